use bytes::Bytes;

use crate::commands::executable::Executable;
use crate::commands::{key_state, wrong_type, CommandParser, CommandParserError, KeyState};
use crate::commands::Session;
use crate::frame::Frame;
use crate::storage::ValueType;
use crate::Error;

/// Ref: <https://redis.io/commands/hlen>
#[derive(Debug, PartialEq)]
pub struct Hlen {
    pub key: Bytes,
}

impl Executable for Hlen {
    fn exec(self, session: &mut Session) -> Result<Frame, Error> {
        let db = session.db();
        let _guard = db.read();

        match key_state(db, &self.key, ValueType::Hash)? {
            KeyState::Missing => Ok(Frame::Integer(0)),
            KeyState::WrongType => Ok(wrong_type()),
            KeyState::Present => Ok(Frame::Integer(
                db.get_field_names(&self.key)?.len() as i64
            )),
        }
    }
}

impl TryFrom<&mut CommandParser> for Hlen {
    type Error = CommandParserError;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        parser.exact(1)?;
        let key = parser.next_bytes()?;
        Ok(Self { key })
    }
}
