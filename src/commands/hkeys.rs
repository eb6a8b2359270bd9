use bytes::Bytes;

use crate::commands::executable::Executable;
use crate::commands::{bulk, key_state, wrong_type, CommandParser, CommandParserError, KeyState};
use crate::commands::Session;
use crate::frame::Frame;
use crate::storage::ValueType;
use crate::Error;

/// Ref: <https://redis.io/commands/hkeys>
#[derive(Debug, PartialEq)]
pub struct Hkeys {
    pub key: Bytes,
}

impl Executable for Hkeys {
    fn exec(self, session: &mut Session) -> Result<Frame, Error> {
        let db = session.db();
        let _guard = db.read();

        match key_state(db, &self.key, ValueType::Hash)? {
            KeyState::Missing => return Ok(Frame::Array(vec![])),
            KeyState::WrongType => return Ok(wrong_type()),
            KeyState::Present => {}
        }

        let names = db.get_field_names(&self.key)?;
        Ok(Frame::Array(names.into_iter().map(bulk).collect()))
    }
}

impl TryFrom<&mut CommandParser> for Hkeys {
    type Error = CommandParserError;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        parser.exact(1)?;
        let key = parser.next_bytes()?;
        Ok(Self { key })
    }
}
