use bytes::Bytes;

use crate::commands::executable::Executable;
use crate::commands::{bulk, key_state, wrong_type, CommandParser, CommandParserError, KeyState};
use crate::commands::Session;
use crate::frame::Frame;
use crate::storage::ValueType;
use crate::Error;

/// Ref: <https://redis.io/commands/lpop>
#[derive(Debug, PartialEq)]
pub struct Lpop {
    pub key: Bytes,
}

impl Executable for Lpop {
    fn exec(self, session: &mut Session) -> Result<Frame, Error> {
        let db = session.db();
        let _guard = db.write();

        match key_state(db, &self.key, ValueType::List)? {
            KeyState::Missing => return Ok(Frame::Null),
            KeyState::WrongType => return Ok(wrong_type()),
            KeyState::Present => {}
        }

        match db.pop_list_head(&self.key)? {
            Some(value) => Ok(bulk(value)),
            None => Ok(Frame::Null),
        }
    }
}

impl TryFrom<&mut CommandParser> for Lpop {
    type Error = CommandParserError;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        parser.exact(1)?;
        let key = parser.next_bytes()?;
        Ok(Self { key })
    }
}
