use bytes::Bytes;

use crate::commands::executable::Executable;
use crate::commands::{bulk, key_state, wrong_type, CommandParser, CommandParserError, KeyState};
use crate::commands::{Session, ERR_STRING_LIMIT, STRING_LIMIT};
use crate::frame::Frame;
use crate::storage::ValueType;
use crate::Error;

/// Ref: <https://redis.io/commands/getset>
#[derive(Debug, PartialEq)]
pub struct Getset {
    pub key: Bytes,
    pub value: Bytes,
}

impl Executable for Getset {
    fn exec(self, session: &mut Session) -> Result<Frame, Error> {
        if self.value.len() > STRING_LIMIT {
            return Ok(Frame::Error(ERR_STRING_LIMIT.to_string()));
        }

        let db = session.db();
        let _guard = db.write();

        let old = match key_state(db, &self.key, ValueType::String)? {
            KeyState::WrongType => return Ok(wrong_type()),
            KeyState::Missing => None,
            KeyState::Present => Some(db.get_string(&self.key)?),
        };

        db.put_string(&self.key, &self.value)?;

        match old {
            Some(value) => Ok(bulk(value)),
            None => Ok(Frame::Null),
        }
    }
}

impl TryFrom<&mut CommandParser> for Getset {
    type Error = CommandParserError;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        parser.exact(2)?;
        let key = parser.next_bytes()?;
        let value = parser.next_bytes()?;
        Ok(Self { key, value })
    }
}
