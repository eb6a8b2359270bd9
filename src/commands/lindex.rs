use bytes::Bytes;

use crate::commands::executable::Executable;
use crate::commands::{bulk, key_state, wrong_type, CommandParser, CommandParserError, KeyState};
use crate::commands::Session;
use crate::frame::Frame;
use crate::storage::ValueType;
use crate::Error;

/// Walks from the head for non-negative indices, from the tail for negative
/// ones.
///
/// Ref: <https://redis.io/commands/lindex>
#[derive(Debug, PartialEq)]
pub struct Lindex {
    pub key: Bytes,
    pub index: i64,
}

impl Executable for Lindex {
    fn exec(self, session: &mut Session) -> Result<Frame, Error> {
        let db = session.db();
        let _guard = db.read();

        match key_state(db, &self.key, ValueType::List)? {
            KeyState::Missing => return Ok(Frame::Null),
            KeyState::WrongType => return Ok(wrong_type()),
            KeyState::Present => {}
        }

        let length = db.get_list_length(&self.key)? as i64;
        if self.index > length - 1 || self.index < -length {
            return Ok(Frame::Null);
        }

        let value = if self.index >= 0 {
            db.get_lindex_from_head(&self.key, self.index as u32)?
        } else {
            db.get_lindex_from_tail(&self.key, (-self.index - 1) as u32)?
        };

        match value {
            Some(value) => Ok(bulk(value)),
            None => Ok(Frame::Null),
        }
    }
}

impl TryFrom<&mut CommandParser> for Lindex {
    type Error = CommandParserError;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        parser.exact(2)?;
        let key = parser.next_bytes()?;
        let index = parser.next_integer()?;
        Ok(Self { key, index })
    }
}
