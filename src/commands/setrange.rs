use bytes::Bytes;

use crate::commands::executable::Executable;
use crate::commands::{key_state, wrong_type, CommandParser, CommandParserError, KeyState};
use crate::commands::{Session, ERR_OFFSET_OUT_RANGE, ERR_STRING_LIMIT, STRING_LIMIT};
use crate::frame::Frame;
use crate::storage::ValueType;
use crate::Error;

/// Overwrites part of the string at `offset`, zero-padding the gap when the
/// string is shorter.
///
/// Ref: <https://redis.io/commands/setrange>
#[derive(Debug, PartialEq)]
pub struct Setrange {
    pub key: Bytes,
    pub offset: i64,
    pub value: Bytes,
}

impl Executable for Setrange {
    fn exec(self, session: &mut Session) -> Result<Frame, Error> {
        if self.offset < 0 {
            return Ok(Frame::Error(ERR_OFFSET_OUT_RANGE.to_string()));
        }
        let offset = self.offset as usize;
        if offset + self.value.len() > STRING_LIMIT {
            return Ok(Frame::Error(ERR_STRING_LIMIT.to_string()));
        }

        let db = session.db();
        let _guard = db.write();

        let mut value = match key_state(db, &self.key, ValueType::String)? {
            KeyState::WrongType => return Ok(wrong_type()),
            KeyState::Missing => Vec::new(),
            KeyState::Present => db.get_string(&self.key)?,
        };

        if value.len() < offset + self.value.len() {
            value.resize(offset + self.value.len(), 0);
        }
        value[offset..offset + self.value.len()].copy_from_slice(&self.value);

        db.put_string(&self.key, &value)?;
        Ok(Frame::Integer(value.len() as i64))
    }
}

impl TryFrom<&mut CommandParser> for Setrange {
    type Error = CommandParserError;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        parser.exact(3)?;
        let key = parser.next_bytes()?;
        let offset = parser.next_integer()?;
        let value = parser.next_bytes()?;
        Ok(Self { key, offset, value })
    }
}
