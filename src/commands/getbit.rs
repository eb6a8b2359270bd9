use bytes::Bytes;

use crate::commands::executable::Executable;
use crate::commands::{key_state, wrong_type, CommandParser, CommandParserError, KeyState};
use crate::commands::{Session, ERR_BIT_OFFSET};
use crate::frame::Frame;
use crate::storage::ValueType;
use crate::Error;

/// Ref: <https://redis.io/commands/getbit>
#[derive(Debug, PartialEq)]
pub struct Getbit {
    pub key: Bytes,
    pub offset: i64,
}

impl Executable for Getbit {
    fn exec(self, session: &mut Session) -> Result<Frame, Error> {
        if self.offset < 0 {
            return Ok(Frame::Error(ERR_BIT_OFFSET.to_string()));
        }

        let db = session.db();
        let _guard = db.read();

        match key_state(db, &self.key, ValueType::String)? {
            KeyState::Missing => return Ok(Frame::Integer(0)),
            KeyState::WrongType => return Ok(wrong_type()),
            KeyState::Present => {}
        }

        let value = db.get_string(&self.key)?;
        let offset = self.offset as usize;
        if offset >= 8 * value.len() {
            return Ok(Frame::Integer(0));
        }

        let byte = offset / 8;
        let pos = offset % 8;
        let bit = value[byte] >> (7 - pos) & 0x01;
        Ok(Frame::Integer(bit as i64))
    }
}

impl TryFrom<&mut CommandParser> for Getbit {
    type Error = CommandParserError;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        parser.exact(2)?;
        let key = parser.next_bytes()?;
        let offset = parser.next_integer()?;
        Ok(Self { key, offset })
    }
}
