use bytes::Bytes;

use crate::commands::executable::Executable;
use crate::commands::{key_state, wrong_type, CommandParser, CommandParserError, KeyState};
use crate::commands::{Session, ERR_BIT_OFFSET, ERR_BIT_VALUE, ERR_STRING_LIMIT, STRING_LIMIT};
use crate::frame::Frame;
use crate::storage::ValueType;
use crate::Error;

/// Sets or clears one bit, zero-extending the string up to the touched
/// byte. Replies with the previous bit value.
///
/// Ref: <https://redis.io/commands/setbit>
#[derive(Debug, PartialEq)]
pub struct Setbit {
    pub key: Bytes,
    pub offset: i64,
    pub bit: i64,
}

impl Executable for Setbit {
    fn exec(self, session: &mut Session) -> Result<Frame, Error> {
        // Offsets address single bits, so the valid range is 0..2^32.
        if self.offset < 0 || self.offset >= (STRING_LIMIT as i64) * 8 {
            return Ok(Frame::Error(ERR_BIT_OFFSET.to_string()));
        }
        if self.bit != 0 && self.bit != 1 {
            return Ok(Frame::Error(ERR_BIT_VALUE.to_string()));
        }

        let offset = self.offset as usize;
        let byte = offset / 8;
        let pos = offset % 8;
        if byte + 1 > STRING_LIMIT {
            return Ok(Frame::Error(ERR_STRING_LIMIT.to_string()));
        }

        let db = session.db();
        let _guard = db.write();

        let mut value = match key_state(db, &self.key, ValueType::String)? {
            KeyState::WrongType => return Ok(wrong_type()),
            KeyState::Missing => Vec::new(),
            KeyState::Present => db.get_string(&self.key)?,
        };

        if value.len() < byte + 1 {
            value.resize(byte + 1, 0);
        }

        let previous = value[byte] >> (7 - pos) & 0x01;
        match self.bit {
            0 => value[byte] &= !(0x01 << (7 - pos)),
            _ => value[byte] |= 0x01 << (7 - pos),
        }

        db.put_string(&self.key, &value)?;
        Ok(Frame::Integer(previous as i64))
    }
}

impl TryFrom<&mut CommandParser> for Setbit {
    type Error = CommandParserError;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        parser.exact(3)?;
        let key = parser.next_bytes()?;
        let offset = parser.next_integer()?;
        let bit = parser.next_integer()?;
        Ok(Self { key, offset, bit })
    }
}
