use bytes::Bytes;

use crate::commands::executable::Executable;
use crate::commands::{bulk, key_state, wrong_type, CommandParser, CommandParserError, KeyState};
use crate::commands::{Session, ERR_NOT_VALID_FLOAT};
use crate::frame::Frame;
use crate::storage::ValueType;
use crate::utils::format_float;
use crate::Error;

/// Ref: <https://redis.io/commands/incrbyfloat>
#[derive(Debug, PartialEq)]
pub struct Incrbyfloat {
    pub key: Bytes,
    pub by: f64,
}

impl Executable for Incrbyfloat {
    fn exec(self, session: &mut Session) -> Result<Frame, Error> {
        let db = session.db();
        let _guard = db.write();

        let new_value = match key_state(db, &self.key, ValueType::String)? {
            KeyState::WrongType => return Ok(wrong_type()),
            KeyState::Missing => self.by,
            KeyState::Present => {
                let value = db.get_string(&self.key)?;
                let current = std::str::from_utf8(&value)
                    .ok()
                    .and_then(|s| s.parse::<f64>().ok());
                match current {
                    Some(current) => current + self.by,
                    None => return Ok(Frame::Error(ERR_NOT_VALID_FLOAT.to_string())),
                }
            }
        };

        let formatted = format_float(new_value);
        db.put_string(&self.key, formatted.as_bytes())?;
        Ok(bulk(formatted.into_bytes()))
    }
}

impl TryFrom<&mut CommandParser> for Incrbyfloat {
    type Error = CommandParserError;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        parser.exact(2)?;
        let key = parser.next_bytes()?;
        let by = parser.next_float()?;
        Ok(Self { key, by })
    }
}
