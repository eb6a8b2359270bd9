use std::collections::HashMap;

use bytes::Bytes;

use crate::commands::executable::Executable;
use crate::commands::{bulk, key_state, wrong_type, CommandParser, CommandParserError, KeyState};
use crate::commands::{Session, ERR_NOT_VALID_FLOAT};
use crate::frame::Frame;
use crate::storage::ValueType;
use crate::utils::format_float;
use crate::Error;

/// Ref: <https://redis.io/commands/hincrbyfloat>
#[derive(Debug, PartialEq)]
pub struct Hincrbyfloat {
    pub key: Bytes,
    pub field: Bytes,
    pub by: f64,
}

impl Executable for Hincrbyfloat {
    fn exec(self, session: &mut Session) -> Result<Frame, Error> {
        let db = session.db();
        let _guard = db.write();

        if let KeyState::WrongType = key_state(db, &self.key, ValueType::Hash)? {
            return Ok(wrong_type());
        }

        let mut existing = db.get_fields(&self.key, &[self.field.to_vec()])?;
        let new_value = match existing.remove(&self.field.to_vec()).flatten() {
            None => self.by,
            Some(value) => {
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
        let mut fields = HashMap::new();
        fields.insert(self.field.to_vec(), formatted.clone().into_bytes());
        db.put_hash(&self.key, ValueType::Hash, &fields)?;
        Ok(bulk(formatted.into_bytes()))
    }
}

impl TryFrom<&mut CommandParser> for Hincrbyfloat {
    type Error = CommandParserError;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        parser.exact(3)?;
        let key = parser.next_bytes()?;
        let field = parser.next_bytes()?;
        let by = parser.next_float()?;
        Ok(Self { key, field, by })
    }
}
