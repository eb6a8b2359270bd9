use std::collections::HashMap;

use bytes::Bytes;

use crate::commands::executable::Executable;
use crate::commands::{key_state, wrong_type, CommandParser, CommandParserError, KeyState};
use crate::commands::{Session, ERR_NOT_VALID_INT};
use crate::frame::Frame;
use crate::storage::ValueType;
use crate::Error;

/// Ref: <https://redis.io/commands/hincrby>
#[derive(Debug, PartialEq)]
pub struct Hincrby {
    pub key: Bytes,
    pub field: Bytes,
    pub by: i64,
}

impl Executable for Hincrby {
    fn exec(self, session: &mut Session) -> Result<Frame, Error> {
        let db = session.db();
        let _guard = db.write();

        if let KeyState::WrongType = key_state(db, &self.key, ValueType::Hash)? {
            return Ok(wrong_type());
        }

        let mut existing = db.get_fields(&self.key, &[self.field.to_vec()])?;
        let new_value = match existing.remove(&self.field.to_vec()).flatten() {
            None => Some(self.by),
            Some(value) => std::str::from_utf8(&value)
                .ok()
                .and_then(|s| s.parse::<i64>().ok())
                .and_then(|i| i.checked_add(self.by)),
        };

        let new_value = match new_value {
            Some(new_value) => new_value,
            None => return Ok(Frame::Error(ERR_NOT_VALID_INT.to_string())),
        };

        let mut fields = HashMap::new();
        fields.insert(self.field.to_vec(), new_value.to_string().into_bytes());
        db.put_hash(&self.key, ValueType::Hash, &fields)?;
        Ok(Frame::Integer(new_value))
    }
}

impl TryFrom<&mut CommandParser> for Hincrby {
    type Error = CommandParserError;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        parser.exact(3)?;
        let key = parser.next_bytes()?;
        let field = parser.next_bytes()?;
        let by = parser.next_integer()?;
        Ok(Self { key, field, by })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_session;

    #[test]
    fn counts_from_zero_for_new_fields() {
        let mut session = test_session();

        let cmd = Hincrby {
            key: Bytes::from("h"),
            field: Bytes::from("n"),
            by: 5,
        };
        assert_eq!(cmd.exec(&mut session).unwrap(), Frame::Integer(5));

        let cmd = Hincrby {
            key: Bytes::from("h"),
            field: Bytes::from("n"),
            by: -7,
        };
        assert_eq!(cmd.exec(&mut session).unwrap(), Frame::Integer(-2));
    }
}
