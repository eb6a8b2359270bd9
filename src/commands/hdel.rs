use bytes::Bytes;

use crate::commands::executable::Executable;
use crate::commands::{key_state, wrong_type, CommandParser, CommandParserError, KeyState};
use crate::commands::Session;
use crate::frame::Frame;
use crate::storage::ValueType;
use crate::Error;

/// Variadic field delete; replies with the number of fields that existed.
///
/// Ref: <https://redis.io/commands/hdel>
#[derive(Debug, PartialEq)]
pub struct Hdel {
    pub key: Bytes,
    pub fields: Vec<Bytes>,
}

impl Executable for Hdel {
    fn exec(self, session: &mut Session) -> Result<Frame, Error> {
        let db = session.db();
        let _guard = db.write();

        match key_state(db, &self.key, ValueType::Hash)? {
            KeyState::Missing => return Ok(Frame::Integer(0)),
            KeyState::WrongType => return Ok(wrong_type()),
            KeyState::Present => {}
        }

        let fields: Vec<Vec<u8>> = self.fields.iter().map(|field| field.to_vec()).collect();
        let existing = db.get_fields(&self.key, &fields)?;
        let count = existing.values().filter(|value| value.is_some()).count();

        db.delete_fields(&self.key, &fields)?;
        Ok(Frame::Integer(count as i64))
    }
}

impl TryFrom<&mut CommandParser> for Hdel {
    type Error = CommandParserError;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        parser.at_least(2)?;
        let key = parser.next_bytes()?;
        let fields = parser.rest()?;
        Ok(Self { key, fields })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_session;
    use std::collections::HashMap;

    #[test]
    fn deleting_last_field_removes_key() {
        let mut session = test_session();
        let mut fields = HashMap::new();
        fields.insert(b"f".to_vec(), b"v".to_vec());
        session
            .db()
            .put_hash(b"h", ValueType::Hash, &fields)
            .unwrap();

        let cmd = Hdel {
            key: Bytes::from("h"),
            fields: vec![Bytes::from("f"), Bytes::from("missing")],
        };
        assert_eq!(cmd.exec(&mut session).unwrap(), Frame::Integer(1));
        assert_eq!(session.db().has(b"h").unwrap(), None);
    }
}
