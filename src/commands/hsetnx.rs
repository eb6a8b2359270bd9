use std::collections::HashMap;

use bytes::Bytes;

use crate::commands::executable::Executable;
use crate::commands::{key_state, wrong_type, CommandParser, CommandParserError, KeyState};
use crate::commands::Session;
use crate::frame::Frame;
use crate::storage::ValueType;
use crate::Error;

/// Ref: <https://redis.io/commands/hsetnx>
#[derive(Debug, PartialEq)]
pub struct Hsetnx {
    pub key: Bytes,
    pub field: Bytes,
    pub value: Bytes,
}

impl Executable for Hsetnx {
    fn exec(self, session: &mut Session) -> Result<Frame, Error> {
        let db = session.db();
        let _guard = db.write();

        if let KeyState::WrongType = key_state(db, &self.key, ValueType::Hash)? {
            return Ok(wrong_type());
        }

        let existing = db.get_fields(&self.key, &[self.field.to_vec()])?;
        let field_exists = existing
            .get(&self.field.to_vec())
            .map(|value| value.is_some())
            .unwrap_or(false);
        if field_exists {
            return Ok(Frame::Integer(0));
        }

        let mut fields = HashMap::new();
        fields.insert(self.field.to_vec(), self.value.to_vec());
        db.put_hash(&self.key, ValueType::Hash, &fields)?;
        Ok(Frame::Integer(1))
    }
}

impl TryFrom<&mut CommandParser> for Hsetnx {
    type Error = CommandParserError;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        parser.exact(3)?;
        let key = parser.next_bytes()?;
        let field = parser.next_bytes()?;
        let value = parser.next_bytes()?;
        Ok(Self { key, field, value })
    }
}
