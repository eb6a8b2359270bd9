use std::collections::HashMap;

use bytes::Bytes;

use crate::commands::executable::Executable;
use crate::commands::{key_state, wrong_type, CommandParser, CommandParserError, KeyState};
use crate::commands::Session;
use crate::frame::Frame;
use crate::storage::ValueType;
use crate::Error;

/// Ref: <https://redis.io/commands/hmset>
#[derive(Debug, PartialEq)]
pub struct Hmset {
    pub key: Bytes,
    pub pairs: Vec<(Bytes, Bytes)>,
}

impl Executable for Hmset {
    fn exec(self, session: &mut Session) -> Result<Frame, Error> {
        let db = session.db();
        let _guard = db.write();

        if let KeyState::WrongType = key_state(db, &self.key, ValueType::Hash)? {
            return Ok(wrong_type());
        }

        let mut fields = HashMap::new();
        for (field, value) in &self.pairs {
            fields.insert(field.to_vec(), value.to_vec());
        }
        db.put_hash(&self.key, ValueType::Hash, &fields)?;
        Ok(Frame::Simple("OK".to_string()))
    }
}

impl TryFrom<&mut CommandParser> for Hmset {
    type Error = CommandParserError;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        if parser.remaining() < 3 || parser.remaining() % 2 != 1 {
            return Err(parser.wrong_arguments());
        }

        let key = parser.next_bytes()?;
        let mut pairs = Vec::with_capacity(parser.remaining() / 2);
        while parser.remaining() > 0 {
            let field = parser.next_bytes()?;
            let value = parser.next_bytes()?;
            pairs.push((field, value));
        }
        Ok(Self { key, pairs })
    }
}
