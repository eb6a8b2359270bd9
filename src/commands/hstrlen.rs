use bytes::Bytes;

use crate::commands::executable::Executable;
use crate::commands::{key_state, wrong_type, CommandParser, CommandParserError, KeyState};
use crate::commands::Session;
use crate::frame::Frame;
use crate::storage::ValueType;
use crate::Error;

/// Ref: <https://redis.io/commands/hstrlen>
#[derive(Debug, PartialEq)]
pub struct Hstrlen {
    pub key: Bytes,
    pub field: Bytes,
}

impl Executable for Hstrlen {
    fn exec(self, session: &mut Session) -> Result<Frame, Error> {
        let db = session.db();
        let _guard = db.read();

        match key_state(db, &self.key, ValueType::Hash)? {
            KeyState::Missing => return Ok(Frame::Integer(0)),
            KeyState::WrongType => return Ok(wrong_type()),
            KeyState::Present => {}
        }

        let mut fields = db.get_fields(&self.key, &[self.field.to_vec()])?;
        let length = fields
            .remove(&self.field.to_vec())
            .flatten()
            .map(|value| value.len())
            .unwrap_or(0);
        Ok(Frame::Integer(length as i64))
    }
}

impl TryFrom<&mut CommandParser> for Hstrlen {
    type Error = CommandParserError;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        parser.exact(2)?;
        let key = parser.next_bytes()?;
        let field = parser.next_bytes()?;
        Ok(Self { key, field })
    }
}
