use bytes::Bytes;

use crate::commands::executable::Executable;
use crate::commands::{bulk, key_state, wrong_type, CommandParser, CommandParserError, KeyState};
use crate::commands::Session;
use crate::frame::Frame;
use crate::storage::ValueType;
use crate::Error;

/// Ref: <https://redis.io/commands/hget>
#[derive(Debug, PartialEq)]
pub struct Hget {
    pub key: Bytes,
    pub field: Bytes,
}

impl Executable for Hget {
    fn exec(self, session: &mut Session) -> Result<Frame, Error> {
        let db = session.db();
        let _guard = db.read();

        match key_state(db, &self.key, ValueType::Hash)? {
            KeyState::Missing => return Ok(Frame::Null),
            KeyState::WrongType => return Ok(wrong_type()),
            KeyState::Present => {}
        }

        let mut fields = db.get_fields(&self.key, &[self.field.to_vec()])?;
        match fields.remove(&self.field.to_vec()).flatten() {
            Some(value) => Ok(bulk(value)),
            None => Ok(Frame::Null),
        }
    }
}

impl TryFrom<&mut CommandParser> for Hget {
    type Error = CommandParserError;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        parser.exact(2)?;
        let key = parser.next_bytes()?;
        let field = parser.next_bytes()?;
        Ok(Self { key, field })
    }
}
