use bytes::Bytes;

use crate::commands::executable::Executable;
use crate::commands::{key_state, wrong_type, CommandParser, CommandParserError, KeyState};
use crate::commands::Session;
use crate::frame::Frame;
use crate::storage::ValueType;
use crate::Error;

/// Ref: <https://redis.io/commands/sismember>
#[derive(Debug, PartialEq)]
pub struct Sismember {
    pub key: Bytes,
    pub member: Bytes,
}

impl Executable for Sismember {
    fn exec(self, session: &mut Session) -> Result<Frame, Error> {
        let db = session.db();
        let _guard = db.read();

        match key_state(db, &self.key, ValueType::Set)? {
            KeyState::Missing => return Ok(Frame::Integer(0)),
            KeyState::WrongType => return Ok(wrong_type()),
            KeyState::Present => {}
        }

        let fields = db.get_fields(&self.key, &[self.member.to_vec()])?;
        let is_member = fields
            .get(&self.member.to_vec())
            .map(|value| value.is_some())
            .unwrap_or(false);
        Ok(Frame::Integer(if is_member { 1 } else { 0 }))
    }
}

impl TryFrom<&mut CommandParser> for Sismember {
    type Error = CommandParserError;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        parser.exact(2)?;
        let key = parser.next_bytes()?;
        let member = parser.next_bytes()?;
        Ok(Self { key, member })
    }
}
