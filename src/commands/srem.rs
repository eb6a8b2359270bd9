use bytes::Bytes;

use crate::commands::executable::Executable;
use crate::commands::{key_state, wrong_type, CommandParser, CommandParserError, KeyState};
use crate::commands::Session;
use crate::frame::Frame;
use crate::storage::ValueType;
use crate::Error;

/// Ref: <https://redis.io/commands/srem>
#[derive(Debug, PartialEq)]
pub struct Srem {
    pub key: Bytes,
    pub members: Vec<Bytes>,
}

impl Executable for Srem {
    fn exec(self, session: &mut Session) -> Result<Frame, Error> {
        let db = session.db();
        let _guard = db.write();

        match key_state(db, &self.key, ValueType::Set)? {
            KeyState::Missing => return Ok(Frame::Integer(0)),
            KeyState::WrongType => return Ok(wrong_type()),
            KeyState::Present => {}
        }

        let members: Vec<Vec<u8>> = self.members.iter().map(|member| member.to_vec()).collect();
        let existing = db.get_fields(&self.key, &members)?;
        let count = existing.values().filter(|value| value.is_some()).count();

        db.delete_fields(&self.key, &members)?;
        Ok(Frame::Integer(count as i64))
    }
}

impl TryFrom<&mut CommandParser> for Srem {
    type Error = CommandParserError;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        parser.at_least(2)?;
        let key = parser.next_bytes()?;
        let members = parser.rest()?;
        Ok(Self { key, members })
    }
}
