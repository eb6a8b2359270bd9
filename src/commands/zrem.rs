use bytes::Bytes;

use crate::commands::executable::Executable;
use crate::commands::{key_state, wrong_type, CommandParser, CommandParserError, KeyState};
use crate::commands::Session;
use crate::frame::Frame;
use crate::storage::ValueType;
use crate::Error;

/// Variadic member removal; deleting the last member destroys the set.
///
/// Ref: <https://redis.io/commands/zrem>
#[derive(Debug, PartialEq)]
pub struct Zrem {
    pub key: Bytes,
    pub members: Vec<Bytes>,
}

impl Executable for Zrem {
    fn exec(self, session: &mut Session) -> Result<Frame, Error> {
        let db = session.db();
        let _guard = db.write();

        match key_state(db, &self.key, ValueType::SortedSet)? {
            KeyState::Missing => return Ok(Frame::Integer(0)),
            KeyState::WrongType => return Ok(wrong_type()),
            KeyState::Present => {}
        }

        let mut removed = 0;
        for member in &self.members {
            removed += db.delete_skip_field(&self.key, member)? as i64;
        }
        Ok(Frame::Integer(removed))
    }
}

impl TryFrom<&mut CommandParser> for Zrem {
    type Error = CommandParserError;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        parser.at_least(2)?;
        let key = parser.next_bytes()?;
        let members = parser.rest()?;
        Ok(Self { key, members })
    }
}
