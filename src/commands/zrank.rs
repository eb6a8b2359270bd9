use bytes::Bytes;

use crate::commands::executable::Executable;
use crate::commands::{key_state, wrong_type, CommandParser, CommandParserError, KeyState};
use crate::commands::Session;
use crate::frame::Frame;
use crate::storage::ValueType;
use crate::Error;

/// 0-based rank of a member in ascending (score, member) order.
///
/// Ref: <https://redis.io/commands/zrank>
#[derive(Debug, PartialEq)]
pub struct Zrank {
    pub key: Bytes,
    pub member: Bytes,
}

impl Executable for Zrank {
    fn exec(self, session: &mut Session) -> Result<Frame, Error> {
        let db = session.db();
        let _guard = db.read();

        match key_state(db, &self.key, ValueType::SortedSet)? {
            KeyState::Missing => return Ok(Frame::Null),
            KeyState::WrongType => return Ok(wrong_type()),
            KeyState::Present => {}
        }

        match db.get_skip_field_rank(&self.key, &self.member)? {
            Some(rank) => Ok(Frame::Integer(rank as i64)),
            None => Ok(Frame::Null),
        }
    }
}

impl TryFrom<&mut CommandParser> for Zrank {
    type Error = CommandParserError;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        parser.exact(2)?;
        let key = parser.next_bytes()?;
        let member = parser.next_bytes()?;
        Ok(Self { key, member })
    }
}
