use bytes::Bytes;

use crate::commands::executable::Executable;
use crate::commands::{bulk, key_state, wrong_type, CommandParser, CommandParserError, KeyState};
use crate::commands::Session;
use crate::frame::Frame;
use crate::storage::ValueType;
use crate::Error;

/// Members in backend (lexicographic) order.
///
/// Ref: <https://redis.io/commands/smembers>
#[derive(Debug, PartialEq)]
pub struct Smembers {
    pub key: Bytes,
}

impl Executable for Smembers {
    fn exec(self, session: &mut Session) -> Result<Frame, Error> {
        let db = session.db();
        let _guard = db.read();

        match key_state(db, &self.key, ValueType::Set)? {
            KeyState::Missing => return Ok(Frame::Array(vec![])),
            KeyState::WrongType => return Ok(wrong_type()),
            KeyState::Present => {}
        }

        let members = db.get_field_names(&self.key)?;
        Ok(Frame::Array(members.into_iter().map(bulk).collect()))
    }
}

impl TryFrom<&mut CommandParser> for Smembers {
    type Error = CommandParserError;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        parser.exact(1)?;
        let key = parser.next_bytes()?;
        Ok(Self { key })
    }
}
