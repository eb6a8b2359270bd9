use bytes::Bytes;

use crate::commands::executable::Executable;
use crate::commands::{bulk, key_state, wrong_type, CommandParser, CommandParserError, KeyState};
use crate::commands::Session;
use crate::frame::Frame;
use crate::storage::ValueType;
use crate::Error;

/// Ref: <https://redis.io/commands/lrange>
#[derive(Debug, PartialEq)]
pub struct Lrange {
    pub key: Bytes,
    pub start: i64,
    pub end: i64,
}

impl Executable for Lrange {
    fn exec(self, session: &mut Session) -> Result<Frame, Error> {
        let db = session.db();
        let _guard = db.read();

        match key_state(db, &self.key, ValueType::List)? {
            KeyState::Missing => return Ok(Frame::Array(vec![])),
            KeyState::WrongType => return Ok(wrong_type()),
            KeyState::Present => {}
        }

        let values = db.get_list_range(&self.key, self.start, self.end)?;
        Ok(Frame::Array(values.into_iter().map(bulk).collect()))
    }
}

impl TryFrom<&mut CommandParser> for Lrange {
    type Error = CommandParserError;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        parser.exact(3)?;
        let key = parser.next_bytes()?;
        let start = parser.next_integer()?;
        let end = parser.next_integer()?;
        Ok(Self { key, start, end })
    }
}
