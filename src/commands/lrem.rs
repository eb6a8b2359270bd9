use bytes::Bytes;

use crate::commands::executable::Executable;
use crate::commands::{key_state, wrong_type, CommandParser, CommandParserError, KeyState};
use crate::commands::Session;
use crate::frame::Frame;
use crate::storage::ValueType;
use crate::Error;

/// Removes up to `|count|` occurrences of `value`, scanning from the head
/// when `count > 0` and from the tail when `count < 0`. `count = 0` removes
/// nothing here (the reference server behaves this way, where Redis removes
/// every occurrence).
///
/// Ref: <https://redis.io/commands/lrem>
#[derive(Debug, PartialEq)]
pub struct Lrem {
    pub key: Bytes,
    pub count: i64,
    pub value: Bytes,
}

impl Executable for Lrem {
    fn exec(self, session: &mut Session) -> Result<Frame, Error> {
        let db = session.db();
        let _guard = db.write();

        match key_state(db, &self.key, ValueType::List)? {
            KeyState::Missing => return Ok(Frame::Integer(0)),
            KeyState::WrongType => return Ok(wrong_type()),
            KeyState::Present => {}
        }

        if self.count == 0 {
            return Ok(Frame::Integer(0));
        }

        let removed = db.rem_list(&self.key, self.count, &self.value)?;
        Ok(Frame::Integer(removed as i64))
    }
}

impl TryFrom<&mut CommandParser> for Lrem {
    type Error = CommandParserError;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        parser.exact(3)?;
        let key = parser.next_bytes()?;
        let count = parser.next_integer()?;
        let value = parser.next_bytes()?;
        Ok(Self { key, count, value })
    }
}
