use bytes::Bytes;

use crate::commands::executable::Executable;
use crate::commands::{key_state, wrong_type, CommandParser, CommandParserError, KeyState};
use crate::commands::Session;
use crate::frame::Frame;
use crate::storage::ValueType;
use crate::Error;

/// Ref: <https://redis.io/commands/ltrim>
#[derive(Debug, PartialEq)]
pub struct Ltrim {
    pub key: Bytes,
    pub start: i64,
    pub end: i64,
}

impl Executable for Ltrim {
    fn exec(self, session: &mut Session) -> Result<Frame, Error> {
        let db = session.db();
        let _guard = db.write();

        match key_state(db, &self.key, ValueType::List)? {
            KeyState::Missing => return Ok(Frame::Simple("OK".to_string())),
            KeyState::WrongType => return Ok(wrong_type()),
            KeyState::Present => {}
        }

        db.trim_list(&self.key, self.start, self.end)?;
        Ok(Frame::Simple("OK".to_string()))
    }
}

impl TryFrom<&mut CommandParser> for Ltrim {
    type Error = CommandParserError;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        parser.exact(3)?;
        let key = parser.next_bytes()?;
        let start = parser.next_integer()?;
        let end = parser.next_integer()?;
        Ok(Self { key, start, end })
    }
}
