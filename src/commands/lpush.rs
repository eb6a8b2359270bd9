use bytes::Bytes;

use crate::commands::executable::Executable;
use crate::commands::{key_state, wrong_type, CommandParser, CommandParserError, KeyState};
use crate::commands::Session;
use crate::frame::Frame;
use crate::storage::ValueType;
use crate::Error;

/// Ref: <https://redis.io/commands/lpush>
#[derive(Debug, PartialEq)]
pub struct Lpush {
    pub key: Bytes,
    pub values: Vec<Bytes>,
}

impl Executable for Lpush {
    fn exec(self, session: &mut Session) -> Result<Frame, Error> {
        let db = session.db();
        let _guard = db.write();

        if let KeyState::WrongType = key_state(db, &self.key, ValueType::List)? {
            return Ok(wrong_type());
        }

        let mut length = 0;
        for value in &self.values {
            length = db.push_list_head(&self.key, ValueType::List, value)?;
        }
        Ok(Frame::Integer(length as i64))
    }
}

impl TryFrom<&mut CommandParser> for Lpush {
    type Error = CommandParserError;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        parser.at_least(2)?;
        let key = parser.next_bytes()?;
        let values = parser.rest()?;
        Ok(Self { key, values })
    }
}
