use bytes::Bytes;

use crate::commands::executable::Executable;
use crate::commands::{key_state, wrong_type, CommandParser, CommandParserError, KeyState};
use crate::commands::Session;
use crate::frame::Frame;
use crate::storage::ValueType;
use crate::Error;

/// RPUSH that only works on an existing list.
///
/// Ref: <https://redis.io/commands/rpushx>
#[derive(Debug, PartialEq)]
pub struct Rpushx {
    pub key: Bytes,
    pub values: Vec<Bytes>,
}

impl Executable for Rpushx {
    fn exec(self, session: &mut Session) -> Result<Frame, Error> {
        let db = session.db();
        let _guard = db.write();

        match key_state(db, &self.key, ValueType::List)? {
            KeyState::Missing => return Ok(Frame::Integer(0)),
            KeyState::WrongType => return Ok(wrong_type()),
            KeyState::Present => {}
        }

        let mut length = 0;
        for value in &self.values {
            length = db.push_list_tail(&self.key, ValueType::List, value)?;
        }
        Ok(Frame::Integer(length as i64))
    }
}

impl TryFrom<&mut CommandParser> for Rpushx {
    type Error = CommandParserError;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        parser.at_least(2)?;
        let key = parser.next_bytes()?;
        let values = parser.rest()?;
        Ok(Self { key, values })
    }
}
