use bytes::Bytes;

use crate::commands::executable::Executable;
use crate::commands::{bulk, key_state, wrong_type, CommandParser, CommandParserError, KeyState};
use crate::commands::Session;
use crate::frame::Frame;
use crate::storage::ValueType;
use crate::Error;

/// Field/value pairs in backend (lexicographic) order.
///
/// Ref: <https://redis.io/commands/hgetall>
#[derive(Debug, PartialEq)]
pub struct Hgetall {
    pub key: Bytes,
}

impl Executable for Hgetall {
    fn exec(self, session: &mut Session) -> Result<Frame, Error> {
        let db = session.db();
        let _guard = db.read();

        match key_state(db, &self.key, ValueType::Hash)? {
            KeyState::Missing => return Ok(Frame::Array(vec![])),
            KeyState::WrongType => return Ok(wrong_type()),
            KeyState::Present => {}
        }

        let mut items = Vec::new();
        for (field, value) in db.get_hash_as_array(&self.key)? {
            items.push(bulk(field));
            items.push(bulk(value));
        }
        Ok(Frame::Array(items))
    }
}

impl TryFrom<&mut CommandParser> for Hgetall {
    type Error = CommandParserError;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        parser.exact(1)?;
        let key = parser.next_bytes()?;
        Ok(Self { key })
    }
}
