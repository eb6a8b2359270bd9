use bytes::Bytes;

use crate::commands::executable::Executable;
use crate::commands::{key_state, wrong_type, CommandParser, CommandParserError, KeyState};
use crate::commands::Session;
use crate::frame::Frame;
use crate::storage::list::InsertPosition;
use crate::storage::ValueType;
use crate::Error;

/// Splices a value before or after the first occurrence of the pivot.
/// Replies with the new length, -1 when the pivot is missing, 0 when the
/// key does not exist.
///
/// Ref: <https://redis.io/commands/linsert>
#[derive(Debug, PartialEq)]
pub struct Linsert {
    pub key: Bytes,
    pub position: InsertPosition,
    pub pivot: Bytes,
    pub value: Bytes,
}

impl Executable for Linsert {
    fn exec(self, session: &mut Session) -> Result<Frame, Error> {
        let db = session.db();
        let _guard = db.write();

        match key_state(db, &self.key, ValueType::List)? {
            KeyState::Missing => return Ok(Frame::Integer(0)),
            KeyState::WrongType => return Ok(wrong_type()),
            KeyState::Present => {}
        }

        let length = db.insert_list(&self.key, self.position, &self.pivot, &self.value)?;
        Ok(Frame::Integer(length))
    }
}

impl TryFrom<&mut CommandParser> for Linsert {
    type Error = CommandParserError;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        parser.exact(4)?;
        let key = parser.next_bytes()?;
        let position = match parser
            .next_string()
            .map_err(|_| CommandParserError::Syntax)?
            .to_lowercase()
            .as_str()
        {
            "before" => InsertPosition::Before,
            "after" => InsertPosition::After,
            _ => return Err(CommandParserError::Syntax),
        };
        let pivot = parser.next_bytes()?;
        let value = parser.next_bytes()?;
        Ok(Self {
            key,
            position,
            pivot,
            value,
        })
    }
}
