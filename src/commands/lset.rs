use bytes::Bytes;

use crate::commands::executable::Executable;
use crate::commands::{key_state, wrong_type, CommandParser, CommandParserError, KeyState};
use crate::commands::{Session, ERR_INDEX_OUT_RANGE, ERR_NO_SUCH_KEY};
use crate::frame::Frame;
use crate::storage::{StorageError, ValueType};
use crate::Error;

/// Ref: <https://redis.io/commands/lset>
#[derive(Debug, PartialEq)]
pub struct Lset {
    pub key: Bytes,
    pub index: i64,
    pub value: Bytes,
}

impl Executable for Lset {
    fn exec(self, session: &mut Session) -> Result<Frame, Error> {
        let db = session.db();
        let _guard = db.write();

        match key_state(db, &self.key, ValueType::List)? {
            KeyState::Missing => return Ok(Frame::Error(ERR_NO_SUCH_KEY.to_string())),
            KeyState::WrongType => return Ok(wrong_type()),
            KeyState::Present => {}
        }

        match db.set_list_element(&self.key, self.index, &self.value) {
            Ok(()) => Ok(Frame::Simple("OK".to_string())),
            Err(StorageError::IndexOutOfRange) => {
                Ok(Frame::Error(ERR_INDEX_OUT_RANGE.to_string()))
            }
            Err(err) => Err(err.into()),
        }
    }
}

impl TryFrom<&mut CommandParser> for Lset {
    type Error = CommandParserError;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        parser.exact(3)?;
        let key = parser.next_bytes()?;
        let index = parser.next_integer()?;
        let value = parser.next_bytes()?;
        Ok(Self { key, index, value })
    }
}
