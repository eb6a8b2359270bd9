use bytes::Bytes;

use crate::commands::executable::Executable;
use crate::commands::incr::incr_decr;
use crate::commands::{CommandParser, CommandParserError, Session, ERR_NOT_VALID_INT};
use crate::frame::Frame;
use crate::Error;

/// Ref: <https://redis.io/commands/decrby>
#[derive(Debug, PartialEq)]
pub struct Decrby {
    pub key: Bytes,
    pub by: i64,
}

impl Executable for Decrby {
    fn exec(self, session: &mut Session) -> Result<Frame, Error> {
        let by = match self.by.checked_neg() {
            Some(by) => by,
            None => return Ok(Frame::Error(ERR_NOT_VALID_INT.to_string())),
        };
        incr_decr(session.db(), &self.key, by)
    }
}

impl TryFrom<&mut CommandParser> for Decrby {
    type Error = CommandParserError;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        parser.exact(2)?;
        let key = parser.next_bytes()?;
        let by = parser.next_integer()?;
        Ok(Self { key, by })
    }
}
