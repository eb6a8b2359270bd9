use bytes::Bytes;

use crate::commands::executable::Executable;
use crate::commands::incr::incr_decr;
use crate::commands::{CommandParser, CommandParserError, Session};
use crate::frame::Frame;
use crate::Error;

/// Ref: <https://redis.io/commands/incrby>
#[derive(Debug, PartialEq)]
pub struct Incrby {
    pub key: Bytes,
    pub by: i64,
}

impl Executable for Incrby {
    fn exec(self, session: &mut Session) -> Result<Frame, Error> {
        incr_decr(session.db(), &self.key, self.by)
    }
}

impl TryFrom<&mut CommandParser> for Incrby {
    type Error = CommandParserError;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        parser.exact(2)?;
        let key = parser.next_bytes()?;
        let by = parser.next_integer()?;
        Ok(Self { key, by })
    }
}
