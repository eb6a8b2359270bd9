use bytes::Bytes;

use crate::commands::executable::Executable;
use crate::commands::incr::incr_decr;
use crate::commands::{CommandParser, CommandParserError, Session};
use crate::frame::Frame;
use crate::Error;

/// Ref: <https://redis.io/commands/decr>
#[derive(Debug, PartialEq)]
pub struct Decr {
    pub key: Bytes,
}

impl Executable for Decr {
    fn exec(self, session: &mut Session) -> Result<Frame, Error> {
        incr_decr(session.db(), &self.key, -1)
    }
}

impl TryFrom<&mut CommandParser> for Decr {
    type Error = CommandParserError;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        parser.exact(1)?;
        let key = parser.next_bytes()?;
        Ok(Self { key })
    }
}
