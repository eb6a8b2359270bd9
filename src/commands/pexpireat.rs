use bytes::Bytes;

use crate::commands::executable::Executable;
use crate::commands::{CommandParser, CommandParserError, Session};
use crate::frame::Frame;
use crate::Error;

/// Sets an absolute deadline in unix milliseconds.
///
/// Ref: <https://redis.io/commands/pexpireat>
#[derive(Debug, PartialEq)]
pub struct Pexpireat {
    pub key: Bytes,
    pub at_millis: i64,
}

impl Executable for Pexpireat {
    fn exec(self, session: &mut Session) -> Result<Frame, Error> {
        let db = session.db();
        let _guard = db.write();

        if db.has(&self.key)?.is_none() {
            return Ok(Frame::Integer(0));
        }

        db.set_expire_at(&self.key, (self.at_millis / 1000).max(1) as u64)?;
        Ok(Frame::Integer(1))
    }
}

impl TryFrom<&mut CommandParser> for Pexpireat {
    type Error = CommandParserError;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        parser.exact(2)?;
        let key = parser.next_bytes()?;
        let at_millis = parser.next_integer()?;
        Ok(Self { key, at_millis })
    }
}
