use bytes::Bytes;

use crate::commands::executable::Executable;
use crate::commands::{CommandParser, CommandParserError, Session};
use crate::frame::Frame;
use crate::Error;

/// Sets an absolute deadline in unix seconds.
///
/// Ref: <https://redis.io/commands/expireat>
#[derive(Debug, PartialEq)]
pub struct Expireat {
    pub key: Bytes,
    pub at: i64,
}

impl Executable for Expireat {
    fn exec(self, session: &mut Session) -> Result<Frame, Error> {
        let db = session.db();
        let _guard = db.write();

        if db.has(&self.key)?.is_none() {
            return Ok(Frame::Integer(0));
        }

        db.set_expire_at(&self.key, self.at.max(1) as u64)?;
        Ok(Frame::Integer(1))
    }
}

impl TryFrom<&mut CommandParser> for Expireat {
    type Error = CommandParserError;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        parser.exact(2)?;
        let key = parser.next_bytes()?;
        let at = parser.next_integer()?;
        Ok(Self { key, at })
    }
}
