use bytes::Bytes;

use crate::commands::executable::Executable;
use crate::commands::{CommandParser, CommandParserError, Session};
use crate::frame::Frame;
use crate::storage::expire::now_unix_seconds;
use crate::Error;

/// Sets a relative deadline in seconds.
///
/// Ref: <https://redis.io/commands/expire>
#[derive(Debug, PartialEq)]
pub struct Expire {
    pub key: Bytes,
    pub seconds: i64,
}

impl Executable for Expire {
    fn exec(self, session: &mut Session) -> Result<Frame, Error> {
        let db = session.db();
        let _guard = db.write();

        if db.has(&self.key)?.is_none() {
            return Ok(Frame::Integer(0));
        }

        let at = (now_unix_seconds() as i64).saturating_add(self.seconds).max(1) as u64;
        db.set_expire_at(&self.key, at)?;
        Ok(Frame::Integer(1))
    }
}

impl TryFrom<&mut CommandParser> for Expire {
    type Error = CommandParserError;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        parser.exact(2)?;
        let key = parser.next_bytes()?;
        let seconds = parser.next_integer()?;
        Ok(Self { key, seconds })
    }
}
