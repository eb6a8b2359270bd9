use bytes::Bytes;

use crate::commands::executable::Executable;
use crate::commands::{CommandParser, CommandParserError, Session};
use crate::frame::Frame;
use crate::storage::expire::now_unix_millis;
use crate::Error;

/// Sets a relative deadline in milliseconds. The stored deadline has second
/// granularity, truncated downward, so a short PEXPIRE usually reclaims the
/// key on its very next access.
///
/// Ref: <https://redis.io/commands/pexpire>
#[derive(Debug, PartialEq)]
pub struct Pexpire {
    pub key: Bytes,
    pub milliseconds: i64,
}

impl Executable for Pexpire {
    fn exec(self, session: &mut Session) -> Result<Frame, Error> {
        let db = session.db();
        let _guard = db.write();

        if db.has(&self.key)?.is_none() {
            return Ok(Frame::Integer(0));
        }

        let at_millis = (now_unix_millis() as i64).saturating_add(self.milliseconds);
        let at = (at_millis / 1000).max(1) as u64;
        db.set_expire_at(&self.key, at)?;
        Ok(Frame::Integer(1))
    }
}

impl TryFrom<&mut CommandParser> for Pexpire {
    type Error = CommandParserError;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        parser.exact(2)?;
        let key = parser.next_bytes()?;
        let milliseconds = parser.next_integer()?;
        Ok(Self { key, milliseconds })
    }
}
