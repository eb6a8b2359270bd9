use bytes::Bytes;

use crate::commands::executable::Executable;
use crate::commands::{CommandParser, CommandParserError, Session};
use crate::frame::Frame;
use crate::storage::expire::now_unix_millis;
use crate::Error;

/// Like TTL, in milliseconds.
///
/// Ref: <https://redis.io/commands/pttl>
#[derive(Debug, PartialEq)]
pub struct Pttl {
    pub key: Bytes,
}

impl Executable for Pttl {
    fn exec(self, session: &mut Session) -> Result<Frame, Error> {
        let db = session.db();
        let _guard = db.read();

        if db.has(&self.key)?.is_none() {
            return Ok(Frame::Integer(-1));
        }

        match db.get_expire_at(&self.key)? {
            Some(at) => Ok(Frame::Integer(
                at as i64 * 1000 - now_unix_millis() as i64,
            )),
            None => Ok(Frame::Integer(-1)),
        }
    }
}

impl TryFrom<&mut CommandParser> for Pttl {
    type Error = CommandParserError;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        parser.exact(1)?;
        let key = parser.next_bytes()?;
        Ok(Self { key })
    }
}
