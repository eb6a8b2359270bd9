use bytes::Bytes;

use crate::commands::executable::Executable;
use crate::commands::{CommandParser, CommandParserError, Session};
use crate::frame::Frame;
use crate::storage::expire::now_unix_seconds;
use crate::Error;

/// Ref: <https://redis.io/commands/setex>
#[derive(Debug, PartialEq)]
pub struct Setex {
    pub key: Bytes,
    pub seconds: i64,
    pub value: Bytes,
}

impl Executable for Setex {
    fn exec(self, session: &mut Session) -> Result<Frame, Error> {
        let db = session.db();
        let _guard = db.write();

        db.put_string(&self.key, &self.value)?;
        let at = (now_unix_seconds() as i64).saturating_add(self.seconds).max(1) as u64;
        db.set_expire_at(&self.key, at)?;

        Ok(Frame::Simple("OK".to_string()))
    }
}

impl TryFrom<&mut CommandParser> for Setex {
    type Error = CommandParserError;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        parser.exact(3)?;
        let key = parser.next_bytes()?;
        let seconds = parser.next_integer()?;
        let value = parser.next_bytes()?;
        Ok(Self {
            key,
            seconds,
            value,
        })
    }
}
