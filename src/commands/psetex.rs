use bytes::Bytes;

use crate::commands::executable::Executable;
use crate::commands::{CommandParser, CommandParserError, Session};
use crate::frame::Frame;
use crate::storage::expire::now_unix_millis;
use crate::Error;

/// Ref: <https://redis.io/commands/psetex>
#[derive(Debug, PartialEq)]
pub struct Psetex {
    pub key: Bytes,
    pub milliseconds: i64,
    pub value: Bytes,
}

impl Executable for Psetex {
    fn exec(self, session: &mut Session) -> Result<Frame, Error> {
        let db = session.db();
        let _guard = db.write();

        db.put_string(&self.key, &self.value)?;
        let at_millis = (now_unix_millis() as i64).saturating_add(self.milliseconds);
        db.set_expire_at(&self.key, (at_millis / 1000).max(1) as u64)?;

        Ok(Frame::Simple("OK".to_string()))
    }
}

impl TryFrom<&mut CommandParser> for Psetex {
    type Error = CommandParserError;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        parser.exact(3)?;
        let key = parser.next_bytes()?;
        let milliseconds = parser.next_integer()?;
        let value = parser.next_bytes()?;
        Ok(Self {
            key,
            milliseconds,
            value,
        })
    }
}
