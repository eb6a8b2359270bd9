use bytes::Bytes;

use crate::commands::executable::Executable;
use crate::commands::{CommandParser, CommandParserError, Session};
use crate::frame::Frame;
use crate::Error;

/// Ref: <https://redis.io/commands/setnx>
#[derive(Debug, PartialEq)]
pub struct Setnx {
    pub key: Bytes,
    pub value: Bytes,
}

impl Executable for Setnx {
    fn exec(self, session: &mut Session) -> Result<Frame, Error> {
        let db = session.db();
        let _guard = db.write();

        if db.has(&self.key)?.is_some() {
            return Ok(Frame::Integer(0));
        }

        db.put_string(&self.key, &self.value)?;
        Ok(Frame::Integer(1))
    }
}

impl TryFrom<&mut CommandParser> for Setnx {
    type Error = CommandParserError;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        parser.exact(2)?;
        let key = parser.next_bytes()?;
        let value = parser.next_bytes()?;
        Ok(Self { key, value })
    }
}
