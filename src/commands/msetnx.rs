use bytes::Bytes;

use crate::commands::executable::Executable;
use crate::commands::{CommandParser, CommandParserError, Session};
use crate::frame::Frame;
use crate::Error;

/// All-or-nothing MSET: nothing is written when any key already exists.
///
/// Ref: <https://redis.io/commands/msetnx>
#[derive(Debug, PartialEq)]
pub struct Msetnx {
    pub pairs: Vec<(Bytes, Bytes)>,
}

impl Executable for Msetnx {
    fn exec(self, session: &mut Session) -> Result<Frame, Error> {
        let db = session.db();
        let _guard = db.write();

        for (key, _) in &self.pairs {
            if db.has(key)?.is_some() {
                return Ok(Frame::Integer(0));
            }
        }

        for (key, value) in &self.pairs {
            db.put_string(key, value)?;
        }
        Ok(Frame::Integer(1))
    }
}

impl TryFrom<&mut CommandParser> for Msetnx {
    type Error = CommandParserError;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        if parser.remaining() == 0 || parser.remaining() % 2 != 0 {
            return Err(parser.wrong_arguments());
        }

        let mut pairs = Vec::with_capacity(parser.remaining() / 2);
        while parser.remaining() > 0 {
            let key = parser.next_bytes()?;
            let value = parser.next_bytes()?;
            pairs.push((key, value));
        }
        Ok(Self { pairs })
    }
}
