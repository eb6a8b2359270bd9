use bytes::Bytes;

use crate::commands::executable::Executable;
use crate::commands::{CommandParser, CommandParserError, Session};
use crate::frame::Frame;
use crate::Error;

/// Ref: <https://redis.io/commands/mset>
#[derive(Debug, PartialEq)]
pub struct Mset {
    pub pairs: Vec<(Bytes, Bytes)>,
}

impl Executable for Mset {
    fn exec(self, session: &mut Session) -> Result<Frame, Error> {
        let db = session.db();
        let _guard = db.write();

        for (key, value) in &self.pairs {
            db.put_string(key, value)?;
        }
        Ok(Frame::Simple("OK".to_string()))
    }
}

impl TryFrom<&mut CommandParser> for Mset {
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
