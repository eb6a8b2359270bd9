use crate::commands::executable::Executable;
use crate::commands::{CommandParser, CommandParserError, Session};
use crate::frame::Frame;
use crate::Error;

/// Ref: <https://redis.io/commands/flushdb>
#[derive(Debug, PartialEq)]
pub struct Flushdb;

impl Executable for Flushdb {
    fn exec(self, session: &mut Session) -> Result<Frame, Error> {
        let db = session.db();
        let _guard = db.write();

        db.flush()?;
        Ok(Frame::Simple("OK".to_string()))
    }
}

impl TryFrom<&mut CommandParser> for Flushdb {
    type Error = CommandParserError;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        parser.exact(0)?;
        Ok(Self)
    }
}
