use crate::commands::executable::Executable;
use crate::commands::{valid_db_index, CommandParser, CommandParserError, Session, ERR_DB_INDEX};
use crate::frame::Frame;
use crate::Error;

/// Rebinds the connection to one of the 16 databases.
///
/// Ref: <https://redis.io/commands/select>
#[derive(Debug, PartialEq)]
pub struct Select {
    pub index: Option<i64>,
}

impl Executable for Select {
    fn exec(self, session: &mut Session) -> Result<Frame, Error> {
        let index = match self.index.and_then(valid_db_index) {
            Some(index) => index,
            None => return Ok(Frame::Error(ERR_DB_INDEX.to_string())),
        };
        session.index = index;
        Ok(Frame::Simple("OK".to_string()))
    }
}

impl TryFrom<&mut CommandParser> for Select {
    type Error = CommandParserError;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        parser.exact(1)?;
        // A non-numeric index replies with the same out-of-range error.
        let index = parser.next_integer().ok();
        Ok(Self { index })
    }
}
