use bytes::Bytes;

use crate::commands::executable::Executable;
use crate::commands::sdiff::set_operand;
use crate::commands::sdiffstore::store_members;
use crate::commands::sinter::inter_members;
use crate::commands::{wrong_type, CommandParser, CommandParserError, Session};
use crate::frame::Frame;
use crate::Error;

/// SINTER whose result replaces `destination`.
///
/// Ref: <https://redis.io/commands/sinterstore>
#[derive(Debug, PartialEq)]
pub struct Sinterstore {
    pub destination: Bytes,
    pub keys: Vec<Bytes>,
}

impl Executable for Sinterstore {
    fn exec(self, session: &mut Session) -> Result<Frame, Error> {
        let db = session.db();
        let _guard = db.write();

        let mut all_present = true;
        for key in &self.keys {
            match set_operand(db, key)? {
                None => all_present = false,
                Some(false) => return Ok(wrong_type()),
                Some(true) => {}
            }
        }

        let members = if all_present {
            inter_members(db, &self.keys)?
        } else {
            Vec::new()
        };
        store_members(db, &self.destination, &members)?;
        Ok(Frame::Integer(members.len() as i64))
    }
}

impl TryFrom<&mut CommandParser> for Sinterstore {
    type Error = CommandParserError;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        parser.at_least(3)?;
        let destination = parser.next_bytes()?;
        let keys = parser.rest()?;
        Ok(Self { destination, keys })
    }
}
