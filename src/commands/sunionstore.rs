use bytes::Bytes;

use crate::commands::executable::Executable;
use crate::commands::sdiff::set_operand;
use crate::commands::sdiffstore::store_members;
use crate::commands::sunion::union_members;
use crate::commands::{wrong_type, CommandParser, CommandParserError, Session};
use crate::frame::Frame;
use crate::Error;

/// SUNION whose result replaces `destination`.
///
/// Ref: <https://redis.io/commands/sunionstore>
#[derive(Debug, PartialEq)]
pub struct Sunionstore {
    pub destination: Bytes,
    pub keys: Vec<Bytes>,
}

impl Executable for Sunionstore {
    fn exec(self, session: &mut Session) -> Result<Frame, Error> {
        let db = session.db();
        let _guard = db.write();

        for key in &self.keys {
            if set_operand(db, key)? == Some(false) {
                return Ok(wrong_type());
            }
        }

        let members = union_members(db, &self.keys)?;
        store_members(db, &self.destination, &members)?;
        Ok(Frame::Integer(members.len() as i64))
    }
}

impl TryFrom<&mut CommandParser> for Sunionstore {
    type Error = CommandParserError;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        parser.at_least(3)?;
        let destination = parser.next_bytes()?;
        let keys = parser.rest()?;
        Ok(Self { destination, keys })
    }
}
