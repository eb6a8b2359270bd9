use bytes::Bytes;

use crate::commands::executable::Executable;
use crate::commands::sadd::put_members;
use crate::commands::sdiff::set_operand;
use crate::commands::{wrong_type, CommandParser, CommandParserError, Session};
use crate::frame::Frame;
use crate::Error;

/// Moves one member between sets; a no-op (reporting 1) when source and
/// destination are the same set and the member is there.
///
/// Ref: <https://redis.io/commands/smove>
#[derive(Debug, PartialEq)]
pub struct Smove {
    pub source: Bytes,
    pub destination: Bytes,
    pub member: Bytes,
}

impl Executable for Smove {
    fn exec(self, session: &mut Session) -> Result<Frame, Error> {
        let db = session.db();
        let _guard = db.write();

        let source_state = set_operand(db, &self.source)?;
        if source_state == Some(false) || set_operand(db, &self.destination)? == Some(false) {
            return Ok(wrong_type());
        }
        if source_state.is_none() {
            return Ok(Frame::Integer(0));
        }

        let member = self.member.to_vec();
        let in_source = db
            .get_fields(&self.source, &[member.clone()])?
            .get(&member)
            .map(|value| value.is_some())
            .unwrap_or(false);
        if !in_source {
            return Ok(Frame::Integer(0));
        }

        if self.source == self.destination {
            return Ok(Frame::Integer(1));
        }

        db.delete_fields(&self.source, &[member.clone()])?;
        put_members(db, &self.destination, &[member])?;
        Ok(Frame::Integer(1))
    }
}

impl TryFrom<&mut CommandParser> for Smove {
    type Error = CommandParserError;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        parser.exact(3)?;
        let source = parser.next_bytes()?;
        let destination = parser.next_bytes()?;
        let member = parser.next_bytes()?;
        Ok(Self {
            source,
            destination,
            member,
        })
    }
}
