use std::collections::HashSet;

use bytes::Bytes;

use crate::commands::executable::Executable;
use crate::commands::sdiff::set_operand;
use crate::commands::{bulk, wrong_type, CommandParser, CommandParserError, Session};
use crate::frame::Frame;
use crate::storage::Database;
use crate::Error;

/// Members common to every given set, in the first set's order.
///
/// Ref: <https://redis.io/commands/sinter>
#[derive(Debug, PartialEq)]
pub struct Sinter {
    pub keys: Vec<Bytes>,
}

pub(crate) fn inter_members(db: &Database, keys: &[Bytes]) -> Result<Vec<Vec<u8>>, Error> {
    let mut members = db.get_field_names(&keys[0])?;
    for key in &keys[1..] {
        let other: HashSet<Vec<u8>> = db.get_field_names(key)?.into_iter().collect();
        members.retain(|member| other.contains(member));
    }
    Ok(members)
}

impl Executable for Sinter {
    fn exec(self, session: &mut Session) -> Result<Frame, Error> {
        let db = session.db();
        let _guard = db.read();

        for key in &self.keys {
            match set_operand(db, key)? {
                // Intersecting with a missing set is always empty.
                None => return Ok(Frame::Array(vec![])),
                Some(false) => return Ok(wrong_type()),
                Some(true) => {}
            }
        }

        let members = inter_members(db, &self.keys)?;
        Ok(Frame::Array(members.into_iter().map(bulk).collect()))
    }
}

impl TryFrom<&mut CommandParser> for Sinter {
    type Error = CommandParserError;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        parser.at_least(2)?;
        let keys = parser.rest()?;
        Ok(Self { keys })
    }
}
