use std::collections::BTreeSet;

use bytes::Bytes;

use crate::commands::executable::Executable;
use crate::commands::sdiff::set_operand;
use crate::commands::{bulk, wrong_type, CommandParser, CommandParserError, Session};
use crate::frame::Frame;
use crate::storage::Database;
use crate::Error;

/// Union of every given set, lexicographically ordered.
///
/// Ref: <https://redis.io/commands/sunion>
#[derive(Debug, PartialEq)]
pub struct Sunion {
    pub keys: Vec<Bytes>,
}

pub(crate) fn union_members(db: &Database, keys: &[Bytes]) -> Result<Vec<Vec<u8>>, Error> {
    let mut members = BTreeSet::new();
    for key in keys {
        members.extend(db.get_field_names(key)?);
    }
    Ok(members.into_iter().collect())
}

impl Executable for Sunion {
    fn exec(self, session: &mut Session) -> Result<Frame, Error> {
        let db = session.db();
        let _guard = db.read();

        for key in &self.keys {
            if set_operand(db, key)? == Some(false) {
                return Ok(wrong_type());
            }
        }

        let members = union_members(db, &self.keys)?;
        Ok(Frame::Array(members.into_iter().map(bulk).collect()))
    }
}

impl TryFrom<&mut CommandParser> for Sunion {
    type Error = CommandParserError;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        parser.at_least(2)?;
        let keys = parser.rest()?;
        Ok(Self { keys })
    }
}
