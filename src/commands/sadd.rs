use std::collections::HashMap;

use bytes::Bytes;

use crate::commands::executable::Executable;
use crate::commands::{key_state, wrong_type, CommandParser, CommandParserError, KeyState};
use crate::commands::Session;
use crate::frame::Frame;
use crate::storage::hash::SET_SENTINEL;
use crate::storage::{Database, ValueType};
use crate::Error;

/// Ref: <https://redis.io/commands/sadd>
#[derive(Debug, PartialEq)]
pub struct Sadd {
    pub key: Bytes,
    pub members: Vec<Bytes>,
}

/// Writes `members` as a set under `key`, one sentinel-valued field each.
pub(crate) fn put_members(db: &Database, key: &[u8], members: &[Vec<u8>]) -> Result<(), Error> {
    let mut fields = HashMap::new();
    for member in members {
        fields.insert(member.clone(), SET_SENTINEL.to_vec());
    }
    db.put_hash(key, ValueType::Set, &fields)?;
    Ok(())
}

impl Executable for Sadd {
    fn exec(self, session: &mut Session) -> Result<Frame, Error> {
        let db = session.db();
        let _guard = db.write();

        if let KeyState::WrongType = key_state(db, &self.key, ValueType::Set)? {
            return Ok(wrong_type());
        }

        let members: Vec<Vec<u8>> = self.members.iter().map(|member| member.to_vec()).collect();
        // The point-get map is deduplicated, so a member passed twice in one
        // call still counts once.
        let existing = db.get_fields(&self.key, &members)?;
        let added = existing.values().filter(|value| value.is_none()).count();

        put_members(db, &self.key, &members)?;
        Ok(Frame::Integer(added as i64))
    }
}

impl TryFrom<&mut CommandParser> for Sadd {
    type Error = CommandParserError;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        parser.at_least(2)?;
        let key = parser.next_bytes()?;
        let members = parser.rest()?;
        Ok(Self { key, members })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_session;

    #[test]
    fn counts_only_new_members() {
        let mut session = test_session();

        let cmd = Sadd {
            key: Bytes::from("s"),
            members: vec![Bytes::from("a"), Bytes::from("b")],
        };
        assert_eq!(cmd.exec(&mut session).unwrap(), Frame::Integer(2));

        let cmd = Sadd {
            key: Bytes::from("s"),
            members: vec![Bytes::from("b"), Bytes::from("c")],
        };
        assert_eq!(cmd.exec(&mut session).unwrap(), Frame::Integer(1));

        assert_eq!(session.db().get_field_names(b"s").unwrap().len(), 3);
    }

    #[test]
    fn repeated_argument_counts_once() {
        let mut session = test_session();

        let cmd = Sadd {
            key: Bytes::from("s"),
            members: vec![Bytes::from("a"), Bytes::from("a")],
        };
        assert_eq!(cmd.exec(&mut session).unwrap(), Frame::Integer(1));
        assert_eq!(session.db().get_field_names(b"s").unwrap().len(), 1);
    }
}
