use bytes::Bytes;
use rand::seq::SliceRandom;

use crate::commands::executable::Executable;
use crate::commands::{bulk, key_state, wrong_type, CommandParser, CommandParserError, KeyState};
use crate::commands::Session;
use crate::frame::Frame;
use crate::storage::ValueType;
use crate::Error;

const ERR_NEGATIVE_COUNT: &str = "ERR value is out of range, must be positive";

/// Removes and returns one random member, or up to `count` distinct members.
///
/// Ref: <https://redis.io/commands/spop>
#[derive(Debug, PartialEq)]
pub struct Spop {
    pub key: Bytes,
    pub count: Option<i64>,
}

impl Executable for Spop {
    fn exec(self, session: &mut Session) -> Result<Frame, Error> {
        if matches!(self.count, Some(count) if count < 0) {
            return Ok(Frame::Error(ERR_NEGATIVE_COUNT.to_string()));
        }

        let db = session.db();
        let _guard = db.write();

        match key_state(db, &self.key, ValueType::Set)? {
            KeyState::Missing => {
                return Ok(match self.count {
                    Some(_) => Frame::Array(vec![]),
                    None => Frame::Null,
                })
            }
            KeyState::WrongType => return Ok(wrong_type()),
            KeyState::Present => {}
        }

        let mut members = db.get_field_names(&self.key)?;
        members.shuffle(&mut rand::thread_rng());

        match self.count {
            None => {
                let member = members.into_iter().next();
                match member {
                    Some(member) => {
                        db.delete_fields(&self.key, &[member.clone()])?;
                        Ok(bulk(member))
                    }
                    None => Ok(Frame::Null),
                }
            }
            Some(count) => {
                members.truncate(count as usize);
                db.delete_fields(&self.key, &members)?;
                Ok(Frame::Array(members.into_iter().map(bulk).collect()))
            }
        }
    }
}

impl TryFrom<&mut CommandParser> for Spop {
    type Error = CommandParserError;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        if parser.remaining() != 1 && parser.remaining() != 2 {
            return Err(parser.wrong_arguments());
        }
        let key = parser.next_bytes()?;
        let count = if parser.remaining() > 0 {
            Some(parser.next_integer()?)
        } else {
            None
        };
        Ok(Self { key, count })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::sadd::put_members;
    use crate::commands::test_session;

    #[test]
    fn pops_members_until_the_set_dies() {
        let mut session = test_session();
        put_members(session.db(), b"s", &[b"a".to_vec(), b"b".to_vec()]).unwrap();

        let reply = Spop {
            key: Bytes::from("s"),
            count: Some(5),
        }
        .exec(&mut session)
        .unwrap();
        match reply {
            Frame::Array(items) => assert_eq!(items.len(), 2),
            other => panic!("unexpected reply {:?}", other),
        }

        // Deleting the last members removes the key itself.
        assert_eq!(session.db().has(b"s").unwrap(), None);
    }
}
