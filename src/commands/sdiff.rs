use std::collections::HashSet;

use bytes::Bytes;

use crate::commands::executable::Executable;
use crate::commands::{bulk, wrong_type, CommandParser, CommandParserError, Session};
use crate::frame::Frame;
use crate::storage::{Database, ValueType};
use crate::Error;

/// Members of the first set with every later set's members removed, in the
/// first set's (lexicographic) order.
///
/// Ref: <https://redis.io/commands/sdiff>
#[derive(Debug, PartialEq)]
pub struct Sdiff {
    pub keys: Vec<Bytes>,
}

/// Type-checks one operand of a set-algebra command. `Ok(None)` means the
/// key is absent.
pub(crate) fn set_operand(db: &Database, key: &[u8]) -> Result<Option<bool>, Error> {
    match db.has(key)? {
        None => Ok(None),
        Some(ValueType::Set) => Ok(Some(true)),
        Some(_) => Ok(Some(false)),
    }
}

/// The difference of `keys[0]` against the rest, preserving the first set's
/// member order.
pub(crate) fn diff_members(db: &Database, keys: &[Bytes]) -> Result<Vec<Vec<u8>>, Error> {
    let mut members = db.get_field_names(&keys[0])?;
    for key in &keys[1..] {
        let other: HashSet<Vec<u8>> = db.get_field_names(key)?.into_iter().collect();
        members.retain(|member| !other.contains(member));
    }
    Ok(members)
}

impl Executable for Sdiff {
    fn exec(self, session: &mut Session) -> Result<Frame, Error> {
        let db = session.db();
        let _guard = db.read();

        for (i, key) in self.keys.iter().enumerate() {
            match set_operand(db, key)? {
                None if i == 0 => return Ok(Frame::Array(vec![])),
                Some(false) => return Ok(wrong_type()),
                _ => {}
            }
        }

        let members = diff_members(db, &self.keys)?;
        Ok(Frame::Array(members.into_iter().map(bulk).collect()))
    }
}

impl TryFrom<&mut CommandParser> for Sdiff {
    type Error = CommandParserError;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        parser.at_least(2)?;
        let keys = parser.rest()?;
        Ok(Self { keys })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::sadd::put_members;
    use crate::commands::test_session;

    #[test]
    fn subtracts_later_sets() {
        let mut session = test_session();
        put_members(
            session.db(),
            b"a",
            &[b"1".to_vec(), b"2".to_vec(), b"3".to_vec()],
        )
        .unwrap();
        put_members(session.db(), b"b", &[b"2".to_vec()]).unwrap();

        let cmd = Sdiff {
            keys: vec![Bytes::from("a"), Bytes::from("b"), Bytes::from("missing")],
        };
        let reply = cmd.exec(&mut session).unwrap();
        assert_eq!(
            reply,
            Frame::Array(vec![
                Frame::Bulk(Bytes::from("1")),
                Frame::Bulk(Bytes::from("3"))
            ])
        );
    }
}
