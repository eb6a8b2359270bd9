use bytes::Bytes;

use crate::commands::executable::Executable;
use crate::commands::{key_state, wrong_type, CommandParser, CommandParserError, KeyState};
use crate::commands::Session;
use crate::frame::Frame;
use crate::storage::ValueType;
use crate::Error;

/// Adds score/member pairs; an existing member has its score updated in
/// place. Replies with the number of members that are new to the set.
///
/// Ref: <https://redis.io/commands/zadd>
#[derive(Debug, PartialEq)]
pub struct Zadd {
    pub key: Bytes,
    pub pairs: Vec<(f64, Bytes)>,
}

impl Executable for Zadd {
    fn exec(self, session: &mut Session) -> Result<Frame, Error> {
        let db = session.db();
        let _guard = db.write();

        if let KeyState::WrongType = key_state(db, &self.key, ValueType::SortedSet)? {
            return Ok(wrong_type());
        }

        let mut added = 0;
        for (score, member) in &self.pairs {
            if db.add_skip_field(&self.key, ValueType::SortedSet, member, *score)? {
                added += 1;
            }
        }
        Ok(Frame::Integer(added))
    }
}

impl TryFrom<&mut CommandParser> for Zadd {
    type Error = CommandParserError;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        if parser.remaining() < 3 || parser.remaining() % 2 != 1 {
            return Err(parser.wrong_arguments());
        }

        let key = parser.next_bytes()?;
        let mut pairs = Vec::with_capacity(parser.remaining() / 2);
        while parser.remaining() > 0 {
            let score = parser.next_float()?;
            let member = parser.next_bytes()?;
            pairs.push((score, member));
        }
        Ok(Self { key, pairs })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_session;

    #[test]
    fn re_adding_updates_in_place() {
        let mut session = test_session();

        let cmd = Zadd {
            key: Bytes::from("z"),
            pairs: vec![(3.0, Bytes::from("a")), (1.0, Bytes::from("b"))],
        };
        assert_eq!(cmd.exec(&mut session).unwrap(), Frame::Integer(2));

        let cmd = Zadd {
            key: Bytes::from("z"),
            pairs: vec![(5.0, Bytes::from("a"))],
        };
        assert_eq!(cmd.exec(&mut session).unwrap(), Frame::Integer(0));

        assert_eq!(session.db().get_skip_length(b"z").unwrap(), 2);
        let elements = session.db().get_skip_range(b"z", 0, -1).unwrap();
        assert_eq!(elements[1].field, b"a".to_vec());
        assert_eq!(elements[1].score, 5.0);
    }
}
