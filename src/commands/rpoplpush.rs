use bytes::Bytes;

use crate::commands::executable::Executable;
use crate::commands::{bulk, key_state, wrong_type, CommandParser, CommandParserError, KeyState};
use crate::commands::Session;
use crate::frame::Frame;
use crate::storage::ValueType;
use crate::Error;

/// Atomically moves the tail of `source` to the head of `destination`.
///
/// Ref: <https://redis.io/commands/rpoplpush>
#[derive(Debug, PartialEq)]
pub struct Rpoplpush {
    pub source: Bytes,
    pub destination: Bytes,
}

impl Executable for Rpoplpush {
    fn exec(self, session: &mut Session) -> Result<Frame, Error> {
        let db = session.db();
        let _guard = db.write();

        match key_state(db, &self.source, ValueType::List)? {
            KeyState::Missing => return Ok(Frame::Null),
            KeyState::WrongType => return Ok(wrong_type()),
            KeyState::Present => {}
        }
        if let KeyState::WrongType = key_state(db, &self.destination, ValueType::List)? {
            return Ok(wrong_type());
        }

        let value = match db.pop_list_tail(&self.source)? {
            Some(value) => value,
            None => return Ok(Frame::Null),
        };
        db.push_list_head(&self.destination, ValueType::List, &value)?;

        Ok(bulk(value))
    }
}

impl TryFrom<&mut CommandParser> for Rpoplpush {
    type Error = CommandParserError;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        parser.exact(2)?;
        let source = parser.next_bytes()?;
        let destination = parser.next_bytes()?;
        Ok(Self {
            source,
            destination,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_session;

    #[test]
    fn rotates_a_list_onto_itself() {
        let mut session = test_session();
        for value in [&b"a"[..], b"b", b"c"] {
            session
                .db()
                .push_list_tail(b"k", ValueType::List, value)
                .unwrap();
        }

        let cmd = Rpoplpush {
            source: Bytes::from("k"),
            destination: Bytes::from("k"),
        };
        assert_eq!(cmd.exec(&mut session).unwrap(), Frame::Bulk(Bytes::from("c")));
        assert_eq!(
            session.db().get_list_range(b"k", 0, -1).unwrap(),
            vec![b"c".to_vec(), b"a".to_vec(), b"b".to_vec()]
        );
    }
}
