use bytes::Bytes;

use crate::commands::executable::Executable;
use crate::commands::{CommandParser, CommandParserError, Session};
use crate::frame::Frame;
use crate::Error;

/// Removes the given keys, whatever their type. Variadic; replies with the
/// number of keys that actually existed.
///
/// Ref: <https://redis.io/commands/del>
#[derive(Debug, PartialEq)]
pub struct Del {
    pub keys: Vec<Bytes>,
}

impl Executable for Del {
    fn exec(self, session: &mut Session) -> Result<Frame, Error> {
        let db = session.db();
        let _guard = db.write();

        let mut count = 0;
        for key in &self.keys {
            if let Some(tipe) = db.has(key)? {
                db.delete(key, tipe)?;
                count += 1;
            }
        }
        Ok(Frame::Integer(count))
    }
}

impl TryFrom<&mut CommandParser> for Del {
    type Error = CommandParserError;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        parser.at_least(1)?;
        let keys = parser.rest()?;
        Ok(Self { keys })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_session;
    use crate::storage::ValueType;

    #[test]
    fn counts_only_existing_keys() {
        let mut session = test_session();
        session.db().put_string(b"a", b"1").unwrap();
        session
            .db()
            .push_list_tail(b"b", ValueType::List, b"x")
            .unwrap();

        let cmd = Del {
            keys: vec![Bytes::from("a"), Bytes::from("b"), Bytes::from("missing")],
        };
        let reply = cmd.exec(&mut session).unwrap();

        assert_eq!(reply, Frame::Integer(2));
        assert_eq!(session.db().has(b"a").unwrap(), None);
        assert_eq!(session.db().has(b"b").unwrap(), None);
    }
}
