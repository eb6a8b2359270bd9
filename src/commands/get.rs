use bytes::Bytes;

use crate::commands::executable::Executable;
use crate::commands::{bulk, key_state, wrong_type, CommandParser, CommandParserError, KeyState};
use crate::commands::Session;
use crate::frame::Frame;
use crate::storage::ValueType;
use crate::Error;

/// Ref: <https://redis.io/commands/get>
#[derive(Debug, PartialEq)]
pub struct Get {
    pub key: Bytes,
}

impl Executable for Get {
    fn exec(self, session: &mut Session) -> Result<Frame, Error> {
        let db = session.db();
        let _guard = db.read();

        match key_state(db, &self.key, ValueType::String)? {
            KeyState::Missing => Ok(Frame::Null),
            KeyState::WrongType => Ok(wrong_type()),
            KeyState::Present => Ok(bulk(db.get_string(&self.key)?)),
        }
    }
}

impl TryFrom<&mut CommandParser> for Get {
    type Error = CommandParserError;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        parser.exact(1)?;
        let key = parser.next_bytes()?;
        Ok(Self { key })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_session;
    use crate::storage::ValueType;

    #[test]
    fn missing_key_is_nil() {
        let mut session = test_session();
        let reply = Get {
            key: Bytes::from("nope"),
        }
        .exec(&mut session)
        .unwrap();
        assert_eq!(reply, Frame::Null);
    }

    #[test]
    fn wrong_type_is_rejected() {
        let mut session = test_session();
        session
            .db()
            .push_list_tail(b"l", ValueType::List, b"x")
            .unwrap();

        let reply = Get {
            key: Bytes::from("l"),
        }
        .exec(&mut session)
        .unwrap();
        assert!(matches!(reply, Frame::Error(msg) if msg.starts_with("WRONGTYPE")));
    }
}
