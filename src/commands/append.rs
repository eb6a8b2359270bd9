use bytes::Bytes;

use crate::commands::executable::Executable;
use crate::commands::{key_state, wrong_type, CommandParser, CommandParserError, KeyState};
use crate::commands::{Session, ERR_STRING_LIMIT, STRING_LIMIT};
use crate::frame::Frame;
use crate::storage::ValueType;
use crate::Error;

/// Ref: <https://redis.io/commands/append>
#[derive(Debug, PartialEq)]
pub struct Append {
    pub key: Bytes,
    pub value: Bytes,
}

impl Executable for Append {
    fn exec(self, session: &mut Session) -> Result<Frame, Error> {
        let db = session.db();
        let _guard = db.write();

        let mut value = match key_state(db, &self.key, ValueType::String)? {
            KeyState::WrongType => return Ok(wrong_type()),
            KeyState::Missing => Vec::new(),
            KeyState::Present => db.get_string(&self.key)?,
        };

        if value.len() + self.value.len() > STRING_LIMIT {
            return Ok(Frame::Error(ERR_STRING_LIMIT.to_string()));
        }

        value.extend_from_slice(&self.value);
        db.put_string(&self.key, &value)?;
        Ok(Frame::Integer(value.len() as i64))
    }
}

impl TryFrom<&mut CommandParser> for Append {
    type Error = CommandParserError;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        parser.exact(2)?;
        let key = parser.next_bytes()?;
        let value = parser.next_bytes()?;
        Ok(Self { key, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_session;

    #[test]
    fn appends_and_reports_length() {
        let mut session = test_session();

        let reply = Append {
            key: Bytes::from("k"),
            value: Bytes::from("Hello"),
        }
        .exec(&mut session)
        .unwrap();
        assert_eq!(reply, Frame::Integer(5));

        let reply = Append {
            key: Bytes::from("k"),
            value: Bytes::from(" World"),
        }
        .exec(&mut session)
        .unwrap();
        assert_eq!(reply, Frame::Integer(11));
        assert_eq!(session.db().get_string(b"k").unwrap(), b"Hello World");
    }
}
