use bytes::Bytes;

use crate::commands::executable::Executable;
use crate::commands::{key_state, wrong_type, CommandParser, CommandParserError, KeyState};
use crate::commands::{Session, ERR_NOT_VALID_INT};
use crate::frame::Frame;
use crate::storage::{Database, ValueType};
use crate::Error;

/// Increments the number stored at key by one.
///
/// Ref: <https://redis.io/commands/incr>
#[derive(Debug, PartialEq)]
pub struct Incr {
    pub key: Bytes,
}

/// Shared by INCR, DECR, INCRBY and DECRBY. An absent key counts from zero;
/// a stored value that does not parse, or a result that overflows, replies
/// with the integer error.
pub(crate) fn incr_decr(db: &Database, key: &[u8], by: i64) -> Result<Frame, Error> {
    let _guard = db.write();

    let new_value = match key_state(db, key, ValueType::String)? {
        KeyState::WrongType => return Ok(wrong_type()),
        KeyState::Missing => Some(by),
        KeyState::Present => {
            let value = db.get_string(key)?;
            std::str::from_utf8(&value)
                .ok()
                .and_then(|s| s.parse::<i64>().ok())
                .and_then(|i| i.checked_add(by))
        }
    };

    let new_value = match new_value {
        Some(new_value) => new_value,
        None => return Ok(Frame::Error(ERR_NOT_VALID_INT.to_string())),
    };

    db.put_string(key, new_value.to_string().as_bytes())?;
    Ok(Frame::Integer(new_value))
}

impl Executable for Incr {
    fn exec(self, session: &mut Session) -> Result<Frame, Error> {
        incr_decr(session.db(), &self.key, 1)
    }
}

impl TryFrom<&mut CommandParser> for Incr {
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

    #[test]
    fn existing_key() {
        let mut session = test_session();
        session.db().put_string(b"key1", b"1").unwrap();

        let reply = Incr {
            key: Bytes::from("key1"),
        }
        .exec(&mut session)
        .unwrap();

        assert_eq!(reply, Frame::Integer(2));
        assert_eq!(session.db().get_string(b"key1").unwrap(), b"2");
    }

    #[test]
    fn non_existing_key() {
        let mut session = test_session();

        let reply = Incr {
            key: Bytes::from("key1"),
        }
        .exec(&mut session)
        .unwrap();

        assert_eq!(reply, Frame::Integer(1));
        assert_eq!(session.db().get_string(b"key1").unwrap(), b"1");
    }

    #[test]
    fn invalid_stored_value() {
        let mut session = test_session();
        session.db().put_string(b"key1", b"value").unwrap();

        let reply = Incr {
            key: Bytes::from("key1"),
        }
        .exec(&mut session)
        .unwrap();

        assert_eq!(reply, Frame::Error(ERR_NOT_VALID_INT.to_string()));
        assert_eq!(session.db().get_string(b"key1").unwrap(), b"value");
    }

    #[test]
    fn out_of_range() {
        let mut session = test_session();
        session
            .db()
            .put_string(b"key1", b"9223372036854775807")
            .unwrap();

        let reply = Incr {
            key: Bytes::from("key1"),
        }
        .exec(&mut session)
        .unwrap();

        assert_eq!(reply, Frame::Error(ERR_NOT_VALID_INT.to_string()));
    }
}
