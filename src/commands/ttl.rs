use bytes::Bytes;

use crate::commands::executable::Executable;
use crate::commands::{CommandParser, CommandParserError, Session};
use crate::frame::Frame;
use crate::storage::expire::now_unix_seconds;
use crate::Error;

/// Remaining seconds before the key expires; -1 when the key is missing or
/// carries no deadline.
///
/// Ref: <https://redis.io/commands/ttl>
#[derive(Debug, PartialEq)]
pub struct Ttl {
    pub key: Bytes,
}

impl Executable for Ttl {
    fn exec(self, session: &mut Session) -> Result<Frame, Error> {
        let db = session.db();
        let _guard = db.read();

        if db.has(&self.key)?.is_none() {
            return Ok(Frame::Integer(-1));
        }

        match db.get_expire_at(&self.key)? {
            Some(at) => Ok(Frame::Integer(at as i64 - now_unix_seconds() as i64)),
            None => Ok(Frame::Integer(-1)),
        }
    }
}

impl TryFrom<&mut CommandParser> for Ttl {
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
    fn reports_remaining_seconds() {
        let mut session = test_session();
        session.db().put_string(b"k", b"v").unwrap();
        session
            .db()
            .set_expire_at(b"k", now_unix_seconds() + 100)
            .unwrap();

        let reply = Ttl {
            key: Bytes::from("k"),
        }
        .exec(&mut session)
        .unwrap();
        match reply {
            Frame::Integer(ttl) => assert!((99..=100).contains(&ttl)),
            other => panic!("unexpected reply {:?}", other),
        }
    }

    #[test]
    fn minus_one_without_deadline() {
        let mut session = test_session();
        session.db().put_string(b"k", b"v").unwrap();

        let reply = Ttl {
            key: Bytes::from("k"),
        }
        .exec(&mut session)
        .unwrap();
        assert_eq!(reply, Frame::Integer(-1));

        let reply = Ttl {
            key: Bytes::from("missing"),
        }
        .exec(&mut session)
        .unwrap();
        assert_eq!(reply, Frame::Integer(-1));
    }
}
