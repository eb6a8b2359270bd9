use bytes::Bytes;

use crate::commands::executable::Executable;
use crate::commands::{bulk, key_state, wrong_type, CommandParser, CommandParserError, KeyState};
use crate::commands::Session;
use crate::frame::Frame;
use crate::storage::ValueType;
use crate::utils::calc_range;
use crate::Error;

/// Ref: <https://redis.io/commands/getrange>
#[derive(Debug, PartialEq)]
pub struct Getrange {
    pub key: Bytes,
    pub start: i64,
    pub end: i64,
}

impl Executable for Getrange {
    fn exec(self, session: &mut Session) -> Result<Frame, Error> {
        let db = session.db();
        let _guard = db.read();

        match key_state(db, &self.key, ValueType::String)? {
            KeyState::Missing => return Ok(bulk(Vec::new())),
            KeyState::WrongType => return Ok(wrong_type()),
            KeyState::Present => {}
        }

        let value = db.get_string(&self.key)?;
        let (start, end) = calc_range(self.start, self.end, value.len());
        if end <= start {
            return Ok(bulk(Vec::new()));
        }
        Ok(bulk(value[start..end].to_vec()))
    }
}

impl TryFrom<&mut CommandParser> for Getrange {
    type Error = CommandParserError;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        parser.exact(3)?;
        let key = parser.next_bytes()?;
        let start = parser.next_integer()?;
        let end = parser.next_integer()?;
        Ok(Self { key, start, end })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_session;

    fn getrange(session: &mut Session, start: i64, end: i64) -> Frame {
        Getrange {
            key: Bytes::from("k"),
            start,
            end,
        }
        .exec(session)
        .unwrap()
    }

    #[test]
    fn slices_with_negative_indices() {
        let mut session = test_session();
        session.db().put_string(b"k", b"This is a string").unwrap();

        assert_eq!(getrange(&mut session, 0, 3), Frame::Bulk(Bytes::from("This")));
        assert_eq!(getrange(&mut session, -3, -1), Frame::Bulk(Bytes::from("ing")));
        assert_eq!(
            getrange(&mut session, 0, -1),
            Frame::Bulk(Bytes::from("This is a string"))
        );
        assert_eq!(
            getrange(&mut session, 10, 100),
            Frame::Bulk(Bytes::from("string"))
        );
    }
}
