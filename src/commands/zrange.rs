use bytes::Bytes;

use crate::commands::executable::Executable;
use crate::commands::{bulk, key_state, wrong_type, CommandParser, CommandParserError, KeyState};
use crate::commands::Session;
use crate::frame::Frame;
use crate::storage::ValueType;
use crate::utils::format_float;
use crate::Error;

/// Members by rank, ascending (score, member) order, optionally with their
/// scores interleaved.
///
/// Ref: <https://redis.io/commands/zrange>
#[derive(Debug, PartialEq)]
pub struct Zrange {
    pub key: Bytes,
    pub start: i64,
    pub end: i64,
    pub with_scores: bool,
}

impl Executable for Zrange {
    fn exec(self, session: &mut Session) -> Result<Frame, Error> {
        let db = session.db();
        let _guard = db.read();

        match key_state(db, &self.key, ValueType::SortedSet)? {
            KeyState::Missing => return Ok(Frame::Array(vec![])),
            KeyState::WrongType => return Ok(wrong_type()),
            KeyState::Present => {}
        }

        let elements = db.get_skip_range(&self.key, self.start, self.end)?;
        let mut items = Vec::with_capacity(elements.len() * 2);
        for element in elements {
            items.push(bulk(element.field));
            if self.with_scores {
                items.push(bulk(format_float(element.score).into_bytes()));
            }
        }
        Ok(Frame::Array(items))
    }
}

impl TryFrom<&mut CommandParser> for Zrange {
    type Error = CommandParserError;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        if parser.remaining() != 3 && parser.remaining() != 4 {
            return Err(parser.wrong_arguments());
        }

        let key = parser.next_bytes()?;
        let start = parser.next_integer()?;
        let end = parser.next_integer()?;

        let with_scores = if parser.remaining() > 0 {
            let option = parser
                .next_string()
                .map_err(|_| CommandParserError::Syntax)?;
            if option.to_lowercase() != "withscores" {
                return Err(CommandParserError::Syntax);
            }
            true
        } else {
            false
        };

        Ok(Self {
            key,
            start,
            end,
            with_scores,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_session;

    #[test]
    fn ties_break_on_member_bytes() {
        let mut session = test_session();
        let db = session.db();
        for (score, member) in [(1.0, &b"a"[..]), (2.0, b"b"), (3.0, b"c"), (2.0, b"d")] {
            db.add_skip_field(b"s", ValueType::SortedSet, member, score)
                .unwrap();
        }

        let reply = Zrange {
            key: Bytes::from("s"),
            start: 0,
            end: -1,
            with_scores: true,
        }
        .exec(&mut session)
        .unwrap();

        let expected: Vec<Frame> = ["a", "1", "b", "2", "d", "2", "c", "3"]
            .iter()
            .map(|part| Frame::Bulk(Bytes::copy_from_slice(part.as_bytes())))
            .collect();
        assert_eq!(reply, Frame::Array(expected));
    }
}
