use bytes::Bytes;

use crate::commands::executable::Executable;
use crate::commands::{bulk, key_state, wrong_type, CommandParser, CommandParserError, KeyState};
use crate::commands::Session;
use crate::frame::Frame;
use crate::storage::ValueType;
use crate::utils::format_float;
use crate::Error;

/// Members with scores inside `[min, max]`; a `(` prefix makes a bound
/// exclusive.
///
/// Ref: <https://redis.io/commands/zrangebyscore>
#[derive(Debug, PartialEq)]
pub struct Zrangebyscore {
    pub key: Bytes,
    pub min: f64,
    pub min_exclusive: bool,
    pub max: f64,
    pub max_exclusive: bool,
    pub with_scores: bool,
}

fn parse_bound(bytes: &[u8]) -> Result<(f64, bool), CommandParserError> {
    let (raw, exclusive) = match bytes.first() {
        Some(b'(') => (&bytes[1..], true),
        _ => (bytes, false),
    };
    if raw.is_empty() {
        return Err(CommandParserError::Syntax);
    }
    let score = std::str::from_utf8(raw)
        .ok()
        .and_then(|s| s.parse::<f64>().ok())
        .ok_or(CommandParserError::Syntax)?;
    Ok((score, exclusive))
}

impl Executable for Zrangebyscore {
    fn exec(self, session: &mut Session) -> Result<Frame, Error> {
        let db = session.db();
        let _guard = db.read();

        match key_state(db, &self.key, ValueType::SortedSet)? {
            KeyState::Missing => return Ok(Frame::Array(vec![])),
            KeyState::WrongType => return Ok(wrong_type()),
            KeyState::Present => {}
        }

        let elements = db.get_skip_range_by_score(
            &self.key,
            self.min,
            self.min_exclusive,
            self.max,
            self.max_exclusive,
        )?;

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

impl TryFrom<&mut CommandParser> for Zrangebyscore {
    type Error = CommandParserError;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        if parser.remaining() != 3 && parser.remaining() != 4 {
            return Err(parser.wrong_arguments());
        }

        let key = parser.next_bytes()?;
        let (min, min_exclusive) = parse_bound(&parser.next_bytes()?)?;
        let (max, max_exclusive) = parse_bound(&parser.next_bytes()?)?;

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
            min,
            min_exclusive,
            max,
            max_exclusive,
            with_scores,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_session;

    fn seed(session: &mut Session) {
        let db = session.db();
        for (score, member) in [(1.0, &b"x"[..]), (2.0, b"y"), (3.0, b"z")] {
            db.add_skip_field(b"s", ValueType::SortedSet, member, score)
                .unwrap();
        }
    }

    fn query(session: &mut Session, min: &str, max: &str) -> Vec<Bytes> {
        let (min, min_exclusive) = parse_bound(min.as_bytes()).unwrap();
        let (max, max_exclusive) = parse_bound(max.as_bytes()).unwrap();
        let reply = Zrangebyscore {
            key: Bytes::from("s"),
            min,
            min_exclusive,
            max,
            max_exclusive,
            with_scores: false,
        }
        .exec(session)
        .unwrap();
        match reply {
            Frame::Array(items) => items
                .into_iter()
                .map(|item| match item {
                    Frame::Bulk(bytes) => bytes,
                    other => panic!("unexpected item {:?}", other),
                })
                .collect(),
            other => panic!("unexpected reply {:?}", other),
        }
    }

    #[test]
    fn exclusive_bounds() {
        let mut session = test_session();
        seed(&mut session);

        assert_eq!(query(&mut session, "1", "3"), vec!["x", "y", "z"]);
        assert_eq!(query(&mut session, "(1", "3"), vec!["y", "z"]);
        assert_eq!(query(&mut session, "1", "(3"), vec!["x", "y"]);
        assert!(query(&mut session, "(2", "(2").is_empty());
    }
}
