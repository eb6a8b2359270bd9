use bytes::Bytes;

use crate::commands::bitcount::parse_index;
use crate::commands::executable::Executable;
use crate::commands::{key_state, wrong_type, CommandParser, CommandParserError, KeyState};
use crate::commands::{Session, ERR_BIT_ARGUMENT, ERR_NOT_VALID_INT, ERR_SYNTAX};
use crate::frame::Frame;
use crate::storage::ValueType;
use crate::utils::bitmap::{POS_FIRST_CLEAR, POS_FIRST_SET};
use crate::utils::calc_range;
use crate::Error;

/// Position of the first set or clear bit, optionally within a byte range.
///
/// The edge cases mirror the reference server: a missing key answers -1 for
/// set bits and 0 for clear bits; searching clear bits in an all-ones string
/// with no explicit end returns the first bit past the string; with an
/// explicit end it returns -1.
///
/// Ref: <https://redis.io/commands/bitpos>
#[derive(Debug, PartialEq)]
pub struct Bitpos {
    pub key: Bytes,
    /// bit, then the optional start and end, still raw: the reference server
    /// validates them only for keys that exist.
    pub args: Vec<Bytes>,
}

impl Executable for Bitpos {
    fn exec(self, session: &mut Session) -> Result<Frame, Error> {
        let bit = match parse_index(&self.args[0]) {
            Some(bit) if bit == 0 || bit == 1 => bit,
            _ => return Ok(Frame::Error(ERR_BIT_ARGUMENT.to_string())),
        };
        let searching_set = bit == 1;

        let db = session.db();
        let _guard = db.read();

        match key_state(db, &self.key, ValueType::String)? {
            KeyState::WrongType => return Ok(wrong_type()),
            KeyState::Missing if searching_set => return Ok(Frame::Integer(-1)),
            KeyState::Missing => return Ok(Frame::Integer(0)),
            KeyState::Present => {}
        }

        if self.args.len() > 3 {
            return Ok(Frame::Error(ERR_SYNTAX.to_string()));
        }

        let value = db.get_string(&self.key)?;

        let mut start = 0i64;
        let mut end = value.len() as i64;
        if self.args.len() >= 2 {
            start = match parse_index(&self.args[1]) {
                Some(start) => start,
                None => return Ok(Frame::Error(ERR_NOT_VALID_INT.to_string())),
            };
        }
        let end_given = self.args.len() == 3;
        if end_given {
            end = match parse_index(&self.args[2]) {
                Some(end) => end,
                None => return Ok(Frame::Error(ERR_NOT_VALID_INT.to_string())),
            };
        }

        let (start, end) = calc_range(start, end, value.len());
        if end <= start {
            return Ok(Frame::Integer(-1));
        }

        let mut pos: i64 = 0;
        let mut found = false;
        for &byte in &value[start..end] {
            if searching_set {
                if POS_FIRST_SET[byte as usize] != -1 {
                    found = true;
                    pos += POS_FIRST_SET[byte as usize] as i64;
                    break;
                }
            } else if POS_FIRST_CLEAR[byte as usize] != 8 {
                found = true;
                pos += POS_FIRST_CLEAR[byte as usize] as i64;
                break;
            }
            pos += 8;
        }

        if found {
            return Ok(Frame::Integer(8 * start as i64 + pos));
        }

        // A string of only zero bytes holds no set bit.
        if searching_set {
            return Ok(Frame::Integer(-1));
        }

        // Searching clear bits in an all-ones string: with no explicit end
        // the string counts as right-padded with zeros, so the answer is the
        // first bit past it; with an explicit end the caller asked about a
        // fully-set range and the answer is -1.
        if end_given {
            return Ok(Frame::Integer(-1));
        }
        Ok(Frame::Integer(8 * end as i64))
    }
}

impl TryFrom<&mut CommandParser> for Bitpos {
    type Error = CommandParserError;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        parser.at_least(2)?;
        let key = parser.next_bytes()?;
        let args = parser.rest()?;
        Ok(Self { key, args })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_session;

    fn bitpos(session: &mut Session, args: &[&str]) -> Frame {
        Bitpos {
            key: Bytes::from("k"),
            args: args
                .iter()
                .map(|arg| Bytes::copy_from_slice(arg.as_bytes()))
                .collect(),
        }
        .exec(session)
        .unwrap()
    }

    #[test]
    fn finds_first_set_bit() {
        let mut session = test_session();
        session.db().put_string(b"k", b"\x00\xff\xf0").unwrap();

        assert_eq!(bitpos(&mut session, &["1"]), Frame::Integer(8));
        assert_eq!(bitpos(&mut session, &["1", "2"]), Frame::Integer(16));
    }

    #[test]
    fn clear_bit_edge_cases() {
        let mut session = test_session();
        session.db().put_string(b"k", b"\xff\xff\xff").unwrap();

        // All ones, no end given: first bit past the string.
        assert_eq!(bitpos(&mut session, &["0"]), Frame::Integer(24));
        // All ones, explicit range: nothing to find.
        assert_eq!(bitpos(&mut session, &["0", "0", "-1"]), Frame::Integer(-1));
    }

    #[test]
    fn missing_key() {
        let mut session = test_session();
        assert_eq!(bitpos(&mut session, &["1"]), Frame::Integer(-1));
        assert_eq!(bitpos(&mut session, &["0"]), Frame::Integer(0));
    }
}
