use bytes::Bytes;

use crate::commands::executable::Executable;
use crate::commands::{key_state, wrong_type, CommandParser, CommandParserError, KeyState};
use crate::commands::{Session, ERR_NOT_VALID_INT, ERR_SYNTAX};
use crate::frame::Frame;
use crate::storage::ValueType;
use crate::utils::bitmap::COUNT_SET_BITS;
use crate::utils::calc_range;
use crate::Error;

/// Population count over the whole string or an inclusive byte range. The
/// range arguments stay raw until after the existence check, matching the
/// reply order of the reference server.
///
/// Ref: <https://redis.io/commands/bitcount>
#[derive(Debug, PartialEq)]
pub struct Bitcount {
    pub key: Bytes,
    pub range: Vec<Bytes>,
}

impl Executable for Bitcount {
    fn exec(self, session: &mut Session) -> Result<Frame, Error> {
        let db = session.db();
        let _guard = db.read();

        match key_state(db, &self.key, ValueType::String)? {
            KeyState::Missing => return Ok(Frame::Integer(0)),
            KeyState::WrongType => return Ok(wrong_type()),
            KeyState::Present => {}
        }

        if !self.range.is_empty() && self.range.len() != 2 {
            return Ok(Frame::Error(ERR_SYNTAX.to_string()));
        }

        let value = db.get_string(&self.key)?;

        let (start, end) = if self.range.is_empty() {
            (0, value.len())
        } else {
            let start = match parse_index(&self.range[0]) {
                Some(start) => start,
                None => return Ok(Frame::Error(ERR_NOT_VALID_INT.to_string())),
            };
            let end = match parse_index(&self.range[1]) {
                Some(end) => end,
                None => return Ok(Frame::Error(ERR_NOT_VALID_INT.to_string())),
            };
            calc_range(start, end, value.len())
        };

        if end <= start {
            return Ok(Frame::Integer(0));
        }

        let sum: i64 = value[start..end]
            .iter()
            .map(|&byte| COUNT_SET_BITS[byte as usize] as i64)
            .sum();
        Ok(Frame::Integer(sum))
    }
}

pub(crate) fn parse_index(bytes: &[u8]) -> Option<i64> {
    std::str::from_utf8(bytes).ok()?.parse::<i64>().ok()
}

impl TryFrom<&mut CommandParser> for Bitcount {
    type Error = CommandParserError;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        parser.at_least(1)?;
        let key = parser.next_bytes()?;
        let range = parser.rest()?;
        Ok(Self { key, range })
    }
}
