use bytes::Bytes;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::commands::executable::Executable;
use crate::commands::{bulk, key_state, wrong_type, CommandParser, CommandParserError, KeyState};
use crate::commands::Session;
use crate::frame::Frame;
use crate::storage::ValueType;
use crate::Error;

/// Random members without removal. A non-negative count yields distinct
/// members; a negative count may repeat them.
///
/// Ref: <https://redis.io/commands/srandmember>
#[derive(Debug, PartialEq)]
pub struct Srandmember {
    pub key: Bytes,
    pub count: Option<i64>,
}

impl Executable for Srandmember {
    fn exec(self, session: &mut Session) -> Result<Frame, Error> {
        let db = session.db();
        let _guard = db.read();

        match key_state(db, &self.key, ValueType::Set)? {
            KeyState::Missing => {
                return Ok(match self.count {
                    Some(_) => Frame::Array(vec![]),
                    None => Frame::Null,
                })
            }
            KeyState::WrongType => return Ok(wrong_type()),
            KeyState::Present => {}
        }

        let mut members = db.get_field_names(&self.key)?;
        let mut rng = rand::thread_rng();

        match self.count {
            None => match members.choose(&mut rng) {
                Some(member) => Ok(bulk(member.clone())),
                None => Ok(Frame::Null),
            },
            Some(count) if count >= 0 => {
                members.shuffle(&mut rng);
                members.truncate(count as usize);
                Ok(Frame::Array(members.into_iter().map(bulk).collect()))
            }
            Some(count) => {
                let mut picks = Vec::with_capacity(count.unsigned_abs() as usize);
                for _ in 0..count.unsigned_abs() {
                    let pick = members[rng.gen_range(0..members.len())].clone();
                    picks.push(bulk(pick));
                }
                Ok(Frame::Array(picks))
            }
        }
    }
}

impl TryFrom<&mut CommandParser> for Srandmember {
    type Error = CommandParserError;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        if parser.remaining() != 1 && parser.remaining() != 2 {
            return Err(parser.wrong_arguments());
        }
        let key = parser.next_bytes()?;
        let count = if parser.remaining() > 0 {
            Some(parser.next_integer()?)
        } else {
            None
        };
        Ok(Self { key, count })
    }
}
