use bytes::Bytes;

use crate::commands::executable::Executable;
use crate::commands::{bulk, CommandParser, CommandParserError, Session};
use crate::frame::Frame;
use crate::storage::ValueType;
use crate::Error;

/// Variadic GET; keys that are missing or hold another type come back nil.
///
/// Ref: <https://redis.io/commands/mget>
#[derive(Debug, PartialEq)]
pub struct Mget {
    pub keys: Vec<Bytes>,
}

impl Executable for Mget {
    fn exec(self, session: &mut Session) -> Result<Frame, Error> {
        let db = session.db();
        let _guard = db.read();

        let mut values = Vec::with_capacity(self.keys.len());
        for key in &self.keys {
            match db.has(key)? {
                Some(ValueType::String) => values.push(bulk(db.get_string(key)?)),
                _ => values.push(Frame::Null),
            }
        }
        Ok(Frame::Array(values))
    }
}

impl TryFrom<&mut CommandParser> for Mget {
    type Error = CommandParserError;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        parser.at_least(1)?;
        let keys = parser.rest()?;
        Ok(Self { keys })
    }
}
