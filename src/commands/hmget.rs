use bytes::Bytes;

use crate::commands::executable::Executable;
use crate::commands::{bulk, key_state, wrong_type, CommandParser, CommandParserError, KeyState};
use crate::commands::Session;
use crate::frame::Frame;
use crate::storage::ValueType;
use crate::Error;

/// Point-gets preserving request order; missing fields come back nil.
///
/// Ref: <https://redis.io/commands/hmget>
#[derive(Debug, PartialEq)]
pub struct Hmget {
    pub key: Bytes,
    pub fields: Vec<Bytes>,
}

impl Executable for Hmget {
    fn exec(self, session: &mut Session) -> Result<Frame, Error> {
        let db = session.db();
        let _guard = db.read();

        if let KeyState::WrongType = key_state(db, &self.key, ValueType::Hash)? {
            return Ok(wrong_type());
        }

        let fields: Vec<Vec<u8>> = self.fields.iter().map(|field| field.to_vec()).collect();
        let values = db.get_fields_as_array(&self.key, &fields)?;

        let items = values
            .into_iter()
            .map(|value| match value {
                Some(value) => bulk(value),
                None => Frame::Null,
            })
            .collect();
        Ok(Frame::Array(items))
    }
}

impl TryFrom<&mut CommandParser> for Hmget {
    type Error = CommandParserError;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        parser.at_least(2)?;
        let key = parser.next_bytes()?;
        let fields = parser.rest()?;
        Ok(Self { key, fields })
    }
}
