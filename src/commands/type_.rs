use bytes::Bytes;

use crate::commands::executable::Executable;
use crate::commands::{CommandParser, CommandParserError, Session};
use crate::frame::Frame;
use crate::Error;

/// Ref: <https://redis.io/commands/type>
#[derive(Debug, PartialEq)]
pub struct Type {
    pub key: Bytes,
}

impl Executable for Type {
    fn exec(self, session: &mut Session) -> Result<Frame, Error> {
        let db = session.db();
        let _guard = db.read();

        let name = match db.has(&self.key)? {
            Some(tipe) => tipe.as_str(),
            None => "none",
        };
        Ok(Frame::Simple(name.to_string()))
    }
}

impl TryFrom<&mut CommandParser> for Type {
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
    use crate::storage::ValueType;

    #[test]
    fn reports_each_type_name() {
        let mut session = test_session();
        let db = session.db();
        db.put_string(b"s", b"v").unwrap();
        db.push_list_tail(b"l", ValueType::List, b"x").unwrap();
        db.add_skip_field(b"z", ValueType::SortedSet, b"m", 1.0)
            .unwrap();

        for (key, expected) in [
            (&b"s"[..], "string"),
            (&b"l"[..], "list"),
            (&b"z"[..], "zset"),
            (&b"missing"[..], "none"),
        ] {
            let reply = Type {
                key: Bytes::copy_from_slice(key),
            }
            .exec(&mut session)
            .unwrap();
            assert_eq!(reply, Frame::Simple(expected.to_string()));
        }
    }
}
