use bytes::Bytes;

use crate::commands::executable::Executable;
use crate::commands::{CommandParser, CommandParserError, Session};
use crate::frame::Frame;
use crate::Error;

/// Variadic; a key given twice counts twice.
///
/// Ref: <https://redis.io/commands/exists>
#[derive(Debug, PartialEq)]
pub struct Exists {
    pub keys: Vec<Bytes>,
}

impl Executable for Exists {
    fn exec(self, session: &mut Session) -> Result<Frame, Error> {
        let db = session.db();
        let _guard = db.read();

        let mut count = 0;
        for key in &self.keys {
            if db.has(key)?.is_some() {
                count += 1;
            }
        }
        Ok(Frame::Integer(count))
    }
}

impl TryFrom<&mut CommandParser> for Exists {
    type Error = CommandParserError;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        parser.at_least(1)?;
        let keys = parser.rest()?;
        Ok(Self { keys })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_session;

    #[test]
    fn duplicates_count() {
        let mut session = test_session();
        session.db().put_string(b"a", b"1").unwrap();

        let cmd = Exists {
            keys: vec![Bytes::from("a"), Bytes::from("a"), Bytes::from("nope")],
        };
        assert_eq!(cmd.exec(&mut session).unwrap(), Frame::Integer(2));
    }
}
