use bytes::Bytes;

use crate::commands::executable::Executable;
use crate::commands::sadd::put_members;
use crate::commands::sdiff::{diff_members, set_operand};
use crate::commands::{wrong_type, CommandParser, CommandParserError, Session};
use crate::frame::Frame;
use crate::storage::Database;
use crate::Error;

/// SDIFF whose result replaces `destination`.
///
/// Ref: <https://redis.io/commands/sdiffstore>
#[derive(Debug, PartialEq)]
pub struct Sdiffstore {
    pub destination: Bytes,
    pub keys: Vec<Bytes>,
}

/// Replaces `destination` with `members`, deleting whatever was there.
pub(crate) fn store_members(
    db: &Database,
    destination: &[u8],
    members: &[Vec<u8>],
) -> Result<(), Error> {
    if let Some(tipe) = db.has(destination)? {
        db.delete(destination, tipe)?;
    }
    if !members.is_empty() {
        put_members(db, destination, members)?;
    }
    Ok(())
}

impl Executable for Sdiffstore {
    fn exec(self, session: &mut Session) -> Result<Frame, Error> {
        let db = session.db();
        let _guard = db.write();

        for (i, key) in self.keys.iter().enumerate() {
            match set_operand(db, key)? {
                None if i == 0 => return Ok(Frame::Integer(0)),
                Some(false) => return Ok(wrong_type()),
                _ => {}
            }
        }

        let members = diff_members(db, &self.keys)?;
        store_members(db, &self.destination, &members)?;
        Ok(Frame::Integer(members.len() as i64))
    }
}

impl TryFrom<&mut CommandParser> for Sdiffstore {
    type Error = CommandParserError;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        parser.at_least(3)?;
        let destination = parser.next_bytes()?;
        let keys = parser.rest()?;
        Ok(Self { destination, keys })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::sadd::put_members;
    use crate::commands::test_session;

    #[test]
    fn replaces_destination() {
        let mut session = test_session();
        put_members(session.db(), b"a", &[b"1".to_vec(), b"2".to_vec()]).unwrap();
        put_members(session.db(), b"b", &[b"2".to_vec()]).unwrap();
        session.db().put_string(b"dest", b"old").unwrap();

        let cmd = Sdiffstore {
            destination: Bytes::from("dest"),
            keys: vec![Bytes::from("a"), Bytes::from("b")],
        };
        assert_eq!(cmd.exec(&mut session).unwrap(), Frame::Integer(1));
        assert_eq!(
            session.db().get_field_names(b"dest").unwrap(),
            vec![b"1".to_vec()]
        );
    }
}
