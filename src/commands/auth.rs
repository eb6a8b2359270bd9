use bytes::Bytes;

use crate::commands::executable::Executable;
use crate::commands::{CommandParser, CommandParserError, Session};
use crate::commands::{ERR_INVALID_PASSWORD, ERR_NO_PASSWORD_SET};
use crate::frame::Frame;
use crate::Error;

/// Authenticates the connection against the configured password.
///
/// Ref: <https://redis.io/commands/auth>
#[derive(Debug, PartialEq)]
pub struct Auth {
    pub password: Bytes,
}

impl Executable for Auth {
    fn exec(self, session: &mut Session) -> Result<Frame, Error> {
        if session.password.is_empty() {
            return Ok(Frame::Error(ERR_NO_PASSWORD_SET.to_string()));
        }
        if self.password != session.password.as_bytes() {
            session.authed = false;
            return Ok(Frame::Error(ERR_INVALID_PASSWORD.to_string()));
        }
        session.authed = true;
        Ok(Frame::Simple("OK".to_string()))
    }
}

impl TryFrom<&mut CommandParser> for Auth {
    type Error = CommandParserError;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        parser.exact(1)?;
        let password = parser.next_bytes()?;
        Ok(Self { password })
    }
}
