use bytes::Bytes;

use crate::commands::executable::Executable;
use crate::commands::{CommandParser, CommandParserError, Session};
use crate::commands::{ERR_STRING_LIMIT, STRING_LIMIT};
use crate::frame::Frame;
use crate::storage::expire::{now_unix_millis, now_unix_seconds};
use crate::Error;

#[derive(Debug, PartialEq)]
pub enum ExpireOption {
    Seconds(i64),
    Milliseconds(i64),
}

/// SET with the EX/PX/NX/XX options. A plain SET clears any existing
/// deadline; SET with options only touches the deadline when EX or PX is
/// given. The last EX/PX wins when several are supplied.
///
/// Ref: <https://redis.io/commands/set>
#[derive(Debug, PartialEq)]
pub struct Set {
    pub key: Bytes,
    pub value: Bytes,
    pub nx: bool,
    pub xx: bool,
    pub expire: Option<ExpireOption>,
}

impl Executable for Set {
    fn exec(self, session: &mut Session) -> Result<Frame, Error> {
        let db = session.db();
        let _guard = db.write();

        if self.nx || self.xx {
            let exists = db.has(&self.key)?.is_some();
            if self.nx && exists {
                return Ok(Frame::Null);
            }
            if self.xx && !exists {
                return Ok(Frame::Null);
            }
        }

        if self.value.len() > STRING_LIMIT {
            return Ok(Frame::Error(ERR_STRING_LIMIT.to_string()));
        }

        let plain = !self.nx && !self.xx && self.expire.is_none();
        db.put_string(&self.key, &self.value)?;

        match self.expire {
            Some(ExpireOption::Seconds(seconds)) => {
                let at = (now_unix_seconds() as i64).saturating_add(seconds).max(1) as u64;
                db.set_expire_at(&self.key, at)?;
            }
            Some(ExpireOption::Milliseconds(milliseconds)) => {
                let at_millis = (now_unix_millis() as i64).saturating_add(milliseconds);
                db.set_expire_at(&self.key, (at_millis / 1000).max(1) as u64)?;
            }
            None if plain => db.clear_expire_at(&self.key)?,
            None => {}
        }

        Ok(Frame::Simple("OK".to_string()))
    }
}

impl TryFrom<&mut CommandParser> for Set {
    type Error = CommandParserError;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        parser.at_least(2)?;
        let key = parser.next_bytes()?;
        let value = parser.next_bytes()?;

        let mut nx = false;
        let mut xx = false;
        let mut expire = None;

        while parser.remaining() > 0 {
            let option = parser
                .next_string()
                .map_err(|_| CommandParserError::Syntax)?
                .to_lowercase();
            match option.as_str() {
                "nx" => nx = true,
                "xx" => xx = true,
                "ex" => {
                    if parser.remaining() == 0 {
                        return Err(CommandParserError::Syntax);
                    }
                    expire = Some(ExpireOption::Seconds(parser.next_integer()?));
                }
                "px" => {
                    if parser.remaining() == 0 {
                        return Err(CommandParserError::Syntax);
                    }
                    expire = Some(ExpireOption::Milliseconds(parser.next_integer()?));
                }
                _ => return Err(CommandParserError::Syntax),
            }
        }

        if nx && xx {
            return Err(CommandParserError::Syntax);
        }

        Ok(Self {
            key,
            value,
            nx,
            xx,
            expire,
        })
    }
}
