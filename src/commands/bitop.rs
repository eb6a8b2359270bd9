use bytes::Bytes;

use crate::commands::executable::Executable;
use crate::commands::{CommandParser, CommandParserError, Session};
use crate::commands::{ERR_BITOP_NOT, ERR_SYNTAX, ERR_WRONG_TYPE};
use crate::frame::Frame;
use crate::storage::ValueType;
use crate::Error;

/// Bitwise AND/OR/XOR/NOT across source strings into a destination key.
/// The destination grows to the longest existing source; shorter operands
/// contribute zero bytes.
///
/// Ref: <https://redis.io/commands/bitop>
#[derive(Debug, PartialEq)]
pub struct Bitop {
    pub operation: String,
    pub destination: Bytes,
    pub sources: Vec<Bytes>,
}

impl Executable for Bitop {
    fn exec(self, session: &mut Session) -> Result<Frame, Error> {
        let db = session.db();
        let _guard = db.write();

        match self.operation.as_str() {
            "not" => {
                if self.sources.len() > 1 {
                    return Ok(Frame::Error(ERR_BITOP_NOT.to_string()));
                }

                let source = &self.sources[0];
                match db.has(source)? {
                    None => return Ok(Frame::Integer(0)),
                    Some(ValueType::String) => {}
                    Some(_) => return Ok(Frame::Error(ERR_WRONG_TYPE.to_string())),
                }

                let value = db.get_string(source)?;
                let result: Vec<u8> = value.iter().map(|byte| !byte).collect();

                db.put_string(&self.destination, &result)?;
                Ok(Frame::Integer(result.len() as i64))
            }
            "and" | "or" | "xor" => {
                let mut result: Vec<u8> = Vec::new();
                for source in &self.sources {
                    let exists = match db.has(source)? {
                        None => false,
                        Some(ValueType::String) => true,
                        Some(_) => return Ok(Frame::Error(ERR_WRONG_TYPE.to_string())),
                    };
                    let value = db.get_string(source)?;

                    if exists && result.len() < value.len() {
                        if result.is_empty() {
                            // The first existing source seeds the result.
                            result.extend_from_slice(&value);
                            continue;
                        }
                        result.resize(value.len(), 0);
                    }

                    for i in 0..result.len() {
                        let operand = if exists && i < value.len() {
                            value[i]
                        } else {
                            0
                        };
                        match self.operation.as_str() {
                            "and" => result[i] &= operand,
                            "or" => result[i] |= operand,
                            _ => result[i] ^= operand,
                        }
                    }
                }

                db.put_string(&self.destination, &result)?;
                Ok(Frame::Integer(result.len() as i64))
            }
            _ => Ok(Frame::Error(ERR_SYNTAX.to_string())),
        }
    }
}

impl TryFrom<&mut CommandParser> for Bitop {
    type Error = CommandParserError;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        parser.at_least(3)?;
        let operation = parser
            .next_string()
            .map_err(|_| CommandParserError::Syntax)?
            .to_lowercase();
        let destination = parser.next_bytes()?;
        let sources = parser.rest()?;
        Ok(Self {
            operation,
            destination,
            sources,
        })
    }
}
