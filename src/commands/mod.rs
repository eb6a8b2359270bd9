pub mod executable;

// connection / server
pub mod auth;
pub mod echo;
pub mod flushdb;
pub mod ping;
pub mod select;

// keys
pub mod del;
pub mod exists;
pub mod expire;
pub mod expireat;
pub mod pexpire;
pub mod pexpireat;
pub mod pttl;
pub mod ttl;
pub mod type_;

// strings
pub mod append;
pub mod bitcount;
pub mod bitop;
pub mod bitpos;
pub mod decr;
pub mod decrby;
pub mod get;
pub mod getbit;
pub mod getrange;
pub mod getset;
pub mod incr;
pub mod incrby;
pub mod incrbyfloat;
pub mod mget;
pub mod mset;
pub mod msetnx;
pub mod psetex;
pub mod set;
pub mod setbit;
pub mod setex;
pub mod setnx;
pub mod setrange;
pub mod strlen;

// hashes
pub mod hdel;
pub mod hexists;
pub mod hget;
pub mod hgetall;
pub mod hincrby;
pub mod hincrbyfloat;
pub mod hkeys;
pub mod hlen;
pub mod hmget;
pub mod hmset;
pub mod hset;
pub mod hsetnx;
pub mod hstrlen;
pub mod hvals;

// lists
pub mod lindex;
pub mod linsert;
pub mod llen;
pub mod lpop;
pub mod lpush;
pub mod lpushx;
pub mod lrange;
pub mod lrem;
pub mod lset;
pub mod ltrim;
pub mod rpop;
pub mod rpoplpush;
pub mod rpush;
pub mod rpushx;

// sets
pub mod sadd;
pub mod scard;
pub mod sdiff;
pub mod sdiffstore;
pub mod sinter;
pub mod sinterstore;
pub mod sismember;
pub mod smembers;
pub mod smove;
pub mod spop;
pub mod srandmember;
pub mod srem;
pub mod sunion;
pub mod sunionstore;

// sorted sets
pub mod zadd;
pub mod zcard;
pub mod zrange;
pub mod zrangebyscore;
pub mod zrank;
pub mod zrem;

use std::sync::Arc;
use std::{str, vec};

use bytes::Bytes;
use thiserror::Error as ThisError;

use crate::commands::executable::Executable;
use crate::frame::Frame;
use crate::storage::{Database, Databases, ValueType, DATABASE_COUNT};
use crate::Error;

pub const ERR_WRONG_TYPE: &str =
    "WRONGTYPE Operation against a key holding the wrong kind of value";
pub const ERR_SYNTAX: &str = "ERR syntax error";
pub const ERR_NO_AUTH: &str = "NOAUTH Authentication required.";
pub const ERR_INVALID_PASSWORD: &str = "ERR invalid password";
pub const ERR_NO_PASSWORD_SET: &str = "ERR Client sent AUTH, but no password is set";
pub const ERR_DB_INDEX: &str = "ERR DB index is out of range";
pub const ERR_NOT_VALID_INT: &str = "ERR value is not an integer or out of range";
pub const ERR_NOT_VALID_FLOAT: &str = "ERR value is not a valid float";
pub const ERR_BITOP_NOT: &str = "ERR BITOP NOT must be called with a single source key.";
pub const ERR_BIT_ARGUMENT: &str = "ERR The bit argument must be 1 or 0.";
pub const ERR_BIT_OFFSET: &str = "ERR bit offset is not an integer or out of range";
pub const ERR_BIT_VALUE: &str = "ERR bit is not an integer or out of range";
pub const ERR_STRING_LIMIT: &str = "ERR string exceeds maximum allowed size (512MB)";
pub const ERR_OFFSET_OUT_RANGE: &str = "ERR offset is out of range";
pub const ERR_NO_SUCH_KEY: &str = "ERR no such key";
pub const ERR_INDEX_OUT_RANGE: &str = "ERR index out of range";
pub const ERR_SERVER_UNKNOWN: &str = "ERR server unknown error";

/// Hard cap on string values and on bitmap extension.
pub const STRING_LIMIT: usize = 536_870_912; // 512MB

/// Per-connection state: the selected database, the auth gate, and the
/// configured password.
pub struct Session {
    pub(crate) databases: Arc<Databases>,
    pub(crate) index: usize,
    pub(crate) authed: bool,
    pub(crate) password: String,
}

impl Session {
    pub fn new(databases: Arc<Databases>, password: String) -> Session {
        let authed = password.is_empty();
        Session {
            databases,
            index: 0,
            authed,
            password,
        }
    }

    pub fn db(&self) -> &Database {
        self.databases.select(self.index)
    }
}

/// Parses and runs one request. Command-domain failures come back as RESP
/// error frames; an `Err` here means the backend itself failed and the
/// caller replies with the generic server error.
pub fn dispatch(frame: Frame, session: &mut Session) -> Result<Frame, Error> {
    let command = match Command::try_from(frame) {
        Ok(command) => command,
        Err(err) => return Ok(err.into_frame()),
    };

    if !session.authed && !matches!(command, Command::Auth(_)) {
        return Ok(Frame::Error(ERR_NO_AUTH.to_string()));
    }

    command.exec(session)
}

/// How a key looks to a command expecting a particular type.
pub(crate) enum KeyState {
    Missing,
    Present,
    WrongType,
}

/// The type gate every typed command applies before touching value records.
pub(crate) fn key_state(
    db: &Database,
    key: &[u8],
    expected: ValueType,
) -> Result<KeyState, Error> {
    match db.has(key)? {
        None => Ok(KeyState::Missing),
        Some(tipe) if tipe == expected => Ok(KeyState::Present),
        Some(_) => Ok(KeyState::WrongType),
    }
}

pub(crate) fn wrong_type() -> Frame {
    Frame::Error(ERR_WRONG_TYPE.to_string())
}

pub(crate) fn bulk(bytes: Vec<u8>) -> Frame {
    Frame::Bulk(Bytes::from(bytes))
}

#[derive(Debug, PartialEq)]
pub enum Command {
    // connection / server
    Auth(auth::Auth),
    Echo(echo::Echo),
    Ping(ping::Ping),
    Select(select::Select),
    Flushdb(flushdb::Flushdb),
    // keys
    Del(del::Del),
    Exists(exists::Exists),
    Expire(expire::Expire),
    Expireat(expireat::Expireat),
    Pexpire(pexpire::Pexpire),
    Pexpireat(pexpireat::Pexpireat),
    Ttl(ttl::Ttl),
    Pttl(pttl::Pttl),
    Type(type_::Type),
    // strings
    Append(append::Append),
    Bitcount(bitcount::Bitcount),
    Bitop(bitop::Bitop),
    Bitpos(bitpos::Bitpos),
    Decr(decr::Decr),
    Decrby(decrby::Decrby),
    Get(get::Get),
    Getbit(getbit::Getbit),
    Getrange(getrange::Getrange),
    Getset(getset::Getset),
    Incr(incr::Incr),
    Incrby(incrby::Incrby),
    Incrbyfloat(incrbyfloat::Incrbyfloat),
    Mget(mget::Mget),
    Mset(mset::Mset),
    Msetnx(msetnx::Msetnx),
    Psetex(psetex::Psetex),
    Set(set::Set),
    Setbit(setbit::Setbit),
    Setex(setex::Setex),
    Setnx(setnx::Setnx),
    Setrange(setrange::Setrange),
    Strlen(strlen::Strlen),
    // hashes
    Hdel(hdel::Hdel),
    Hexists(hexists::Hexists),
    Hget(hget::Hget),
    Hgetall(hgetall::Hgetall),
    Hincrby(hincrby::Hincrby),
    Hincrbyfloat(hincrbyfloat::Hincrbyfloat),
    Hkeys(hkeys::Hkeys),
    Hlen(hlen::Hlen),
    Hmget(hmget::Hmget),
    Hmset(hmset::Hmset),
    Hset(hset::Hset),
    Hsetnx(hsetnx::Hsetnx),
    Hstrlen(hstrlen::Hstrlen),
    Hvals(hvals::Hvals),
    // lists
    Lindex(lindex::Lindex),
    Linsert(linsert::Linsert),
    Llen(llen::Llen),
    Lpop(lpop::Lpop),
    Lpush(lpush::Lpush),
    Lpushx(lpushx::Lpushx),
    Lrange(lrange::Lrange),
    Lrem(lrem::Lrem),
    Lset(lset::Lset),
    Ltrim(ltrim::Ltrim),
    Rpop(rpop::Rpop),
    Rpoplpush(rpoplpush::Rpoplpush),
    Rpush(rpush::Rpush),
    Rpushx(rpushx::Rpushx),
    // sets
    Sadd(sadd::Sadd),
    Scard(scard::Scard),
    Sdiff(sdiff::Sdiff),
    Sdiffstore(sdiffstore::Sdiffstore),
    Sinter(sinter::Sinter),
    Sinterstore(sinterstore::Sinterstore),
    Sismember(sismember::Sismember),
    Smembers(smembers::Smembers),
    Smove(smove::Smove),
    Spop(spop::Spop),
    Srandmember(srandmember::Srandmember),
    Srem(srem::Srem),
    Sunion(sunion::Sunion),
    Sunionstore(sunionstore::Sunionstore),
    // sorted sets
    Zadd(zadd::Zadd),
    Zcard(zcard::Zcard),
    Zrange(zrange::Zrange),
    Zrangebyscore(zrangebyscore::Zrangebyscore),
    Zrank(zrank::Zrank),
    Zrem(zrem::Zrem),
}

impl Executable for Command {
    fn exec(self, session: &mut Session) -> Result<Frame, Error> {
        match self {
            Command::Auth(cmd) => cmd.exec(session),
            Command::Echo(cmd) => cmd.exec(session),
            Command::Ping(cmd) => cmd.exec(session),
            Command::Select(cmd) => cmd.exec(session),
            Command::Flushdb(cmd) => cmd.exec(session),
            Command::Del(cmd) => cmd.exec(session),
            Command::Exists(cmd) => cmd.exec(session),
            Command::Expire(cmd) => cmd.exec(session),
            Command::Expireat(cmd) => cmd.exec(session),
            Command::Pexpire(cmd) => cmd.exec(session),
            Command::Pexpireat(cmd) => cmd.exec(session),
            Command::Ttl(cmd) => cmd.exec(session),
            Command::Pttl(cmd) => cmd.exec(session),
            Command::Type(cmd) => cmd.exec(session),
            Command::Append(cmd) => cmd.exec(session),
            Command::Bitcount(cmd) => cmd.exec(session),
            Command::Bitop(cmd) => cmd.exec(session),
            Command::Bitpos(cmd) => cmd.exec(session),
            Command::Decr(cmd) => cmd.exec(session),
            Command::Decrby(cmd) => cmd.exec(session),
            Command::Get(cmd) => cmd.exec(session),
            Command::Getbit(cmd) => cmd.exec(session),
            Command::Getrange(cmd) => cmd.exec(session),
            Command::Getset(cmd) => cmd.exec(session),
            Command::Incr(cmd) => cmd.exec(session),
            Command::Incrby(cmd) => cmd.exec(session),
            Command::Incrbyfloat(cmd) => cmd.exec(session),
            Command::Mget(cmd) => cmd.exec(session),
            Command::Mset(cmd) => cmd.exec(session),
            Command::Msetnx(cmd) => cmd.exec(session),
            Command::Psetex(cmd) => cmd.exec(session),
            Command::Set(cmd) => cmd.exec(session),
            Command::Setbit(cmd) => cmd.exec(session),
            Command::Setex(cmd) => cmd.exec(session),
            Command::Setnx(cmd) => cmd.exec(session),
            Command::Setrange(cmd) => cmd.exec(session),
            Command::Strlen(cmd) => cmd.exec(session),
            Command::Hdel(cmd) => cmd.exec(session),
            Command::Hexists(cmd) => cmd.exec(session),
            Command::Hget(cmd) => cmd.exec(session),
            Command::Hgetall(cmd) => cmd.exec(session),
            Command::Hincrby(cmd) => cmd.exec(session),
            Command::Hincrbyfloat(cmd) => cmd.exec(session),
            Command::Hkeys(cmd) => cmd.exec(session),
            Command::Hlen(cmd) => cmd.exec(session),
            Command::Hmget(cmd) => cmd.exec(session),
            Command::Hmset(cmd) => cmd.exec(session),
            Command::Hset(cmd) => cmd.exec(session),
            Command::Hsetnx(cmd) => cmd.exec(session),
            Command::Hstrlen(cmd) => cmd.exec(session),
            Command::Hvals(cmd) => cmd.exec(session),
            Command::Lindex(cmd) => cmd.exec(session),
            Command::Linsert(cmd) => cmd.exec(session),
            Command::Llen(cmd) => cmd.exec(session),
            Command::Lpop(cmd) => cmd.exec(session),
            Command::Lpush(cmd) => cmd.exec(session),
            Command::Lpushx(cmd) => cmd.exec(session),
            Command::Lrange(cmd) => cmd.exec(session),
            Command::Lrem(cmd) => cmd.exec(session),
            Command::Lset(cmd) => cmd.exec(session),
            Command::Ltrim(cmd) => cmd.exec(session),
            Command::Rpop(cmd) => cmd.exec(session),
            Command::Rpoplpush(cmd) => cmd.exec(session),
            Command::Rpush(cmd) => cmd.exec(session),
            Command::Rpushx(cmd) => cmd.exec(session),
            Command::Sadd(cmd) => cmd.exec(session),
            Command::Scard(cmd) => cmd.exec(session),
            Command::Sdiff(cmd) => cmd.exec(session),
            Command::Sdiffstore(cmd) => cmd.exec(session),
            Command::Sinter(cmd) => cmd.exec(session),
            Command::Sinterstore(cmd) => cmd.exec(session),
            Command::Sismember(cmd) => cmd.exec(session),
            Command::Smembers(cmd) => cmd.exec(session),
            Command::Smove(cmd) => cmd.exec(session),
            Command::Spop(cmd) => cmd.exec(session),
            Command::Srandmember(cmd) => cmd.exec(session),
            Command::Srem(cmd) => cmd.exec(session),
            Command::Sunion(cmd) => cmd.exec(session),
            Command::Sunionstore(cmd) => cmd.exec(session),
            Command::Zadd(cmd) => cmd.exec(session),
            Command::Zcard(cmd) => cmd.exec(session),
            Command::Zrange(cmd) => cmd.exec(session),
            Command::Zrangebyscore(cmd) => cmd.exec(session),
            Command::Zrank(cmd) => cmd.exec(session),
            Command::Zrem(cmd) => cmd.exec(session),
        }
    }
}

impl TryFrom<Frame> for Command {
    type Error = CommandParserError;

    fn try_from(frame: Frame) -> Result<Self, Self::Error> {
        let mut parser = CommandParser::new(frame)?;
        let name = parser.command().to_string();

        match name.as_str() {
            "auth" => auth::Auth::try_from(&mut parser).map(Command::Auth),
            "echo" => echo::Echo::try_from(&mut parser).map(Command::Echo),
            // COMMAND is answered like PING so stock clients can connect.
            "ping" | "command" => ping::Ping::try_from(&mut parser).map(Command::Ping),
            "select" => select::Select::try_from(&mut parser).map(Command::Select),
            "flushdb" => flushdb::Flushdb::try_from(&mut parser).map(Command::Flushdb),

            "del" => del::Del::try_from(&mut parser).map(Command::Del),
            "exists" => exists::Exists::try_from(&mut parser).map(Command::Exists),
            "expire" => expire::Expire::try_from(&mut parser).map(Command::Expire),
            "expireat" => expireat::Expireat::try_from(&mut parser).map(Command::Expireat),
            "pexpire" => pexpire::Pexpire::try_from(&mut parser).map(Command::Pexpire),
            "pexpireat" => pexpireat::Pexpireat::try_from(&mut parser).map(Command::Pexpireat),
            "ttl" => ttl::Ttl::try_from(&mut parser).map(Command::Ttl),
            "pttl" => pttl::Pttl::try_from(&mut parser).map(Command::Pttl),
            "type" => type_::Type::try_from(&mut parser).map(Command::Type),

            "append" => append::Append::try_from(&mut parser).map(Command::Append),
            "bitcount" => bitcount::Bitcount::try_from(&mut parser).map(Command::Bitcount),
            "bitop" => bitop::Bitop::try_from(&mut parser).map(Command::Bitop),
            "bitpos" => bitpos::Bitpos::try_from(&mut parser).map(Command::Bitpos),
            "decr" => decr::Decr::try_from(&mut parser).map(Command::Decr),
            "decrby" => decrby::Decrby::try_from(&mut parser).map(Command::Decrby),
            "get" => get::Get::try_from(&mut parser).map(Command::Get),
            "getbit" => getbit::Getbit::try_from(&mut parser).map(Command::Getbit),
            "getrange" => getrange::Getrange::try_from(&mut parser).map(Command::Getrange),
            "getset" => getset::Getset::try_from(&mut parser).map(Command::Getset),
            "incr" => incr::Incr::try_from(&mut parser).map(Command::Incr),
            "incrby" => incrby::Incrby::try_from(&mut parser).map(Command::Incrby),
            "incrbyfloat" => {
                incrbyfloat::Incrbyfloat::try_from(&mut parser).map(Command::Incrbyfloat)
            }
            "mget" => mget::Mget::try_from(&mut parser).map(Command::Mget),
            "mset" => mset::Mset::try_from(&mut parser).map(Command::Mset),
            "msetnx" => msetnx::Msetnx::try_from(&mut parser).map(Command::Msetnx),
            "psetex" => psetex::Psetex::try_from(&mut parser).map(Command::Psetex),
            "set" => set::Set::try_from(&mut parser).map(Command::Set),
            "setbit" => setbit::Setbit::try_from(&mut parser).map(Command::Setbit),
            "setex" => setex::Setex::try_from(&mut parser).map(Command::Setex),
            "setnx" => setnx::Setnx::try_from(&mut parser).map(Command::Setnx),
            "setrange" => setrange::Setrange::try_from(&mut parser).map(Command::Setrange),
            "strlen" => strlen::Strlen::try_from(&mut parser).map(Command::Strlen),

            "hdel" => hdel::Hdel::try_from(&mut parser).map(Command::Hdel),
            "hexists" => hexists::Hexists::try_from(&mut parser).map(Command::Hexists),
            "hget" => hget::Hget::try_from(&mut parser).map(Command::Hget),
            "hgetall" => hgetall::Hgetall::try_from(&mut parser).map(Command::Hgetall),
            "hincrby" => hincrby::Hincrby::try_from(&mut parser).map(Command::Hincrby),
            "hincrbyfloat" => {
                hincrbyfloat::Hincrbyfloat::try_from(&mut parser).map(Command::Hincrbyfloat)
            }
            "hkeys" => hkeys::Hkeys::try_from(&mut parser).map(Command::Hkeys),
            "hlen" => hlen::Hlen::try_from(&mut parser).map(Command::Hlen),
            "hmget" => hmget::Hmget::try_from(&mut parser).map(Command::Hmget),
            "hmset" => hmset::Hmset::try_from(&mut parser).map(Command::Hmset),
            "hset" => hset::Hset::try_from(&mut parser).map(Command::Hset),
            "hsetnx" => hsetnx::Hsetnx::try_from(&mut parser).map(Command::Hsetnx),
            "hstrlen" => hstrlen::Hstrlen::try_from(&mut parser).map(Command::Hstrlen),
            "hvals" => hvals::Hvals::try_from(&mut parser).map(Command::Hvals),

            "lindex" => lindex::Lindex::try_from(&mut parser).map(Command::Lindex),
            "linsert" => linsert::Linsert::try_from(&mut parser).map(Command::Linsert),
            "llen" => llen::Llen::try_from(&mut parser).map(Command::Llen),
            "lpop" => lpop::Lpop::try_from(&mut parser).map(Command::Lpop),
            "lpush" => lpush::Lpush::try_from(&mut parser).map(Command::Lpush),
            "lpushx" => lpushx::Lpushx::try_from(&mut parser).map(Command::Lpushx),
            "lrange" => lrange::Lrange::try_from(&mut parser).map(Command::Lrange),
            "lrem" => lrem::Lrem::try_from(&mut parser).map(Command::Lrem),
            "lset" => lset::Lset::try_from(&mut parser).map(Command::Lset),
            "ltrim" => ltrim::Ltrim::try_from(&mut parser).map(Command::Ltrim),
            "rpop" => rpop::Rpop::try_from(&mut parser).map(Command::Rpop),
            "rpoplpush" => rpoplpush::Rpoplpush::try_from(&mut parser).map(Command::Rpoplpush),
            "rpush" => rpush::Rpush::try_from(&mut parser).map(Command::Rpush),
            "rpushx" => rpushx::Rpushx::try_from(&mut parser).map(Command::Rpushx),

            "sadd" => sadd::Sadd::try_from(&mut parser).map(Command::Sadd),
            "scard" => scard::Scard::try_from(&mut parser).map(Command::Scard),
            "sdiff" => sdiff::Sdiff::try_from(&mut parser).map(Command::Sdiff),
            "sdiffstore" => {
                sdiffstore::Sdiffstore::try_from(&mut parser).map(Command::Sdiffstore)
            }
            "sinter" => sinter::Sinter::try_from(&mut parser).map(Command::Sinter),
            "sinterstore" => {
                sinterstore::Sinterstore::try_from(&mut parser).map(Command::Sinterstore)
            }
            "sismember" => sismember::Sismember::try_from(&mut parser).map(Command::Sismember),
            "smembers" => smembers::Smembers::try_from(&mut parser).map(Command::Smembers),
            "smove" => smove::Smove::try_from(&mut parser).map(Command::Smove),
            "spop" => spop::Spop::try_from(&mut parser).map(Command::Spop),
            "srandmember" => {
                srandmember::Srandmember::try_from(&mut parser).map(Command::Srandmember)
            }
            "srem" => srem::Srem::try_from(&mut parser).map(Command::Srem),
            "sunion" => sunion::Sunion::try_from(&mut parser).map(Command::Sunion),
            "sunionstore" => {
                sunionstore::Sunionstore::try_from(&mut parser).map(Command::Sunionstore)
            }

            "zadd" => zadd::Zadd::try_from(&mut parser).map(Command::Zadd),
            "zcard" => zcard::Zcard::try_from(&mut parser).map(Command::Zcard),
            "zrange" => zrange::Zrange::try_from(&mut parser).map(Command::Zrange),
            "zrangebyscore" => {
                zrangebyscore::Zrangebyscore::try_from(&mut parser).map(Command::Zrangebyscore)
            }
            "zrank" => zrank::Zrank::try_from(&mut parser).map(Command::Zrank),
            "zrem" => zrem::Zrem::try_from(&mut parser).map(Command::Zrem),

            name => Err(CommandParserError::UnknownCommand(name.to_string())),
        }
    }
}

pub(crate) struct CommandParser {
    command: String,
    parts: vec::IntoIter<Frame>,
}

impl CommandParser {
    fn new(frame: Frame) -> Result<CommandParser, CommandParserError> {
        // Clients send commands to the server as RESP arrays.
        let frames = match frame {
            Frame::Array(array) => array,
            frame => {
                return Err(CommandParserError::InvalidFrame {
                    expected: "array".to_string(),
                    actual: frame,
                })
            }
        };

        let mut parts = frames.into_iter();
        let command = match parts.next() {
            Some(Frame::Simple(s)) => s.to_lowercase(),
            Some(Frame::Bulk(bytes)) => str::from_utf8(&bytes[..])
                .map(|s| s.to_lowercase())
                .map_err(CommandParserError::InvalidUTF8String)?,
            Some(frame) => {
                return Err(CommandParserError::InvalidFrame {
                    expected: "simple or bulk string".to_string(),
                    actual: frame,
                })
            }
            None => return Err(CommandParserError::NoCommand),
        };

        Ok(CommandParser { command, parts })
    }

    pub(crate) fn command(&self) -> &str {
        &self.command
    }

    pub(crate) fn remaining(&self) -> usize {
        self.parts.len()
    }

    pub(crate) fn wrong_arguments(&self) -> CommandParserError {
        CommandParserError::WrongNumberOfArguments(self.command.clone())
    }

    /// Exact argument count, not counting the command name.
    pub(crate) fn exact(&self, count: usize) -> Result<(), CommandParserError> {
        if self.remaining() != count {
            return Err(self.wrong_arguments());
        }
        Ok(())
    }

    pub(crate) fn at_least(&self, count: usize) -> Result<(), CommandParserError> {
        if self.remaining() < count {
            return Err(self.wrong_arguments());
        }
        Ok(())
    }

    pub(crate) fn next_bytes(&mut self) -> Result<Bytes, CommandParserError> {
        let frame = self.parts.next().ok_or(CommandParserError::EndOfStream)?;

        match frame {
            // Both `Simple` and `Bulk` representations may carry arguments.
            Frame::Simple(s) => Ok(Bytes::from(s)),
            Frame::Bulk(bytes) => Ok(bytes),
            frame => Err(CommandParserError::InvalidFrame {
                expected: "simple or bulk string".to_string(),
                actual: frame,
            }),
        }
    }

    pub(crate) fn next_string(&mut self) -> Result<String, CommandParserError> {
        let bytes = self.next_bytes()?;
        str::from_utf8(&bytes)
            .map(|s| s.to_string())
            .map_err(CommandParserError::InvalidUTF8String)
    }

    pub(crate) fn next_integer(&mut self) -> Result<i64, CommandParserError> {
        let bytes = self.next_bytes()?;
        str::from_utf8(&bytes)
            .ok()
            .and_then(|s| s.parse::<i64>().ok())
            .ok_or(CommandParserError::NotValidInt)
    }

    pub(crate) fn next_float(&mut self) -> Result<f64, CommandParserError> {
        let bytes = self.next_bytes()?;
        str::from_utf8(&bytes)
            .ok()
            .and_then(|s| s.parse::<f64>().ok())
            .ok_or(CommandParserError::NotValidFloat)
    }

    /// Every remaining argument, in order.
    pub(crate) fn rest(&mut self) -> Result<Vec<Bytes>, CommandParserError> {
        let mut args = Vec::with_capacity(self.remaining());
        while self.remaining() > 0 {
            args.push(self.next_bytes()?);
        }
        Ok(args)
    }
}

#[derive(Debug, ThisError, PartialEq)]
pub enum CommandParserError {
    #[error("ERR no command")]
    NoCommand,
    #[error("ERR unknown command '{0}'")]
    UnknownCommand(String),
    #[error("ERR wrong number of arguments for '{0}' command")]
    WrongNumberOfArguments(String),
    #[error("ERR syntax error")]
    Syntax,
    #[error("ERR value is not an integer or out of range")]
    NotValidInt,
    #[error("ERR value is not a valid float")]
    NotValidFloat,
    #[error("protocol error; invalid frame, expected {expected}, got {actual}")]
    InvalidFrame { expected: String, actual: Frame },
    #[error("protocol error; invalid UTF-8 string")]
    InvalidUTF8String(#[from] str::Utf8Error),
    #[error("protocol error; attempting to extract a value failed due to the frame being fully consumed")]
    EndOfStream,
}

impl CommandParserError {
    pub fn into_frame(self) -> Frame {
        Frame::Error(self.to_string())
    }
}

/// Validates that `index` selects one of the 16 databases.
pub(crate) fn valid_db_index(index: i64) -> Option<usize> {
    if (0..DATABASE_COUNT as i64).contains(&index) {
        Some(index as usize)
    } else {
        None
    }
}

#[cfg(test)]
pub(crate) fn test_session() -> Session {
    Session::new(Arc::new(Databases::temporary()), String::new())
}
