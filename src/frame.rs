// https://redis.io/docs/reference/protocol-spec

use std::fmt;

use bytes::Buf;
use bytes::Bytes;
use std::io::Cursor;
use std::string::FromUtf8Error;
use thiserror::Error as ThisError;

static CRLF: &[u8; 2] = b"\r\n";

#[derive(Debug, ThisError)]
pub enum Error {
    #[error("not enough data is available to parse an entire frame")]
    Incomplete,
    /// Invalid message encoding.
    #[error("{0}")]
    Other(crate::Error),
}

#[derive(Clone, Debug, PartialEq)]
pub enum Frame {
    Simple(String),
    Error(String),
    Integer(i64),
    Bulk(Bytes),
    Null,
    Array(Vec<Frame>),
}

impl Frame {
    /// Parses one frame out of `src`, advancing the cursor past it. A first
    /// byte that is not one of the five RESP type markers is treated as the
    /// start of an inline command: the rest of the line, split on spaces.
    pub fn parse(src: &mut Cursor<&[u8]>) -> Result<Self, Error> {
        // The first byte in a RESP-serialized payload identifies its type.
        let first_byte = get_byte(src)?;

        match first_byte {
            b'+' => {
                let bytes = get_line(src)?.to_vec();
                let string = String::from_utf8(bytes)?;
                Ok(Frame::Simple(string))
            }
            b'-' => {
                let bytes = get_line(src)?.to_vec();
                let string = String::from_utf8(bytes)?;
                Ok(Frame::Error(string))
            }
            b':' => {
                let integer = get_integer_line(src)?;
                Ok(Frame::Integer(integer))
            }
            // $<length>\r\n<data>\r\n
            b'$' => {
                let length = get_integer_line(src)?;

                if length == -1 {
                    return Ok(Frame::Null);
                }
                let length = usize::try_from(length)
                    .map_err(|_| Error::from("protocol error; invalid bulk length"))?;

                // Binary safe: exactly `length` bytes, then the CRLF.
                if src.remaining() < length + 2 {
                    return Err(Error::Incomplete);
                }
                let start = src.position() as usize;
                let data = Bytes::copy_from_slice(&src.get_ref()[start..start + length]);
                src.advance(length + 2);

                Ok(Frame::Bulk(data))
            }
            // *<number-of-elements>\r\n<element-1>...<element-n>
            b'*' => {
                let length = get_integer_line(src)?;

                if length == -1 {
                    return Ok(Frame::Null);
                }
                let length = usize::try_from(length)
                    .map_err(|_| Error::from("protocol error; invalid array length"))?;

                let mut frames = Vec::with_capacity(length);
                for _ in 0..length {
                    frames.push(Self::parse(src)?);
                }

                Ok(Frame::Array(frames))
            }
            // Inline command: the whole line, split on spaces into bulk
            // strings. The byte just consumed is part of the first word.
            _ => {
                src.set_position(src.position() - 1);
                let line = get_line(src)?;

                let words = line
                    .split(|&byte| byte == b' ')
                    .filter(|word| !word.is_empty())
                    .map(|word| Frame::Bulk(Bytes::copy_from_slice(word)))
                    .collect();

                Ok(Frame::Array(words))
            }
        }
    }

    pub fn serialize(&self) -> Vec<u8> {
        match self {
            Frame::Simple(s) => {
                let mut bytes = Vec::with_capacity(1 + s.len() + CRLF.len());
                bytes.push(b'+');
                bytes.extend_from_slice(s.as_bytes());
                bytes.extend_from_slice(CRLF);
                bytes
            }
            Frame::Error(s) => {
                let mut bytes = Vec::with_capacity(1 + s.len() + CRLF.len());
                bytes.push(b'-');
                bytes.extend_from_slice(s.as_bytes());
                bytes.extend_from_slice(CRLF);
                bytes
            }
            Frame::Integer(i) => {
                let repr = i.to_string();
                let mut bytes = Vec::with_capacity(1 + repr.len() + CRLF.len());
                bytes.push(b':');
                bytes.extend_from_slice(repr.as_bytes());
                bytes.extend_from_slice(CRLF);
                bytes
            }
            Frame::Bulk(data) => {
                let length = data.len().to_string();
                let mut bytes =
                    Vec::with_capacity(1 + length.len() + CRLF.len() + data.len() + CRLF.len());
                bytes.push(b'$');
                bytes.extend_from_slice(length.as_bytes());
                bytes.extend_from_slice(CRLF);
                bytes.extend_from_slice(data);
                bytes.extend_from_slice(CRLF);
                bytes
            }
            // RESP2 nil bulk string.
            Frame::Null => b"$-1\r\n".to_vec(),
            Frame::Array(items) => {
                let length = items.len().to_string();
                let mut bytes = Vec::with_capacity(1 + length.len() + CRLF.len());
                bytes.push(b'*');
                bytes.extend_from_slice(length.as_bytes());
                bytes.extend_from_slice(CRLF);
                for item in items {
                    bytes.extend(item.serialize());
                }
                bytes
            }
        }
    }
}

impl From<Frame> for Vec<u8> {
    fn from(frame: Frame) -> Self {
        frame.serialize()
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Frame::Simple(s) => write!(f, "+{}", s),
            Frame::Error(s) => write!(f, "-{}", s),
            Frame::Integer(i) => write!(f, ":{}", i),
            Frame::Bulk(bytes) => write!(f, "${}", String::from_utf8_lossy(bytes)),
            Frame::Null => write!(f, "$-1"),
            Frame::Array(arr) => {
                write!(f, "*{}\r\n", arr.len())?;
                for frame in arr {
                    write!(f, "{}\r\n", frame)?;
                }
                Ok(())
            }
        }
    }
}

fn get_line<'a>(src: &mut Cursor<&'a [u8]>) -> Result<&'a [u8], Error> {
    let start = src.position() as usize;
    let end = src.get_ref().len();

    let line_end = src.get_ref()[start..end]
        .windows(2)
        .position(|window| window == CRLF)
        .ok_or(Error::Incomplete)
        .map(|index| start + index)?;

    src.set_position((line_end + CRLF.len()) as u64);

    Ok(&src.get_ref()[start..line_end])
}

/// A decimal integer line, with an optional leading `-`.
fn get_integer_line(src: &mut Cursor<&[u8]>) -> Result<i64, Error> {
    let line = get_line(src)?;
    let string = std::str::from_utf8(line)
        .map_err(|_| Error::from("protocol error; invalid integer frame"))?;
    string
        .parse::<i64>()
        .map_err(|_| Error::from("protocol error; invalid integer frame"))
}

fn get_byte(src: &mut Cursor<&[u8]>) -> Result<u8, Error> {
    if !src.has_remaining() {
        return Err(Error::Incomplete);
    }
    Ok(src.get_u8())
}

impl From<FromUtf8Error> for Error {
    fn from(_src: FromUtf8Error) -> Error {
        "protocol error; invalid frame format".into()
    }
}

impl From<&str> for Error {
    fn from(src: &str) -> Error {
        src.to_string().into()
    }
}

impl From<String> for Error {
    fn from(src: String) -> Error {
        Error::Other(src.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_simple_string_frame() {
        let data = b"+OK\r\n";
        let mut cursor = Cursor::new(&data[..]);

        let frame = Frame::parse(&mut cursor);

        assert!(matches!(frame, Ok(Frame::Simple(ref s)) if s == "OK"));
    }

    #[test]
    fn parse_simple_error_frame() {
        let data = b"-Error message\r\n";
        let mut cursor = Cursor::new(&data[..]);

        let frame = Frame::parse(&mut cursor);

        assert!(matches!(
            frame,
            Ok(Frame::Error(ref s)) if s == "Error message"
        ));
    }

    fn parse_integer_frame(data: &[u8], expected: i64) {
        let mut cursor = Cursor::new(&data[..]);

        let frame = Frame::parse(&mut cursor);

        assert!(matches!(frame, Ok(Frame::Integer(i)) if i == expected));
    }

    #[test]
    fn parse_integer_frame_positive() {
        parse_integer_frame(b":1000\r\n", 1000);
    }

    #[test]
    fn parse_integer_frame_negative() {
        parse_integer_frame(b":-1000\r\n", -1000);
    }

    #[test]
    fn parse_integer_frame_zero() {
        parse_integer_frame(b":0\r\n", 0);
    }

    #[test]
    fn parse_bulk_string_frame() {
        let data = b"$6\r\nfoobar\r\n";
        let mut cursor = Cursor::new(&data[..]);

        let frame = Frame::parse(&mut cursor);

        assert!(matches!(
            frame,
            Ok(Frame::Bulk(ref b)) if b == &Bytes::from("foobar")
        ));
    }

    #[test]
    fn parse_bulk_string_frame_empty() {
        let data = b"$0\r\n\r\n";
        let mut cursor = Cursor::new(&data[..]);

        let frame = Frame::parse(&mut cursor);

        assert!(matches!(
            frame,
            Ok(Frame::Bulk(ref b)) if b == &Bytes::from("")
        ));
    }

    #[test]
    fn parse_bulk_string_frame_binary() {
        // The payload embeds CRLF; the parser must count bytes, not scan.
        let data = b"$6\r\nfoo\r\nr\r\n";
        let mut cursor = Cursor::new(&data[..]);

        let frame = Frame::parse(&mut cursor);

        assert!(matches!(
            frame,
            Ok(Frame::Bulk(ref b)) if b == &Bytes::from(&b"foo\r\nr"[..])
        ));
    }

    #[test]
    fn parse_bulk_string_frame_null() {
        let data = b"$-1\r\n";
        let mut cursor = Cursor::new(&data[..]);

        let frame = Frame::parse(&mut cursor);

        assert!(matches!(frame, Ok(Frame::Null)));
    }

    #[test]
    fn parse_bulk_string_frame_incomplete() {
        let data = b"$6\r\nfoo";
        let mut cursor = Cursor::new(&data[..]);

        let frame = Frame::parse(&mut cursor);

        assert!(matches!(frame, Err(Error::Incomplete)));
    }

    #[test]
    fn parse_array_frame_empty() {
        let data = b"*0\r\n";
        let mut cursor = Cursor::new(&data[..]);

        let frame = Frame::parse(&mut cursor);

        assert!(matches!(frame, Ok(Frame::Array(ref a)) if a.is_empty()));
    }

    #[test]
    fn parse_array_frame() {
        let data = b"*2\r\n$5\r\nhello\r\n$5\r\nworld\r\n";
        let mut cursor = Cursor::new(&data[..]);

        let frame = Frame::parse(&mut cursor);

        assert!(matches!(
            frame,
            Ok(Frame::Array(ref a)) if a.len() == 2
        ));

        assert!(matches!(
            frame,
            Ok(Frame::Array(ref a)) if a[0] == Frame::Bulk(Bytes::from("hello"))
        ));

        assert!(matches!(
            frame,
            Ok(Frame::Array(ref a)) if a[1] == Frame::Bulk(Bytes::from("world"))
        ));
    }

    #[test]
    fn parse_array_frame_nested() {
        let data = b"*2\r\n*3\r\n:1\r\n:2\r\n:3\r\n*2\r\n+Hello\r\n-World\r\n";
        let mut cursor = Cursor::new(&data[..]);

        let frame = Frame::parse(&mut cursor);

        assert!(matches!(
            frame,
            Ok(Frame::Array(ref a)) if a.len() == 2
        ));

        assert!(matches!(
            frame,
            Ok(Frame::Array(ref a)) if a[0] == Frame::Array(vec![
                Frame::Integer(1),
                Frame::Integer(2),
                Frame::Integer(3)
            ])
        ));

        assert!(matches!(
            frame,
            Ok(Frame::Array(ref a)) if a[1] == Frame::Array(vec![
                Frame::Simple("Hello".to_string()),
                Frame::Error("World".to_string())
            ])
        ));
    }

    #[test]
    fn parse_array_frame_null() {
        let data = b"*-1\r\n";
        let mut cursor = Cursor::new(&data[..]);

        let frame = Frame::parse(&mut cursor);

        assert!(matches!(frame, Ok(Frame::Null)));
    }

    #[test]
    fn parse_array_frame_null_in_the_middle() {
        let data = b"*3\r\n$5\r\nhello\r\n$-1\r\n$5\r\nworld\r\n";
        let mut cursor = Cursor::new(&data[..]);

        let frame = Frame::parse(&mut cursor);

        assert!(matches!(
            frame,
            Ok(Frame::Array(ref a)) if a.len() == 3
        ));

        assert!(matches!(
            frame,
            Ok(Frame::Array(ref a)) if a[0] == Frame::Bulk(Bytes::from("hello"))
        ));

        assert!(matches!(frame, Ok(Frame::Array(ref a)) if a[1] == Frame::Null));

        assert!(matches!(
            frame,
            Ok(Frame::Array(ref a)) if a[2] == Frame::Bulk(Bytes::from("world"))
        ));
    }

    #[test]
    fn parse_inline_command() {
        let data = b"PING\r\n";
        let mut cursor = Cursor::new(&data[..]);

        let frame = Frame::parse(&mut cursor).unwrap();

        assert_eq!(frame, Frame::Array(vec![Frame::Bulk(Bytes::from("PING"))]));
    }

    #[test]
    fn parse_inline_command_with_arguments() {
        let data = b"SET  mykey   myvalue\r\n";
        let mut cursor = Cursor::new(&data[..]);

        let frame = Frame::parse(&mut cursor).unwrap();

        assert_eq!(
            frame,
            Frame::Array(vec![
                Frame::Bulk(Bytes::from("SET")),
                Frame::Bulk(Bytes::from("mykey")),
                Frame::Bulk(Bytes::from("myvalue")),
            ])
        );
    }

    #[test]
    fn parse_inline_command_incomplete() {
        let data = b"PING";
        let mut cursor = Cursor::new(&data[..]);

        let frame = Frame::parse(&mut cursor);

        assert!(matches!(frame, Err(Error::Incomplete)));
    }

    #[test]
    fn serialize_null_as_nil_bulk_string() {
        assert_eq!(Frame::Null.serialize(), b"$-1\r\n");
    }

    #[test]
    fn serialize_round_trip() {
        let frames = vec![
            Frame::Simple("OK".to_string()),
            Frame::Error("ERR oops".to_string()),
            Frame::Integer(-42),
            Frame::Bulk(Bytes::from("hello")),
            Frame::Array(vec![
                Frame::Bulk(Bytes::from("GET")),
                Frame::Bulk(Bytes::from("key")),
            ]),
        ];

        for frame in frames {
            let bytes = frame.serialize();
            let mut cursor = Cursor::new(&bytes[..]);
            assert_eq!(Frame::parse(&mut cursor).unwrap(), frame);
        }
    }
}
