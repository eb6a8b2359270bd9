use std::io::Cursor;

use bytes::{Buf, BytesMut};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

use crate::frame::{self, Frame};
use crate::{Error, Result};

pub struct Connection {
    stream: TcpStream,
    // Data is read from the socket into the read buffer. When a frame is
    // parsed, the corresponding data is removed from the buffer.
    buffer: BytesMut,
}

impl Connection {
    pub fn new(stream: TcpStream) -> Connection {
        Connection {
            stream,
            // Allocate the buffer with 4kb of capacity.
            buffer: BytesMut::with_capacity(4096),
        }
    }

    /// The next full frame from the socket. `None` means the client closed
    /// the connection cleanly; a framing error surfaces as `Err` and the
    /// caller drops the connection.
    pub async fn read_frame(&mut self) -> Result<Option<Frame>> {
        loop {
            if let Some(frame) = self.parse_frame()? {
                return Ok(Some(frame));
            }

            if 0 == self.stream.read_buf(&mut self.buffer).await? {
                if self.buffer.is_empty() {
                    return Ok(None);
                }
                return Err("connection reset by peer".into());
            }
        }
    }

    fn parse_frame(&mut self) -> Result<Option<Frame>> {
        let mut cursor = Cursor::new(&self.buffer[..]);

        match Frame::parse(&mut cursor) {
            Ok(frame) => {
                let parsed = cursor.position() as usize;
                // Remove the parsed frame from the buffer.
                self.buffer.advance(parsed);
                Ok(Some(frame))
            }
            // Not enough data to parse a frame yet.
            Err(frame::Error::Incomplete) => Ok(None),
            Err(err) => Err(Box::new(err) as Error),
        }
    }

    pub async fn write_frame(&mut self, frame: &Frame) -> Result<()> {
        self.stream.write_all(&frame.serialize()).await?;
        self.stream.flush().await?;
        Ok(())
    }
}
