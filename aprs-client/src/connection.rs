use std::io;
use std::time::Duration;

use aprs_is_protocol::DELIMITER;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader, BufWriter};
use tokio::net::TcpStream;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tracing::{debug, trace, warn};

use crate::error::{ClientError, Result};

/// Longest accepted line, delimiter included. APRS-IS lines stay under 512
/// bytes.
pub const MAX_LINE_LEN: usize = 4096;

/// Both halves of one TCP stream, framed on CR LF.
pub struct Connection {
    reader: BufReader<OwnedReadHalf>,
    writer: BufWriter<OwnedWriteHalf>,
    read_timeout: Duration,
}

impl Connection {
    pub async fn connect(
        host: &str,
        port: u16,
        connect_timeout: Duration,
        read_timeout: Duration,
    ) -> Result<Self> {
        debug!(host, port, "TCP connecting");
        let stream = tokio::time::timeout(connect_timeout, TcpStream::connect((host, port)))
            .await
            .map_err(|_| ClientError::Timeout(connect_timeout))?
            .map_err(ClientError::Connection)?;

        stream.set_nodelay(true).ok();

        let (read_half, write_half) = stream.into_split();
        Ok(Self {
            reader: BufReader::new(read_half),
            writer: BufWriter::new(write_half),
            read_timeout,
        })
    }

    /// Write `data` (delimiter included) and flush.
    pub async fn send_raw(&mut self, data: &[u8]) -> Result<()> {
        trace!(data = %String::from_utf8_lossy(data).trim_end(), "sending");
        self.writer.write_all(data).await?;
        self.writer.flush().await?;
        Ok(())
    }

    /// Read one CR LF terminated line, without the delimiter and with
    /// surrounding whitespace removed.
    ///
    /// Returns `Ok(None)` on end-of-stream with nothing pending. A stream that
    /// ends in the middle of a line is an `UnexpectedEof` connection error.
    /// A bare LF does not end a line. The read timeout covers the whole line,
    /// and a line longer than [`MAX_LINE_LEN`] is an `InvalidData` error.
    pub async fn read_line(&mut self) -> Result<Option<Vec<u8>>> {
        let read_timeout = self.read_timeout;
        tokio::time::timeout(read_timeout, self.read_delimited())
            .await
            .map_err(|_| {
                warn!(timeout = ?read_timeout, "read timeout");
                ClientError::Timeout(read_timeout)
            })?
    }

    async fn read_delimited(&mut self) -> Result<Option<Vec<u8>>> {
        let mut buf = Vec::new();
        loop {
            // At least one byte past the cap so an overlong line is detectable.
            let budget = (MAX_LINE_LEN + 1).saturating_sub(buf.len()) as u64;
            let n = (&mut self.reader)
                .take(budget)
                .read_until(b'\n', &mut buf)
                .await?;
            if buf.len() > MAX_LINE_LEN {
                return Err(ClientError::Connection(io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!("line exceeds {MAX_LINE_LEN} bytes"),
                )));
            }
            if n == 0 {
                if buf.is_empty() {
                    return Ok(None);
                }
                return Err(ClientError::Connection(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    format!("stream ended mid-line after {} bytes", buf.len()),
                )));
            }
            if buf.ends_with(DELIMITER) {
                break;
            }
        }
        buf.truncate(buf.len() - DELIMITER.len());
        Ok(Some(buf.trim_ascii().to_vec()))
    }

    /// Close the write side of the stream.
    pub async fn shutdown(&mut self) -> Result<()> {
        self.writer.shutdown().await?;
        Ok(())
    }
}
