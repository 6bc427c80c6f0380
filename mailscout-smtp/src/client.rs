//! Plain-TCP SMTP client.

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::trace;

use crate::error::{ClientError, Result};
use crate::reply::Reply;

/// Initial size of the reply read buffer.
const BUFFER_SIZE: usize = 8192;

/// Maximum reply buffer size before the reply is considered malformed (1MB).
const MAX_BUFFER_SIZE: usize = 1024 * 1024;

/// An SMTP client connection.
pub struct SmtpClient {
    stream: TcpStream,
    buffer: Vec<u8>,
    buffer_pos: usize,
}

impl SmtpClient {
    /// Connects to `addr` (`host:port`).
    ///
    /// # Errors
    ///
    /// Returns an error if the TCP connection cannot be established.
    pub async fn connect(addr: &str) -> Result<Self> {
        let stream = TcpStream::connect(addr).await.map_err(ClientError::Io)?;

        Ok(Self {
            stream,
            buffer: vec![0u8; BUFFER_SIZE],
            buffer_pos: 0,
        })
    }

    /// Reads the initial server greeting (usually 220).
    ///
    /// # Errors
    ///
    /// Returns an error if reading fails or the greeting is malformed.
    pub async fn read_greeting(&mut self) -> Result<Reply> {
        self.read_reply().await
    }

    /// Sends a raw command line and reads the reply.
    ///
    /// # Errors
    ///
    /// Returns an error if sending or reading fails.
    pub async fn command(&mut self, command: &str) -> Result<Reply> {
        trace!(command, "sending SMTP command");
        self.stream
            .write_all(format!("{command}\r\n").as_bytes())
            .await?;
        self.read_reply().await
    }

    /// Sends `HELO <domain>`.
    ///
    /// # Errors
    ///
    /// Returns an error if the command fails.
    pub async fn helo(&mut self, domain: &str) -> Result<Reply> {
        self.command(&format!("HELO {domain}")).await
    }

    /// Sends `EHLO <domain>`.
    ///
    /// # Errors
    ///
    /// Returns an error if the command fails.
    pub async fn ehlo(&mut self, domain: &str) -> Result<Reply> {
        self.command(&format!("EHLO {domain}")).await
    }

    /// Sends `MAIL FROM:<from>`.
    ///
    /// # Errors
    ///
    /// Returns an error if the command fails.
    pub async fn mail_from(&mut self, from: &str) -> Result<Reply> {
        self.command(&format!("MAIL FROM:<{from}>")).await
    }

    /// Sends `RCPT TO:<to>`.
    ///
    /// # Errors
    ///
    /// Returns an error if the command fails.
    pub async fn rcpt_to(&mut self, to: &str) -> Result<Reply> {
        self.command(&format!("RCPT TO:<{to}>")).await
    }

    /// Sends `DATA`.
    ///
    /// # Errors
    ///
    /// Returns an error if the command fails.
    pub async fn data(&mut self) -> Result<Reply> {
        self.command("DATA").await
    }

    /// Sends message content followed by the end-of-data marker.
    ///
    /// Lines are normalized to CRLF and dot-stuffed per RFC 5321 §4.5.2.
    ///
    /// # Errors
    ///
    /// Returns an error if sending or reading the final reply fails.
    pub async fn send_data(&mut self, content: &str) -> Result<Reply> {
        for line in content.split_inclusive('\n') {
            if line.starts_with('.') {
                self.stream.write_all(b".").await?;
            }

            let line = line
                .strip_suffix("\r\n")
                .or_else(|| line.strip_suffix('\n'))
                .unwrap_or(line);
            self.stream.write_all(line.as_bytes()).await?;
            self.stream.write_all(b"\r\n").await?;
        }

        self.stream.write_all(b".\r\n").await?;
        self.read_reply().await
    }

    /// Sends `QUIT`.
    ///
    /// # Errors
    ///
    /// Returns an error if the command fails.
    pub async fn quit(&mut self) -> Result<Reply> {
        self.command("QUIT").await
    }

    /// Reads one complete SMTP reply, growing the buffer as needed.
    async fn read_reply(&mut self) -> Result<Reply> {
        loop {
            if let Some((reply, consumed)) = Reply::parse(&self.buffer[..self.buffer_pos])? {
                self.buffer.copy_within(consumed..self.buffer_pos, 0);
                self.buffer_pos -= consumed;
                trace!(code = reply.code, "received SMTP reply");
                return Ok(reply);
            }

            if self.buffer_pos >= self.buffer.len() {
                let new_size = self.buffer.len() * 2;
                if new_size > MAX_BUFFER_SIZE {
                    return Err(ClientError::Parse(format!(
                        "reply too large (exceeds {MAX_BUFFER_SIZE} bytes)"
                    )));
                }
                self.buffer.resize(new_size, 0);
            }

            let n = self.stream.read(&mut self.buffer[self.buffer_pos..]).await?;
            if n == 0 {
                return Err(ClientError::ConnectionClosed);
            }
            self.buffer_pos += n;
        }
    }
}
