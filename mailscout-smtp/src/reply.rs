//! SMTP reply parsing.
//!
//! Replies are one or more lines of the form `250-text` (continuation) or
//! `250 text` (final line). All lines of a multi-line reply carry the same
//! status code.

use crate::error::{ClientError, Result};

/// A complete SMTP reply, possibly multi-line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    /// The three-digit status code.
    pub code: u16,
    /// Text of each line, code and separator stripped.
    pub lines: Vec<String>,
}

/// One parsed reply line.
struct ReplyLine {
    code: u16,
    is_last: bool,
    text: String,
}

impl Reply {
    #[must_use]
    pub const fn new(code: u16, lines: Vec<String>) -> Self {
        Self { code, lines }
    }

    /// All line texts joined with newlines.
    #[must_use]
    pub fn message(&self) -> String {
        self.lines.join("\n")
    }

    /// The reply reconstructed as the server's first line, e.g. `550 User
    /// unknown`. Used verbatim as rejection detail.
    #[must_use]
    pub fn first_line(&self) -> String {
        match self.lines.first() {
            Some(text) if !text.is_empty() => format!("{} {text}", self.code),
            _ => self.code.to_string(),
        }
    }

    /// `true` for 2xx codes.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.code >= 200 && self.code < 300
    }

    /// `true` for 4xx codes.
    #[must_use]
    pub const fn is_temporary_error(&self) -> bool {
        self.code >= 400 && self.code < 500
    }

    /// `true` for 5xx codes.
    #[must_use]
    pub const fn is_permanent_error(&self) -> bool {
        self.code >= 500 && self.code < 600
    }

    /// Parses one line of a reply.
    fn parse_line(line: &str) -> Result<ReplyLine> {
        if line.len() < 3 {
            return Err(ClientError::Parse(format!("reply line too short: '{line}'")));
        }

        if !line.as_bytes()[..3].iter().all(u8::is_ascii_digit) {
            return Err(ClientError::Parse(format!(
                "invalid status code in reply line: '{line}'"
            )));
        }

        let code = line[..3]
            .parse::<u16>()
            .map_err(|_| ClientError::Parse(format!("invalid status code: '{}'", &line[..3])))?;

        // A space after the code marks the final line, a dash marks a
        // continuation; a bare three-character line is final.
        let is_last = match line.as_bytes().get(3) {
            Some(b' ') | None => true,
            Some(b'-') => false,
            Some(_) => {
                return Err(ClientError::Parse(format!(
                    "invalid separator in reply line: '{line}'"
                )));
            }
        };

        let text = if line.len() > 4 {
            line[4..].to_string()
        } else {
            String::new()
        };

        Ok(ReplyLine {
            code,
            is_last,
            text,
        })
    }

    /// Attempts to parse a complete reply from the front of `buffer`.
    ///
    /// Returns the reply and the number of bytes consumed, or `None` when
    /// more data is needed.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Parse` on a malformed reply and
    /// `ClientError::Utf8` on non-UTF-8 bytes.
    pub fn parse(buffer: &[u8]) -> Result<Option<(Self, usize)>> {
        let text = std::str::from_utf8(buffer)?;

        let mut lines = Vec::new();
        let mut code = None;
        let mut consumed = 0;

        loop {
            let rest = &text[consumed..];
            let Some(end) = rest.find('\n') else {
                // Incomplete line.
                return Ok(None);
            };

            let line = rest[..end].trim_end_matches('\r');
            consumed += end + 1;

            if line.is_empty() {
                continue;
            }

            let parsed = Self::parse_line(line)?;

            match code {
                Some(code) if code != parsed.code => {
                    return Err(ClientError::Parse(format!(
                        "status code mismatch in multi-line reply: expected {code}, got {}",
                        parsed.code
                    )));
                }
                Some(_) => {}
                None => code = Some(parsed.code),
            }

            lines.push(parsed.text);

            if parsed.is_last {
                let code = code.unwrap_or(parsed.code);
                return Ok(Some((Self::new(code, lines), consumed)));
            }
        }
    }
}
