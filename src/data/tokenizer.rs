use std::io::{ErrorKind, Read};

use log::warn;

use super::codepage::CodePage;
use super::model::SENTINEL_KEY;
use crate::error::{Result, SpeError};

// ---------------------------------------------------------------------------
// HeaderLine – one tokenized header line
// ---------------------------------------------------------------------------

/// `KEY` or `KEY=VALUE` as read from the header.
///
/// `value` is `None` for flag-only lines and for the sentinel; `Some("")` for
/// `KEY=` followed directly by CR LF.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderLine {
    pub key: String,
    pub value: Option<String>,
}

impl HeaderLine {
    pub fn is_sentinel(&self) -> bool {
        self.key == SENTINEL_KEY
    }
}

// ---------------------------------------------------------------------------
// LineTokenizer
// ---------------------------------------------------------------------------

/// Reads header lines byte by byte so the stream is never advanced past the
/// sentinel's `=`.
///
/// Wrap unbuffered sources in a `BufReader` first; every byte is a separate
/// `read` call.
pub struct LineTokenizer<'c, R> {
    reader: R,
    code_page: &'c CodePage,
    lines_read: usize,
    position: u64,
}

impl<'c, R: Read> LineTokenizer<'c, R> {
    pub fn new(reader: R, code_page: &'c CodePage) -> Self {
        Self {
            reader,
            code_page,
            lines_read: 0,
            position: 0,
        }
    }

    /// Number of complete lines returned so far.
    pub fn lines_read(&self) -> usize {
        self.lines_read
    }

    /// Bytes consumed from the underlying reader.
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Give the reader back, positioned right after the last consumed byte.
    pub fn into_inner(self) -> R {
        self.reader
    }

    /// Read the next header line.
    ///
    /// A line ends at `\r`; the byte after it is skipped unread (normally
    /// `\n`).  The sentinel `SPECTR=` ends the line at its `=`.
    pub fn next_line(&mut self) -> Result<HeaderLine> {
        let mut key = String::new();
        let mut value: Option<String> = None;

        loop {
            let Some(byte) = self.read_byte()? else {
                return Err(self.end_of_stream(key, value));
            };

            match self.code_page.decode_byte(byte) {
                '\r' => {
                    // Line feed; not decoded and not checked.
                    self.read_byte()?;
                    self.lines_read += 1;
                    return Ok(HeaderLine { key, value });
                }
                '=' if value.is_none() && key == SENTINEL_KEY => {
                    self.lines_read += 1;
                    return Ok(HeaderLine { key, value: None });
                }
                '=' if value.is_none() => value = Some(String::new()),
                ch => {
                    if ch == char::REPLACEMENT_CHARACTER {
                        warn!(
                            "header line {}: byte 0x{byte:02X} at offset {} is undefined in {}",
                            self.lines_read + 1,
                            self.position - 1,
                            self.code_page.name()
                        );
                    }
                    match value.as_mut() {
                        Some(v) => v.push(ch),
                        None => key.push(ch),
                    }
                }
            }
        }
    }

    fn end_of_stream(&self, key: String, value: Option<String>) -> SpeError {
        if key.is_empty() && value.is_none() {
            return SpeError::MissingSentinel {
                lines: self.lines_read,
            };
        }
        let partial = match value {
            Some(v) => format!("{key}={v}"),
            None => key,
        };
        SpeError::MalformedHeaderLine {
            line: self.lines_read + 1,
            partial,
        }
    }

    fn read_byte(&mut self) -> Result<Option<u8>> {
        let mut buf = [0u8; 1];
        loop {
            match self.reader.read(&mut buf) {
                Ok(0) => return Ok(None),
                Ok(_) => {
                    self.position += 1;
                    return Ok(Some(buf[0]));
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
    }
}
