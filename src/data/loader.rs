use std::fs::File;
use std::io::{BufReader, ErrorKind, Read};
use std::path::Path;

use log::debug;

use super::codepage::CodePage;
use super::model::{Spectrum, SpectrumInformation};
use super::payload::{ByteOrder, decode_payload};
use super::tokenizer::LineTokenizer;
use crate::error::{Result, SpeError};

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// How header text and channel counts are encoded.
#[derive(Debug, Clone, Default)]
pub struct SpeOptions {
    pub byte_order: ByteOrder,
    pub code_page: CodePage,
}

impl SpeOptions {
    pub fn with_byte_order(mut self, byte_order: ByteOrder) -> Self {
        self.byte_order = byte_order;
        self
    }

    pub fn with_code_page(mut self, code_page: CodePage) -> Self {
        self.code_page = code_page;
        self
    }
}

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load a `.spe` file with default options (little-endian, Windows-1251).
pub fn load_file(path: &Path) -> Result<Spectrum> {
    load_file_with_options(path, &SpeOptions::default())
}

/// Load a `.spe` file.  The file is closed before this returns, on success
/// and on error alike.
pub fn load_file_with_options(path: &Path, options: &SpeOptions) -> Result<Spectrum> {
    let file = File::open(path).map_err(|e| {
        if e.kind() == ErrorKind::NotFound {
            SpeError::FileNotFound {
                path: path.to_path_buf(),
            }
        } else {
            SpeError::Io(e)
        }
    })?;
    debug!("parsing {}", path.display());
    parse_spe(BufReader::new(file), options)
}

// ---------------------------------------------------------------------------
// Decoder state machine
// ---------------------------------------------------------------------------

/// Decoder state.  The only transition is header → payload, taken when the
/// tokenizer reports the `SPECTR` sentinel.
enum DecodeState<'c, R> {
    ReadingHeader {
        tokenizer: LineTokenizer<'c, R>,
        info: SpectrumInformation,
    },
    ReadingPayload {
        reader: R,
        info: SpectrumInformation,
    },
}

/// Decode a complete `.spe` stream.
///
/// `reader` is read one byte at a time through the header, so pass a
/// buffered reader for files and sockets.
pub fn parse_spe<R: Read>(reader: R, options: &SpeOptions) -> Result<Spectrum> {
    let mut state = DecodeState::ReadingHeader {
        tokenizer: LineTokenizer::new(reader, &options.code_page),
        info: SpectrumInformation::default(),
    };

    loop {
        state = match state {
            DecodeState::ReadingHeader {
                mut tokenizer,
                mut info,
            } => {
                let line = tokenizer.next_line()?;
                if line.is_sentinel() {
                    debug!(
                        "header: {} line(s), {} field(s), payload at byte {}",
                        tokenizer.lines_read(),
                        info.header_fields.len(),
                        tokenizer.position()
                    );
                    DecodeState::ReadingPayload {
                        reader: tokenizer.into_inner(),
                        info,
                    }
                } else {
                    info.apply_line(&line.key, line.value.as_deref());
                    DecodeState::ReadingHeader { tokenizer, info }
                }
            }
            DecodeState::ReadingPayload { reader, info } => {
                let data = decode_payload(reader, options.byte_order)?;
                debug!("payload: {} channel(s)", data.len());
                return Ok(Spectrum::new(data, info));
            }
        };
    }
}
