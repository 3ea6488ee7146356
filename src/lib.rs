//! Reader for LSRM `.spe` gamma spectrum files.
//!
//! A `.spe` file is a block of `KEY=VALUE` header lines (CR LF terminated,
//! single-byte legacy code page) ended by `SPECTR=`, followed directly by raw
//! 4-byte signed channel counts up to end of file.
//!
//! ```no_run
//! use std::path::Path;
//! use lsrm_spe::{load_file, export::write_report};
//!
//! let spectrum = load_file(Path::new("sample.spe")).unwrap();
//! write_report(&spectrum, std::io::stdout()).unwrap();
//! ```

pub mod data;
mod error;
pub mod export;

pub use data::codepage::CodePage;
pub use data::loader::{SpeOptions, load_file, load_file_with_options, parse_spe};
pub use data::model::{HeaderFields, Spectrum, SpectrumInformation};
pub use data::payload::ByteOrder;
pub use data::writer::{save_file, write_spe};
pub use error::{Result, SpeError};
