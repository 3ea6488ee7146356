/// Data layer: `.spe` decoding, encoding and the spectrum model.
///
/// Architecture:
/// ```text
///   .spe bytes
///        │
///        ▼
///   ┌───────────┐
///   │ tokenizer  │  byte → char via codepage, one header line per call
///   └───────────┘
///        │ lines
///        ▼
///   ┌───────────┐
///   │  header    │  typed fields + ordered HeaderFields
///   └───────────┘
///        │ SPECTR=
///        ▼
///   ┌───────────┐
///   │  payload   │  4-byte counts until end of stream
///   └───────────┘
///        │
///        ▼
///     Spectrum     (loader drives the states, writer goes the other way)
/// ```

pub mod codepage;
pub mod header;
pub mod loader;
pub mod model;
pub mod payload;
pub mod tokenizer;
pub mod writer;
