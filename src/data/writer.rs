use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use super::loader::SpeOptions;
use super::model::{HeaderFields, SENTINEL_KEY, Spectrum};
use crate::error::{Result, SpeError};

/// Encode `spectrum` as a `.spe` stream.
///
/// Header lines come from `header_fields` in order; the typed fields are not
/// written separately.  A spectrum without `info` gets an empty header.
///
/// Every entry is checked before anything is written; entries the decoder
/// would split, merge or mistake for the sentinel are rejected with
/// [`SpeError::UnwritableHeader`].
pub fn write_spe<W: Write>(spectrum: &Spectrum, mut writer: W, options: &SpeOptions) -> Result<()> {
    if let Some(info) = &spectrum.info {
        check_header(&info.header_fields)?;
        for (key, value) in info.header_fields.iter() {
            writer.write_all(&options.code_page.encode(key)?)?;
            writer.write_all(b"=")?;
            writer.write_all(&options.code_page.encode(value)?)?;
            writer.write_all(b"\r\n")?;
        }
    }

    writer.write_all(SENTINEL_KEY.as_bytes())?;
    writer.write_all(b"=")?;
    for &count in &spectrum.data {
        writer.write_all(&options.byte_order.encode(count))?;
    }
    writer.flush()?;
    Ok(())
}

fn check_header(fields: &HeaderFields) -> Result<()> {
    for (key, value) in fields.iter() {
        let reason = if key == SENTINEL_KEY {
            Some("key is the SPECTR sentinel")
        } else if key.contains(['=', '\r']) {
            Some("key contains '=' or CR")
        } else if value.contains('\r') {
            Some("value contains CR")
        } else if value.is_empty() {
            Some("value is empty")
        } else {
            None
        };
        if let Some(reason) = reason {
            return Err(SpeError::UnwritableHeader {
                key: key.to_string(),
                reason,
            });
        }
    }
    Ok(())
}

/// Write a `.spe` file, replacing any existing file at `path`.
pub fn save_file(spectrum: &Spectrum, path: &Path, options: &SpeOptions) -> Result<()> {
    let file = File::create(path)?;
    write_spe(spectrum, BufWriter::new(file), options)
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;
    use crate::data::loader::parse_spe;
    use crate::data::model::SpectrumInformation;
    use crate::error::SpeError;

    #[test]
    fn writes_header_then_sentinel_then_counts() {
        let mut info = SpectrumInformation::default();
        info.apply_line("SHIFR", Some("A"));
        info.apply_line("FLAG", None);
        let spectrum = Spectrum::new(vec![1, -1], info);

        let mut out = Vec::new();
        write_spe(&spectrum, &mut out, &SpeOptions::default()).unwrap();

        let mut expected = b"SHIFR=A\r\nSPECTR=".to_vec();
        expected.extend_from_slice(&[1, 0, 0, 0, 0xFF, 0xFF, 0xFF, 0xFF]);
        assert_eq!(out, expected);
    }

    #[test]
    fn cyrillic_header_survives_reparse() {
        let mut info = SpectrumInformation::default();
        info.apply_line("SHIFR", Some("Проба-7"));
        info.apply_line("GEOMETRY", Some("Маринелли 1 л"));
        let spectrum = Spectrum::new(vec![10, 20, 30], info);

        let mut out = Vec::new();
        write_spe(&spectrum, &mut out, &SpeOptions::default()).unwrap();
        let parsed = parse_spe(Cursor::new(out), &SpeOptions::default()).unwrap();
        assert_eq!(parsed, spectrum);
    }

    fn unwritable_reason(key: &str, value: &str) -> Option<&'static str> {
        let mut info = SpectrumInformation::default();
        info.header_fields.insert("SHIFR", "A");
        info.header_fields.insert(key, value);
        let spectrum = Spectrum::new(vec![1, 2], info);

        let mut out = Vec::new();
        match write_spe(&spectrum, &mut out, &SpeOptions::default()) {
            Err(SpeError::UnwritableHeader { reason, .. }) => {
                assert!(out.is_empty(), "nothing is written for a rejected header");
                Some(reason)
            }
            Err(other) => panic!("unexpected error: {other:?}"),
            Ok(()) => None,
        }
    }

    #[test]
    fn carriage_return_in_value_is_rejected() {
        assert_eq!(
            unwritable_reason("GEOMETRY", "A\r\nTLIVE=9"),
            Some("value contains CR")
        );
    }

    #[test]
    fn sentinel_key_is_rejected() {
        assert_eq!(
            unwritable_reason(SENTINEL_KEY, "x"),
            Some("key is the SPECTR sentinel")
        );
    }

    #[test]
    fn equals_or_cr_in_key_is_rejected() {
        assert_eq!(unwritable_reason("A=B", "x"), Some("key contains '=' or CR"));
        assert_eq!(unwritable_reason("A\rB", "x"), Some("key contains '=' or CR"));
    }

    #[test]
    fn empty_value_is_rejected() {
        assert_eq!(unwritable_reason("EMPTY", ""), Some("value is empty"));
    }

    #[test]
    fn equals_in_value_and_empty_key_are_fine() {
        assert_eq!(unwritable_reason("EXPR", "a=b"), None);
        assert_eq!(unwritable_reason("", "orphan"), None);
    }

    #[test]
    fn text_outside_code_page_is_rejected() {
        let mut info = SpectrumInformation::default();
        info.apply_line("SHIFR", Some("試料"));
        let spectrum = Spectrum::new(vec![], info);
        let result = write_spe(&spectrum, Vec::new(), &SpeOptions::default());
        assert!(matches!(result, Err(SpeError::Unencodable { .. })));
    }
}
