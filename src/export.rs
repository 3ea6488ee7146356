//! Writers that turn a decoded [`Spectrum`] into text files.
//!
//! The plain-text report is the format the legacy converter produced:
//!
//! ```text
//! SHIFR=<name>
//! TLIVE=<live time>
//! TREAL=<real time>
//! DATE=<date>          only when MEASBEGIN is present
//! TIME=<time>          only when MEASBEGIN has a time part
//! SPECTRTXT=<channels>
//! 1<TAB><count>
//! 2<TAB><count>
//! ...
//! ```

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;

use crate::data::model::{Spectrum, SpectrumInformation};

// ---------------------------------------------------------------------------
// Formats
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExportFormat {
    #[default]
    Txt,
    Json,
    Csv,
}

impl ExportFormat {
    /// Pick a format from the file extension, if it is one we write.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();

        match ext.as_str() {
            "txt" => Some(Self::Txt),
            "json" => Some(Self::Json),
            "csv" => Some(Self::Csv),
            _ => None,
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Txt => "txt",
            Self::Json => "json",
            Self::Csv => "csv",
        }
    }
}

/// `input` with its extension replaced by the format's (`a/b.spe` → `a/b.txt`).
pub fn output_path(input: &Path, format: ExportFormat) -> PathBuf {
    input.with_extension(format.extension())
}

/// Create `path` and write `spectrum` to it in `format`.
pub fn export_file(spectrum: &Spectrum, path: &Path, format: ExportFormat) -> Result<()> {
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let mut writer = BufWriter::new(file);

    let written = match format {
        ExportFormat::Txt => write_report(spectrum, &mut writer),
        ExportFormat::Json => write_json(spectrum, &mut writer),
        ExportFormat::Csv => write_csv(spectrum, &mut writer),
    };
    written.with_context(|| format!("writing {}", path.display()))?;

    writer
        .flush()
        .with_context(|| format!("flushing {}", path.display()))
}

// ---------------------------------------------------------------------------
// Text report
// ---------------------------------------------------------------------------

/// Write the plain-text report.
pub fn write_report<W: Write>(spectrum: &Spectrum, mut writer: W) -> Result<()> {
    let default_info = SpectrumInformation::default();
    let info = spectrum.info.as_ref().unwrap_or(&default_info);

    writeln!(writer, "SHIFR={}", info.name)?;
    writeln!(writer, "TLIVE={}", format_float(info.live_time))?;
    writeln!(writer, "TREAL={}", format_float(info.real_time))?;
    if let Some((date, time)) = info.measurement_begin() {
        writeln!(writer, "DATE={date}")?;
        if let Some(time) = time {
            writeln!(writer, "TIME={time}")?;
        }
    }

    writeln!(writer, "SPECTRTXT={}", spectrum.len())?;
    for (channel, count) in spectrum.channels() {
        writeln!(writer, "{channel}\t{count}")?;
    }
    Ok(())
}

/// Render a float the way the legacy converter did: whole numbers keep a
/// trailing `.0`, very large or very small magnitudes use an exponent with a
/// sign and at least two digits (`1e+16`, `1.5e-05`).
pub fn format_float(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }

    let magnitude = value.abs();
    if magnitude != 0.0 && !(1e-4..1e16).contains(&magnitude) {
        let sci = format!("{value:e}");
        let (mantissa, exponent) = sci.split_once('e').unwrap_or((sci.as_str(), "0"));
        let exponent: i32 = exponent.parse().unwrap_or(0);
        let sign = if exponent < 0 { '-' } else { '+' };
        return format!("{mantissa}e{sign}{:02}", exponent.abs());
    }

    if value.fract() == 0.0 {
        format!("{value:.1}")
    } else {
        format!("{value}")
    }
}

// ---------------------------------------------------------------------------
// JSON / CSV
// ---------------------------------------------------------------------------

/// Pretty-printed JSON of the whole spectrum, header fields in file order.
pub fn write_json<W: Write>(spectrum: &Spectrum, mut writer: W) -> Result<()> {
    serde_json::to_writer_pretty(&mut writer, spectrum).context("serializing spectrum")?;
    writeln!(writer)?;
    Ok(())
}

#[derive(Serialize)]
struct ChannelRow {
    channel: usize,
    count: i32,
}

/// `channel,count` table with a header row.
pub fn write_csv<W: Write>(spectrum: &Spectrum, writer: W) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for (channel, count) in spectrum.channels() {
        csv_writer
            .serialize(ChannelRow { channel, count })
            .with_context(|| format!("channel {channel}"))?;
    }
    if spectrum.is_empty() {
        csv_writer.write_record(["channel", "count"])?;
    }
    csv_writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Spectrum {
        let mut info = SpectrumInformation::default();
        info.apply_line("SHIFR", Some("A"));
        info.apply_line("TLIVE", Some("100.5"));
        info.apply_line("TREAL", Some("101"));
        info.apply_line("MEASBEGIN", Some("2020-01-01 10:00:00"));
        Spectrum::new(vec![5, -3], info)
    }

    fn report(spectrum: &Spectrum) -> String {
        let mut out = Vec::new();
        write_report(spectrum, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn report_matches_legacy_layout() {
        assert_eq!(
            report(&sample()),
            "SHIFR=A\nTLIVE=100.5\nTREAL=101.0\nDATE=2020-01-01\nTIME=10:00:00\n\
             SPECTRTXT=2\n1\t5\n2\t-3\n"
        );
    }

    #[test]
    fn report_without_measurement_begin_or_info() {
        let mut spectrum = sample();
        spectrum.info = None;
        assert_eq!(
            report(&spectrum),
            "SHIFR=\nTLIVE=0.0\nTREAL=0.0\nSPECTRTXT=2\n1\t5\n2\t-3\n"
        );
    }

    #[test]
    fn report_with_date_only() {
        let mut spectrum = sample();
        if let Some(info) = spectrum.info.as_mut() {
            info.apply_line("MEASBEGIN", Some("2020-01-01"));
        }
        let text = report(&spectrum);
        assert!(text.contains("DATE=2020-01-01\n"));
        assert!(!text.contains("TIME="));
    }

    #[test]
    fn float_rendering() {
        assert_eq!(format_float(101.0), "101.0");
        assert_eq!(format_float(100.5), "100.5");
        assert_eq!(format_float(0.0), "0.0");
        assert_eq!(format_float(-2.0), "-2.0");
        assert_eq!(format_float(0.1), "0.1");
        assert_eq!(format_float(1e16), "1e+16");
        assert_eq!(format_float(1.5e-5), "1.5e-05");
        assert_eq!(format_float(f64::NAN), "nan");
    }

    #[test]
    fn csv_has_header_and_rows() {
        let mut out = Vec::new();
        write_csv(&sample(), &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "channel,count\n1,5\n2,-3\n");
    }

    #[test]
    fn json_keeps_header_order() {
        let mut out = Vec::new();
        write_json(&sample(), &mut out).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value["data"], serde_json::json!([5, -3]));
        assert_eq!(value["info"]["live_time"], serde_json::json!(100.5));

        let text = String::from_utf8(out).unwrap();
        let shifr = text.find("\"SHIFR\"").unwrap();
        let measbegin = text.find("\"MEASBEGIN\"").unwrap();
        assert!(shifr < measbegin);
    }

    #[test]
    fn formats_and_output_paths() {
        assert_eq!(
            ExportFormat::from_path(Path::new("out.JSON")),
            Some(ExportFormat::Json)
        );
        assert_eq!(ExportFormat::from_path(Path::new("out.spe")), None);
        assert_eq!(
            output_path(Path::new("data/run1.spe"), ExportFormat::Txt),
            PathBuf::from("data/run1.txt")
        );
        assert_eq!(
            output_path(Path::new("run1"), ExportFormat::Csv),
            PathBuf::from("run1.csv")
        );
    }
}
