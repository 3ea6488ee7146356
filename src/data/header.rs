//! Header line dispatch: typed fields plus the ordered key/value store.

use log::trace;

use super::model::{
    KEY_DISTANCE, KEY_GEOMETRY, KEY_LIVE_TIME, KEY_NAME, KEY_REAL_TIME, SENTINEL_KEY,
    SpectrumInformation,
};

/// Parse `value` as a decimal number, falling back to `default` when it is
/// absent or not a number.  Never fails.
pub fn parse_float_or(value: Option<&str>, default: f64) -> f64 {
    value
        .and_then(|v| v.trim().parse::<f64>().ok())
        .unwrap_or(default)
}

impl SpectrumInformation {
    /// Apply one tokenized header line.
    ///
    /// Known keys update their typed field.  Any key other than the sentinel
    /// that carries a non-empty value is also recorded in `header_fields`.
    pub fn apply_line(&mut self, key: &str, value: Option<&str>) {
        match key {
            KEY_NAME => self.name = value.unwrap_or_default().to_string(),
            KEY_LIVE_TIME => self.live_time = parse_float_or(value, 0.0),
            KEY_REAL_TIME => self.real_time = parse_float_or(value, 0.0),
            KEY_GEOMETRY => self.geometry = value.unwrap_or_default().to_string(),
            KEY_DISTANCE => self.distance = parse_float_or(value, 0.0),
            _ => {}
        }

        match value {
            Some(v) if !v.is_empty() && key != SENTINEL_KEY => {
                trace!("header {key}={v}");
                self.header_fields.insert(key, v);
            }
            _ => trace!("header flag {key}"),
        }
    }
}
