use std::collections::BTreeMap;
use std::fmt;

use serde::ser::{Serialize, SerializeMap, Serializer};

/// Header key whose `=` switches the file from text to binary.
pub const SENTINEL_KEY: &str = "SPECTR";

pub const KEY_NAME: &str = "SHIFR";
pub const KEY_LIVE_TIME: &str = "TLIVE";
pub const KEY_REAL_TIME: &str = "TREAL";
pub const KEY_GEOMETRY: &str = "GEOMETRY";
pub const KEY_DISTANCE: &str = "DISTANCE";
pub const KEY_MEASUREMENT_BEGIN: &str = "MEASBEGIN";

// ---------------------------------------------------------------------------
// HeaderFields – insertion-ordered key/value store
// ---------------------------------------------------------------------------

/// Every valued header line, in the order keys were first seen.
///
/// Re-inserting a key replaces its value but keeps its original position.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HeaderFields {
    entries: Vec<(String, String)>,
    positions: BTreeMap<String, usize>,
}

impl HeaderFields {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite `key`.  Returns the previous value, if any.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        let key = key.into();
        let value = value.into();
        match self.positions.get(&key) {
            Some(&pos) => Some(std::mem::replace(&mut self.entries[pos].1, value)),
            None => {
                self.positions.insert(key.clone(), self.entries.len());
                self.entries.push((key, value));
                None
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.positions
            .get(key)
            .map(|&pos| self.entries[pos].1.as_str())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.positions.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for HeaderFields {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut fields = HeaderFields::new();
        for (key, value) in iter {
            fields.insert(key, value);
        }
        fields
    }
}

impl Serialize for HeaderFields {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

// ---------------------------------------------------------------------------
// SpectrumInformation – decoded header
// ---------------------------------------------------------------------------

/// Header metadata of one spectrum.
///
/// The typed fields are a convenience view; `header_fields` holds the same
/// keys (and every other valued key) verbatim.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize)]
pub struct SpectrumInformation {
    /// `SHIFR`
    pub name: String,
    /// `TLIVE`, seconds.
    pub live_time: f64,
    /// `TREAL`, seconds.
    pub real_time: f64,
    /// `GEOMETRY`
    pub geometry: String,
    /// `DISTANCE`
    pub distance: f64,
    pub header_fields: HeaderFields,
}

impl SpectrumInformation {
    /// Lists the header as `KEY=VALUE` lines (bare `KEY` for empty values).
    pub fn header_listing(&self) -> HeaderListing<'_> {
        HeaderListing(&self.header_fields)
    }

    /// `MEASBEGIN` split at its first space into date and time.
    pub fn measurement_begin(&self) -> Option<(&str, Option<&str>)> {
        let value = self.header_fields.get(KEY_MEASUREMENT_BEGIN)?;
        Some(match value.split_once(' ') {
            Some((date, time)) => (date, Some(time)),
            None => (value, None),
        })
    }
}

/// `Display` adaptor returned by [`SpectrumInformation::header_listing`].
pub struct HeaderListing<'a>(&'a HeaderFields);

impl fmt::Display for HeaderListing<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (key, value) in self.0.iter() {
            if value.is_empty() {
                writeln!(f, "{key}")?;
            } else {
                writeln!(f, "{key}={value}")?;
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Spectrum – channel counts plus header
// ---------------------------------------------------------------------------

/// A decoded spectrum: one count per detector channel.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize)]
pub struct Spectrum {
    pub data: Vec<i32>,
    /// Always present on spectra produced by the loader.
    pub info: Option<SpectrumInformation>,
}

impl Spectrum {
    pub fn new(data: Vec<i32>, info: SpectrumInformation) -> Self {
        Self {
            data,
            info: Some(info),
        }
    }

    /// Number of channels.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// `(channel, count)` pairs with 1-based channel numbers.
    pub fn channels(&self) -> impl Iterator<Item = (usize, i32)> + '_ {
        self.data.iter().enumerate().map(|(i, &count)| (i + 1, count))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_fields_keep_first_seen_order() {
        let mut fields = HeaderFields::new();
        assert_eq!(fields.insert("B", "1"), None);
        fields.insert("A", "2");
        assert_eq!(fields.insert("B", "3"), Some("1".to_string()));

        let entries: Vec<_> = fields.iter().collect();
        assert_eq!(entries, vec![("B", "3"), ("A", "2")]);
        assert_eq!(fields.len(), 2);
        assert_eq!(fields.get("A"), Some("2"));
        assert!(!fields.contains_key("C"));
    }

    #[test]
    fn header_fields_serialize_in_order() {
        let fields: HeaderFields = vec![("Z", "last"), ("A", "first")].into_iter().collect();
        let json = serde_json::to_string(&fields).unwrap();
        assert_eq!(json, r#"{"Z":"last","A":"first"}"#);
    }

    #[test]
    fn header_listing_prints_key_value_lines() {
        let mut info = SpectrumInformation::default();
        info.header_fields.insert("SHIFR", "A");
        info.header_fields.insert("EMPTY", "");
        assert_eq!(info.header_listing().to_string(), "SHIFR=A\nEMPTY\n");
    }

    #[test]
    fn measurement_begin_splits_at_first_space() {
        let mut info = SpectrumInformation::default();
        assert_eq!(info.measurement_begin(), None);

        info.header_fields
            .insert(KEY_MEASUREMENT_BEGIN, "2020-01-01 10:00:00 UTC");
        assert_eq!(
            info.measurement_begin(),
            Some(("2020-01-01", Some("10:00:00 UTC")))
        );

        info.header_fields.insert(KEY_MEASUREMENT_BEGIN, "2020-01-01");
        assert_eq!(info.measurement_begin(), Some(("2020-01-01", None)));
    }

    #[test]
    fn channels_are_one_based() {
        let spectrum = Spectrum::new(vec![5, -3], SpectrumInformation::default());
        let channels: Vec<_> = spectrum.channels().collect();
        assert_eq!(channels, vec![(1, 5), (2, -3)]);
        assert_eq!(spectrum.len(), 2);
    }
}
