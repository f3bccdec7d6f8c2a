//! Lower-cased header map handed to the decoders

use crate::error::{DecodeError, Result};
use std::collections::HashMap;

/// Header name to raw value, keyed by lower-cased name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderMap {
    inner: HashMap<String, String>,
}

impl HeaderMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a map from the raw header block of a message.
    ///
    /// Values are kept undecoded with folded lines joined by a single space.
    /// When a header repeats, the first occurrence wins.
    pub fn from_raw(raw: &[u8]) -> Result<Self> {
        let (headers, _) =
            mailparse::parse_headers(raw).map_err(|e| DecodeError::Headers(e.to_string()))?;

        let mut map = Self::new();
        for header in &headers {
            let value = String::from_utf8_lossy(header.get_value_raw());
            let unfolded = value
                .lines()
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .collect::<Vec<_>>()
                .join(" ");
            map.inner
                .entry(header.get_key().to_lowercase())
                .or_insert(unfolded);
        }

        Ok(map)
    }

    /// Insert a header, replacing any previous value under the same name
    pub fn insert(&mut self, name: impl AsRef<str>, value: impl Into<String>) -> Option<String> {
        self.inner
            .insert(name.as_ref().to_lowercase(), value.into())
    }

    /// Look up a header by name, in any case
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.inner.get(&name.to_lowercase()).map(String::as_str)
    }

    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.get("content-type")
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for HeaderMap
where
    K: AsRef<str>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (name, value) in iter {
            map.insert(name, value);
        }
        map
    }
}
