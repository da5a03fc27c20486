//! Case-insensitive header storage.
//!
//! Header names are folded to ASCII lowercase on insert and on lookup, so
//! `Content-Type`, `content-type` and `CONTENT-TYPE` address the same entry.
//! A repeated header replaces the earlier value.

use std::collections::HashMap;

/// Header map keyed by lowercased name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderMap {
    entries: HashMap<String, String>,
}

impl HeaderMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse `Name: value` lines from a message head.
    ///
    /// The first line (request or status line) is skipped. Each line is split
    /// on the first `": "` only; lines without it are ignored.
    pub fn from_head(head: &str) -> Self {
        let mut headers = Self::new();
        for line in head.split("\r\n").skip(1) {
            if let Some((name, value)) = line.split_once(": ") {
                headers.insert(name, value);
            }
        }
        headers
    }

    pub fn insert(&mut self, name: &str, value: impl Into<String>) {
        self.entries.insert(name.to_ascii_lowercase(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(&name.to_ascii_lowercase())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over `(lowercased name, value)` pairs in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}
