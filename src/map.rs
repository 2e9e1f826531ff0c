//! Translation maps between field addresses and descriptive tokens.
//!
//! ## Text format
//!
//! ```text
//! # Patient record
//! P.3:PatPracticePID        # trailing comments are stripped
//! P.6.1.1:PatLastName
//! ```
//!
//! One `KEY:VALUE` entry per line, split on the first `:`. Blank and comment-only
//! lines are ignored. A bidirectional map also holds every reverse entry, so the
//! same map turns addresses into tokens and tokens back into addresses.

use crate::error::CodecError;
use crate::record::RecordContent;
use std::collections::HashMap;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MapDirection {
    /// `KEY:VALUE` maps key to value only.
    #[default]
    Forward,
    /// `KEY:VALUE` also maps value back to key.
    Bidirectional,
}

/// String-to-string map that keeps insertion order for saving and listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TranslationMap {
    entries: HashMap<String, String>,
    order: Vec<String>,
}

impl TranslationMap {
    pub fn new() -> Self {
        TranslationMap::default()
    }

    /// Build from pairs; when a key repeats, the first value wins.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut map = TranslationMap::new();
        for (k, v) in pairs {
            let k = k.into();
            if !map.entries.contains_key(&k) {
                map.insert(k, v);
            }
        }
        map
    }

    /// Insert or replace an entry. A replaced key keeps its original position.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        if self.entries.insert(key.clone(), value.into()).is_none() {
            self.order.push(key);
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.order
            .iter()
            .filter_map(|k| self.entries.get(k).map(|v| (k.as_str(), v.as_str())))
    }

    /// Map with keys and values swapped (first occurrence wins on collisions).
    pub fn inverse(&self) -> Self {
        TranslationMap::from_pairs(self.iter().map(|(k, v)| (v, k)))
    }

    /// Parse the `KEY:VALUE` text format. Lines without `:` are skipped.
    pub fn parse(text: &str, direction: MapDirection) -> Self {
        let mut map = TranslationMap::new();
        for (number, line) in text.lines().enumerate() {
            let line = match line.find('#') {
                Some(i) => &line[..i],
                None => line,
            }
            .trim();
            if line.is_empty() {
                continue;
            }
            let Some((key, value)) = line.split_once(':') else {
                tracing::warn!(line = number + 1, content = line, "skipping translation map line without ':'");
                continue;
            };
            let (key, value) = (key.trim(), value.trim());
            map.insert(key, value);
            if direction == MapDirection::Bidirectional {
                map.insert(value, key);
            }
        }
        map
    }

    /// Load a map file. A missing or unreadable file yields an empty map.
    pub fn load(path: impl AsRef<Path>, direction: MapDirection) -> Self {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(text) => {
                let map = TranslationMap::parse(&text, direction);
                tracing::debug!(path = %path.display(), entries = map.len(), "loaded translation map");
                map
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "translation map unavailable, using empty map");
                TranslationMap::new()
            }
        }
    }

    /// `KEY:VALUE` lines in insertion order.
    pub fn to_lines(&self) -> Vec<String> {
        self.iter().map(|(k, v)| format!("{}:{}", k, v)).collect()
    }

    /// Write the map in the text format, one entry per line.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), CodecError> {
        let mut out = String::new();
        for line in self.to_lines() {
            out.push_str(&line);
            out.push('\n');
        }
        std::fs::write(path, out)?;
        Ok(())
    }

    /// Re-key `source` through this map. See [`remap`].
    pub fn remap(&self, source: &[(String, String)], only_mapped: bool) -> RecordContent {
        remap(source, self, only_mapped)
    }

    /// [`remap`] applied to every record of a message.
    pub fn remap_message(&self, message: &[RecordContent], only_mapped: bool) -> Vec<RecordContent> {
        message.iter().map(|record| remap(record, self, only_mapped)).collect()
    }
}

/// Replace each key found in `map` with its mapped key, keeping order and values.
/// Unmapped pairs pass through unchanged, or are dropped when `only_mapped` is set.
pub fn remap(source: &[(String, String)], map: &TranslationMap, only_mapped: bool) -> RecordContent {
    source
        .iter()
        .filter_map(|(key, value)| match map.get(key) {
            Some(mapped) => Some((mapped.to_string(), value.clone())),
            None if only_mapped => None,
            None => Some((key.clone(), value.clone())),
        })
        .collect()
}
