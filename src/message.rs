//! Whole messages: header negotiation, extraction to `(address, value)` pairs and
//! assembly back to record text.
//!
//! A message is one record per line (CR, LF or CRLF). Each header record (`H` or
//! `MSH`) declares the delimiter set used by the records that follow it, until the
//! next header. Extraction can append three metadata pairs per record:
//!
//! | key           | value                                        |
//! |---------------|----------------------------------------------|
//! | `_Type`       | record-type tag (`H`, `P`, `MSH`, ...)       |
//! | `_Delimiters` | declaration of the active header (`|\^&`)    |
//! | `_MsgType`    | `ASTM` or `HL7`                              |
//!
//! Keys starting with `_` are never written back into a record by assembly.

use crate::address::Address;
use crate::delimiters::{DelimiterSet, Dialect};
use crate::error::CodecError;
use crate::map::{remap, TranslationMap};
use crate::record::{EnumerateOptions, Record, RecordContent};

pub const TYPE_KEY: &str = "_Type";
pub const DELIMITERS_KEY: &str = "_Delimiters";
pub const MESSAGE_TYPE_KEY: &str = "_MsgType";

/// Options for [`Message::parse`] and [`Message::extract`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractOptions {
    /// Drop pairs whose address is not in the translation map.
    pub only_mapped: bool,
    /// See [`EnumerateOptions::suppress_ambiguous_top_level`].
    pub suppress_ambiguous_top_level: bool,
    /// Delimiters for records that appear before any header. `None` makes such
    /// records an error.
    pub default_delimiters: Option<DelimiterSet>,
    /// Append `_Type`, `_Delimiters` and `_MsgType` to each record's content.
    pub include_metadata: bool,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        ExtractOptions {
            only_mapped: false,
            suppress_ambiguous_top_level: false,
            default_delimiters: Some(DelimiterSet::astm()),
            include_metadata: true,
        }
    }
}

impl ExtractOptions {
    fn enumerate_options(&self) -> EnumerateOptions {
        EnumerateOptions {
            suppress_ambiguous_top_level: self.suppress_ambiguous_top_level,
        }
    }
}

/// One record's extracted content plus the negotiation state it was read under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedRecord {
    pub record_type: String,
    /// Dialect of the governing header, `None` before any header.
    pub dialect: Option<Dialect>,
    /// Declaration of the governing header, `""` before any header.
    pub delimiters: String,
    pub content: RecordContent,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Entry {
    record: Record,
    dialect: Option<Dialect>,
    declaration: String,
}

/// Ordered records of one message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Message {
    entries: Vec<Entry>,
}

impl Message {
    pub fn new() -> Self {
        Message::default()
    }

    /// Split `text` into records, negotiating delimiters at every header line.
    /// Blank lines and lines starting with `#` are skipped.
    pub fn parse(text: &str, options: &ExtractOptions) -> Result<Self, CodecError> {
        let mut active = options.default_delimiters.clone();
        let mut negotiated: Option<(Dialect, String)> = None;
        let mut entries = Vec::new();

        for line in text.split(|c: char| c == '\r' || c == '\n') {
            if line.trim().is_empty() || line.trim_start().starts_with('#') {
                continue;
            }
            let record = match Dialect::detect(line) {
                Some(dialect) => {
                    let record = Record::parse_header(line, dialect)?;
                    let declaration = dialect.render_declaration(record.delimiters());
                    tracing::debug!(
                        dialect = dialect.message_type(),
                        delimiters = %declaration,
                        "negotiated delimiters from header"
                    );
                    active = Some(record.delimiters().clone());
                    negotiated = Some((dialect, declaration));
                    record
                }
                None => {
                    let delimiters = active.clone().ok_or_else(|| {
                        CodecError::MissingDelimiterSet(format!(
                            "record {:?} precedes any header and no default delimiters are set",
                            line.chars().take(8).collect::<String>()
                        ))
                    })?;
                    Record::parse(line, delimiters)
                }
            };
            let (dialect, declaration) = match &negotiated {
                Some((d, decl)) => (Some(*d), decl.clone()),
                None => (None, String::new()),
            };
            entries.push(Entry {
                record,
                dialect,
                declaration,
            });
        }
        tracing::debug!(records = entries.len(), "parsed message");
        Ok(Message { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn records(&self) -> impl Iterator<Item = &Record> {
        self.entries.iter().map(|e| &e.record)
    }

    pub fn records_mut(&mut self) -> impl Iterator<Item = &mut Record> {
        self.entries.iter_mut().map(|e| &mut e.record)
    }

    /// Append a record. A header record starts a new negotiation; any other record
    /// inherits the state of the record before it.
    pub fn push(&mut self, record: Record) {
        let (dialect, declaration) = match record.header_dialect() {
            Some(d) => (Some(d), d.render_declaration(record.delimiters())),
            None => self
                .entries
                .last()
                .map(|e| (e.dialect, e.declaration.clone()))
                .unwrap_or((None, String::new())),
        };
        self.entries.push(Entry {
            record,
            dialect,
            declaration,
        });
    }

    /// Enumerate every record, remap through `map` and append metadata if asked.
    pub fn extract(&self, map: Option<&TranslationMap>, options: &ExtractOptions) -> Vec<ExtractedRecord> {
        let enumerate = options.enumerate_options();
        self.entries
            .iter()
            .map(|entry| {
                let items = entry.record.enumerate(enumerate);
                tracing::trace!(
                    record_type = entry.record.record_type(),
                    items = items.len(),
                    "extracted record"
                );
                let mut content = match map {
                    Some(map) => remap(&items, map, options.only_mapped),
                    None => items,
                };
                let record_type = entry.record.record_type().to_string();
                if options.include_metadata {
                    let message_type = entry.dialect.unwrap_or_default().message_type();
                    content.push((TYPE_KEY.to_string(), record_type.clone()));
                    content.push((DELIMITERS_KEY.to_string(), entry.declaration.clone()));
                    content.push((MESSAGE_TYPE_KEY.to_string(), message_type.to_string()));
                }
                ExtractedRecord {
                    record_type,
                    dialect: entry.dialect,
                    delimiters: entry.declaration.clone(),
                    content,
                }
            })
            .collect()
    }

    /// Record texts joined by `separator` (typically `"\r"` or `"\n"`).
    pub fn to_text(&self, separator: &str) -> String {
        self.entries
            .iter()
            .map(|e| e.record.text())
            .collect::<Vec<_>>()
            .join(separator)
    }
}

/// Parse and extract in one step.
pub fn extract_message(
    text: &str,
    map: Option<&TranslationMap>,
    options: &ExtractOptions,
) -> Result<Vec<ExtractedRecord>, CodecError> {
    Ok(Message::parse(text, options)?.extract(map, options))
}

/// Build one record from `(address, value)` pairs.
///
/// Keys are first remapped through `map` (typically the inverse of the map used
/// for extraction). Keys starting with `_` are skipped; `_Type` fills field 1 when
/// no pair wrote it. Pairs are written outermost first. A value with pairs for its
/// parts is written as a composite, keeping its inner separators, and the parts
/// then overwrite their positions. A record whose type is `dialect`'s header tag becomes a header
/// and carries the delimiter declaration in field 2.
pub fn assemble_record(
    content: &[(String, String)],
    delimiters: &DelimiterSet,
    dialect: Dialect,
    map: Option<&TranslationMap>,
    only_mapped: bool,
) -> Result<Record, CodecError> {
    let record_type = content
        .iter()
        .find(|(key, _)| key == TYPE_KEY)
        .map(|(_, value)| value.as_str());
    let mapped = match map {
        Some(map) => remap(content, map, only_mapped),
        None => content.to_vec(),
    };

    let mut writes = mapped
        .iter()
        .filter(|(key, _)| !key.starts_with('_'))
        .map(|(key, value)| Ok((key.parse::<Address>()?, value.as_str())))
        .collect::<Result<Vec<_>, CodecError>>()?;
    // outer values first so their parts are written on top
    writes.sort_by_key(|(address, _)| address.depth());

    let mut record = Record::new(delimiters.clone());
    for (address, value) in &writes {
        let has_parts = writes.iter().any(|(other, _)| {
            other.depth() > address.depth() && other.path().starts_with(address.path())
        });
        if has_parts {
            record.set_composite_at(address, value)?;
        } else {
            record.set_at(address, value)?;
        }
    }
    if record.get("1")?.is_empty() {
        if let Some(tag) = record_type {
            record.set("1", tag)?;
        }
    }
    if !record.is_empty() && record.record_type() == dialect.header_tag() {
        record.set_header_dialect(Some(dialect));
    }
    Ok(record)
}

/// Build message text, one string per record; records that end up empty are dropped.
pub fn assemble_message(
    content: &[RecordContent],
    delimiters: &DelimiterSet,
    dialect: Dialect,
    map: Option<&TranslationMap>,
    only_mapped: bool,
) -> Result<Vec<String>, CodecError> {
    let mut message = Vec::with_capacity(content.len());
    for pairs in content {
        let record = assemble_record(pairs, delimiters, dialect, map, only_mapped)?;
        let text = record.text();
        if !text.is_empty() {
            message.push(text);
        }
    }
    tracing::debug!(records = message.len(), dialect = dialect.message_type(), "assembled message");
    Ok(message)
}
