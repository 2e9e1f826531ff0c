//! Delimiter sets and header negotiation.
//!
//! A delimiter set is an ordered list of separators, one per nesting level
//! (field, repeat, component and, for HL7, sub-component), plus one escape
//! character. The first record of a message declares its delimiter set
//! inline, right after the record-type tag:
//!
//! ```text
//! H|\^&|||Mini LIS          ASTM: field, repeat, component, escape
//! MSH|^~\&|SENDER           HL7:  field, component, repeat, escape, sub-component
//! ```

use crate::error::CodecError;
use std::fmt;

/// Escape markers, one per nesting level. `E` is reserved for the escape character itself.
pub(crate) const LEVEL_MARKERS: [char; 4] = ['F', 'R', 'S', 'T'];

/// Ordered separators plus escape character.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DelimiterSet {
    separators: Vec<char>,
    escape: char,
}

impl DelimiterSet {
    /// Build a delimiter set. Separators must be non-empty, distinct, at most four
    /// levels deep, and must not contain the escape character.
    pub fn new(separators: impl Into<Vec<char>>, escape: char) -> Result<Self, CodecError> {
        let separators = separators.into();
        if separators.is_empty() {
            return Err(CodecError::InvalidDelimiters(
                "at least one separator is required".to_string(),
            ));
        }
        if separators.len() > LEVEL_MARKERS.len() {
            return Err(CodecError::InvalidDelimiters(format!(
                "{} separators given, at most {} nesting levels are supported",
                separators.len(),
                LEVEL_MARKERS.len()
            )));
        }
        for (i, sep) in separators.iter().enumerate() {
            if *sep == escape {
                return Err(CodecError::InvalidDelimiters(format!(
                    "escape {:?} is also used as a separator",
                    escape
                )));
            }
            if separators[..i].contains(sep) {
                return Err(CodecError::InvalidDelimiters(format!(
                    "separator {:?} appears more than once",
                    sep
                )));
            }
        }
        Ok(DelimiterSet { separators, escape })
    }

    /// ASTM E1394 / LIS2-A2 defaults: `|`, `\`, `^` with escape `&`.
    pub fn astm() -> Self {
        DelimiterSet {
            separators: vec!['|', '\\', '^'],
            escape: '&',
        }
    }

    /// HL7 v2.x defaults in nesting order: `|`, `~`, `^`, `&` with escape `\`.
    pub fn hl7() -> Self {
        DelimiterSet {
            separators: vec!['|', '~', '^', '&'],
            escape: '\\',
        }
    }

    pub fn separators(&self) -> &[char] {
        &self.separators
    }

    pub fn escape(&self) -> char {
        self.escape
    }

    /// Top-level (field) separator.
    pub fn field(&self) -> char {
        self.separators[0]
    }

    /// Number of nesting levels.
    pub fn depth(&self) -> usize {
        self.separators.len()
    }
}

impl Default for DelimiterSet {
    fn default() -> Self {
        DelimiterSet::astm()
    }
}

impl fmt::Display for DelimiterSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&render_delimiters(self))
    }
}

/// Read the ASTM delimiter block (three separators then the escape) that follows
/// the record-type letter of a header record.
pub fn parse_delimiters(raw_text: &str) -> Result<DelimiterSet, CodecError> {
    Dialect::Astm.parse_header(raw_text)
}

/// Inverse of [`parse_delimiters`]: separators in nesting order followed by the escape.
pub fn render_delimiters(set: &DelimiterSet) -> String {
    let mut out: String = set.separators.iter().collect();
    out.push(set.escape);
    out
}

/// Header layout of a message family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Dialect {
    /// ASTM E1394 / LIS2-A2: `H|\^&`.
    #[default]
    Astm,
    /// HL7 v2.x: `MSH|^~\&`.
    Hl7,
}

impl Dialect {
    /// Record-type tag of the delimiter-declaring header.
    pub fn header_tag(self) -> &'static str {
        match self {
            Dialect::Astm => "H",
            Dialect::Hl7 => "MSH",
        }
    }

    /// Message family name (`ASTM` / `HL7`).
    pub fn message_type(self) -> &'static str {
        match self {
            Dialect::Astm => "ASTM",
            Dialect::Hl7 => "HL7",
        }
    }

    /// Character offset of the delimiter block (length of the tag).
    pub fn header_offset(self) -> usize {
        self.header_tag().len()
    }

    /// Number of characters in the declared delimiter block.
    pub fn declaration_len(self) -> usize {
        match self {
            Dialect::Astm => 4,
            Dialect::Hl7 => 5,
        }
    }

    pub fn default_delimiters(self) -> DelimiterSet {
        match self {
            Dialect::Astm => DelimiterSet::astm(),
            Dialect::Hl7 => DelimiterSet::hl7(),
        }
    }

    /// Recognise a delimiter-declaring header line by its tag.
    ///
    /// An ASTM header is any line starting with `H` not followed by an alphanumeric
    /// character, so `H|...` and a bare `H` match but `HXX|...` does not.
    pub fn detect(line: &str) -> Option<Dialect> {
        if line.starts_with(Dialect::Hl7.header_tag()) {
            return Some(Dialect::Hl7);
        }
        let mut chars = line.chars();
        match (chars.next(), chars.next()) {
            (Some('H'), None) => Some(Dialect::Astm),
            (Some('H'), Some(next)) if !next.is_alphanumeric() => Some(Dialect::Astm),
            _ => None,
        }
    }

    /// Parse the delimiter block at this dialect's fixed offset.
    pub fn parse_header(self, line: &str) -> Result<DelimiterSet, CodecError> {
        let block: Vec<char> = line
            .chars()
            .skip(self.header_offset())
            .take(self.declaration_len())
            .collect();
        if block.len() < self.declaration_len() {
            return Err(CodecError::MalformedHeader(format!(
                "{} header needs {} delimiter characters after '{}', found {}",
                self.message_type(),
                self.declaration_len(),
                self.header_tag(),
                block.len()
            )));
        }
        match self {
            Dialect::Astm => DelimiterSet::new(&block[..3], block[3]),
            // declared: field, component, repeat, escape, sub-component
            Dialect::Hl7 => DelimiterSet::new([block[0], block[2], block[1], block[4]], block[3]),
        }
    }

    /// Render a delimiter set in this dialect's declared order; inverse of [`Dialect::parse_header`].
    ///
    /// Sets whose depth does not match the dialect fall back to [`render_delimiters`].
    pub fn render_declaration(self, set: &DelimiterSet) -> String {
        match (self, set.separators.as_slice()) {
            (Dialect::Hl7, [field, repeat, component, sub]) => {
                [*field, *component, *repeat, set.escape, *sub].iter().collect()
            }
            _ => render_delimiters(set),
        }
    }
}
