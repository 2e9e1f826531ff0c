//! Addressable records: recursive get/set/enumerate over nested delimiter levels.
//!
//! A record is a line of text split by the field separator. Each field may be
//! split again by the repeat separator, each repeat by the component separator,
//! and so on, one level per separator in the record's [`DelimiterSet`].
//!
//! ```text
//! P|1|PID123456|||Brown^Bobby^B|White
//!                 ^^^^^^^^^^^^^ P.6        = "Brown^Bobby^B"
//!                       ^^^^^   P.6.1.2    = "Bobby"
//! ```
//!
//! Values are escaped once when written ([`Record::set`]) and unescaped when read
//! ([`Record::get`], [`Record::enumerate`]), so a value may contain any delimiter.
//!
//! Header records (`H`, `MSH`) declare the delimiter set in their second field.
//! That field is blanked when the header is parsed, so it is never split as content,
//! and re-inserted by [`Record::text`].

use crate::address::Address;
use crate::delimiters::{DelimiterSet, Dialect};
use crate::error::CodecError;
use crate::escape::{escape, escape_outer, unescape};
use std::fmt;

/// Ordered `(address, value)` pairs extracted from or written into a record.
pub type RecordContent = Vec<(String, String)>;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EnumerateOptions {
    /// Emit only values that do not split further: composite values still holding a
    /// deeper separator are skipped, and trailing empty cells are trimmed first.
    pub suppress_ambiguous_top_level: bool,
}

impl EnumerateOptions {
    pub fn leaves_only() -> Self {
        EnumerateOptions {
            suppress_ambiguous_top_level: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    delimiters: DelimiterSet,
    fields: Vec<String>,
    /// Set for delimiter-declaring header records.
    header: Option<Dialect>,
}

impl Record {
    /// Empty record using the given delimiters.
    pub fn new(delimiters: DelimiterSet) -> Self {
        Record {
            delimiters,
            fields: Vec::new(),
            header: None,
        }
    }

    /// New header record holding only its tag; [`Record::text`] adds the declaration.
    pub fn header(dialect: Dialect, delimiters: DelimiterSet) -> Self {
        Record {
            delimiters,
            fields: vec![dialect.header_tag().to_string()],
            header: Some(dialect),
        }
    }

    /// Split a data record with known delimiters. Field text is kept raw (escaped).
    pub fn parse(text: &str, delimiters: DelimiterSet) -> Self {
        let fields = if text.is_empty() {
            Vec::new()
        } else {
            text.split(delimiters.field()).map(str::to_string).collect()
        };
        Record {
            delimiters,
            fields,
            header: None,
        }
    }

    /// Parse a header record, taking the delimiter set from its declaration block.
    pub fn parse_header(text: &str, dialect: Dialect) -> Result<Self, CodecError> {
        let delimiters = dialect.parse_header(text)?;
        // keep tag and field separator, drop the rest of the declaration
        let keep = dialect.header_offset() + 1;
        let skip = dialect.declaration_len() - 1;
        let stripped: String = text
            .chars()
            .take(keep)
            .chain(text.chars().skip(keep + skip))
            .collect();
        let mut record = Record::parse(&stripped, delimiters);
        record.header = Some(dialect);
        tracing::trace!(
            dialect = dialect.message_type(),
            fields = record.fields.len(),
            "parsed header record"
        );
        Ok(record)
    }

    pub fn delimiters(&self) -> &DelimiterSet {
        &self.delimiters
    }

    /// Raw (escaped) top-level fields. A header's declaration field is empty here.
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Record-type tag: the raw first field, or `""` for an empty record.
    pub fn record_type(&self) -> &str {
        self.fields.first().map(String::as_str).unwrap_or("")
    }

    pub fn header_dialect(&self) -> Option<Dialect> {
        self.header
    }

    /// Mark (or unmark) this record as a delimiter-declaring header.
    pub fn set_header_dialect(&mut self, dialect: Option<Dialect>) {
        self.header = dialect;
    }

    /// Record text, fields joined by the field separator. Headers get their
    /// delimiter declaration back in field 2.
    pub fn text(&self) -> String {
        let sep = self.delimiters.field().to_string();
        match self.header {
            Some(dialect) if !self.fields.is_empty() => {
                let declaration: String = dialect
                    .render_declaration(&self.delimiters)
                    .chars()
                    .skip(1)
                    .collect();
                let mut fields = self.fields.clone();
                if fields.len() < 2 {
                    fields.resize(2, String::new());
                }
                fields[1] = declaration;
                fields.join(&sep)
            }
            _ => self.fields.join(&sep),
        }
    }

    /// Unescaped value at `address` (e.g. `"P.6.1.2"` or `"6.1.2"`).
    ///
    /// Positions that do not exist yield `""`.
    pub fn get(&self, address: &str) -> Result<String, CodecError> {
        self.get_at(&address.parse()?)
    }

    pub fn get_at(&self, address: &Address) -> Result<String, CodecError> {
        self.check_depth(address)?;
        let path = address.path();
        let raw = match self.fields.get(path[0] - 1) {
            None => "",
            Some(field) if path.len() == 1 => field.as_str(),
            Some(field) => descend(field, &self.delimiters.separators()[1..], &path[1..]),
        };
        Ok(unescape(raw, &self.delimiters))
    }

    /// Write `value` at `address`, padding missing positions with empty strings.
    pub fn set(&mut self, address: &str, value: &str) -> Result<(), CodecError> {
        self.set_at(&address.parse()?, value)
    }

    pub fn set_at(&mut self, address: &Address, value: &str) -> Result<(), CodecError> {
        self.check_depth(address)?;
        let escaped = escape(value, &self.delimiters);
        self.write_raw(address, escaped);
        Ok(())
    }

    /// Write a composite value whose separators below `address` are structural, as
    /// reported by [`Record::enumerate`] for a value that subdivides. Only the escape
    /// character and the separators at or above the address's level are escaped.
    pub fn set_composite_at(&mut self, address: &Address, value: &str) -> Result<(), CodecError> {
        self.check_depth(address)?;
        let escaped = escape_outer(value, &self.delimiters, address.depth());
        self.write_raw(address, escaped);
        Ok(())
    }

    fn write_raw(&mut self, address: &Address, escaped: String) {
        let path = address.path();
        let column = path[0];
        if self.fields.len() < column {
            self.fields.resize(column, String::new());
        }
        let updated = if path.len() == 1 {
            escaped
        } else {
            rebuild(
                &self.fields[column - 1],
                &self.delimiters.separators()[1..],
                &path[1..],
                &escaped,
            )
        };
        self.fields[column - 1] = updated;
        tracing::trace!(address = %address, "set field");
    }

    /// Every non-empty value in the record, depth first (field, then repeat, then
    /// component), as `("<type>.<address>", unescaped value)`.
    ///
    /// A cell equal to the nearest emitted ancestor is not reported again: a field
    /// that does not subdivide appears once, at its shortest address.
    pub fn enumerate(&self, options: EnumerateOptions) -> RecordContent {
        let separators = self.delimiters.separators();
        let mut walk = Walk {
            record_type: self.record_type(),
            delimiters: &self.delimiters,
            options,
            path: Vec::new(),
            lineage: Vec::new(),
            content: Vec::new(),
        };
        walk.visit(self.fields.iter().map(String::as_str), separators);
        walk.content
    }

    /// Replace each listed address whose value is non-empty with `mask`.
    /// Returns the number of values replaced.
    pub fn redact(&mut self, addresses: &[&str], mask: &str) -> Result<usize, CodecError> {
        let mut replaced = 0;
        for address in addresses {
            let address: Address = address.parse()?;
            if !self.get_at(&address)?.is_empty() {
                self.set_at(&address, mask)?;
                replaced += 1;
            }
        }
        Ok(replaced)
    }

    fn check_depth(&self, address: &Address) -> Result<(), CodecError> {
        if address.depth() > self.delimiters.depth() {
            return Err(CodecError::AddressTooDeep {
                address: address.to_string(),
                depth: address.depth(),
                available: self.delimiters.depth(),
            });
        }
        Ok(())
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text())
    }
}

fn descend<'a>(segment: &'a str, separators: &[char], path: &[usize]) -> &'a str {
    let Some(cell) = segment.split(separators[0]).nth(path[0] - 1) else {
        return "";
    };
    if path.len() == 1 {
        cell
    } else {
        descend(cell, &separators[1..], &path[1..])
    }
}

fn rebuild(segment: &str, separators: &[char], path: &[usize], value: &str) -> String {
    let separator = separators[0];
    let mut cells: Vec<String> = segment.split(separator).map(str::to_string).collect();
    let column = path[0];
    if cells.len() < column {
        cells.resize(column, String::new());
    }
    let updated = if path.len() == 1 {
        value.to_string()
    } else {
        rebuild(&cells[column - 1], &separators[1..], &path[1..], value)
    };
    cells[column - 1] = updated;
    cells.join(separator.to_string().as_str())
}

struct Walk<'r> {
    record_type: &'r str,
    delimiters: &'r DelimiterSet,
    options: EnumerateOptions,
    path: Vec<usize>,
    /// Raw text emitted for each ancestor on the current path (`None` if skipped).
    lineage: Vec<Option<&'r str>>,
    content: RecordContent,
}

impl<'r> Walk<'r> {
    fn visit<I>(&mut self, cells: I, separators: &[char])
    where
        I: Iterator<Item = &'r str>,
    {
        let deeper = &separators[1..];
        for (index, cell) in cells.enumerate() {
            let cell = if self.options.suppress_ambiguous_top_level {
                cell.trim_end_matches(|c: char| separators.contains(&c))
            } else {
                cell
            };
            if cell.is_empty() {
                continue;
            }
            self.path.push(index + 1);

            let duplicate = self.lineage.iter().rev().find_map(|p| *p) == Some(cell);
            let composite = self.options.suppress_ambiguous_top_level
                && cell.contains(|c: char| deeper.contains(&c));
            let emit = !duplicate && !composite;
            if emit {
                let address = self.address();
                self.content.push((address, unescape(cell, self.delimiters)));
            }

            if let Some(next) = deeper.first() {
                self.lineage.push(emit.then_some(cell));
                self.visit(cell.split(*next), deeper);
                self.lineage.pop();
            }
            self.path.pop();
        }
    }

    fn address(&self) -> String {
        let path = self
            .path
            .iter()
            .map(|n| n.to_string())
            .collect::<Vec<_>>()
            .join(".");
        if self.record_type.is_empty() {
            path
        } else {
            format!("{}.{}", self.record_type, path)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn astm(text: &str) -> Record {
        Record::parse(text, DelimiterSet::astm())
    }

    #[test]
    fn get_nested_values() {
        let r = astm(r"P|1|PID123456|||Brown^Bobby^B|White|196501020304|M|PHY1001^Brewster^Katherine\PHY1002^McCoy^Leonard^H");
        assert_eq!(r.get("P.3").unwrap(), "PID123456");
        assert_eq!(r.get("6.1.2").unwrap(), "Bobby");
        assert_eq!(r.get("P.10.2.2").unwrap(), "McCoy");
        assert_eq!(r.get("P.10.2").unwrap(), "PHY1002^McCoy^Leonard^H");
        assert_eq!(r.get("P.10.3").unwrap(), "");
        assert_eq!(r.get("P.40").unwrap(), "");
        assert_eq!(r.get("P.6.1.9").unwrap(), "");
    }

    #[test]
    fn get_unescapes() {
        let r = astm("O|1|SID304||Type &E& Screen|N");
        assert_eq!(r.get("O.5").unwrap(), "Type & Screen");
        assert_eq!(r.fields()[4], "Type &E& Screen");
    }

    #[test]
    fn address_too_deep() {
        let mut r = astm("P|1");
        let err = r.get("P.1.1.1.1").unwrap_err();
        assert!(matches!(err, CodecError::AddressTooDeep { depth: 4, available: 3, .. }), "{:?}", err);
        assert!(matches!(r.set("1.1.1.1", "x"), Err(CodecError::AddressTooDeep { .. })));
        assert!(matches!(r.set("P.0", "x"), Err(CodecError::InvalidAddress(_))));
    }

    #[test]
    fn sparse_set_pads_every_level() {
        let mut r = Record::new(DelimiterSet::astm());
        r.set("10.2.3", "v").unwrap();
        assert_eq!(r.len(), 10);
        assert_eq!(r.get("10.2.1").unwrap(), "");
        assert_eq!(r.get("10.2.2").unwrap(), "");
        assert_eq!(r.get("10.2.3").unwrap(), "v");
        assert_eq!(r.text(), r"|||||||||\^^v");
    }

    #[test]
    fn set_escapes_once() {
        let mut r = astm("O|1");
        r.set("O.5.1.2", r"a|b\c^d&e").unwrap();
        assert_eq!(r.fields()[4], "^a&F&b&R&c&S&d&E&e");
        assert_eq!(r.get("O.5.1.2").unwrap(), r"a|b\c^d&e");
    }

    #[test]
    fn composite_keeps_inner_separators() {
        let mut r = astm("P|1");
        let address: Address = "P.6".parse().unwrap();
        r.set_composite_at(&address, r"Brown^Bobby^B & Co|x").unwrap();
        assert_eq!(r.fields()[5], r"Brown^Bobby^B &E& Co&F&x");
        assert_eq!(r.get("P.6.1.2").unwrap(), "Bobby");
        assert_eq!(r.get("P.6.1.3").unwrap(), "B & Co|x");
    }

    #[test]
    fn header_declaration_is_blanked_and_restored() {
        let r = Record::parse_header(r"H|\^&|||Mini LIS", Dialect::Astm).expect("header");
        assert_eq!(r.delimiters(), &DelimiterSet::astm());
        assert_eq!(r.get("H.2").unwrap(), "");
        assert_eq!(r.get("H.5").unwrap(), "Mini LIS");
        assert_eq!(r.text(), r"H|\^&|||Mini LIS");
    }

    #[test]
    fn enumerate_skips_unsplit_duplicates() {
        let r = astm(r"P|1|A\A^B");
        let content = r.enumerate(EnumerateOptions::default());
        let keys: Vec<&str> = content.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, ["P.1", "P.2", "P.3", "P.3.1", "P.3.2", "P.3.2.1", "P.3.2.2"]);

        let leaves = r.enumerate(EnumerateOptions::leaves_only());
        let keys: Vec<&str> = leaves.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, ["P.1", "P.2", "P.3.1", "P.3.2.1", "P.3.2.2"]);
    }

    #[test]
    fn redact_only_present_values() {
        let mut r = astm("P|1|PID1|||Doe^John");
        let n = r.redact(&["P.3", "P.4", "P.6"], "xxxxx").unwrap();
        assert_eq!(n, 2);
        assert_eq!(r.text(), "P|1|xxxxx|||xxxxx");
    }
}
