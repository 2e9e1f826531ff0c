//! Escape sequences for literal delimiters inside values.
//!
//! Each literal separator becomes `<esc>M<esc>` where `M` is the marker of its
//! nesting level (`F` field, `R` repeat, `S` component, `T` sub-component) and a
//! literal escape becomes `<esc>E<esc>`. Both directions scan left to right in a
//! single pass, so `unescape(escape(v)) == v` for every `v`.
//!
//! Raw text that was not produced by [`escape`] may still hold sequences such as
//! `&F&` meant literally; those are decoded like any other escape sequence.

use crate::delimiters::{DelimiterSet, LEVEL_MARKERS};

const ESCAPE_MARKER: char = 'E';

/// Replace every literal delimiter and escape character with its escape sequence.
pub fn escape(value: &str, delimiters: &DelimiterSet) -> String {
    escape_outer(value, delimiters, delimiters.depth())
}

/// Like [`escape`], but only the escape character and the separators of the first
/// `levels` nesting levels are escaped. Deeper separators stay structural, so a
/// composite value written at depth `levels` keeps its inner structure.
pub fn escape_outer(value: &str, delimiters: &DelimiterSet, levels: usize) -> String {
    let esc = delimiters.escape();
    let all = delimiters.separators();
    let separators = &all[..levels.min(all.len())];
    if !value.contains(|c: char| c == esc || separators.contains(&c)) {
        return value.to_string();
    }
    let mut out = String::with_capacity(value.len() + 8);
    for c in value.chars() {
        let marker = if c == esc {
            Some(ESCAPE_MARKER)
        } else {
            separators
                .iter()
                .position(|s| *s == c)
                .map(|level| LEVEL_MARKERS[level])
        };
        match marker {
            Some(m) => {
                out.push(esc);
                out.push(m);
                out.push(esc);
            }
            None => out.push(c),
        }
    }
    out
}

/// Decode escape sequences back to literal characters. Unknown sequences are kept verbatim.
pub fn unescape(value: &str, delimiters: &DelimiterSet) -> String {
    let esc = delimiters.escape();
    if !value.contains(esc) {
        return value.to_string();
    }
    let chars: Vec<char> = value.chars().collect();
    let mut out = String::with_capacity(value.len());
    let mut i = 0;
    while i < chars.len() {
        if chars[i] == esc && i + 2 < chars.len() && chars[i + 2] == esc {
            if let Some(literal) = literal_for(chars[i + 1], delimiters) {
                out.push(literal);
                i += 3;
                continue;
            }
        }
        out.push(chars[i]);
        i += 1;
    }
    out
}

fn literal_for(marker: char, delimiters: &DelimiterSet) -> Option<char> {
    if marker == ESCAPE_MARKER {
        return Some(delimiters.escape());
    }
    LEVEL_MARKERS
        .iter()
        .position(|m| *m == marker)
        .and_then(|level| delimiters.separators().get(level).copied())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_astm_value() {
        let d = DelimiterSet::astm();
        assert_eq!(escape("Type & Screen", &d), "Type &E& Screen");
        assert_eq!(escape(r"ABO\ABScr", &d), "ABO&R&ABScr");
        assert_eq!(escape("a|b^c", &d), "a&F&b&S&c");
        assert_eq!(unescape("ABO&R&ABScr", &d), r"ABO\ABScr");
    }

    #[test]
    fn decode_inverts_encode_with_every_delimiter() {
        let d = DelimiterSet::astm();
        for v in ["", "plain", r"|\^&", "&F&", "&E&F&E&", "&&", "x&", "&Q&", r"a\b|c^d&e"] {
            assert_eq!(unescape(&escape(v, &d), &d), v, "value {:?}", v);
        }
    }

    #[test]
    fn outer_levels_only() {
        let d = DelimiterSet::astm();
        assert_eq!(escape_outer(r"a^b\c|d&e", &d, 1), r"a^b\c&F&d&E&e");
        assert_eq!(escape_outer(r"a^b\c", &d, 2), r"a^b&R&c");
        assert_eq!(escape_outer("a^b", &d, 3), escape("a^b", &d));
    }

    #[test]
    fn hl7_sub_component_marker() {
        let d = DelimiterSet::hl7();
        assert_eq!(escape("R&D", &d), r"R\T\D");
        assert_eq!(escape(r"C:\tmp", &d), r"C:\E\tmp");
        assert_eq!(unescape(r"R\T\D", &d), "R&D");
    }

    #[test]
    fn unknown_and_unterminated_sequences_pass_through() {
        let d = DelimiterSet::astm();
        assert_eq!(unescape("&X&", &d), "&X&");
        assert_eq!(unescape("a&F", &d), "a&F");
        // T has no level in a three-separator set
        assert_eq!(unescape("&T&", &d), "&T&");
    }
}
