//! Format extracted content for display (Markdown tables, hex dumps).

use crate::map::TranslationMap;

/// `| Position | Value |` table, one row per pair.
pub fn content_table(content: &[(String, String)]) -> String {
    let mut out = String::from("| Position | Value |\n|---|---|\n");
    for (address, value) in content {
        out.push_str(&format!("| {} | {} |\n", address, cell(value)));
    }
    out
}

/// `| Position | Token | Value |` table. The token column is empty for addresses
/// the map does not know.
pub fn mapped_content_table(content: &[(String, String)], map: &TranslationMap) -> String {
    let mut out = String::from("| Position | Token | Value |\n|---|---|---|\n");
    for (address, value) in content {
        let token = map.get(address).unwrap_or("");
        out.push_str(&format!("| {} | {} | {} |\n", address, token, cell(value)));
    }
    out
}

/// Bytes as dash-separated uppercase hex, e.g. `02-32-50`.
pub fn hex_string(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{:02X}", b))
        .collect::<Vec<_>>()
        .join("-")
}

// Pipes would break the table layout.
fn cell(value: &str) -> String {
    value.replace('|', "\\|")
}
