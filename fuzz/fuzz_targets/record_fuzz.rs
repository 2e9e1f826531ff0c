//! Record fuzz target: feed arbitrary text to message parsing, addressing and enumeration.
//! None of them may panic; malformed input must come back as Err.
//! Build with: cargo fuzz run record_fuzz (requires nightly and cargo fuzz).

#![cfg_attr(fuzzing, no_main)]

#[cfg(fuzzing)]
use libfuzzer_sys::fuzz_target;

#[cfg(fuzzing)]
fuzz_target!(|data: &[u8]| {
    let s = match std::str::from_utf8(data) {
        Ok(x) => x,
        Err(_) => return,
    };
    let options = astm_records::ExtractOptions::default();
    if let Ok(message) = astm_records::Message::parse(s, &options) {
        let _ = message.extract(None, &options);
        for record in message.records() {
            let _ = record.get("1.2.3");
            let _ = record.enumerate(astm_records::EnumerateOptions::leaves_only());
        }
    }
    // the first line doubles as an address
    let first = s.lines().next().unwrap_or("");
    if let Ok(address) = first.parse::<astm_records::Address>() {
        let mut record = astm_records::Record::parse(s, astm_records::DelimiterSet::astm());
        if record.set_at(&address, s).is_ok() {
            let _ = record.get_at(&address);
        }
        let _ = record.set_composite_at(&address, s);
    }
    let _ = astm_records::parse_timestamp(first);
    let _ = astm_records::checksum(data);
});

#[cfg(not(fuzzing))]
fn main() {
    eprintln!("Build with: cargo fuzz run record_fuzz");
}
