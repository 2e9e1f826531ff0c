//! # astm-records: addressable ASTM / HL7 delimited records
//!
//! Parse, address and rebuild the line-oriented records used by laboratory
//! instruments and information systems (ASTM E1394 / CLSI LIS2-A2, HL7 v2.x),
//! plus the LIS1-A (ASTM E1381) frame checksum.
//!
//! ## Record model
//!
//! - **Delimiter set**: ordered separators, one per nesting level, plus an escape
//!   character. Negotiated from the header record (`H|\^&`, `MSH|^~\&`).
//! - **Address**: `[Type.]Field[.Repeat[.Component[.SubComponent]]]`, 1-based.
//! - **Values** are escaped when written and unescaped when read.
//!
//! ## Example
//!
//! ```
//! use astm_records::{DelimiterSet, Record};
//!
//! let mut p = Record::parse("P|1", DelimiterSet::astm());
//! p.set("P.6.1.1", "Brown").unwrap();
//! p.set("P.6.1.2", "Bobby").unwrap();
//! assert_eq!(p.text(), "P|1||||Brown^Bobby");
//! assert_eq!(p.get("P.6.1.2").unwrap(), "Bobby");
//! ```
//!
//! ## Messages and maps
//!
//! [`Message`] splits a message into records and extracts every value as
//! `(address, value)` pairs; a [`TranslationMap`] renames addresses to
//! descriptive tokens and back. [`assemble_message`] rebuilds record text from
//! such pairs.

pub mod address;
pub mod delimiters;
pub mod dump;
pub mod error;
pub mod escape;
pub mod frame;
pub mod kind;
pub mod map;
pub mod message;
pub mod record;
pub mod timestamp;

pub use address::{Address, MAX_POSITION};
pub use delimiters::{parse_delimiters, render_delimiters, DelimiterSet, Dialect};
pub use error::CodecError;
pub use escape::{escape, unescape};
pub use frame::{build_frame, checksum, checksum_with, complete_frame, verify_frame, FrameMarkers};
pub use kind::RecordKind;
pub use map::{remap, MapDirection, TranslationMap};
pub use message::{
    assemble_message, assemble_record, extract_message, ExtractOptions, ExtractedRecord, Message,
};
pub use record::{EnumerateOptions, Record, RecordContent};
pub use timestamp::{format_timestamp, parse_timestamp, TIMESTAMP_FORMAT};
