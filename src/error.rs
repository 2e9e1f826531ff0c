//! Errors raised while addressing, parsing or framing records.

#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("IO: {0}")]
    Io(#[from] std::io::Error),
    /// Non-numeric, zero or empty address component.
    #[error("Invalid address: {0}")]
    InvalidAddress(String),
    #[error("Address too deep: {address} has {depth} levels, only {available} delimiter levels available")]
    AddressTooDeep {
        address: String,
        depth: usize,
        available: usize,
    },
    /// Header record too short to hold its delimiter declaration.
    #[error("Malformed header: {0}")]
    MalformedHeader(String),
    #[error("Missing delimiter set: {0}")]
    MissingDelimiterSet(String),
    #[error("Invalid delimiters: {0}")]
    InvalidDelimiters(String),
    /// Date/time text that is not a valid `YYYYMMDDHHMMSS` timestamp.
    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),
    #[error("Frame: {0}")]
    Frame(String),
}
