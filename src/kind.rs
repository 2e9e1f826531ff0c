//! Record kinds and typed accessors for their well-known fields.
//!
//! The address-based core in [`record`](crate::record) works on any record; the
//! accessors here only answer for the matching kind and return `None` otherwise.

use chrono::NaiveDateTime;

use crate::delimiters::Dialect;
use crate::record::Record;
use crate::timestamp::parse_timestamp;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RecordKind {
    /// `H` message header.
    Header,
    /// `P` patient information.
    Patient,
    /// `O` test order.
    Order,
    /// `R` result.
    Result,
    /// `C` comment.
    Comment,
    /// `Q` request information (query).
    Query,
    /// `L` message terminator.
    Terminator,
    /// `M` manufacturer information.
    Manufacturer,
    /// `S` scientific.
    Scientific,
    /// HL7 `MSH` segment.
    MessageHeader,
    Other(String),
}

impl RecordKind {
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "H" => RecordKind::Header,
            "P" => RecordKind::Patient,
            "O" => RecordKind::Order,
            "R" => RecordKind::Result,
            "C" => RecordKind::Comment,
            "Q" => RecordKind::Query,
            "L" => RecordKind::Terminator,
            "M" => RecordKind::Manufacturer,
            "S" => RecordKind::Scientific,
            "MSH" => RecordKind::MessageHeader,
            other => RecordKind::Other(other.to_string()),
        }
    }

    pub fn tag(&self) -> &str {
        match self {
            RecordKind::Header => "H",
            RecordKind::Patient => "P",
            RecordKind::Order => "O",
            RecordKind::Result => "R",
            RecordKind::Comment => "C",
            RecordKind::Query => "Q",
            RecordKind::Terminator => "L",
            RecordKind::Manufacturer => "M",
            RecordKind::Scientific => "S",
            RecordKind::MessageHeader => "MSH",
            RecordKind::Other(tag) => tag,
        }
    }

    /// Dialect whose header this kind is, if any.
    pub fn header_dialect(&self) -> Option<Dialect> {
        match self {
            RecordKind::Header => Some(Dialect::Astm),
            RecordKind::MessageHeader => Some(Dialect::Hl7),
            _ => None,
        }
    }

    /// Kinds whose second field is a sequence number.
    pub fn has_sequence_number(&self) -> bool {
        matches!(
            self,
            RecordKind::Patient
                | RecordKind::Order
                | RecordKind::Result
                | RecordKind::Comment
                | RecordKind::Query
                | RecordKind::Terminator
        )
    }
}

impl Record {
    pub fn kind(&self) -> RecordKind {
        RecordKind::from_tag(self.record_type())
    }

    fn typed(&self, kind: RecordKind, address: &str) -> Option<String> {
        if self.kind() != kind {
            return None;
        }
        self.get(address).ok()
    }

    /// Field 2 of P, O, R, C, Q and L records. `None` if absent or not a number.
    pub fn sequence_number(&self) -> Option<u32> {
        if !self.kind().has_sequence_number() {
            return None;
        }
        self.get("2").ok()?.trim().parse().ok()
    }

    /// H.5 sender name or ID.
    pub fn sender_name(&self) -> Option<String> {
        self.typed(RecordKind::Header, "5")
    }

    /// H.12 processing ID (`P` production, `T` training, `D` debugging, `Q` QC).
    pub fn processing_id(&self) -> Option<String> {
        self.typed(RecordKind::Header, "12")
    }

    /// H.13 version, e.g. `LIS2-A`.
    pub fn version(&self) -> Option<String> {
        self.typed(RecordKind::Header, "13")
    }

    /// H.14 message date and time (`YYYYMMDDHHMMSS`).
    pub fn timestamp(&self) -> Option<String> {
        self.typed(RecordKind::Header, "14")
    }

    /// [`timestamp`](Record::timestamp) parsed; `None` when absent or malformed.
    pub fn message_time(&self) -> Option<NaiveDateTime> {
        parse_timestamp(&self.timestamp()?).ok()
    }

    /// O.7 specimen collection time, parsed.
    pub fn collection_time(&self) -> Option<NaiveDateTime> {
        parse_timestamp(&self.typed(RecordKind::Order, "7")?).ok()
    }

    /// P.3 practice-assigned patient ID.
    pub fn practice_patient_id(&self) -> Option<String> {
        self.typed(RecordKind::Patient, "3")
    }

    /// P.6 patient name, still holding its component separators.
    pub fn patient_name(&self) -> Option<String> {
        self.typed(RecordKind::Patient, "6")
    }

    /// O.3 specimen ID.
    pub fn specimen_id(&self) -> Option<String> {
        self.typed(RecordKind::Order, "3")
    }

    /// O.5 universal test ID.
    pub fn universal_test_id(&self) -> Option<String> {
        self.typed(RecordKind::Order, "5")
    }

    /// L.3 termination code.
    pub fn termination_code(&self) -> Option<String> {
        self.typed(RecordKind::Terminator, "3")
    }
}
