//! Dotted field addresses: `[RecordType.]Field[.Repeat[.Component[.SubComponent]]]`.
//!
//! `P.10.2.3` is field 10, repeat 2, component 3 of a patient record. The record
//! type is optional and ignored when resolving; `10.2.3` addresses the same value.

use crate::error::CodecError;
use std::fmt;
use std::str::FromStr;

/// Largest position accepted at any level (the 16-bit signed range of LIS column numbers).
pub const MAX_POSITION: usize = i16::MAX as usize;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Address {
    record_type: Option<String>,
    path: Vec<usize>,
}

impl Address {
    /// Address from 1-based positions, without a record type. Every position must be
    /// in `1..=MAX_POSITION`.
    pub fn new(path: Vec<usize>) -> Result<Self, CodecError> {
        if path.is_empty() || path.iter().any(|n| !(1..=MAX_POSITION).contains(n)) {
            return Err(CodecError::InvalidAddress(format!("{:?}", path)));
        }
        Ok(Address {
            record_type: None,
            path,
        })
    }

    pub fn with_record_type(mut self, record_type: impl Into<String>) -> Self {
        self.record_type = Some(record_type.into());
        self
    }

    pub fn record_type(&self) -> Option<&str> {
        self.record_type.as_deref()
    }

    /// 1-based positions, outermost first.
    pub fn path(&self) -> &[usize] {
        &self.path
    }

    /// Number of nesting levels the address descends.
    pub fn depth(&self) -> usize {
        self.path.len()
    }
}

impl FromStr for Address {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || CodecError::InvalidAddress(s.to_string());
        let mut parts = s.trim().split('.').peekable();
        let record_type = match parts.peek() {
            Some(first) if first.starts_with(|c: char| c.is_alphabetic()) => {
                parts.next().map(str::to_string)
            }
            _ => None,
        };
        let path = parts
            .map(|p| match p.parse::<usize>() {
                Ok(n) if (1..=MAX_POSITION).contains(&n) => Ok(n),
                _ => Err(invalid()),
            })
            .collect::<Result<Vec<_>, _>>()?;
        if path.is_empty() {
            return Err(invalid());
        }
        Ok(Address { record_type, path })
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(rt) = &self.record_type {
            write!(f, "{}.", rt)?;
        }
        let mut first = true;
        for n in &self.path {
            if !first {
                f.write_str(".")?;
            }
            write!(f, "{}", n)?;
            first = false;
        }
        Ok(())
    }
}
