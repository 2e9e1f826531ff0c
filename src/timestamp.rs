//! LIS date/time values (`YYYYMMDDHHMMSS`, local time without offset).
//!
//! Header H.14, order O.7 and result completion times all use this layout.
//! Invalid text is reported as [`CodecError::InvalidTimestamp`]; there is no
//! sentinel date.

use chrono::{Datelike, Local, NaiveDateTime};

use crate::error::CodecError;

/// `chrono` format of a LIS timestamp.
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S";

const TIMESTAMP_LEN: usize = 14;

/// Parse a 14-digit timestamp such as `20210309155210`.
pub fn parse_timestamp(text: &str) -> Result<NaiveDateTime, CodecError> {
    // chrono alone would accept signs and short numeric fields
    if text.len() != TIMESTAMP_LEN || !text.bytes().all(|b| b.is_ascii_digit()) {
        return Err(CodecError::InvalidTimestamp(format!(
            "{:?} is not {} digits",
            text, TIMESTAMP_LEN
        )));
    }
    NaiveDateTime::parse_from_str(text, TIMESTAMP_FORMAT)
        .map_err(|e| CodecError::InvalidTimestamp(format!("{:?}: {}", text, e)))
}

/// Render `value` as a 14-digit timestamp. Years outside `0..=9999` do not fit.
pub fn format_timestamp(value: &NaiveDateTime) -> Result<String, CodecError> {
    if !(0..=9999).contains(&value.year()) {
        return Err(CodecError::InvalidTimestamp(format!(
            "year {} does not fit four digits",
            value.year()
        )));
    }
    Ok(value.format(TIMESTAMP_FORMAT).to_string())
}

/// Current local time as a timestamp, for building header and order records.
pub fn now_timestamp() -> String {
    Local::now().format(TIMESTAMP_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Timelike};

    #[test]
    fn parse_header_time() {
        let t = parse_timestamp("20210309155210").unwrap();
        assert_eq!(t.date(), NaiveDate::from_ymd_opt(2021, 3, 9).unwrap());
        assert_eq!((t.hour(), t.minute(), t.second()), (15, 52, 10));
        assert_eq!(format_timestamp(&t).unwrap(), "20210309155210");
    }

    #[test]
    fn reject_malformed_text() {
        for bad in [
            "",
            "2021",
            "2021030915521",
            "202103091552100",
            "2021030915521x",
            "+2021030915521",
            "20211309155210",
            "20210230155210",
            "20210309245210",
            "2021-03-09 15:5",
        ] {
            let err = parse_timestamp(bad).unwrap_err();
            assert!(matches!(err, CodecError::InvalidTimestamp(_)), "{:?}: {:?}", bad, err);
        }
    }

    #[test]
    fn format_pads_and_bounds_year() {
        let early = NaiveDate::from_ymd_opt(987, 1, 2).unwrap().and_hms_opt(3, 4, 5).unwrap();
        assert_eq!(format_timestamp(&early).unwrap(), "09870102030405");
        let late = NaiveDate::from_ymd_opt(10000, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
        assert!(matches!(format_timestamp(&late), Err(CodecError::InvalidTimestamp(_))));
    }

    #[test]
    fn now_parses_back() {
        let now = now_timestamp();
        assert_eq!(now.len(), 14);
        assert!(parse_timestamp(&now).is_ok());
    }
}
