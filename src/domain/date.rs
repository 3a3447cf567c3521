//! SBS date normalization.
//!
//! The SBS export writes dates as `DD/MM/YYYY`. The pipeline sorts and filters
//! on the zero-padded `YYYY-MM-DD` form, which orders correctly as a plain
//! string. No calendar validation happens here: `31/02/2020` becomes
//! `2020-02-31`.

use chrono::NaiveDate;

/// A date string that does not split into exactly three `/`-separated parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedDate {
    input: String,
}

impl MalformedDate {
    pub fn input(&self) -> &str {
        &self.input
    }
}

impl std::fmt::Display for MalformedDate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Malformed date '{}': expected DD/MM/YYYY", self.input)
    }
}

impl std::error::Error for MalformedDate {}

/// Reassemble `DD/MM/YYYY` as `YYYY-MM-DD`.
pub fn to_iso(s: &str) -> Result<String, MalformedDate> {
    let parts: Vec<&str> = s.split('/').collect();
    let [dd, mm, yyyy] = parts.as_slice() else {
        return Err(MalformedDate {
            input: s.to_string(),
        });
    };
    Ok(format!("{yyyy}-{mm}-{dd}"))
}

/// Parse a user-entered `YYYY-MM-DD` bound.
///
/// Front ends use this to reject typos before they reach the range filter;
/// the filter itself only compares strings.
pub fn parse_iso_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repositions_day_month_year() {
        assert_eq!(to_iso("05/03/2024").unwrap(), "2024-03-05");
        assert_eq!(to_iso("31/12/1999").unwrap(), "1999-12-31");
    }

    #[test]
    fn does_not_validate_calendar() {
        assert_eq!(to_iso("31/02/2020").unwrap(), "2020-02-31");
    }

    #[test]
    fn rejects_wrong_part_count() {
        for bad in ["", "2024-03-05", "05/03", "05/03/2024/1"] {
            let err = to_iso(bad).unwrap_err();
            assert_eq!(err.input(), bad);
        }
    }

    #[test]
    fn parse_iso_date_checks_calendar() {
        assert_eq!(
            parse_iso_date(" 2024-02-29 "),
            NaiveDate::from_ymd_opt(2024, 2, 29)
        );
        assert!(parse_iso_date("2023-02-29").is_none());
        assert!(parse_iso_date("29/02/2024").is_none());
    }
}
