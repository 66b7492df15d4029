//! Time related utils.

use crate::{Error, Result};
use chrono::SecondsFormat;

/// DateTime in UTC, the only zone SigV4 operates in.
pub type DateTime = chrono::DateTime<chrono::Utc>;

/// Return the current UTC instant.
pub fn now() -> DateTime {
    chrono::Utc::now()
}

/// Format a datetime into an AWS datestamp: `20220313`.
pub fn format_date(t: DateTime) -> String {
    t.format("%Y%m%d").to_string()
}

/// Format a datetime into a compact ISO 8601 timestamp: `20220313T072004Z`.
///
/// Both this and [`format_date`] must be derived from the same instant for
/// a given signing call, otherwise the credential scope and the
/// `x-amz-date` header can disagree around midnight.
pub fn format_iso8601(t: DateTime) -> String {
    t.format("%Y%m%dT%H%M%SZ").to_string()
}

/// Parse an RFC 3339 timestamp like `2019-11-09T13:34:41Z`.
pub fn parse_rfc3339(s: &str) -> Result<DateTime> {
    let t = chrono::DateTime::parse_from_rfc3339(s)
        .map_err(|e| Error::role_assume(format!("invalid timestamp: {s}")).with_source(e))?;
    Ok(t.with_timezone(&chrono::Utc))
}

/// Format a datetime back into RFC 3339, second precision.
pub fn format_rfc3339(t: DateTime) -> String {
    t.to_rfc3339_opts(SecondsFormat::Secs, true)
}
