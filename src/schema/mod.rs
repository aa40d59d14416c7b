//! Typed output records, one per supported document.
//!
//! Every record derives `Default`, and every field is `#[serde(default)]`,
//! so a model reply with missing keys still yields a fully constructed
//! value. Models also like to answer `null` where a string is expected and
//! occasionally send numbers for amounts; the lenient deserialisers below
//! fold both into the string form.
//!
//! Dates are `Option<NaiveDate>` and serialise as ISO-8601 (`YYYY-MM-DD`).
//! On input, ISO, `DD/MM/YYYY` and `DD-MM-YYYY` are accepted.

pub mod aadhaar;
pub mod form16;
pub mod pan;

pub use aadhaar::{AadhaarBack, AadhaarFront};
pub use form16::{
    CertificateDetails, ChallanDetails, DeducteeDetails, DeductorDetails, Form16, PaymentSummary,
    Period, TaxDeductedSummary, TaxDeductionDeposit, TaxDepositDetails, VerificationDetails,
};
pub use pan::PanCard;

use chrono::NaiveDate;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::debug;

/// Accepted input date layouts, tried in order.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y", "%d-%m-%Y"];

/// Placeholder strings models emit for "not found".
fn is_missing_marker(s: &str) -> bool {
    let t = s.trim();
    t.is_empty() || t.eq_ignore_ascii_case("null") || t.eq_ignore_ascii_case("none")
}

/// Read a string field: `null` and "None" become empty, numbers and
/// booleans are stringified.
pub(crate) fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(String::new()),
        Some(Value::String(s)) if is_missing_marker(&s) => Ok(String::new()),
        Some(Value::String(s)) => Ok(s.trim().to_string()),
        Some(Value::Number(n)) => Ok(n.to_string()),
        Some(Value::Bool(b)) => Ok(b.to_string()),
        Some(other) => Err(D::Error::custom(format!(
            "expected a string, found {}",
            other
        ))),
    }
}

/// Read a nested record or list, treating `null` as its default.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Parse a date in any of the accepted layouts.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let t = s.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(t, fmt).ok())
}

/// Read an optional date: empty and `null` become `None`, and so does a
/// bare year (cards that print only "Year of Birth"). Anything else must
/// parse.
pub(crate) fn lenient_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::String(s)) => s,
        Some(Value::Number(n)) => n.to_string(),
        Some(other) => return Err(D::Error::custom(format!("expected a date, got {other}"))),
    };
    if is_missing_marker(&raw) {
        return Ok(None);
    }
    if is_digits(raw.trim(), 4) {
        debug!("Year-only date '{}' read as missing", raw.trim());
        return Ok(None);
    }
    parse_date(&raw)
        .map(Some)
        .ok_or_else(|| D::Error::custom(format!("unrecognised date '{}'", raw.trim())))
}

// ── Merge helpers ────────────────────────────────────────────────────────────

/// Keep `target` unless it is empty, in which case take `incoming`.
pub(crate) fn fill_string(target: &mut String, incoming: String) {
    if target.trim().is_empty() && !incoming.trim().is_empty() {
        *target = incoming;
    }
}

/// Keep `target` unless it is `None`.
pub(crate) fn fill_option<T>(target: &mut Option<T>, incoming: Option<T>) {
    if target.is_none() {
        *target = incoming;
    }
}

/// All of the given strings are non-blank.
pub(crate) fn all_present(fields: &[&str]) -> bool {
    fields.iter().all(|f| !f.trim().is_empty())
}

/// None of the given strings has any text.
pub(crate) fn all_blank(fields: &[&str]) -> bool {
    fields.iter().all(|f| f.trim().is_empty())
}

/// `s` is exactly `len` ASCII digits.
pub(crate) fn is_digits(s: &str, len: usize) -> bool {
    s.len() == len && s.bytes().all(|b| b.is_ascii_digit())
}
