//! Forgiving deserializers for form-sourced fields
//!
//! HTML forms post numbers as strings and leave untouched dates as `""`.
//! Stored documents always carry the strict representation.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrText {
    Number(f64),
    Text(String),
}

fn parse_number<E: serde::de::Error>(value: NumberOrText) -> Result<Option<f64>, E> {
    match value {
        NumberOrText::Number(n) => Ok(Some(n)),
        NumberOrText::Text(s) if s.trim().is_empty() => Ok(None),
        NumberOrText::Text(s) => s
            .trim()
            .parse::<f64>()
            .map(Some)
            .map_err(|_| E::custom(format!("expected a number, got {:?}", s))),
    }
}

/// Number or numeric string; blank and null become 0
pub fn number<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<NumberOrText>::deserialize(deserializer)?;
    match value {
        Some(v) => Ok(parse_number::<D::Error>(v)?.unwrap_or(0.0)),
        None => Ok(0.0),
    }
}

/// Whole number or numeric string; blank and null become 0
pub fn integer<'de, D>(deserializer: D) -> Result<i32, D::Error>
where
    D: Deserializer<'de>,
{
    let n = number(deserializer)?;
    if n.fract() != 0.0 || n < i32::MIN as f64 || n > i32::MAX as f64 {
        return Err(serde::de::Error::custom(format!("expected a whole number, got {}", n)));
    }
    Ok(n as i32)
}

/// Parse `YYYY-MM-DD`, also accepting a full ISO timestamp
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    let date_part = trimmed.get(..10).unwrap_or(trimmed);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
}

/// Optional date; blank and null become `None`
pub fn optional_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    match raw {
        None => Ok(None),
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => parse_date(&s)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid date {:?}", s))),
    }
}
