use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, NaiveDate, Utc};

use crate::db::models::HolidayKind;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

pub fn parse_date(value: &str, field: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .with_context(|| format!("failed to parse {field} '{value}'"))
}

pub fn date_str(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub fn parse_datetime(value: &str, field: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .with_context(|| format!("failed to parse {field}"))
}

pub fn parse_optional_datetime(
    value: Option<String>,
    field: &str,
) -> Result<Option<DateTime<Utc>>> {
    match value {
        Some(raw) => parse_datetime(&raw, field).map(Some),
        None => Ok(None),
    }
}

pub fn parse_holiday_kind(value: &str) -> Result<HolidayKind> {
    match value {
        "national" => Ok(HolidayKind::National),
        "municipal" => Ok(HolidayKind::Municipal),
        other => Err(anyhow!("unknown holiday kind '{other}'")),
    }
}
