use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum HolidayKind {
    /// Blocks new bookings on that date.
    National,
    /// Advisory only; does not affect scheduling.
    Municipal,
}

impl HolidayKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            HolidayKind::National => "national",
            HolidayKind::Municipal => "municipal",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Holiday {
    pub id: i64,
    pub date: NaiveDate,
    pub kind: HolidayKind,
    pub name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HolidayInput {
    pub date: NaiveDate,
    pub kind: HolidayKind,
    pub name: Option<String>,
}
