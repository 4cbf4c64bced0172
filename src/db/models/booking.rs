//! Booking (delivery appointment) data models.
//!
//! A booking occupies exactly one (due_date, time_label) slot; slots are a
//! single shared pool across all clients, not per-client.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: i64,
    pub due_date: NaiveDate,
    pub time_label: String,
    pub status_id: Option<i64>,
    pub client_id: i64,
    pub responsible: Option<String>,
    pub notes: Option<String>,
    pub is_rectification: bool,
    /// Set when the status enters the completed set, cleared when it leaves.
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input data for creating or updating a booking.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingInput {
    pub due_date: NaiveDate,
    pub time_label: String,
    pub status_id: Option<i64>,
    pub client_id: i64,
    pub responsible: Option<String>,
    pub notes: Option<String>,
    #[serde(default)]
    pub is_rectification: bool,
}

/// A booking joined with its client and status, as shown in the day agenda
/// and the month report.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingDetails {
    pub id: i64,
    pub due_date: NaiveDate,
    pub time_label: String,
    pub status_id: Option<i64>,
    pub client_id: i64,
    pub responsible: Option<String>,
    pub notes: Option<String>,
    pub is_rectification: bool,
    pub client_name: String,
    pub contact: String,
    pub send_mode: String,
    pub status_name: Option<String>,
    pub status_color: Option<String>,
}

/// Projection used by the month status aggregation: just the date plus the
/// (possibly absent) status name and color of each booking.
#[derive(Debug, Clone)]
pub struct BookingStatusRow {
    pub due_date: NaiveDate,
    pub status_name: Option<String>,
    pub color_hex: Option<String>,
}
