//! Scheduling and capacity engine.
//!
//! Slots are time labels within a day, shared by all clients: one booking
//! per (date, time) across the whole pool. This module owns slot plan
//! generation, day availability, the pending-conflict guard, recurrence
//! placement, and the month status roll-up. It never talks to the UI; the
//! command layer wires it to the repositories.

pub mod availability;
pub mod commands;
pub mod recurrence;
pub mod slots;
pub mod status_map;

use chrono::NaiveDate;
use thiserror::Error;

/// Status name that marks a booking as awaiting completion. Matching is
/// case-insensitive: older databases carried "PENDENTE".
pub const PENDING_STATUS: &str = "Pendente";

/// Statuses that count as done. A day whose bookings are all in this set is
/// painted with [`COMPLETED_COLOR`] regardless of priority.
pub const COMPLETED_STATUSES: [&str; 2] = ["Feito", "Feito e enviado"];

/// Fixed green of the aggregator's golden rule.
pub const COMPLETED_COLOR: &str = "#28a745";

/// Priority order for the month view, most urgent first.
pub const STATUS_PRIORITY: [&str; 8] = [
    "Houve Algum Erro",
    "Chamado",
    "Remarcado",
    "Pendente",
    "Realocado",
    "Retificado",
    "Feito",
    "Feito e enviado",
];

pub fn names_equal(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

pub fn is_completed_status(name: &str) -> bool {
    COMPLETED_STATUSES.iter().any(|s| names_equal(s, name))
}

/// Failure kinds of the scheduling engine, distinct from plain repository
/// errors so callers can tell them apart.
#[derive(Debug, Error)]
pub enum ScheduleError {
    /// The forward search for a recurrence placement ran past the lookahead
    /// bound without finding a bookable day.
    #[error("no availability found within {lookahead_days} days of {target}")]
    NoAvailability {
        target: NaiveDate,
        lookahead_days: i64,
    },

    /// The "Pendente" status row is missing, so a recurrence batch cannot be
    /// persisted.
    #[error("pending status '{PENDING_STATUS}' is not configured")]
    MissingPendingStatus,

    /// The recurrence span is outside the supported values.
    #[error("unsupported recurrence span: {0} months")]
    InvalidSpan(u32),
}
