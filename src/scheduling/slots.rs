//! Slot plan generation.
//!
//! The plan is a pure function of the configuration; it does not vary by
//! date. (Day-specific plans are a possible extension, not current
//! behavior.)

use chrono::{Duration, NaiveTime};
use serde::{Deserialize, Serialize};

pub const TIME_FORMAT: &str = "%H:%M";

/// How the day's bookable slots are produced. Global, not per-date.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum SlotPlanConfig {
    /// Emit a label every `interval_minutes` from `start` up to and
    /// including `end`.
    Automatic {
        start: String,
        end: String,
        interval_minutes: u32,
    },
    /// Comma-separated `HH:MM` labels, curated by hand.
    Manual { slots: String },
}

impl Default for SlotPlanConfig {
    /// The historical half-hour grid: 08:30 through 17:00.
    fn default() -> Self {
        SlotPlanConfig::Automatic {
            start: "08:30".into(),
            end: "17:00".into(),
            interval_minutes: 30,
        }
    }
}

/// Generate the ordered slot labels for a day.
///
/// Automatic mode yields a strictly ascending grid with an inclusive end
/// bound. Manual mode is permissive: invalid tokens are dropped silently,
/// valid ones are normalized to `HH:MM` and sorted ascending; duplicates
/// are kept as given.
pub fn generate(config: &SlotPlanConfig) -> Vec<String> {
    match config {
        SlotPlanConfig::Automatic {
            start,
            end,
            interval_minutes,
        } => generate_automatic(start, end, *interval_minutes),
        SlotPlanConfig::Manual { slots } => parse_manual(slots),
    }
}

fn generate_automatic(start: &str, end: &str, interval_minutes: u32) -> Vec<String> {
    let (Some(start), Some(end)) = (parse_label(start), parse_label(end)) else {
        return Vec::new();
    };
    if interval_minutes == 0 {
        return Vec::new();
    }

    let step = Duration::minutes(i64::from(interval_minutes));
    let mut labels = Vec::new();
    let mut current = start;
    while current <= end {
        labels.push(current.format(TIME_FORMAT).to_string());
        let (next, wrapped) = current.overflowing_add_signed(step);
        if wrapped != 0 {
            // Ran past midnight; the grid is done.
            break;
        }
        current = next;
    }
    labels
}

fn parse_manual(raw: &str) -> Vec<String> {
    let mut times: Vec<NaiveTime> = raw
        .split(',')
        .filter_map(|token| parse_label(token.trim()))
        .collect();
    times.sort();
    times
        .into_iter()
        .map(|t| t.format(TIME_FORMAT).to_string())
        .collect()
}

fn parse_label(token: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(token, TIME_FORMAT).ok()
}
