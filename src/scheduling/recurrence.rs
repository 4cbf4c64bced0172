//! Monthly recurrence placement.
//!
//! A recurrence rule ("day 10 at 09:30, for the next N months") is turned
//! into N concrete placements. Each iteration targets today's month plus
//! `i + 1`, clamps the day to the target month's length, then walks forward
//! past weekends, national holidays, and fully booked days until it finds a
//! day with free capacity. The search is bounded; running past the bound is
//! reported as [`ScheduleError::NoAvailability`] instead of looping forever.

use std::collections::HashSet;

use anyhow::{anyhow, Result};
use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::scheduling::{availability::is_business_day, ScheduleError};

pub const MAX_LOOKAHEAD_DAYS: i64 = 365;

/// Supported spans, in months.
pub const ALLOWED_SPANS: [u32; 3] = [4, 8, 12];

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecurrenceRequest {
    pub client_id: i64,
    /// Target day of month, 1–31. Clamped to each target month's length.
    pub day_of_month: u32,
    pub time_label: String,
    pub span_months: u32,
}

/// One concrete future booking produced by [`plan`]. When the placement had
/// to move off the targeted date or time, `note` records the original
/// target for audit.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Placement {
    pub due_date: NaiveDate,
    pub time_label: String,
    pub note: Option<String>,
}

/// Compute the placements for a recurrence request. Pure over `free_slots`,
/// which reports the free labels of a candidate day; `national_holidays`
/// must cover the whole lookahead window.
///
/// Each iteration's target is derived from `today`, not from the previous
/// iteration's accepted date.
pub fn plan<F>(
    request: &RecurrenceRequest,
    today: NaiveDate,
    national_holidays: &HashSet<NaiveDate>,
    mut free_slots: F,
) -> Result<Vec<Placement>>
where
    F: FnMut(NaiveDate) -> Result<Vec<String>>,
{
    if !ALLOWED_SPANS.contains(&request.span_months) {
        return Err(ScheduleError::InvalidSpan(request.span_months).into());
    }

    let mut placements = Vec::with_capacity(request.span_months as usize);
    for i in 0..request.span_months {
        let (year, month) = add_months(today.year(), today.month(), i + 1);
        let day = request.day_of_month.min(days_in_month(year, month)).max(1);
        let target = NaiveDate::from_ymd_opt(year, month, day)
            .ok_or_else(|| anyhow!("invalid target date {year}-{month:02}-{day:02}"))?;

        let (due_date, free) =
            resolve_candidate(target, today, national_holidays, &mut free_slots)?;

        // The requested time wins when it is free; otherwise the day's first
        // free slot keeps the one-booking-per-slot invariant intact.
        let time_label = if free.iter().any(|l| l == &request.time_label) {
            request.time_label.clone()
        } else {
            free.first()
                .cloned()
                .ok_or_else(|| anyhow!("accepted day {due_date} has no free slot"))?
        };

        let mut moved = Vec::new();
        if due_date != target {
            moved.push(format!("Data original: {}", target.format("%d/%m/%Y")));
        }
        if time_label != request.time_label {
            moved.push(format!("Horário original: {}", request.time_label));
        }
        let note = (!moved.is_empty()).then(|| moved.join("; "));

        placements.push(Placement {
            due_date,
            time_label,
            note,
        });
    }

    Ok(placements)
}

/// Walk forward from `target` to the first bookable day: in the future,
/// a business day, and not fully booked. Bounded by [`MAX_LOOKAHEAD_DAYS`].
fn resolve_candidate<F>(
    target: NaiveDate,
    today: NaiveDate,
    national_holidays: &HashSet<NaiveDate>,
    free_slots: &mut F,
) -> Result<(NaiveDate, Vec<String>)>
where
    F: FnMut(NaiveDate) -> Result<Vec<String>>,
{
    let mut candidate = target;
    if candidate <= today {
        candidate = today + Duration::days(1);
    }

    let deadline = candidate + Duration::days(MAX_LOOKAHEAD_DAYS);
    while candidate <= deadline {
        if !is_business_day(candidate, national_holidays) {
            candidate += Duration::days(1);
            continue;
        }

        let free = free_slots(candidate)?;
        if !free.is_empty() {
            return Ok((candidate, free));
        }
        candidate += Duration::days(1);
    }

    Err(ScheduleError::NoAvailability {
        target,
        lookahead_days: MAX_LOOKAHEAD_DAYS,
    }
    .into())
}

fn add_months(year: i32, month: u32, offset: u32) -> (i32, u32) {
    let zero_based = month - 1 + offset;
    (year + (zero_based / 12) as i32, zero_based % 12 + 1)
}

pub(crate) fn days_in_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|d| d.pred_opt())
        .map(|d| d.day())
        .unwrap_or(28)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Weekday;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn request(day: u32, time: &str, span: u32) -> RecurrenceRequest {
        RecurrenceRequest {
            client_id: 1,
            day_of_month: day,
            time_label: time.into(),
            span_months: span,
        }
    }

    fn always_free(_: NaiveDate) -> Result<Vec<String>> {
        Ok(vec!["09:00".into(), "09:30".into(), "10:00".into()])
    }

    #[test]
    fn produces_span_many_future_weekday_placements() {
        let today = date("2025-01-15");
        let placements =
            plan(&request(15, "09:30", 4), today, &HashSet::new(), always_free).unwrap();

        assert_eq!(placements.len(), 4);
        for p in &placements {
            assert!(p.due_date > today);
            assert!(!matches!(p.due_date.weekday(), Weekday::Sat | Weekday::Sun));
        }
    }

    #[test]
    fn iterations_are_anchored_to_today_not_previous_placements() {
        let today = date("2025-01-15");
        let placements =
            plan(&request(10, "09:00", 4), today, &HashSet::new(), always_free).unwrap();

        // Feb 10, Mar 10, Apr 10 are weekdays in 2025; May 10 is a Saturday.
        assert_eq!(placements[0].due_date, date("2025-02-10"));
        assert_eq!(placements[1].due_date, date("2025-03-10"));
        assert_eq!(placements[2].due_date, date("2025-04-10"));
        assert_eq!(placements[3].due_date, date("2025-05-12"));
    }

    #[test]
    fn clamps_day_to_month_length_without_rolling_over() {
        let today = date("2025-03-15");
        let placements =
            plan(&request(31, "09:00", 4), today, &HashSet::new(), always_free).unwrap();

        // April has 30 days; the target clamps to the 30th (a Wednesday).
        assert_eq!(placements[0].due_date, date("2025-04-30"));
        // A clamped-but-weekend target still walks forward: May 31 is a
        // Saturday, so the placement lands on Monday June 2 with a note.
        assert_eq!(placements[1].due_date, date("2025-06-02"));
        assert_eq!(
            placements[1].note.as_deref(),
            Some("Data original: 31/05/2025")
        );
    }

    #[test]
    fn weekend_target_walks_to_monday_and_records_the_move() {
        // 2025-02-15 is a Saturday.
        let today = date("2025-01-10");
        let placements =
            plan(&request(15, "09:00", 4), today, &HashSet::new(), always_free).unwrap();

        assert_eq!(placements[0].due_date, date("2025-02-17"));
        assert_eq!(
            placements[0].note.as_deref(),
            Some("Data original: 15/02/2025")
        );
        // An untouched placement carries no note: April 15 is a Tuesday.
        assert_eq!(placements[2].due_date, date("2025-04-15"));
        assert_eq!(placements[2].note, None);
    }

    #[test]
    fn national_holiday_is_skipped() {
        let today = date("2025-11-20");
        let mut holidays = HashSet::new();
        holidays.insert(date("2025-12-25")); // Thursday

        let placements = plan(&request(25, "09:00", 4), today, &holidays, always_free).unwrap();
        assert_eq!(placements[0].due_date, date("2025-12-26"));
        assert_eq!(
            placements[0].note.as_deref(),
            Some("Data original: 25/12/2025")
        );
    }

    #[test]
    fn fully_booked_day_is_skipped() {
        let today = date("2025-01-10");
        let full_day = date("2025-02-17"); // Monday
        let lookup = |d: NaiveDate| -> Result<Vec<String>> {
            if d == full_day {
                Ok(Vec::new())
            } else {
                always_free(d)
            }
        };

        // Target Feb 15 (Saturday) walks to Feb 17, finds it full, and
        // settles on Feb 18.
        let placements = plan(&request(15, "09:00", 4), today, &HashSet::new(), lookup).unwrap();
        assert_eq!(placements[0].due_date, date("2025-02-18"));
    }

    #[test]
    fn occupied_target_time_falls_back_to_first_free_slot() {
        let today = date("2025-01-10");
        let lookup = |_: NaiveDate| -> Result<Vec<String>> { Ok(vec!["10:00".into()]) };

        let placements = plan(&request(12, "09:00", 4), today, &HashSet::new(), lookup).unwrap();
        assert_eq!(placements[0].time_label, "10:00");
        assert_eq!(
            placements[0].note.as_deref(),
            Some("Horário original: 09:00")
        );
    }

    #[test]
    fn exhausted_lookahead_reports_no_availability() {
        let today = date("2025-01-10");
        let never_free = |_: NaiveDate| -> Result<Vec<String>> { Ok(Vec::new()) };

        let err = plan(&request(15, "09:00", 4), today, &HashSet::new(), never_free).unwrap_err();
        match err.downcast_ref::<ScheduleError>() {
            Some(ScheduleError::NoAvailability { target, .. }) => {
                assert_eq!(*target, date("2025-02-15"));
            }
            other => panic!("expected NoAvailability, got {other:?}"),
        }
    }

    #[test]
    fn unsupported_span_is_rejected() {
        let today = date("2025-01-10");
        let err = plan(&request(15, "09:00", 5), today, &HashSet::new(), always_free).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ScheduleError>(),
            Some(ScheduleError::InvalidSpan(5))
        ));
    }

    #[test]
    fn month_arithmetic_rolls_the_year() {
        assert_eq!(add_months(2025, 11, 1), (2025, 12));
        assert_eq!(add_months(2025, 11, 2), (2026, 1));
        assert_eq!(add_months(2025, 12, 12), (2026, 12));
    }

    #[test]
    fn month_lengths_cover_leap_years() {
        assert_eq!(days_in_month(2025, 2), 28);
        assert_eq!(days_in_month(2024, 2), 29);
        assert_eq!(days_in_month(2025, 4), 30);
        assert_eq!(days_in_month(2025, 12), 31);
    }
}
