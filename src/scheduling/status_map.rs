//! Month status roll-up for the calendar grid.
//!
//! Every day with bookings collapses to one color and a count. If all of a
//! day's bookings are done, the day is the fixed green no matter what;
//! otherwise the most urgent status present (per the fixed priority order)
//! picks the color.

use std::collections::HashMap;

use chrono::Datelike;
use serde::Serialize;

use crate::db::models::BookingStatusRow;
use crate::scheduling::{is_completed_status, names_equal, COMPLETED_COLOR, STATUS_PRIORITY};

/// Color and booking count of one calendar day.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DaySummary {
    pub color: String,
    pub count: usize,
}

/// Reduce a range's bookings to a per-day-of-month summary. Rows are
/// expected to come from a single month's query; the key is the day of
/// month. Status-less bookings count but never drive the color.
pub fn aggregate(rows: &[BookingStatusRow]) -> HashMap<u32, DaySummary> {
    let mut by_day: HashMap<u32, Vec<&BookingStatusRow>> = HashMap::new();
    for row in rows {
        by_day.entry(row.due_date.day()).or_default().push(row);
    }

    by_day
        .into_iter()
        .map(|(day, day_rows)| (day, summarize_day(&day_rows)))
        .collect()
}

fn summarize_day(day_rows: &[&BookingStatusRow]) -> DaySummary {
    let count = day_rows.len();

    let all_completed = day_rows.iter().all(|row| {
        row.status_name
            .as_deref()
            .map_or(false, is_completed_status)
    });
    if all_completed {
        return DaySummary {
            color: COMPLETED_COLOR.into(),
            count,
        };
    }

    let dominant = STATUS_PRIORITY.iter().find(|candidate| {
        day_rows.iter().any(|row| {
            row.status_name
                .as_deref()
                .map_or(false, |name| names_equal(name, candidate))
        })
    });

    // The color comes from this day's own rows, so a same-named status
    // recolored elsewhere in the range cannot bleed in. No ranked status on
    // the day (e.g. all bookings status-less) falls back to the green.
    let color = dominant
        .and_then(|name| {
            day_rows.iter().find_map(|row| {
                let matches = row
                    .status_name
                    .as_deref()
                    .map_or(false, |n| names_equal(n, name));
                if matches {
                    row.color_hex.clone()
                } else {
                    None
                }
            })
        })
        .unwrap_or_else(|| COMPLETED_COLOR.into());

    DaySummary { color, count }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn row(date: &str, status: Option<(&str, &str)>) -> BookingStatusRow {
        BookingStatusRow {
            due_date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            status_name: status.map(|(name, _)| name.to_string()),
            color_hex: status.map(|(_, color)| color.to_string()),
        }
    }

    #[test]
    fn all_completed_day_is_golden_green() {
        let rows = vec![
            row("2025-03-10", Some(("Feito", "#007bff"))),
            row("2025-03-10", Some(("Feito e enviado", "#28a745"))),
        ];

        let map = aggregate(&rows);
        assert_eq!(
            map[&10],
            DaySummary {
                color: "#28a745".into(),
                count: 2
            }
        );
    }

    #[test]
    fn golden_rule_is_case_insensitive() {
        let rows = vec![row("2025-03-10", Some(("FEITO", "#007bff")))];
        assert_eq!(aggregate(&rows)[&10].color, "#28a745");
    }

    #[test]
    fn priority_order_picks_the_dominant_status() {
        let rows = vec![
            row("2025-03-11", Some(("Feito", "#007bff"))),
            row("2025-03-11", Some(("Pendente", "#ffc107"))),
            row("2025-03-11", Some(("Chamado", "#6f42c1"))),
        ];

        // Chamado outranks Pendente and Feito.
        assert_eq!(aggregate(&rows)[&11].color, "#6f42c1");
    }

    #[test]
    fn pending_beats_completed_on_mixed_days() {
        let rows = vec![
            row("2025-03-12", Some(("Pendente", "#ffc107"))),
            row("2025-03-12", Some(("Feito", "#007bff"))),
        ];

        let summary = &aggregate(&rows)[&12];
        assert_eq!(summary.color, "#ffc107");
        assert_eq!(summary.count, 2);
    }

    #[test]
    fn count_includes_statusless_bookings() {
        let rows = vec![
            row("2025-03-13", Some(("Pendente", "#ffc107"))),
            row("2025-03-13", None),
        ];

        let summary = &aggregate(&rows)[&13];
        assert_eq!(summary.count, 2);
        assert_eq!(summary.color, "#ffc107");
    }

    #[test]
    fn statusless_only_day_falls_back_to_green() {
        let rows = vec![row("2025-03-14", None)];
        assert_eq!(aggregate(&rows)[&14].color, "#28a745");
    }

    #[test]
    fn color_lookup_is_scoped_to_the_day() {
        // Same status name carries different colors on different days (the
        // color was edited between them); each day keeps its own.
        let rows = vec![
            row("2025-03-17", Some(("Pendente", "#ffc107"))),
            row("2025-03-18", Some(("Pendente", "#ff0000"))),
        ];

        let map = aggregate(&rows);
        assert_eq!(map[&17].color, "#ffc107");
        assert_eq!(map[&18].color, "#ff0000");
    }

    #[test]
    fn days_without_bookings_are_absent() {
        let rows = vec![row("2025-03-10", Some(("Feito", "#007bff")))];
        let map = aggregate(&rows);
        assert_eq!(map.len(), 1);
        assert!(!map.contains_key(&11));
    }
}
