//! Day availability: partitions the slot plan into free and occupied sets.

use std::collections::HashSet;

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

/// Free/occupied breakdown of one day. `free` and `occupied` preserve the
/// plan's order and partition it: their union is the plan, their
/// intersection empty.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayAvailability {
    pub capacity: usize,
    pub occupied: Vec<String>,
    pub free: Vec<String>,
}

/// Resolve a day's availability from the slot plan and the labels already
/// booked that day. Booked labels outside the plan (e.g. after the grid was
/// reconfigured) do not count against capacity.
pub fn resolve(slot_plan: &[String], booked_labels: &[String]) -> DayAvailability {
    let booked: HashSet<&str> = booked_labels.iter().map(String::as_str).collect();

    let mut occupied = Vec::new();
    let mut free = Vec::new();
    for label in slot_plan {
        if booked.contains(label.as_str()) {
            occupied.push(label.clone());
        } else {
            free.push(label.clone());
        }
    }

    DayAvailability {
        capacity: slot_plan.len(),
        occupied,
        free,
    }
}

/// A date is schedulable iff it is a weekday and not a national holiday.
/// Municipal holidays are advisory and do not block.
pub fn is_business_day(date: NaiveDate, national_holidays: &HashSet<NaiveDate>) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun) && !national_holidays.contains(&date)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn partitions_plan_preserving_order() {
        let plan = labels(&["08:30", "09:00", "09:30", "10:00"]);
        let booked = labels(&["09:30", "08:30"]);

        let day = resolve(&plan, &booked);

        assert_eq!(day.capacity, 4);
        assert_eq!(day.occupied, labels(&["08:30", "09:30"]));
        assert_eq!(day.free, labels(&["09:00", "10:00"]));

        // free ∪ occupied == plan, free ∩ occupied == ∅
        let mut union: Vec<String> = day.free.iter().chain(day.occupied.iter()).cloned().collect();
        union.sort();
        let mut expected = plan.clone();
        expected.sort();
        assert_eq!(union, expected);
        assert!(day.free.iter().all(|l| !day.occupied.contains(l)));
    }

    #[test]
    fn off_plan_bookings_do_not_consume_capacity() {
        let plan = labels(&["08:30", "09:00"]);
        let booked = labels(&["07:00"]);

        let day = resolve(&plan, &booked);
        assert!(day.occupied.is_empty());
        assert_eq!(day.free, plan);
    }

    #[test]
    fn full_day_has_no_free_slots() {
        let plan = labels(&["08:30", "09:00"]);
        let day = resolve(&plan, &plan.clone());
        assert!(day.free.is_empty());
        assert_eq!(day.occupied.len(), 2);
    }

    #[test]
    fn weekends_are_not_business_days() {
        let none = HashSet::new();
        assert!(!is_business_day(date("2025-01-11"), &none)); // Saturday
        assert!(!is_business_day(date("2025-01-12"), &none)); // Sunday
        assert!(is_business_day(date("2025-01-13"), &none)); // Monday
    }

    #[test]
    fn national_holidays_block_but_municipal_do_not() {
        let mut national = HashSet::new();
        national.insert(date("2025-12-25")); // Thursday

        assert!(!is_business_day(date("2025-12-25"), &national));
        // A municipal holiday never enters the national set.
        assert!(is_business_day(date("2025-12-26"), &national));
    }
}
