use std::collections::HashMap;

use anyhow::{anyhow, Result};
use chrono::{Duration, Local, NaiveDate};
use log::info;
use tauri::State;

use crate::{
    db::{
        models::{Booking, BookingInput},
        repositories::{BookingRepository, HolidayRepository},
    },
    scheduling::{
        availability::{self, DayAvailability},
        recurrence::{self, Placement, RecurrenceRequest, MAX_LOOKAHEAD_DAYS},
        slots,
        status_map::{self, DaySummary},
        ScheduleError, PENDING_STATUS,
    },
    AppState,
};

/// Free/occupied breakdown for the day view.
#[tauri::command]
pub async fn get_day_slots(
    state: State<'_, AppState>,
    date: NaiveDate,
) -> Result<DayAvailability, String> {
    let slot_plan = slots::generate(&state.settings.slot_plan());
    state
        .db
        .execute(move |conn| {
            let booked = BookingRepository::new(conn).booked_labels_for_date(date)?;
            Ok(availability::resolve(&slot_plan, &booked))
        })
        .await
        .map_err(|e| e.to_string())
}

/// Per-day color + count map for the month grid.
#[tauri::command]
pub async fn get_month_status_map(
    state: State<'_, AppState>,
    year: i32,
    month: u32,
) -> Result<HashMap<u32, DaySummary>, String> {
    let (from, to) = month_bounds(year, month).map_err(|e| e.to_string())?;
    state
        .db
        .execute(move |conn| {
            let rows = BookingRepository::new(conn).status_rows_for_range(from, to)?;
            Ok(status_map::aggregate(&rows))
        })
        .await
        .map_err(|e| e.to_string())
}

/// The single-slot creation guard: the client's existing pending booking,
/// if any. The frontend must ask the user to cancel it or abort; nothing
/// is resolved automatically here.
#[tauri::command]
pub async fn has_pending_conflict(
    state: State<'_, AppState>,
    client_id: i64,
) -> Result<Option<Booking>, String> {
    state
        .db
        .find_pending_for_client(client_id)
        .await
        .map_err(|e| e.to_string())
}

/// Preview the placements of a recurrence rule. Read-only; nothing is
/// persisted until `commit_recurrence`.
#[tauri::command]
pub async fn plan_recurrence(
    state: State<'_, AppState>,
    request: RecurrenceRequest,
) -> Result<Vec<Placement>, String> {
    let slot_plan = slots::generate(&state.settings.slot_plan());
    let today = Local::now().date_naive();

    state
        .db
        .execute(move |conn| {
            // Cover every possible target month plus the forward search.
            let horizon = today + Duration::days(400 + MAX_LOOKAHEAD_DAYS);
            let national = HolidayRepository::new(conn).national_dates_between(today, horizon)?;

            let bookings = BookingRepository::new(conn);
            recurrence::plan(&request, today, &national, |date| {
                let booked = bookings.booked_labels_for_date(date)?;
                Ok(availability::resolve(&slot_plan, &booked).free)
            })
        })
        .await
        .map_err(|e| e.to_string())
}

/// Persist a previewed recurrence plan: drop the client's future pending
/// bookings, then insert every placement as "Pendente", all in one
/// transaction so a failure leaves nothing half-written.
#[tauri::command]
pub async fn commit_recurrence(
    state: State<'_, AppState>,
    client_id: i64,
    placements: Vec<Placement>,
    responsible: Option<String>,
) -> Result<usize, String> {
    let today = Local::now().date_naive();

    state
        .db
        .execute(move |conn| commit_plan(conn, client_id, &placements, responsible.as_deref(), today))
        .await
        .map_err(|e| e.to_string())
}

pub(crate) fn commit_plan(
    conn: &mut rusqlite::Connection,
    client_id: i64,
    placements: &[Placement],
    responsible: Option<&str>,
    today: NaiveDate,
) -> Result<usize> {
    let tx = conn.transaction()?;
    {
        let repo = BookingRepository::new(&tx);
        let pending_id = repo
            .find_status_id_by_name(PENDING_STATUS)?
            .ok_or(ScheduleError::MissingPendingStatus)?;

        let removed = repo.delete_future_pending(client_id, today)?;
        if removed > 0 {
            info!("Removed {removed} stale pending bookings for client {client_id}");
        }

        for placement in placements {
            repo.create(&BookingInput {
                due_date: placement.due_date,
                time_label: placement.time_label.clone(),
                status_id: Some(pending_id),
                client_id,
                responsible: responsible.map(Into::into),
                notes: placement.note.clone(),
                is_rectification: false,
            })?;
        }
    }
    tx.commit()?;

    info!(
        "Committed {} recurrence placements for client {client_id}",
        placements.len()
    );
    Ok(placements.len())
}

fn month_bounds(year: i32, month: u32) -> Result<(NaiveDate, NaiveDate)> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| anyhow!("invalid month {year}-{month:02}"))?;
    let last = NaiveDate::from_ymd_opt(year, month, recurrence::days_in_month(year, month))
        .ok_or_else(|| anyhow!("invalid month {year}-{month:02}"))?;
    Ok((first, last))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::{params, Connection};

    fn test_conn() -> Connection {
        let mut conn = Connection::open_in_memory().expect("in-memory DB");
        conn.pragma_update(None, "foreign_keys", "ON").unwrap();
        crate::db::migrations::run_migrations(&mut conn).expect("migrations");
        conn
    }

    fn seed_client(conn: &Connection) -> i64 {
        conn.execute(
            "INSERT INTO clients (name, send_mode, contact) VALUES ('Acme', 'Nosso', 'a@b.c')",
            [],
        )
        .unwrap();
        conn.last_insert_rowid()
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn placement(date_s: &str, label: &str) -> Placement {
        Placement {
            due_date: date(date_s),
            time_label: label.into(),
            note: None,
        }
    }

    #[test]
    fn commit_replaces_future_pending_and_inserts_batch() {
        let mut conn = test_conn();
        let client = seed_client(&conn);
        let today = date("2025-03-10");

        // A stale future pending booking from an earlier rule.
        {
            let repo = BookingRepository::new(&conn);
            let pending_id = repo.find_status_id_by_name("Pendente").unwrap().unwrap();
            repo.create(&BookingInput {
                due_date: date("2025-04-01"),
                time_label: "09:00".into(),
                status_id: Some(pending_id),
                client_id: client,
                responsible: None,
                notes: None,
                is_rectification: false,
            })
            .unwrap();
        }

        let inserted = commit_plan(
            &mut conn,
            client,
            &[
                placement("2025-04-10", "09:30"),
                placement("2025-05-12", "09:30"),
            ],
            Some("Ana"),
            today,
        )
        .unwrap();
        assert_eq!(inserted, 2);

        let dates: Vec<String> = {
            let mut stmt = conn
                .prepare("SELECT due_date FROM bookings WHERE client_id = ?1 ORDER BY due_date")
                .unwrap();
            let rows = stmt
                .query_map(params![client], |row| row.get::<_, String>(0))
                .unwrap();
            rows.map(|r| r.unwrap()).collect()
        };
        // The stale 2025-04-01 booking is gone; only the new batch remains.
        assert_eq!(dates, vec!["2025-04-10", "2025-05-12"]);
    }

    #[test]
    fn commit_rolls_back_when_a_placement_collides() {
        let mut conn = test_conn();
        let client = seed_client(&conn);
        let today = date("2025-03-10");

        commit_plan(&mut conn, client, &[placement("2025-04-10", "09:30")], None, today).unwrap();

        // Another client holds a slot the batch wants; that booking is not
        // pending cleanup fodder, so the insert collides.
        conn.execute(
            "INSERT INTO clients (name, send_mode, contact) VALUES ('Beta', 'Deles', 'b@b.c')",
            [],
        )
        .unwrap();
        let other = conn.last_insert_rowid();
        BookingRepository::new(&conn)
            .create(&BookingInput {
                due_date: date("2025-06-10"),
                time_label: "09:30".into(),
                status_id: None,
                client_id: other,
                responsible: None,
                notes: None,
                is_rectification: false,
            })
            .unwrap();

        let result = commit_plan(
            &mut conn,
            client,
            &[
                placement("2025-05-12", "10:00"),
                placement("2025-06-10", "09:30"),
            ],
            None,
            today,
        );
        assert!(result.is_err());

        // Rollback restored the first batch (deleted by the failed batch's
        // own cleanup) and kept nothing from the new one.
        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM bookings WHERE client_id = ?1",
                params![client],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(count, 1);
        let survivor: String = conn
            .query_row(
                "SELECT due_date FROM bookings WHERE client_id = ?1",
                params![client],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(survivor, "2025-04-10");
    }

    #[test]
    fn commit_without_pending_status_fails_cleanly() {
        let mut conn = test_conn();
        let client = seed_client(&conn);
        conn.execute("DELETE FROM statuses WHERE LOWER(name) = 'pendente'", [])
            .unwrap();

        let err = commit_plan(
            &mut conn,
            client,
            &[placement("2025-04-10", "09:30")],
            None,
            date("2025-03-10"),
        )
        .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ScheduleError>(),
            Some(ScheduleError::MissingPendingStatus)
        ));
    }

    #[test]
    fn month_bounds_span_the_whole_month() {
        let (from, to) = month_bounds(2025, 2).unwrap();
        assert_eq!(from, date("2025-02-01"));
        assert_eq!(to, date("2025-02-28"));
        assert!(month_bounds(2025, 13).is_err());
    }
}
