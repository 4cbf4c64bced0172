use chrono::NaiveDate;
use tauri::State;

use crate::{
    db::models::{Booking, BookingDetails, BookingInput},
    AppState,
};

#[tauri::command]
pub async fn create_booking(
    state: State<'_, AppState>,
    input: BookingInput,
) -> Result<Booking, String> {
    state
        .db
        .create_booking(input)
        .await
        .map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn update_booking(
    state: State<'_, AppState>,
    booking_id: i64,
    input: BookingInput,
) -> Result<Booking, String> {
    state
        .db
        .update_booking(booking_id, input)
        .await
        .map_err(|e| e.to_string())
}

/// Deletes exactly this booking. Also the second half of the pending
/// conflict flow: once the user confirms, the frontend deletes the old
/// pending booking through here before creating the new one.
#[tauri::command]
pub async fn delete_booking(state: State<'_, AppState>, booking_id: i64) -> Result<(), String> {
    state
        .db
        .delete_booking(booking_id)
        .await
        .map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn get_booking(
    state: State<'_, AppState>,
    booking_id: i64,
) -> Result<Option<Booking>, String> {
    state
        .db
        .get_booking(booking_id)
        .await
        .map_err(|e| e.to_string())
}

/// Joined day agenda for the day-view dialog.
#[tauri::command]
pub async fn get_day_agenda(
    state: State<'_, AppState>,
    date: NaiveDate,
) -> Result<Vec<BookingDetails>, String> {
    state
        .db
        .list_day_agenda(date)
        .await
        .map_err(|e| e.to_string())
}

/// Ordered month listing for the report exporter.
#[tauri::command]
pub async fn get_month_report(
    state: State<'_, AppState>,
    from: NaiveDate,
    to: NaiveDate,
) -> Result<Vec<BookingDetails>, String> {
    state
        .db
        .list_bookings_for_range(from, to)
        .await
        .map_err(|e| e.to_string())
}

/// Bookings on `date` between two time labels, for the reminder poller.
#[tauri::command]
pub async fn get_bookings_in_interval(
    state: State<'_, AppState>,
    date: NaiveDate,
    from_label: String,
    to_label: String,
) -> Result<Vec<BookingDetails>, String> {
    state
        .db
        .list_bookings_in_interval(date, from_label, to_label)
        .await
        .map_err(|e| e.to_string())
}
