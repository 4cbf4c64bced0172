use chrono::NaiveDate;
use tauri::State;

use crate::{
    db::models::{Holiday, HolidayInput},
    AppState,
};

#[tauri::command]
pub async fn get_holiday(
    state: State<'_, AppState>,
    date: NaiveDate,
) -> Result<Option<Holiday>, String> {
    state.db.get_holiday(date).await.map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn list_holidays(
    state: State<'_, AppState>,
    from: NaiveDate,
    to: NaiveDate,
) -> Result<Vec<Holiday>, String> {
    state
        .db
        .list_holidays_for_range(from, to)
        .await
        .map_err(|e| e.to_string())
}

/// One holiday per date; saving again replaces the kind and name.
#[tauri::command]
pub async fn upsert_holiday(
    state: State<'_, AppState>,
    input: HolidayInput,
) -> Result<Holiday, String> {
    state
        .db
        .upsert_holiday(input)
        .await
        .map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn delete_holiday(state: State<'_, AppState>, date: NaiveDate) -> Result<(), String> {
    state
        .db
        .delete_holiday(date)
        .await
        .map_err(|e| e.to_string())
}
