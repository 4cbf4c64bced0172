use tauri::State;

use crate::{
    db::models::{Status, StatusInput},
    AppState,
};

#[tauri::command]
pub async fn list_statuses(state: State<'_, AppState>) -> Result<Vec<Status>, String> {
    state.db.list_statuses().await.map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn create_status(
    state: State<'_, AppState>,
    input: StatusInput,
) -> Result<Status, String> {
    state
        .db
        .create_status(input)
        .await
        .map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn update_status(
    state: State<'_, AppState>,
    status_id: i64,
    input: StatusInput,
) -> Result<Status, String> {
    state
        .db
        .update_status(status_id, input)
        .await
        .map_err(|e| e.to_string())
}

/// Deletes a status; bookings that carried it keep existing with no status.
#[tauri::command]
pub async fn delete_status(state: State<'_, AppState>, status_id: i64) -> Result<(), String> {
    state
        .db
        .delete_status(status_id)
        .await
        .map_err(|e| e.to_string())
}
