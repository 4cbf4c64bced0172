use tauri::State;

use crate::{
    db::models::{Client, ClientInput},
    AppState,
};

#[tauri::command]
pub async fn list_clients(state: State<'_, AppState>) -> Result<Vec<Client>, String> {
    state.db.list_clients().await.map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn create_client(
    state: State<'_, AppState>,
    input: ClientInput,
) -> Result<Client, String> {
    state
        .db
        .create_client(input)
        .await
        .map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn update_client(
    state: State<'_, AppState>,
    client_id: i64,
    input: ClientInput,
) -> Result<Client, String> {
    state
        .db
        .update_client(client_id, input)
        .await
        .map_err(|e| e.to_string())
}

/// Deletes the client and, through the schema cascade, every booking of
/// theirs.
#[tauri::command]
pub async fn delete_client(state: State<'_, AppState>, client_id: i64) -> Result<(), String> {
    state
        .db
        .delete_client(client_id)
        .await
        .map_err(|e| e.to_string())
}

/// Bulk insert from the spreadsheet import dialog. All-or-nothing.
#[tauri::command]
pub async fn import_clients(
    state: State<'_, AppState>,
    inputs: Vec<ClientInput>,
) -> Result<usize, String> {
    state
        .db
        .import_clients(inputs)
        .await
        .map_err(|e| e.to_string())
}
