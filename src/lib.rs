mod booking_commands;
mod client_commands;
mod db;
mod holiday_commands;
mod scheduling;
mod settings;
mod status_commands;

use db::Database;
use settings::{RecurrenceDefaults, SettingsStore};
use tauri::{Manager, State};

use booking_commands::{
    create_booking, delete_booking, get_booking, get_bookings_in_interval, get_day_agenda,
    get_month_report, update_booking,
};
use client_commands::{create_client, delete_client, import_clients, list_clients, update_client};
use holiday_commands::{delete_holiday, get_holiday, list_holidays, upsert_holiday};
use scheduling::commands::{
    commit_recurrence, get_day_slots, get_month_status_map, has_pending_conflict, plan_recurrence,
};
use scheduling::slots::SlotPlanConfig;
use status_commands::{create_status, delete_status, list_statuses, update_status};

pub(crate) struct AppState {
    pub(crate) db: Database,
    pub(crate) settings: SettingsStore,
}

#[tauri::command]
fn get_slot_plan_config(state: State<AppState>) -> Result<SlotPlanConfig, String> {
    Ok(state.settings.slot_plan())
}

#[tauri::command]
fn set_slot_plan_config(config: SlotPlanConfig, state: State<AppState>) -> Result<(), String> {
    state
        .settings
        .update_slot_plan(config)
        .map_err(|e| e.to_string())
}

#[tauri::command]
fn get_recurrence_defaults(state: State<AppState>) -> Result<RecurrenceDefaults, String> {
    Ok(state.settings.recurrence_defaults())
}

#[tauri::command]
fn set_recurrence_defaults(
    defaults: RecurrenceDefaults,
    state: State<AppState>,
) -> Result<(), String> {
    state
        .settings
        .update_recurrence_defaults(defaults)
        .map_err(|e| e.to_string())
}

#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    // Initialize logging (reads RUST_LOG env var)
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    log::info!("Agendador starting up...");

    tauri::Builder::default()
        .plugin(tauri_plugin_opener::init())
        .setup(|app| {
            let result = (|| -> anyhow::Result<()> {
                let app_data_dir = app
                    .path()
                    .app_data_dir()
                    .map_err(|err| anyhow::anyhow!(err))?;
                std::fs::create_dir_all(&app_data_dir)?;

                let db_path = app_data_dir.join("agendador.sqlite3");
                let database = Database::new(db_path)?;

                let settings_path = app_data_dir.join("settings.json");
                let settings_store = SettingsStore::new(settings_path)?;

                app.manage(AppState {
                    db: database,
                    settings: settings_store,
                });

                Ok(())
            })();

            result.map_err(|err| err.into())
        })
        .invoke_handler(tauri::generate_handler![
            get_day_slots,
            get_month_status_map,
            has_pending_conflict,
            plan_recurrence,
            commit_recurrence,
            create_booking,
            update_booking,
            delete_booking,
            get_booking,
            get_day_agenda,
            get_month_report,
            get_bookings_in_interval,
            list_clients,
            create_client,
            update_client,
            delete_client,
            import_clients,
            list_statuses,
            create_status,
            update_status,
            delete_status,
            get_holiday,
            list_holidays,
            upsert_holiday,
            delete_holiday,
            get_slot_plan_config,
            set_slot_plan_config,
            get_recurrence_defaults,
            set_recurrence_defaults,
        ])
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}
