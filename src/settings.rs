use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf, sync::RwLock};

use crate::scheduling::slots::SlotPlanConfig;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecurrenceDefaults {
    /// Pre-selected span for the recurrence dialog. 4, 8 or 12.
    pub span_months: u32,
}

impl Default for RecurrenceDefaults {
    fn default() -> Self {
        Self { span_months: 4 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct UserSettings {
    slot_plan: SlotPlanConfig,
    recurrence: RecurrenceDefaults,
}

/// JSON-backed settings file. Loaded once at startup; the scheduling
/// functions receive the values by parameter rather than reading any
/// global state.
pub struct SettingsStore {
    path: PathBuf,
    data: RwLock<UserSettings>,
}

impl SettingsStore {
    pub fn new(path: PathBuf) -> Result<Self> {
        let data = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read settings from {}", path.display()))?;
            serde_json::from_str(&contents).unwrap_or_default()
        } else {
            UserSettings::default()
        };

        Ok(Self {
            path,
            data: RwLock::new(data),
        })
    }

    pub fn slot_plan(&self) -> SlotPlanConfig {
        self.data.read().unwrap().slot_plan.clone()
    }

    pub fn update_slot_plan(&self, config: SlotPlanConfig) -> Result<()> {
        let mut guard = self.data.write().unwrap();
        guard.slot_plan = config;
        self.persist(&guard)
    }

    pub fn recurrence_defaults(&self) -> RecurrenceDefaults {
        self.data.read().unwrap().recurrence.clone()
    }

    pub fn update_recurrence_defaults(&self, defaults: RecurrenceDefaults) -> Result<()> {
        let mut guard = self.data.write().unwrap();
        guard.recurrence = defaults;
        self.persist(&guard)
    }

    fn persist(&self, data: &UserSettings) -> Result<()> {
        let serialized = serde_json::to_string_pretty(data)?;
        fs::write(&self.path, serialized)
            .with_context(|| format!("Failed to write settings to {}", self.path.display()))
    }
}
