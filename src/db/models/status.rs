use serde::{Deserialize, Serialize};

/// A booking status with its calendar color. Names are matched
/// case-insensitively everywhere they drive behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Status {
    pub id: i64,
    pub name: String,
    pub color_hex: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusInput {
    pub name: String,
    pub color_hex: String,
}
