use serde::{Deserialize, Serialize};

/// A client whose deliveries get scheduled. Everything beyond `name` and
/// `contact` is display metadata with no scheduling meaning.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    pub id: i64,
    pub name: String,
    pub send_mode: String,
    pub contact: String,
    pub issues_receipt: bool,
    pub counts_xmls: bool,
    pub tier: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientInput {
    pub name: String,
    pub send_mode: String,
    pub contact: String,
    #[serde(default)]
    pub issues_receipt: bool,
    #[serde(default)]
    pub counts_xmls: bool,
    pub tier: Option<String>,
    pub notes: Option<String>,
}
