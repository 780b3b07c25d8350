//! SAP (student activity points) ledger

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SapRecord {
    #[serde(rename = "_id")]
    pub id: String,

    pub rollno: String,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub department: String,

    /// Sum of activity marks
    #[serde(default)]
    pub sap: f64,

    #[serde(default)]
    pub activities: Vec<SapActivity>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SapActivity {
    pub activity: String,
    pub content: String,
    pub marks: f64,
    pub date: DateTime<Utc>,
}

impl SapRecord {
    pub fn total(&self) -> f64 {
        self.activities.iter().map(|a| a.marks).sum()
    }
}
