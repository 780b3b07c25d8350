//! Assessments with uploaded question images

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assessment {
    #[serde(rename = "_id")]
    pub id: String,

    pub teacher_id: String,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub marks: f64,

    /// Public paths under the uploads prefix
    #[serde(default)]
    pub images: Vec<String>,

    #[serde(default)]
    pub start_date: Option<NaiveDate>,

    #[serde(default)]
    pub end_date: Option<NaiveDate>,

    #[serde(default)]
    pub start_time: String,

    #[serde(default)]
    pub end_time: String,
}
