//! Scheduled live sessions

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveSession {
    #[serde(rename = "_id")]
    pub id: String,
    pub teacher_id: String,
    pub name: String,
    pub time: String,
    pub date: NaiveDate,
    pub link: String,
}
