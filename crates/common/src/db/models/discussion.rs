//! Discussion threads and their replies

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Discussion {
    #[serde(rename = "_id")]
    pub id: String,

    #[serde(default)]
    pub teacher_id: String,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub message: String,

    #[serde(default)]
    pub replies: Vec<Reply>,

    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reply {
    #[serde(rename = "_id")]
    pub id: String,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub reply_message: String,

    pub date: DateTime<Utc>,
}
