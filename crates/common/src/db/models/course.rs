//! Courses

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    #[serde(rename = "_id")]
    pub id: String,

    pub teacher_id: String,

    #[serde(default)]
    pub course_name: String,

    #[serde(default)]
    pub image: String,

    #[serde(default)]
    pub title: String,

    /// Unique across all teachers
    pub course_id: String,

    #[serde(default)]
    pub contents: Vec<String>,

    /// URL or file path to notes
    #[serde(default)]
    pub notes: String,
}
