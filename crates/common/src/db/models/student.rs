//! Student roster entries

use serde::{Deserialize, Serialize};

use super::lenient;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    #[serde(rename = "_id")]
    pub id: String,

    /// Owning teacher
    pub teacher_id: String,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub email: String,

    /// Unique across all teachers
    pub rollno: String,

    #[serde(default)]
    pub phone: String,

    #[serde(default)]
    pub address: String,

    #[serde(default)]
    pub department: String,

    #[serde(default)]
    pub class_name: String,

    #[serde(default)]
    pub section: String,

    #[serde(default)]
    pub year: String,

    #[serde(default)]
    pub subjects: Vec<Subject>,

    #[serde(default)]
    pub attendance: Vec<DailyAttendance>,

    /// Cumulative SAP points
    #[serde(default)]
    pub sap: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subject {
    #[serde(default)]
    pub subject_name: String,

    #[serde(default, deserialize_with = "lenient::number")]
    pub marks: f64,
}

/// Period counts embedded in the roster entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyAttendance {
    #[serde(default)]
    pub date: String,

    #[serde(default)]
    pub day: String,

    #[serde(default, deserialize_with = "lenient::integer")]
    pub total_period: i32,

    #[serde(default, deserialize_with = "lenient::integer")]
    pub attended_period: i32,
}
