//! CAT (continuous assessment) and SEM (semester) mark reports
//!
//! One document per roll number; `reports` only ever grows.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::lenient;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatReport {
    #[serde(rename = "_id")]
    pub id: String,
    pub rollno: String,
    #[serde(default)]
    pub reports: Vec<CatEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatEntry {
    #[serde(default, deserialize_with = "lenient::integer")]
    pub cat_number: i32,

    #[serde(default, deserialize_with = "lenient::optional_date")]
    pub date: Option<NaiveDate>,

    #[serde(default)]
    pub marks: Vec<SubjectMark>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectMark {
    #[serde(default)]
    pub subject: String,

    #[serde(default, deserialize_with = "lenient::number")]
    pub marks: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SemReport {
    #[serde(rename = "_id")]
    pub id: String,
    pub rollno: String,
    #[serde(default)]
    pub reports: Vec<SemEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SemEntry {
    #[serde(default, deserialize_with = "lenient::integer")]
    pub sem_number: i32,

    #[serde(default, deserialize_with = "lenient::optional_date")]
    pub date: Option<NaiveDate>,

    #[serde(default)]
    pub marks: Vec<CourseMark>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseMark {
    #[serde(default)]
    pub course_code: String,

    #[serde(default)]
    pub course_id: String,

    #[serde(default, deserialize_with = "lenient::number")]
    pub credits: f64,

    #[serde(default, deserialize_with = "lenient::number")]
    pub marks_scored: f64,
}
