//! Per-student, per-date attendance with one status per period

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::lenient;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attendance {
    #[serde(rename = "_id")]
    pub id: String,

    pub roll_no: String,

    pub date: NaiveDate,

    pub day: String,

    #[serde(default)]
    pub attendance: Vec<PeriodStatus>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodStatus {
    #[serde(deserialize_with = "lenient::integer")]
    pub period_number: i32,

    pub status: AttendanceStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttendanceStatus {
    Present,
    Absent,
}

impl Attendance {
    pub fn present_periods(&self) -> usize {
        self.attendance
            .iter()
            .filter(|p| p.status == AttendanceStatus::Present)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_spelling() {
        let period: PeriodStatus =
            serde_json::from_str(r#"{"periodNumber":1,"status":"Present"}"#).unwrap();
        assert_eq!(period.status, AttendanceStatus::Present);

        assert!(serde_json::from_str::<PeriodStatus>(r#"{"periodNumber":1,"status":"Late"}"#).is_err());
    }
}
