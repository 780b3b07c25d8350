//! Reporting computations
//!
//! Pure functions over stored documents that produce the figures the
//! dashboards display: subject averages, attendance percentages, the
//! filtered and sorted roster, and a per-student summary.

use crate::db::models::{Attendance, CatReport, SapRecord, SemReport, Student, Subject};
use crate::ATTENDANCE_THRESHOLD_PERCENT;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

// ============================================================================
// Averages and percentages
// ============================================================================

/// Mean subject mark, 0 when the student has no subjects
pub fn subject_average(subjects: &[Subject]) -> f64 {
    if subjects.is_empty() {
        return 0.0;
    }
    subjects.iter().map(|s| s.marks).sum::<f64>() / subjects.len() as f64
}

/// Present periods over recorded periods, as a percentage
pub fn attendance_day_percentage(record: &Attendance) -> f64 {
    percentage(record.present_periods(), record.attendance.len())
}

fn percentage(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayAttendance {
    pub date: NaiveDate,
    pub day: String,
    pub percentage: f64,
    pub below_threshold: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceOverview {
    pub total_periods: usize,
    pub attended_periods: usize,
    pub percentage: f64,
    pub below_threshold: bool,
    pub days: Vec<DayAttendance>,
}

/// Aggregate attendance across days. Days keep the order they were given in.
pub fn attendance_overview(records: &[Attendance]) -> AttendanceOverview {
    let days: Vec<DayAttendance> = records
        .iter()
        .map(|record| {
            let percentage = attendance_day_percentage(record);
            DayAttendance {
                date: record.date,
                day: record.day.clone(),
                percentage,
                below_threshold: percentage < ATTENDANCE_THRESHOLD_PERCENT,
            }
        })
        .collect();

    let total_periods = records.iter().map(|r| r.attendance.len()).sum();
    let attended_periods = records.iter().map(Attendance::present_periods).sum();
    let percentage = percentage(attended_periods, total_periods);

    AttendanceOverview {
        total_periods,
        attended_periods,
        percentage,
        below_threshold: total_periods > 0 && percentage < ATTENDANCE_THRESHOLD_PERCENT,
        days,
    }
}

// ============================================================================
// Roster
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

/// Query-string filters for the tracking view. Empty strings are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RosterFilter {
    pub name: Option<String>,
    pub email: Option<String>,
    pub rollno: Option<String>,
    pub department: Option<String>,
    pub year: Option<String>,
    pub section: Option<String>,
    pub phone: Option<String>,
    /// Sort by average marks; by name when absent
    pub sort: Option<SortOrder>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterRow {
    #[serde(flatten)]
    pub student: Student,
    pub average_marks: f64,
}

fn active(filter: &Option<String>) -> Option<String> {
    filter
        .as_deref()
        .map(str::trim)
        .filter(|f| !f.is_empty())
        .map(str::to_lowercase)
}

fn contains(field: &str, needle: &Option<String>) -> bool {
    needle
        .as_ref()
        .map_or(true, |n| field.to_lowercase().contains(n.as_str()))
}

pub fn filter_roster(students: Vec<Student>, filter: &RosterFilter) -> Vec<RosterRow> {
    let name = active(&filter.name);
    let email = active(&filter.email);
    let rollno = active(&filter.rollno);
    let department = active(&filter.department);
    let year = active(&filter.year);
    let section = active(&filter.section);
    let phone = active(&filter.phone);

    let mut rows: Vec<RosterRow> = students
        .into_iter()
        .filter(|s| {
            contains(&s.name, &name)
                && contains(&s.email, &email)
                && contains(&s.rollno, &rollno)
                && contains(&s.year, &year)
                && contains(&s.section, &section)
                && contains(&s.phone, &phone)
                && department
                    .as_ref()
                    .map_or(true, |d| s.department.to_lowercase() == *d)
        })
        .map(|student| RosterRow {
            average_marks: subject_average(&student.subjects),
            student,
        })
        .collect();

    match filter.sort {
        Some(SortOrder::Asc) => rows.sort_by(|a, b| by_average(a, b)),
        Some(SortOrder::Desc) => rows.sort_by(|a, b| by_average(b, a)),
        None => rows.sort_by(|a, b| {
            a.student
                .name
                .to_lowercase()
                .cmp(&b.student.name.to_lowercase())
        }),
    }

    rows
}

fn by_average(a: &RosterRow, b: &RosterRow) -> Ordering {
    a.average_marks
        .partial_cmp(&b.average_marks)
        .unwrap_or(Ordering::Equal)
}

// ============================================================================
// Student summary
// ============================================================================

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentSummary {
    pub rollno: String,
    pub name: String,
    pub department: String,
    pub year: String,
    pub section: String,
    pub average_marks: f64,
    pub attendance: AttendanceOverview,
    pub cat_exams: usize,
    /// Mean subject mark of the most recently appended CAT
    pub latest_cat_average: Option<f64>,
    pub semesters: usize,
    /// Mean marks scored in the most recently appended semester
    pub latest_sem_average: Option<f64>,
    pub sap: f64,
}

fn mean(values: impl ExactSizeIterator<Item = f64>) -> Option<f64> {
    let n = values.len();
    if n == 0 {
        return None;
    }
    Some(values.sum::<f64>() / n as f64)
}

/// Combine everything recorded for one student
pub fn student_summary(
    student: &Student,
    attendance: &[Attendance],
    cat: Option<&CatReport>,
    sem: Option<&SemReport>,
    sap: Option<&SapRecord>,
) -> StudentSummary {
    let cat_entries = cat.map(|c| c.reports.as_slice()).unwrap_or_default();
    let sem_entries = sem.map(|s| s.reports.as_slice()).unwrap_or_default();

    StudentSummary {
        rollno: student.rollno.clone(),
        name: student.name.clone(),
        department: student.department.clone(),
        year: student.year.clone(),
        section: student.section.clone(),
        average_marks: subject_average(&student.subjects),
        attendance: attendance_overview(attendance),
        cat_exams: cat_entries.len(),
        latest_cat_average: cat_entries
            .last()
            .and_then(|e| mean(e.marks.iter().map(|m| m.marks))),
        semesters: sem_entries.len(),
        latest_sem_average: sem_entries
            .last()
            .and_then(|e| mean(e.marks.iter().map(|m| m.marks_scored))),
        sap: sap.map_or(student.sap, SapRecord::total),
    }
}
