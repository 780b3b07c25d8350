//! Document models
//!
//! One module per collection. Field names on the wire match what the
//! front end sends and reads (camelCase, plus the historical `rollno`,
//! `rollNo` and `teacherid` spellings).

mod assessment;
mod attendance;
mod course;
mod discussion;
mod live_session;
mod platform;
mod report;
mod sap;
mod student;
mod teacher;

pub mod lenient;

pub use assessment::Assessment;
pub use attendance::{Attendance, AttendanceStatus, PeriodStatus};
pub use course::Course;
pub use discussion::{Discussion, Reply};
pub use live_session::LiveSession;
pub use platform::{Platform, PlatformInput};
pub use report::{CatEntry, CatReport, CourseMark, SemEntry, SemReport, SubjectMark};
pub use sap::{SapActivity, SapRecord};
pub use student::{DailyAttendance, Student, Subject};
pub use teacher::{Teacher, TeacherProfile, TeacherUpdate};

/// Collection names, shared by every store backend
pub mod collections {
    pub const TEACHERS: &str = "teachers";
    pub const STUDENTS: &str = "managestudents";
    pub const PLATFORMS: &str = "platforms";
    pub const COURSES: &str = "courses";
    pub const ASSESSMENTS: &str = "assessments";
    pub const DISCUSSIONS: &str = "discussions";
    pub const ATTENDANCES: &str = "attendances";
    pub const LIVE_SESSIONS: &str = "livesessions";
    pub const CAT_REPORTS: &str = "cats";
    pub const SEM_REPORTS: &str = "sems";
    pub const SAP_RECORDS: &str = "saps";
}
