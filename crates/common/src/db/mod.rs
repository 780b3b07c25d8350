//! Document store layer for ClassDesk
//!
//! Provides:
//! - Document models, one per collection
//! - The `DocumentStore` trait every backend implements
//! - A MongoDB backend and an in-memory backend
//! - Backend selection from configuration

mod memory;
pub mod models;
mod mongo;

pub use memory::MemoryStore;
pub use mongo::MongoStore;

use crate::config::{DatabaseConfig, StoreBackend};
use crate::errors::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use models::*;
use std::sync::Arc;
use tracing::info;

/// Shared handle to the configured store
pub type SharedStore = Arc<dyn DocumentStore>;

/// Collection operations used by the HTTP layer.
///
/// Lookups return `Ok(None)` or an empty `Vec` for unknown keys; only
/// backend failures are errors. Inserts that violate a unique key return
/// `AppError::Duplicate`.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Check backend connectivity
    async fn ping(&self) -> Result<()>;

    // ========================================================================
    // Teachers
    // ========================================================================

    async fn find_teacher_by_email_or_id(&self, email: &str, teacher_id: &str) -> Result<Option<Teacher>>;

    /// Match `identifier` against either email or teacherId
    async fn find_teacher_by_identifier(&self, identifier: &str) -> Result<Option<Teacher>>;

    async fn find_teacher(&self, teacher_id: &str) -> Result<Option<Teacher>>;

    async fn insert_teacher(&self, teacher: Teacher) -> Result<()>;

    async fn update_teacher(&self, teacher_id: &str, update: &TeacherUpdate) -> Result<Option<Teacher>>;

    // ========================================================================
    // Students
    // ========================================================================

    async fn insert_student(&self, student: Student) -> Result<()>;

    async fn list_students(&self, teacher_id: &str) -> Result<Vec<Student>>;

    async fn find_student(&self, rollno: &str) -> Result<Option<Student>>;

    /// Add SAP points to the roster entry
    async fn add_student_sap(&self, rollno: &str, points: f64) -> Result<Option<Student>>;

    // ========================================================================
    // Platforms
    // ========================================================================

    /// All platforms, or only those owned by `teacherid`
    async fn list_platforms(&self, teacherid: Option<&str>) -> Result<Vec<Platform>>;

    async fn insert_platform(&self, platform: Platform) -> Result<()>;

    async fn update_platform(&self, id: &str, input: &PlatformInput) -> Result<Option<Platform>>;

    /// Returns false when nothing matched
    async fn delete_platform(&self, id: &str) -> Result<bool>;

    // ========================================================================
    // Courses
    // ========================================================================

    async fn find_course(&self, course_id: &str) -> Result<Option<Course>>;

    async fn insert_course(&self, course: Course) -> Result<()>;

    async fn list_courses(&self, teacher_id: &str) -> Result<Vec<Course>>;

    // ========================================================================
    // Assessments
    // ========================================================================

    async fn insert_assessment(&self, assessment: Assessment) -> Result<()>;

    async fn list_assessments(&self, teacher_id: &str) -> Result<Vec<Assessment>>;

    async fn find_assessment(&self, id: &str) -> Result<Option<Assessment>>;

    // ========================================================================
    // Discussions
    // ========================================================================

    async fn insert_discussion(&self, discussion: Discussion) -> Result<()>;

    async fn update_discussion_message(&self, id: &str, message: &str) -> Result<Option<Discussion>>;

    async fn push_discussion_reply(&self, id: &str, reply: Reply) -> Result<Option<Discussion>>;

    async fn list_discussions(&self, teacher_id: &str) -> Result<Vec<Discussion>>;

    // ========================================================================
    // Attendance
    // ========================================================================

    async fn find_attendance(&self, roll_no: &str, date: NaiveDate) -> Result<Option<Attendance>>;

    async fn insert_attendance(&self, attendance: Attendance) -> Result<()>;

    /// Records for one student, oldest date first
    async fn list_attendance(&self, roll_no: &str) -> Result<Vec<Attendance>>;

    // ========================================================================
    // Live sessions
    // ========================================================================

    async fn insert_live_session(&self, session: LiveSession) -> Result<()>;

    async fn list_live_sessions(&self, teacher_id: &str) -> Result<Vec<LiveSession>>;

    // ========================================================================
    // CAT / SEM reports
    // ========================================================================

    /// Find-or-create the student's CAT document, then append `entry`
    async fn append_cat_report(&self, rollno: &str, entry: CatEntry) -> Result<CatReport>;

    /// Find-or-create the student's SEM document, then append `entry`
    async fn append_sem_report(&self, rollno: &str, entry: SemEntry) -> Result<SemReport>;

    async fn find_cat_report(&self, rollno: &str) -> Result<Option<CatReport>>;

    async fn find_sem_report(&self, rollno: &str) -> Result<Option<SemReport>>;

    // ========================================================================
    // SAP
    // ========================================================================

    /// Find-or-create the student's SAP ledger, append `activity`, and
    /// return the ledger with its recomputed total
    async fn append_sap_activity(
        &self,
        rollno: &str,
        name: &str,
        department: &str,
        activity: SapActivity,
    ) -> Result<SapRecord>;

    async fn find_sap_record(&self, rollno: &str) -> Result<Option<SapRecord>>;
}

/// Connect to the backend named in the configuration
pub async fn connect(config: &DatabaseConfig) -> Result<SharedStore> {
    match config.backend {
        StoreBackend::Mongodb => {
            let store = MongoStore::connect(config).await?;
            Ok(Arc::new(store))
        }
        StoreBackend::Memory => {
            info!("Using in-memory document store; data is lost on restart");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}
