//! In-memory `DocumentStore`
//!
//! Used by tests and by local runs with `database.backend = "memory"`.
//! Applies the same uniqueness rules the MongoDB indexes enforce.

use super::models::*;
use super::DocumentStore;
use crate::errors::{AppError, Result};
use crate::new_document_id;
use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::RwLock;

#[derive(Default)]
pub struct MemoryStore {
    teachers: RwLock<Vec<Teacher>>,
    students: RwLock<Vec<Student>>,
    platforms: RwLock<Vec<Platform>>,
    courses: RwLock<Vec<Course>>,
    assessments: RwLock<Vec<Assessment>>,
    discussions: RwLock<Vec<Discussion>>,
    attendances: RwLock<Vec<Attendance>>,
    live_sessions: RwLock<Vec<LiveSession>>,
    cat_reports: RwLock<Vec<CatReport>>,
    sem_reports: RwLock<Vec<SemReport>>,
    sap_records: RwLock<Vec<SapRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn duplicate(message: &str) -> AppError {
    AppError::Duplicate { message: message.to_string() }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn ping(&self) -> Result<()> {
        Ok(())
    }

    // ========================================================================
    // Teachers
    // ========================================================================

    async fn find_teacher_by_email_or_id(&self, email: &str, teacher_id: &str) -> Result<Option<Teacher>> {
        let teachers = self.teachers.read().await;
        Ok(teachers
            .iter()
            .find(|t| t.email == email || t.teacher_id == teacher_id)
            .cloned())
    }

    async fn find_teacher_by_identifier(&self, identifier: &str) -> Result<Option<Teacher>> {
        self.find_teacher_by_email_or_id(identifier, identifier).await
    }

    async fn find_teacher(&self, teacher_id: &str) -> Result<Option<Teacher>> {
        let teachers = self.teachers.read().await;
        Ok(teachers.iter().find(|t| t.teacher_id == teacher_id).cloned())
    }

    async fn insert_teacher(&self, teacher: Teacher) -> Result<()> {
        let mut teachers = self.teachers.write().await;
        if teachers
            .iter()
            .any(|t| t.email == teacher.email || t.teacher_id == teacher.teacher_id)
        {
            return Err(duplicate("Teacher with this email or ID already exists"));
        }
        teachers.push(teacher);
        Ok(())
    }

    async fn update_teacher(&self, teacher_id: &str, update: &TeacherUpdate) -> Result<Option<Teacher>> {
        let mut teachers = self.teachers.write().await;

        if let Some(ref email) = update.email {
            if teachers.iter().any(|t| &t.email == email && t.teacher_id != teacher_id) {
                return Err(duplicate("Another teacher already uses this email"));
            }
        }

        Ok(teachers
            .iter_mut()
            .find(|t| t.teacher_id == teacher_id)
            .map(|t| {
                update.apply(t);
                t.clone()
            }))
    }

    // ========================================================================
    // Students
    // ========================================================================

    async fn insert_student(&self, student: Student) -> Result<()> {
        let mut students = self.students.write().await;
        if students.iter().any(|s| s.rollno == student.rollno) {
            return Err(duplicate("A student with this roll number already exists"));
        }
        students.push(student);
        Ok(())
    }

    async fn list_students(&self, teacher_id: &str) -> Result<Vec<Student>> {
        let students = self.students.read().await;
        Ok(students.iter().filter(|s| s.teacher_id == teacher_id).cloned().collect())
    }

    async fn find_student(&self, rollno: &str) -> Result<Option<Student>> {
        let students = self.students.read().await;
        Ok(students.iter().find(|s| s.rollno == rollno).cloned())
    }

    async fn add_student_sap(&self, rollno: &str, points: f64) -> Result<Option<Student>> {
        let mut students = self.students.write().await;
        Ok(students.iter_mut().find(|s| s.rollno == rollno).map(|s| {
            s.sap += points;
            s.clone()
        }))
    }

    // ========================================================================
    // Platforms
    // ========================================================================

    async fn list_platforms(&self, teacherid: Option<&str>) -> Result<Vec<Platform>> {
        let platforms = self.platforms.read().await;
        Ok(platforms
            .iter()
            .filter(|p| teacherid.map_or(true, |t| p.teacherid == t))
            .cloned()
            .collect())
    }

    async fn insert_platform(&self, platform: Platform) -> Result<()> {
        self.platforms.write().await.push(platform);
        Ok(())
    }

    async fn update_platform(&self, id: &str, input: &PlatformInput) -> Result<Option<Platform>> {
        let mut platforms = self.platforms.write().await;
        Ok(platforms.iter_mut().find(|p| p.id == id).map(|p| {
            p.apply(input);
            p.clone()
        }))
    }

    async fn delete_platform(&self, id: &str) -> Result<bool> {
        let mut platforms = self.platforms.write().await;
        let before = platforms.len();
        platforms.retain(|p| p.id != id);
        Ok(platforms.len() < before)
    }

    // ========================================================================
    // Courses
    // ========================================================================

    async fn find_course(&self, course_id: &str) -> Result<Option<Course>> {
        let courses = self.courses.read().await;
        Ok(courses.iter().find(|c| c.course_id == course_id).cloned())
    }

    async fn insert_course(&self, course: Course) -> Result<()> {
        let mut courses = self.courses.write().await;
        if courses.iter().any(|c| c.course_id == course.course_id) {
            return Err(duplicate("Course ID already exists"));
        }
        courses.push(course);
        Ok(())
    }

    async fn list_courses(&self, teacher_id: &str) -> Result<Vec<Course>> {
        let courses = self.courses.read().await;
        Ok(courses.iter().filter(|c| c.teacher_id == teacher_id).cloned().collect())
    }

    // ========================================================================
    // Assessments
    // ========================================================================

    async fn insert_assessment(&self, assessment: Assessment) -> Result<()> {
        self.assessments.write().await.push(assessment);
        Ok(())
    }

    async fn list_assessments(&self, teacher_id: &str) -> Result<Vec<Assessment>> {
        let assessments = self.assessments.read().await;
        Ok(assessments.iter().filter(|a| a.teacher_id == teacher_id).cloned().collect())
    }

    async fn find_assessment(&self, id: &str) -> Result<Option<Assessment>> {
        let assessments = self.assessments.read().await;
        Ok(assessments.iter().find(|a| a.id == id).cloned())
    }

    // ========================================================================
    // Discussions
    // ========================================================================

    async fn insert_discussion(&self, discussion: Discussion) -> Result<()> {
        self.discussions.write().await.push(discussion);
        Ok(())
    }

    async fn update_discussion_message(&self, id: &str, message: &str) -> Result<Option<Discussion>> {
        let mut discussions = self.discussions.write().await;
        Ok(discussions.iter_mut().find(|d| d.id == id).map(|d| {
            d.message = message.to_string();
            d.clone()
        }))
    }

    async fn push_discussion_reply(&self, id: &str, reply: Reply) -> Result<Option<Discussion>> {
        let mut discussions = self.discussions.write().await;
        Ok(discussions.iter_mut().find(|d| d.id == id).map(|d| {
            d.replies.push(reply);
            d.clone()
        }))
    }

    async fn list_discussions(&self, teacher_id: &str) -> Result<Vec<Discussion>> {
        let discussions = self.discussions.read().await;
        Ok(discussions.iter().filter(|d| d.teacher_id == teacher_id).cloned().collect())
    }

    // ========================================================================
    // Attendance
    // ========================================================================

    async fn find_attendance(&self, roll_no: &str, date: NaiveDate) -> Result<Option<Attendance>> {
        let attendances = self.attendances.read().await;
        Ok(attendances
            .iter()
            .find(|a| a.roll_no == roll_no && a.date == date)
            .cloned())
    }

    async fn insert_attendance(&self, attendance: Attendance) -> Result<()> {
        let mut attendances = self.attendances.write().await;
        if attendances
            .iter()
            .any(|a| a.roll_no == attendance.roll_no && a.date == attendance.date)
        {
            return Err(duplicate("Attendance already exists for this date"));
        }
        attendances.push(attendance);
        Ok(())
    }

    async fn list_attendance(&self, roll_no: &str) -> Result<Vec<Attendance>> {
        let attendances = self.attendances.read().await;
        let mut records: Vec<Attendance> =
            attendances.iter().filter(|a| a.roll_no == roll_no).cloned().collect();
        records.sort_by_key(|a| a.date);
        Ok(records)
    }

    // ========================================================================
    // Live sessions
    // ========================================================================

    async fn insert_live_session(&self, session: LiveSession) -> Result<()> {
        self.live_sessions.write().await.push(session);
        Ok(())
    }

    async fn list_live_sessions(&self, teacher_id: &str) -> Result<Vec<LiveSession>> {
        let sessions = self.live_sessions.read().await;
        Ok(sessions.iter().filter(|s| s.teacher_id == teacher_id).cloned().collect())
    }

    // ========================================================================
    // CAT / SEM reports
    // ========================================================================

    async fn append_cat_report(&self, rollno: &str, entry: CatEntry) -> Result<CatReport> {
        let mut reports = self.cat_reports.write().await;
        match reports.iter_mut().find(|r| r.rollno == rollno) {
            Some(existing) => {
                existing.reports.push(entry);
                Ok(existing.clone())
            }
            None => {
                let report = CatReport {
                    id: new_document_id(),
                    rollno: rollno.to_string(),
                    reports: vec![entry],
                };
                reports.push(report.clone());
                Ok(report)
            }
        }
    }

    async fn append_sem_report(&self, rollno: &str, entry: SemEntry) -> Result<SemReport> {
        let mut reports = self.sem_reports.write().await;
        match reports.iter_mut().find(|r| r.rollno == rollno) {
            Some(existing) => {
                existing.reports.push(entry);
                Ok(existing.clone())
            }
            None => {
                let report = SemReport {
                    id: new_document_id(),
                    rollno: rollno.to_string(),
                    reports: vec![entry],
                };
                reports.push(report.clone());
                Ok(report)
            }
        }
    }

    async fn find_cat_report(&self, rollno: &str) -> Result<Option<CatReport>> {
        let reports = self.cat_reports.read().await;
        Ok(reports.iter().find(|r| r.rollno == rollno).cloned())
    }

    async fn find_sem_report(&self, rollno: &str) -> Result<Option<SemReport>> {
        let reports = self.sem_reports.read().await;
        Ok(reports.iter().find(|r| r.rollno == rollno).cloned())
    }

    // ========================================================================
    // SAP
    // ========================================================================

    async fn append_sap_activity(
        &self,
        rollno: &str,
        name: &str,
        department: &str,
        activity: SapActivity,
    ) -> Result<SapRecord> {
        let mut records = self.sap_records.write().await;
        let index = match records.iter().position(|r| r.rollno == rollno) {
            Some(i) => i,
            None => {
                records.push(SapRecord {
                    id: new_document_id(),
                    rollno: rollno.to_string(),
                    name: name.to_string(),
                    department: department.to_string(),
                    sap: 0.0,
                    activities: Vec::new(),
                });
                records.len() - 1
            }
        };

        let record = &mut records[index];
        record.name = name.to_string();
        record.department = department.to_string();
        record.activities.push(activity);
        record.sap = record.total();
        Ok(record.clone())
    }

    async fn find_sap_record(&self, rollno: &str) -> Result<Option<SapRecord>> {
        let records = self.sap_records.read().await;
        Ok(records.iter().find(|r| r.rollno == rollno).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use tokio_test::{assert_err, assert_ok};

    fn teacher(email: &str, teacher_id: &str) -> Teacher {
        Teacher {
            id: new_document_id(),
            name: "Teacher".into(),
            email: email.into(),
            teacher_id: teacher_id.into(),
            dob: None,
            gender: String::new(),
            experience: String::new(),
            specialization: String::new(),
            phone: String::new(),
            address: String::new(),
            password: "hash".into(),
            created_at: Utc::now(),
        }
    }

    fn student(teacher_id: &str, rollno: &str) -> Student {
        Student {
            id: new_document_id(),
            teacher_id: teacher_id.into(),
            name: format!("Student {}", rollno),
            email: String::new(),
            rollno: rollno.into(),
            phone: String::new(),
            address: String::new(),
            department: "CSE".into(),
            class_name: String::new(),
            section: "A".into(),
            year: "2".into(),
            subjects: Vec::new(),
            attendance: Vec::new(),
            sap: 0.0,
        }
    }

    fn cat(number: i32) -> CatEntry {
        CatEntry {
            cat_number: number,
            date: NaiveDate::from_ymd_opt(2024, 2, number as u32),
            marks: vec![SubjectMark { subject: "Maths".into(), marks: 40.0 + number as f64 }],
        }
    }

    #[tokio::test]
    async fn test_teacher_uniqueness() {
        let store = MemoryStore::new();
        assert_ok!(store.insert_teacher(teacher("a@school.edu", "T1")).await);

        let same_email = store.insert_teacher(teacher("a@school.edu", "T2")).await;
        assert!(matches!(same_email, Err(AppError::Duplicate { .. })));

        let same_id = store.insert_teacher(teacher("b@school.edu", "T1")).await;
        assert!(matches!(same_id, Err(AppError::Duplicate { .. })));

        let found = store.find_teacher_by_identifier("a@school.edu").await.unwrap();
        assert_eq!(found.unwrap().teacher_id, "T1");
        assert!(store.find_teacher_by_identifier("T1").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_update_teacher_unknown_is_none() {
        let store = MemoryStore::new();
        let update = TeacherUpdate { phone: Some("123".into()), ..Default::default() };
        assert!(store.update_teacher("nobody", &update).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_students_scoped_by_teacher() {
        let store = MemoryStore::new();
        assert_ok!(store.insert_student(student("T1", "R1")).await);
        assert_ok!(store.insert_student(student("T1", "R2")).await);
        assert_ok!(store.insert_student(student("T2", "R3")).await);

        assert_eq!(store.list_students("T1").await.unwrap().len(), 2);
        assert!(store.list_students("unknown").await.unwrap().is_empty());

        let dup = store.insert_student(student("T2", "R1")).await;
        assert!(matches!(dup, Err(AppError::Duplicate { .. })));
    }

    #[tokio::test]
    async fn test_cat_append_preserves_prior_entries() {
        let store = MemoryStore::new();
        let first = store.append_cat_report("R1", cat(1)).await.unwrap();
        let second = store.append_cat_report("R1", cat(2)).await.unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(second.reports.len(), 2);
        assert_eq!(second.reports[0], cat(1));
        assert_eq!(second.reports[1].cat_number, 2);
        assert!(store.find_sem_report("R1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_attendance_one_record_per_date() {
        let store = MemoryStore::new();
        let date = NaiveDate::from_ymd_opt(2024, 3, 4).unwrap();
        let record = Attendance {
            id: new_document_id(),
            roll_no: "R1".into(),
            date,
            day: "Monday".into(),
            attendance: Vec::new(),
        };

        assert_ok!(store.insert_attendance(record.clone()).await);
        assert_err!(
            store
                .insert_attendance(Attendance { id: new_document_id(), ..record })
                .await
        );
        assert!(store.find_attendance("R1", date).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_sap_total_accumulates() {
        let store = MemoryStore::new();
        for marks in [5.0, 7.5] {
            store
                .append_sap_activity(
                    "R1",
                    "Asha",
                    "CSE",
                    SapActivity {
                        activity: "Hackathon".into(),
                        content: "Finalist".into(),
                        marks,
                        date: Utc::now(),
                    },
                )
                .await
                .unwrap();
        }

        let record = store.find_sap_record("R1").await.unwrap().unwrap();
        assert_eq!(record.activities.len(), 2);
        assert_eq!(record.sap, 12.5);
    }

    #[tokio::test]
    async fn test_delete_platform_reports_miss() {
        let store = MemoryStore::new();
        let platform = Platform::from_input("p1".into(), PlatformInput::default());
        store.insert_platform(platform).await.unwrap();

        assert!(store.delete_platform("p1").await.unwrap());
        assert!(!store.delete_platform("p1").await.unwrap());
    }
}
