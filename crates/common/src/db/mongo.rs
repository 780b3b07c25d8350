//! MongoDB `DocumentStore`
//!
//! One collection per model. Unique keys are backed by indexes created at
//! startup, and duplicate-key write errors (code 11000) surface as
//! `AppError::Duplicate`. Report and SAP appends are single atomic upserts.

use super::models::{collections, *};
use super::DocumentStore;
use crate::config::DatabaseConfig;
use crate::errors::{AppError, Result};
use crate::new_document_id;
use async_trait::async_trait;
use chrono::NaiveDate;
use futures::TryStreamExt;
use mongodb::{
    bson::{doc, to_bson, to_document, Document},
    error::{ErrorKind, WriteFailure},
    options::{ClientOptions, IndexOptions, ReturnDocument},
    Client, Collection, Database, IndexModel,
};
use serde::{de::DeserializeOwned, Serialize};
use std::time::Duration;
use tracing::info;

const DUPLICATE_KEY: i32 = 11000;

/// Document store backed by a MongoDB database
#[derive(Clone)]
pub struct MongoStore {
    db: Database,
}

impl MongoStore {
    /// Connect, verify connectivity and make sure unique indexes exist
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        info!(database = %config.name, "Connecting to MongoDB...");

        let mut options = ClientOptions::parse(&config.url)
            .await
            .map_err(|e| AppError::DatabaseConnection {
                message: format!("Invalid connection string: {}", e),
            })?;
        options.app_name = Some("classdesk".to_string());
        options.connect_timeout = Some(Duration::from_secs(config.connect_timeout_secs));
        options.server_selection_timeout = Some(Duration::from_secs(config.connect_timeout_secs));
        options.max_pool_size = Some(config.max_pool_size);

        let client = Client::with_options(options).map_err(|e| AppError::DatabaseConnection {
            message: format!("Failed to create client: {}", e),
        })?;

        let store = Self {
            db: client.database(&config.name),
        };

        store.ping().await.map_err(|e| AppError::DatabaseConnection {
            message: format!("Ping failed: {}", e),
        })?;
        store.ensure_indexes().await?;

        info!("MongoDB connection established");
        Ok(store)
    }

    fn collection<T: Send + Sync>(&self, name: &str) -> Collection<T> {
        self.db.collection(name)
    }

    async fn ensure_indexes(&self) -> Result<()> {
        let unique = [
            (collections::TEACHERS, doc! { "email": 1 }),
            (collections::TEACHERS, doc! { "teacherId": 1 }),
            (collections::STUDENTS, doc! { "rollno": 1 }),
            (collections::COURSES, doc! { "courseId": 1 }),
            (collections::ATTENDANCES, doc! { "rollNo": 1, "date": 1 }),
            (collections::CAT_REPORTS, doc! { "rollno": 1 }),
            (collections::SEM_REPORTS, doc! { "rollno": 1 }),
            (collections::SAP_RECORDS, doc! { "rollno": 1 }),
        ];

        for (name, keys) in unique {
            let index = IndexModel::builder()
                .keys(keys)
                .options(IndexOptions::builder().unique(true).build())
                .build();
            self.collection::<Document>(name).create_index(index).await?;
        }

        // Lookup-only indexes for the per-teacher listings
        for name in [
            collections::STUDENTS,
            collections::COURSES,
            collections::ASSESSMENTS,
            collections::DISCUSSIONS,
            collections::LIVE_SESSIONS,
        ] {
            let index = IndexModel::builder().keys(doc! { "teacherId": 1 }).build();
            self.collection::<Document>(name).create_index(index).await?;
        }

        Ok(())
    }

    async fn find_many<T>(&self, name: &str, filter: Document) -> Result<Vec<T>>
    where
        T: DeserializeOwned + Unpin + Send + Sync,
    {
        let cursor = self.collection::<T>(name).find(filter).await?;
        Ok(cursor.try_collect().await?)
    }

    async fn insert<T>(&self, name: &str, value: &T, duplicate_message: &str) -> Result<()>
    where
        T: Serialize + Send + Sync,
    {
        self.collection::<T>(name)
            .insert_one(value)
            .await
            .map_err(|e| map_duplicate(e, duplicate_message))?;
        Ok(())
    }

    async fn update_returning<T>(
        &self,
        name: &str,
        filter: Document,
        update: Document,
    ) -> Result<Option<T>>
    where
        T: DeserializeOwned + Send + Sync,
    {
        Ok(self
            .collection::<T>(name)
            .find_one_and_update(filter, update)
            .return_document(ReturnDocument::After)
            .await?)
    }

    /// Append to an array field, creating the document keyed by `rollno`
    /// when it does not exist yet
    async fn upsert_push<T>(&self, name: &str, rollno: &str, update: Document) -> Result<T>
    where
        T: DeserializeOwned + Send + Sync,
    {
        self.collection::<T>(name)
            .find_one_and_update(doc! { "rollno": rollno }, update)
            .upsert(true)
            .return_document(ReturnDocument::After)
            .await?
            .ok_or_else(|| AppError::Internal {
                message: format!("Upsert into {} returned no document", name),
            })
    }
}

fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    match err.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(e)) => e.code == DUPLICATE_KEY,
        ErrorKind::Command(e) => e.code == DUPLICATE_KEY,
        _ => false,
    }
}

fn map_duplicate(err: mongodb::error::Error, message: &str) -> AppError {
    if is_duplicate_key(&err) {
        AppError::Duplicate { message: message.to_string() }
    } else {
        AppError::Database(err)
    }
}

#[async_trait]
impl DocumentStore for MongoStore {
    async fn ping(&self) -> Result<()> {
        self.db.run_command(doc! { "ping": 1 }).await?;
        Ok(())
    }

    // ========================================================================
    // Teachers
    // ========================================================================

    async fn find_teacher_by_email_or_id(&self, email: &str, teacher_id: &str) -> Result<Option<Teacher>> {
        let filter = doc! { "$or": [ { "email": email }, { "teacherId": teacher_id } ] };
        Ok(self.collection::<Teacher>(collections::TEACHERS).find_one(filter).await?)
    }

    async fn find_teacher_by_identifier(&self, identifier: &str) -> Result<Option<Teacher>> {
        self.find_teacher_by_email_or_id(identifier, identifier).await
    }

    async fn find_teacher(&self, teacher_id: &str) -> Result<Option<Teacher>> {
        Ok(self
            .collection::<Teacher>(collections::TEACHERS)
            .find_one(doc! { "teacherId": teacher_id })
            .await?)
    }

    async fn insert_teacher(&self, teacher: Teacher) -> Result<()> {
        self.insert(
            collections::TEACHERS,
            &teacher,
            "Teacher with this email or ID already exists",
        )
        .await
    }

    async fn update_teacher(&self, teacher_id: &str, update: &TeacherUpdate) -> Result<Option<Teacher>> {
        if update.is_empty() {
            return self.find_teacher(teacher_id).await;
        }

        let set = to_document(update)?;
        self.update_returning(
            collections::TEACHERS,
            doc! { "teacherId": teacher_id },
            doc! { "$set": set },
        )
        .await
        .map_err(|e| match e {
            AppError::Database(err) => map_duplicate(err, "Another teacher already uses this email"),
            other => other,
        })
    }

    // ========================================================================
    // Students
    // ========================================================================

    async fn insert_student(&self, student: Student) -> Result<()> {
        self.insert(
            collections::STUDENTS,
            &student,
            "A student with this roll number already exists",
        )
        .await
    }

    async fn list_students(&self, teacher_id: &str) -> Result<Vec<Student>> {
        self.find_many(collections::STUDENTS, doc! { "teacherId": teacher_id }).await
    }

    async fn find_student(&self, rollno: &str) -> Result<Option<Student>> {
        Ok(self
            .collection::<Student>(collections::STUDENTS)
            .find_one(doc! { "rollno": rollno })
            .await?)
    }

    async fn add_student_sap(&self, rollno: &str, points: f64) -> Result<Option<Student>> {
        self.update_returning(
            collections::STUDENTS,
            doc! { "rollno": rollno },
            doc! { "$inc": { "sap": points } },
        )
        .await
    }

    // ========================================================================
    // Platforms
    // ========================================================================

    async fn list_platforms(&self, teacherid: Option<&str>) -> Result<Vec<Platform>> {
        let filter = match teacherid {
            Some(t) => doc! { "teacherid": t },
            None => doc! {},
        };
        self.find_many(collections::PLATFORMS, filter).await
    }

    async fn insert_platform(&self, platform: Platform) -> Result<()> {
        self.insert(collections::PLATFORMS, &platform, "Platform already exists").await
    }

    async fn update_platform(&self, id: &str, input: &PlatformInput) -> Result<Option<Platform>> {
        let set = to_document(input)?;
        if set.is_empty() {
            return Ok(self
                .collection::<Platform>(collections::PLATFORMS)
                .find_one(doc! { "_id": id })
                .await?);
        }

        self.update_returning(collections::PLATFORMS, doc! { "_id": id }, doc! { "$set": set })
            .await
    }

    async fn delete_platform(&self, id: &str) -> Result<bool> {
        let result = self
            .collection::<Platform>(collections::PLATFORMS)
            .delete_one(doc! { "_id": id })
            .await?;
        Ok(result.deleted_count > 0)
    }

    // ========================================================================
    // Courses
    // ========================================================================

    async fn find_course(&self, course_id: &str) -> Result<Option<Course>> {
        Ok(self
            .collection::<Course>(collections::COURSES)
            .find_one(doc! { "courseId": course_id })
            .await?)
    }

    async fn insert_course(&self, course: Course) -> Result<()> {
        self.insert(collections::COURSES, &course, "Course ID already exists").await
    }

    async fn list_courses(&self, teacher_id: &str) -> Result<Vec<Course>> {
        self.find_many(collections::COURSES, doc! { "teacherId": teacher_id }).await
    }

    // ========================================================================
    // Assessments
    // ========================================================================

    async fn insert_assessment(&self, assessment: Assessment) -> Result<()> {
        self.insert(collections::ASSESSMENTS, &assessment, "Assessment already exists").await
    }

    async fn list_assessments(&self, teacher_id: &str) -> Result<Vec<Assessment>> {
        self.find_many(collections::ASSESSMENTS, doc! { "teacherId": teacher_id }).await
    }

    async fn find_assessment(&self, id: &str) -> Result<Option<Assessment>> {
        Ok(self
            .collection::<Assessment>(collections::ASSESSMENTS)
            .find_one(doc! { "_id": id })
            .await?)
    }

    // ========================================================================
    // Discussions
    // ========================================================================

    async fn insert_discussion(&self, discussion: Discussion) -> Result<()> {
        self.insert(collections::DISCUSSIONS, &discussion, "Discussion already exists").await
    }

    async fn update_discussion_message(&self, id: &str, message: &str) -> Result<Option<Discussion>> {
        self.update_returning(
            collections::DISCUSSIONS,
            doc! { "_id": id },
            doc! { "$set": { "message": message } },
        )
        .await
    }

    async fn push_discussion_reply(&self, id: &str, reply: Reply) -> Result<Option<Discussion>> {
        let reply = to_bson(&reply)?;
        self.update_returning(
            collections::DISCUSSIONS,
            doc! { "_id": id },
            doc! { "$push": { "replies": reply } },
        )
        .await
    }

    async fn list_discussions(&self, teacher_id: &str) -> Result<Vec<Discussion>> {
        self.find_many(collections::DISCUSSIONS, doc! { "teacherId": teacher_id }).await
    }

    // ========================================================================
    // Attendance
    // ========================================================================

    async fn find_attendance(&self, roll_no: &str, date: NaiveDate) -> Result<Option<Attendance>> {
        Ok(self
            .collection::<Attendance>(collections::ATTENDANCES)
            .find_one(doc! { "rollNo": roll_no, "date": date.to_string() })
            .await?)
    }

    async fn insert_attendance(&self, attendance: Attendance) -> Result<()> {
        self.insert(
            collections::ATTENDANCES,
            &attendance,
            "Attendance already exists for this date",
        )
        .await
    }

    async fn list_attendance(&self, roll_no: &str) -> Result<Vec<Attendance>> {
        let cursor = self
            .collection::<Attendance>(collections::ATTENDANCES)
            .find(doc! { "rollNo": roll_no })
            .sort(doc! { "date": 1 })
            .await?;
        Ok(cursor.try_collect().await?)
    }

    // ========================================================================
    // Live sessions
    // ========================================================================

    async fn insert_live_session(&self, session: LiveSession) -> Result<()> {
        self.insert(collections::LIVE_SESSIONS, &session, "Live session already exists").await
    }

    async fn list_live_sessions(&self, teacher_id: &str) -> Result<Vec<LiveSession>> {
        self.find_many(collections::LIVE_SESSIONS, doc! { "teacherId": teacher_id }).await
    }

    // ========================================================================
    // CAT / SEM reports
    // ========================================================================

    async fn append_cat_report(&self, rollno: &str, entry: CatEntry) -> Result<CatReport> {
        let entry = to_bson(&entry)?;
        self.upsert_push(
            collections::CAT_REPORTS,
            rollno,
            doc! {
                "$push": { "reports": entry },
                "$setOnInsert": { "_id": new_document_id() },
            },
        )
        .await
    }

    async fn append_sem_report(&self, rollno: &str, entry: SemEntry) -> Result<SemReport> {
        let entry = to_bson(&entry)?;
        self.upsert_push(
            collections::SEM_REPORTS,
            rollno,
            doc! {
                "$push": { "reports": entry },
                "$setOnInsert": { "_id": new_document_id() },
            },
        )
        .await
    }

    async fn find_cat_report(&self, rollno: &str) -> Result<Option<CatReport>> {
        Ok(self
            .collection::<CatReport>(collections::CAT_REPORTS)
            .find_one(doc! { "rollno": rollno })
            .await?)
    }

    async fn find_sem_report(&self, rollno: &str) -> Result<Option<SemReport>> {
        Ok(self
            .collection::<SemReport>(collections::SEM_REPORTS)
            .find_one(doc! { "rollno": rollno })
            .await?)
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
        let marks = activity.marks;
        let activity = to_bson(&activity)?;
        self.upsert_push(
            collections::SAP_RECORDS,
            rollno,
            doc! {
                "$push": { "activities": activity },
                "$inc": { "sap": marks },
                "$set": { "name": name, "department": department },
                "$setOnInsert": { "_id": new_document_id() },
            },
        )
        .await
    }

    async fn find_sap_record(&self, rollno: &str) -> Result<Option<SapRecord>> {
        Ok(self
            .collection::<SapRecord>(collections::SAP_RECORDS)
            .find_one(doc! { "rollno": rollno })
            .await?)
    }
}
