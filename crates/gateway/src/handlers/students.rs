//! Student roster handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use super::{require, AppJson, AppQuery, MessageResponse};
use crate::AppState;
use classdesk_common::{
    db::models::{lenient, DailyAttendance, Student, Subject},
    errors::{AppError, Result},
    new_document_id,
    reporting::{self, RosterFilter, RosterRow},
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddStudentRequest {
    #[serde(default)]
    pub teacher_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
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
    #[serde(default, deserialize_with = "lenient::number")]
    pub sap: f64,
}

pub async fn add_student(
    State(state): State<AppState>,
    AppJson(request): AppJson<AddStudentRequest>,
) -> Result<(StatusCode, Json<MessageResponse>)> {
    require(&request.teacher_id, "teacherId")?;
    require(&request.rollno, "rollno")?;

    let student = Student {
        id: new_document_id(),
        teacher_id: request.teacher_id,
        name: request.name,
        email: request.email,
        rollno: request.rollno.trim().to_string(),
        phone: request.phone,
        address: request.address,
        department: request.department,
        class_name: request.class_name,
        section: request.section,
        year: request.year,
        subjects: request.subjects,
        attendance: request.attendance,
        sap: request.sap,
    };

    tracing::info!(
        teacher_id = %student.teacher_id,
        rollno = %student.rollno,
        "Adding student"
    );

    state.store.insert_student(student).await?;

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new("Student added successfully!")),
    ))
}

/// Roster for one teacher; 404 when the teacher has no students
pub async fn list_students(
    State(state): State<AppState>,
    Path(teacher_id): Path<String>,
) -> Result<Json<Vec<Student>>> {
    let students = state.store.list_students(&teacher_id).await?;
    if students.is_empty() {
        return Err(AppError::NotFound {
            resource_type: "Students".to_string(),
            id: format!("teacher {}", teacher_id),
        });
    }
    Ok(Json(students))
}

pub async fn get_student(
    State(state): State<AppState>,
    Path(rollno): Path<String>,
) -> Result<Json<Student>> {
    state
        .store
        .find_student(&rollno)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::not_found("Student", rollno))
}

/// Filtered roster with average marks, for the tracking dashboard
pub async fn track_students(
    State(state): State<AppState>,
    Path(teacher_id): Path<String>,
    AppQuery(filter): AppQuery<RosterFilter>,
) -> Result<Json<Vec<RosterRow>>> {
    let students = state.store.list_students(&teacher_id).await?;
    Ok(Json(reporting::filter_roster(students, &filter)))
}
