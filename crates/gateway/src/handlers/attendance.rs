//! Period-wise attendance handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use super::{require, AppJson};
use crate::AppState;
use classdesk_common::{
    db::models::{lenient, Attendance, PeriodStatus},
    errors::{AppError, Result},
    new_document_id,
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddAttendanceRequest {
    #[serde(default)]
    pub roll_no: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub day: String,
    #[serde(default)]
    pub attendance: Vec<PeriodStatus>,
}

#[derive(Debug, Serialize)]
pub struct AttendanceResponse {
    pub attendance: Attendance,
}

/// Record one day of attendance; a second record for the same date is rejected
pub async fn add_attendance(
    State(state): State<AppState>,
    AppJson(request): AppJson<AddAttendanceRequest>,
) -> Result<(StatusCode, Json<AttendanceResponse>)> {
    let roll_no = request.roll_no.trim().to_string();
    require(&roll_no, "rollNo")?;
    require(&request.date, "date")?;
    require(&request.day, "day")?;

    let date = lenient::parse_date(&request.date).ok_or_else(|| AppError::Validation {
        message: "date must be a YYYY-MM-DD date".to_string(),
        field: Some("date".to_string()),
    })?;

    if state.store.find_attendance(&roll_no, date).await?.is_some() {
        return Err(AppError::Duplicate {
            message: "Attendance already exists for this date".to_string(),
        });
    }

    let attendance = Attendance {
        id: new_document_id(),
        roll_no,
        date,
        day: request.day,
        attendance: request.attendance,
    };
    state.store.insert_attendance(attendance.clone()).await?;

    tracing::info!(
        roll_no = %attendance.roll_no,
        date = %attendance.date,
        present = attendance.present_periods(),
        periods = attendance.attendance.len(),
        "Attendance recorded"
    );

    Ok((StatusCode::CREATED, Json(AttendanceResponse { attendance })))
}

/// All records for a student, oldest first; 404 when there are none
pub async fn list_attendance(
    State(state): State<AppState>,
    Path(roll_no): Path<String>,
) -> Result<Json<Vec<Attendance>>> {
    let records = state.store.list_attendance(&roll_no).await?;
    if records.is_empty() {
        return Err(AppError::NotFound {
            resource_type: "Attendance records".to_string(),
            id: roll_no,
        });
    }
    Ok(Json(records))
}
