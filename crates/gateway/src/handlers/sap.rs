//! SAP (activity points) ledger handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::{require, AppJson};
use crate::AppState;
use classdesk_common::{
    db::models::{lenient, SapActivity, SapRecord},
    errors::{AppError, Result},
};

#[derive(Debug, Deserialize)]
pub struct AddSapRequest {
    #[serde(default)]
    pub rollno: String,
    #[serde(default)]
    pub activity: String,
    #[serde(default)]
    pub content: String,
    #[serde(default, deserialize_with = "lenient::number")]
    pub marks: f64,
}

#[derive(Debug, Serialize)]
pub struct SapAdded {
    pub message: String,
    pub sap: SapRecord,
}

/// Log an activity and credit its points to the student
pub async fn add_sap(
    State(state): State<AppState>,
    AppJson(request): AppJson<AddSapRequest>,
) -> Result<(StatusCode, Json<SapAdded>)> {
    require(&request.rollno, "rollno")?;
    require(&request.activity, "activity")?;
    if !request.marks.is_finite() || request.marks < 0.0 {
        return Err(AppError::Validation {
            message: "marks must be a non-negative number".to_string(),
            field: Some("marks".to_string()),
        });
    }

    let student = state
        .store
        .find_student(&request.rollno)
        .await?
        .ok_or_else(|| AppError::not_found("Student", &request.rollno))?;

    let activity = SapActivity {
        activity: request.activity,
        content: request.content,
        marks: request.marks,
        date: Utc::now(),
    };

    let record = state
        .store
        .append_sap_activity(&student.rollno, &student.name, &student.department, activity)
        .await?;
    state.store.add_student_sap(&student.rollno, request.marks).await?;

    tracing::info!(rollno = %record.rollno, total = record.sap, "SAP activity added");

    Ok((
        StatusCode::CREATED,
        Json(SapAdded {
            message: "SAP activity added successfully".to_string(),
            sap: record,
        }),
    ))
}

pub async fn get_sap(
    State(state): State<AppState>,
    Path(rollno): Path<String>,
) -> Result<Json<SapRecord>> {
    state
        .store
        .find_sap_record(&rollno)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::not_found("SAP record", rollno))
}

#[cfg(test)]
mod tests {
    use crate::handlers::test_support::test_app;
    use axum::http::StatusCode;
    use serde_json::json;

    #[tokio::test]
    async fn test_sap_accumulates() {
        let app = test_app();
        app.post(
            "/api/managestudents",
            json!({ "teacherId": "T1", "rollno": "21IT01", "name": "Ravi", "department": "IT" }),
        )
        .await;

        let (status, body) = app
            .post(
                "/api/sap/add",
                json!({ "rollno": "21IT01", "activity": "Hackathon", "content": "Finalist", "marks": "10" }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{}", body);
        assert_eq!(body["sap"]["sap"], 10.0);
        assert_eq!(body["sap"]["department"], "IT");

        let (status, body) = app
            .post(
                "/api/sap/add",
                json!({ "rollno": "21IT01", "activity": "NSS", "content": "Camp", "marks": 2.5 }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["sap"]["sap"], 12.5);

        let (status, body) = app.get("/api/sap/21IT01").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["activities"].as_array().unwrap().len(), 2);

        let (_, student) = app.get("/api/managestudents/student/21IT01").await;
        assert_eq!(student["sap"], 12.5);
    }

    #[tokio::test]
    async fn test_sap_unknown_student() {
        let app = test_app();

        let (status, _) = app
            .post("/api/sap/add", json!({ "rollno": "NOPE", "activity": "x", "marks": 1 }))
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = app.get("/api/sap/NOPE").await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = app
            .post("/api/sap/add", json!({ "rollno": "NOPE", "activity": "x", "marks": -4 }))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
