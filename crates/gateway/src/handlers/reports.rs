//! CAT/SEM mark reports and the per-student summary

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::NaiveDate;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;

use super::{require, AppJson, MessageResponse};
use crate::AppState;
use classdesk_common::{
    db::models::{lenient, CatEntry, CourseMark, SemEntry, SubjectMark},
    errors::{AppError, Result},
    reporting::{self, StudentSummary},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportType {
    Cat,
    Sem,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddReportRequest {
    #[serde(default)]
    pub report_type: String,
    #[serde(default)]
    pub rollno: String,
    #[serde(default, deserialize_with = "lenient::integer")]
    pub cat_number: i32,
    #[serde(default, deserialize_with = "lenient::integer")]
    pub sem_number: i32,
    #[serde(default, deserialize_with = "lenient::optional_date")]
    pub date: Option<NaiveDate>,
    /// Shape depends on `reportType`
    #[serde(default)]
    pub marks: Value,
}

#[derive(Debug, Serialize)]
pub struct ReportsResponse<T> {
    pub reports: Vec<T>,
}

fn parse_marks<T: DeserializeOwned>(marks: Value) -> Result<Vec<T>> {
    if marks.is_null() {
        return Ok(Vec::new());
    }
    serde_json::from_value(marks).map_err(|e| AppError::Validation {
        message: format!("Invalid marks: {}", e),
        field: Some("marks".to_string()),
    })
}

/// Append a CAT or SEM entry to the student's report document
pub async fn add_report(
    State(state): State<AppState>,
    AppJson(request): AppJson<AddReportRequest>,
) -> Result<(StatusCode, Json<MessageResponse>)> {
    let report_type = match request.report_type.as_str() {
        "CAT" => ReportType::Cat,
        "SEM" => ReportType::Sem,
        _ => {
            return Err(AppError::Validation {
                message: "Invalid report type".to_string(),
                field: Some("reportType".to_string()),
            })
        }
    };
    require(&request.rollno, "rollno")?;

    match report_type {
        ReportType::Cat => {
            let entry = CatEntry {
                cat_number: request.cat_number,
                date: request.date,
                marks: parse_marks::<SubjectMark>(request.marks)?,
            };
            let report = state.store.append_cat_report(&request.rollno, entry).await?;
            tracing::info!(rollno = %request.rollno, entries = report.reports.len(), "CAT report added");
        }
        ReportType::Sem => {
            let entry = SemEntry {
                sem_number: request.sem_number,
                date: request.date,
                marks: parse_marks::<CourseMark>(request.marks)?,
            };
            let report = state.store.append_sem_report(&request.rollno, entry).await?;
            tracing::info!(rollno = %request.rollno, entries = report.reports.len(), "SEM report added");
        }
    }

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new("Report added successfully")),
    ))
}

pub async fn get_cat_reports(
    State(state): State<AppState>,
    Path(rollno): Path<String>,
) -> Result<Json<ReportsResponse<CatEntry>>> {
    let report = state
        .store
        .find_cat_report(&rollno)
        .await?
        .ok_or_else(|| AppError::not_found("CAT reports", &rollno))?;

    Ok(Json(ReportsResponse {
        reports: report.reports,
    }))
}

pub async fn get_sem_reports(
    State(state): State<AppState>,
    Path(rollno): Path<String>,
) -> Result<Json<ReportsResponse<SemEntry>>> {
    let report = state
        .store
        .find_sem_report(&rollno)
        .await?
        .ok_or_else(|| AppError::not_found("SEM reports", &rollno))?;

    Ok(Json(ReportsResponse {
        reports: report.reports,
    }))
}

/// Marks, attendance, reports and SAP for one student in a single payload
pub async fn student_summary(
    State(state): State<AppState>,
    Path(rollno): Path<String>,
) -> Result<Json<StudentSummary>> {
    let student = state
        .store
        .find_student(&rollno)
        .await?
        .ok_or_else(|| AppError::not_found("Student", &rollno))?;

    let (attendance, cat, sem, sap) = tokio::try_join!(
        state.store.list_attendance(&rollno),
        state.store.find_cat_report(&rollno),
        state.store.find_sem_report(&rollno),
        state.store.find_sap_record(&rollno),
    )?;

    Ok(Json(reporting::student_summary(
        &student,
        &attendance,
        cat.as_ref(),
        sem.as_ref(),
        sap.as_ref(),
    )))
}

#[cfg(test)]
mod tests {
    use crate::handlers::test_support::test_app;
    use axum::http::StatusCode;
    use serde_json::json;

    #[tokio::test]
    async fn test_cat_reports_accumulate() {
        let app = test_app();

        for (n, maths) in [(1, "40"), (2, "45")] {
            let (status, body) = app
                .post(
                    "/api/reports/add",
                    json!({
                        "reportType": "CAT",
                        "rollno": "21IT01",
                        "catNumber": n,
                        "date": "2024-09-10",
                        "marks": [{ "subject": "Maths", "marks": maths }]
                    }),
                )
                .await;
            assert_eq!(status, StatusCode::CREATED);
            assert_eq!(body["message"], "Report added successfully");
        }

        let (status, body) = app.get("/api/reports/CAT/21IT01").await;
        assert_eq!(status, StatusCode::OK);
        let reports = body["reports"].as_array().unwrap();
        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0]["catNumber"], 1);
        assert_eq!(reports[1]["marks"][0]["marks"], 45.0);

        let (status, _) = app.get("/api/reports/SEM/21IT01").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_sem_report() {
        let app = test_app();

        let (status, _) = app
            .post(
                "/api/reports/add",
                json!({
                    "reportType": "SEM",
                    "rollno": "21IT01",
                    "semNumber": "3",
                    "marks": [{ "courseCode": "CS301", "courseId": "C1", "credits": 4, "marksScored": 88 }]
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);

        let (_, body) = app.get("/api/reports/SEM/21IT01").await;
        assert_eq!(body["reports"][0]["semNumber"], 3);
        assert_eq!(body["reports"][0]["marks"][0]["marksScored"], 88.0);
    }

    #[tokio::test]
    async fn test_sem_reports_accumulate() {
        let app = test_app();

        for (n, code) in [(1, "CS101"), (2, "CS201")] {
            let (status, _) = app
                .post(
                    "/api/reports/add",
                    json!({
                        "reportType": "SEM",
                        "rollno": "21IT02",
                        "semNumber": n,
                        "marks": [{ "courseCode": code, "courseId": code, "credits": 3, "marksScored": 70 + n }]
                    }),
                )
                .await;
            assert_eq!(status, StatusCode::CREATED);
        }

        let (status, body) = app.get("/api/reports/SEM/21IT02").await;
        assert_eq!(status, StatusCode::OK);
        let reports = body["reports"].as_array().unwrap();
        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0]["semNumber"], 1);
        assert_eq!(reports[0]["marks"][0]["courseCode"], "CS101");
        assert_eq!(reports[1]["semNumber"], 2);
        assert_eq!(reports[1]["marks"][0]["marksScored"], 72.0);
    }

    #[tokio::test]
    async fn test_invalid_report_type() {
        let app = test_app();
        let (status, body) = app
            .post("/api/reports/add", json!({ "reportType": "QUIZ", "rollno": "R1" }))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Invalid report type");
    }

    #[tokio::test]
    async fn test_student_summary() {
        let app = test_app();

        app.post(
            "/api/managestudents",
            json!({
                "teacherId": "T1",
                "name": "Ravi",
                "rollno": "21IT01",
                "subjects": [{ "subjectName": "Maths", "marks": 70 }, { "subjectName": "DS", "marks": 90 }]
            }),
        )
        .await;
        app.post(
            "/addAttendance",
            json!({
                "rollNo": "21IT01",
                "date": "2024-09-02",
                "day": "Monday",
                "attendance": [
                    { "periodNumber": 1, "status": "Present" },
                    { "periodNumber": 2, "status": "Absent" }
                ]
            }),
        )
        .await;

        let (status, body) = app.get("/api/students/21IT01/summary").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["averageMarks"], 80.0);
        assert_eq!(body["attendance"]["percentage"], 50.0);
        assert_eq!(body["attendance"]["belowThreshold"], true);
        assert_eq!(body["catExams"], 0);

        let (status, _) = app.get("/api/students/NOPE/summary").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
