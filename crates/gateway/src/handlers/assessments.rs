//! Assessment handlers, including multipart image upload

use axum::{
    body::Bytes,
    extract::{multipart::MultipartError, Multipart, Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use std::collections::HashMap;

use super::require;
use crate::AppState;
use classdesk_common::{
    db::models::{lenient, Assessment},
    errors::{AppError, Result},
    metrics, new_document_id,
};

#[derive(Debug, Serialize)]
pub struct CreateAssessmentResponse {
    pub message: String,
    pub assessment: Assessment,
}

fn multipart_error(err: MultipartError, limit: usize) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge { limit }
    } else {
        AppError::InvalidFormat {
            message: err.body_text(),
        }
    }
}

fn optional_date(fields: &HashMap<String, String>, key: &str) -> Result<Option<chrono::NaiveDate>> {
    match fields.get(key).map(|v| v.trim()) {
        None | Some("") => Ok(None),
        Some(raw) => lenient::parse_date(raw).map(Some).ok_or_else(|| AppError::Validation {
            message: format!("{} must be a YYYY-MM-DD date", key),
            field: Some(key.to_string()),
        }),
    }
}

fn marks(fields: &HashMap<String, String>) -> Result<f64> {
    match fields.get("marks").map(|v| v.trim()) {
        None | Some("") => Ok(0.0),
        Some(raw) => raw.parse::<f64>().map_err(|_| AppError::Validation {
            message: "marks must be a number".to_string(),
            field: Some("marks".to_string()),
        }),
    }
}

/// Create an assessment from a multipart form with up to `max_files` images.
///
/// Every image is checked before any file is written. If a write or the
/// insert fails afterwards, the images already stored are removed again.
pub async fn create_assessment(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<CreateAssessmentResponse>)> {
    let body_limit = state.config.server.body_limit_bytes;
    let mut fields: HashMap<String, String> = HashMap::new();
    let mut images: Vec<(String, Bytes)> = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, body_limit))?
    {
        let name = field.name().unwrap_or_default().to_string();

        if name == "images" {
            state.uploads.check_count(images.len() + 1)?;
            state.uploads.check_image(field.content_type())?;

            let file_name = field.file_name().unwrap_or("image").to_string();
            let bytes = field
                .bytes()
                .await
                .map_err(|e| multipart_error(e, body_limit))?;
            state.uploads.check_size(&file_name, bytes.len())?;

            images.push((file_name, bytes));
        } else {
            let value = field
                .text()
                .await
                .map_err(|e| multipart_error(e, body_limit))?;
            fields.insert(name, value);
        }
    }

    let teacher_id = fields.get("teacherId").cloned().unwrap_or_default();
    require(&teacher_id, "teacherId")?;
    let marks = marks(&fields)?;
    let start_date = optional_date(&fields, "startDate")?;
    let end_date = optional_date(&fields, "endDate")?;

    let mut paths = Vec::with_capacity(images.len());
    let mut total_bytes = 0;
    for (file_name, bytes) in &images {
        match state.uploads.save_image(file_name, bytes).await {
            Ok(path) => paths.push(path),
            Err(e) => {
                state.uploads.remove_images(&paths).await;
                return Err(e.into());
            }
        }
        total_bytes += bytes.len();
    }
    metrics::record_upload(paths.len(), total_bytes);

    let field = |key: &str| fields.get(key).cloned().unwrap_or_default();
    let assessment = Assessment {
        id: new_document_id(),
        teacher_id,
        name: field("name"),
        marks,
        images: paths,
        start_date,
        end_date,
        start_time: field("startTime"),
        end_time: field("endTime"),
    };
    if let Err(e) = state.store.insert_assessment(assessment.clone()).await {
        state.uploads.remove_images(&assessment.images).await;
        return Err(e);
    }

    tracing::info!(
        assessment_id = %assessment.id,
        teacher_id = %assessment.teacher_id,
        images = assessment.images.len(),
        "Assessment created"
    );

    Ok((
        StatusCode::CREATED,
        Json(CreateAssessmentResponse {
            message: "Assessment added successfully".to_string(),
            assessment,
        }),
    ))
}

/// Assessments for one teacher; an unknown teacher gets an empty list
pub async fn list_assessments(
    State(state): State<AppState>,
    Path(teacher_id): Path<String>,
) -> Result<Json<Vec<Assessment>>> {
    Ok(Json(state.store.list_assessments(&teacher_id).await?))
}

pub async fn get_assessment(
    State(state): State<AppState>,
    Path(assessment_id): Path<String>,
) -> Result<Json<Assessment>> {
    state
        .store
        .find_assessment(&assessment_id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::not_found("Assessment", assessment_id))
}

#[cfg(test)]
mod tests {
    use crate::handlers::test_support::{test_app, TestApp};
    use axum::{
        body::Body,
        http::{header::CONTENT_TYPE, Request, StatusCode},
    };
    use serde_json::Value;

    const BOUNDARY: &str = "classdesk-test-boundary";

    enum Part<'a> {
        Text(&'a str, &'a str),
        File(&'a str, &'a str, &'a [u8]),
    }

    async fn post_form(app: &TestApp, parts: &[Part<'_>]) -> (StatusCode, Value) {
        let mut body: Vec<u8> = Vec::new();
        for part in parts {
            body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
            match part {
                Part::Text(name, value) => {
                    body.extend_from_slice(
                        format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n", name, value)
                            .as_bytes(),
                    );
                }
                Part::File(file_name, content_type, bytes) => {
                    body.extend_from_slice(
                        format!(
                            "Content-Disposition: form-data; name=\"images\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                            file_name, content_type
                        )
                        .as_bytes(),
                    );
                    body.extend_from_slice(bytes);
                    body.extend_from_slice(b"\r\n");
                }
            }
        }
        body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());

        let request = Request::builder()
            .method("POST")
            .uri("/api/assessments")
            .header(CONTENT_TYPE, format!("multipart/form-data; boundary={}", BOUNDARY))
            .body(Body::from(body))
            .unwrap();
        app.request(request).await
    }

    fn uploaded_files(app: &TestApp) -> usize {
        std::fs::read_dir(app.uploads.path()).unwrap().count()
    }

    #[tokio::test]
    async fn test_create_assessment_with_images() {
        let app = test_app();

        let (status, body) = post_form(
            &app,
            &[
                Part::Text("teacherId", "T1"),
                Part::Text("name", "Unit test 1"),
                Part::Text("marks", "50"),
                Part::Text("startDate", "2024-08-01"),
                Part::Text("endDate", ""),
                Part::Text("startTime", "10:00"),
                Part::File("q1.png", "image/png", b"\x89PNG fake"),
                Part::File("q2.jpg", "image/jpeg", b"jpeg fake"),
            ],
        )
        .await;

        assert_eq!(status, StatusCode::CREATED, "{}", body);
        assert_eq!(body["message"], "Assessment added successfully");
        let assessment = &body["assessment"];
        assert_eq!(assessment["marks"], 50.0);
        assert_eq!(assessment["startDate"], "2024-08-01");
        assert!(assessment["endDate"].is_null());
        let images = assessment["images"].as_array().unwrap();
        assert_eq!(images.len(), 2);
        assert!(images[0].as_str().unwrap().starts_with("/uploads/"));
        assert_eq!(uploaded_files(&app), 2);

        let id = assessment["_id"].as_str().unwrap();
        let (status, fetched) = app.get(&format!("/api/assessments/details/{}", id)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(fetched["name"], "Unit test 1");

        let (status, listed) = app.get("/api/assessments/T1").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(listed.as_array().unwrap().len(), 1);

        // Uploaded files are served back
        let request = Request::builder()
            .uri(images[0].as_str().unwrap())
            .body(Body::empty())
            .unwrap();
        let (status, _) = app.request(request).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_more_than_five_images_rejected() {
        let app = test_app();

        let mut parts = vec![Part::Text("teacherId", "T1")];
        for _ in 0..6 {
            parts.push(Part::File("q.png", "image/png", b"img"));
        }

        let (status, body) = post_form(&app, &parts).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["field"], "images");
        assert_eq!(uploaded_files(&app), 0);
    }

    #[tokio::test]
    async fn test_non_image_rejected() {
        let app = test_app();

        let (status, _) = post_form(
            &app,
            &[
                Part::Text("teacherId", "T1"),
                Part::File("notes.pdf", "application/pdf", b"%PDF"),
            ],
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(uploaded_files(&app), 0);
    }

    #[tokio::test]
    async fn test_teacher_id_required() {
        let app = test_app();
        let (status, body) = post_form(&app, &[Part::Text("name", "Quiz")]).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "teacherId is required");
    }

    #[tokio::test]
    async fn test_unknown_assessment_and_teacher() {
        let app = test_app();

        let (status, _) = app.get("/api/assessments/details/nope").await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, body) = app.get("/api/assessments/T404").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, serde_json::json!([]));
    }
}
