//! Course handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use super::{require, AppJson};
use crate::AppState;
use classdesk_common::{
    db::models::Course,
    errors::{AppError, Result},
    new_document_id,
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddCourseRequest {
    #[serde(default)]
    pub teacher_id: String,
    #[serde(default)]
    pub course_name: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub course_id: String,
    #[serde(default)]
    pub contents: Vec<String>,
    #[serde(default)]
    pub notes: String,
}

pub async fn add_course(
    State(state): State<AppState>,
    AppJson(request): AppJson<AddCourseRequest>,
) -> Result<(StatusCode, Json<Course>)> {
    require(&request.teacher_id, "teacherId")?;
    require(&request.course_id, "courseId")?;

    if state.store.find_course(&request.course_id).await?.is_some() {
        return Err(AppError::Duplicate {
            message: "Course ID already exists".to_string(),
        });
    }

    let course = Course {
        id: new_document_id(),
        teacher_id: request.teacher_id,
        course_name: request.course_name,
        image: request.image,
        title: request.title,
        course_id: request.course_id,
        contents: request.contents,
        notes: request.notes,
    };
    state.store.insert_course(course.clone()).await?;

    tracing::info!(course_id = %course.course_id, teacher_id = %course.teacher_id, "Course added");

    Ok((StatusCode::CREATED, Json(course)))
}

/// Courses for one teacher; 404 when there are none
pub async fn list_courses(
    State(state): State<AppState>,
    Path(teacher_id): Path<String>,
) -> Result<Json<Vec<Course>>> {
    let courses = state.store.list_courses(&teacher_id).await?;
    if courses.is_empty() {
        return Err(AppError::NotFound {
            resource_type: "Courses".to_string(),
            id: format!("teacher {}", teacher_id),
        });
    }
    Ok(Json(courses))
}

#[cfg(test)]
mod tests {
    use crate::handlers::test_support::test_app;
    use axum::http::StatusCode;
    use serde_json::json;

    #[tokio::test]
    async fn test_add_and_list_courses() {
        let app = test_app();

        let course = json!({
            "teacherId": "T1",
            "courseName": "Data Structures",
            "courseId": "CS201",
            "contents": ["Lists", "Trees"],
        });

        let (status, body) = app.post("/api/courses", course.clone()).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["courseId"], "CS201");
        assert_eq!(body["contents"][1], "Trees");

        let (status, body) = app.post("/api/courses", course).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Course ID already exists");

        let (status, body) = app.get("/api/courses/T1").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 1);

        let (status, _) = app.get("/api/courses/T2").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_course_requires_ids() {
        let app = test_app();
        let (status, body) = app
            .post("/api/courses", json!({ "teacherId": "T1", "courseName": "X" }))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["field"], "courseId");
    }
}
