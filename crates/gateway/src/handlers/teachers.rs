//! Teacher account handlers: signup, login and profile

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{AppJson, MessageResponse};
use crate::AppState;
use classdesk_common::{
    auth,
    db::models::{lenient, Teacher, TeacherProfile, TeacherUpdate},
    errors::{AppError, Result},
    metrics, new_document_id,
};

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    #[validate(email(message = "A valid email is required"))]
    pub email: String,

    #[serde(default)]
    #[validate(length(min = 1, message = "teacherId is required"))]
    pub teacher_id: String,

    #[serde(default, deserialize_with = "lenient::optional_date")]
    pub dob: Option<NaiveDate>,

    #[serde(default)]
    pub gender: String,

    #[serde(default)]
    pub experience: String,

    #[serde(default)]
    pub specialization: String,

    #[serde(default)]
    pub phone: String,

    #[serde(default)]
    pub address: String,

    #[serde(default)]
    #[validate(length(min = 1, message = "password is required"))]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub identifier: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub teacher_id: String,
    pub email: String,
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct ProfileUpdateResponse {
    pub message: String,
    pub teacher: TeacherProfile,
}

/// Register a new teacher
pub async fn signup(
    State(state): State<AppState>,
    AppJson(request): AppJson<SignupRequest>,
) -> Result<(StatusCode, Json<MessageResponse>)> {
    request.validate()?;

    let existing = state
        .store
        .find_teacher_by_email_or_id(&request.email, &request.teacher_id)
        .await?;
    if existing.is_some() {
        return Err(AppError::Duplicate {
            message: "Teacher with this email or ID already exists".to_string(),
        });
    }

    // argon2 runs on the blocking pool
    let password = request.password;
    let hash = tokio::task::spawn_blocking(move || auth::hash_password(&password))
        .await
        .map_err(|e| AppError::Internal {
            message: format!("Password hashing task failed: {}", e),
        })??;

    let teacher = Teacher {
        id: new_document_id(),
        name: request.name,
        email: request.email,
        teacher_id: request.teacher_id,
        dob: request.dob,
        gender: request.gender,
        experience: request.experience,
        specialization: request.specialization,
        phone: request.phone,
        address: request.address,
        password: hash,
        created_at: Utc::now(),
    };
    let teacher_id = teacher.teacher_id.clone();

    state.store.insert_teacher(teacher).await?;
    metrics::record_signup();

    tracing::info!(teacher_id = %teacher_id, "Teacher registered");

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new("Teacher registered successfully")),
    ))
}

/// Authenticate with email or teacherId plus password
pub async fn login(
    State(state): State<AppState>,
    AppJson(request): AppJson<LoginRequest>,
) -> Result<Json<LoginResponse>> {
    let invalid = || AppError::Unauthorized {
        message: "Invalid credentials".to_string(),
    };

    if request.identifier.trim().is_empty() || request.password.is_empty() {
        metrics::record_login(false);
        return Err(invalid());
    }

    let Some(teacher) = state
        .store
        .find_teacher_by_identifier(request.identifier.trim())
        .await?
    else {
        metrics::record_login(false);
        return Err(invalid());
    };

    let password = request.password;
    let stored = teacher.password.clone();
    let verified = tokio::task::spawn_blocking(move || auth::verify_password(&password, &stored))
        .await
        .map_err(|e| AppError::Internal {
            message: format!("Password verification task failed: {}", e),
        })?;

    metrics::record_login(verified);
    if !verified {
        tracing::warn!(teacher_id = %teacher.teacher_id, "Rejected login");
        return Err(invalid());
    }

    tracing::info!(teacher_id = %teacher.teacher_id, "Teacher logged in");

    Ok(Json(LoginResponse {
        teacher_id: teacher.teacher_id,
        email: teacher.email,
        name: teacher.name,
    }))
}

/// Fetch a profile; the password hash is never included
pub async fn get_teacher(
    State(state): State<AppState>,
    Path(teacher_id): Path<String>,
) -> Result<Json<TeacherProfile>> {
    let teacher = state
        .store
        .find_teacher(&teacher_id)
        .await?
        .ok_or_else(|| AppError::not_found("Teacher", &teacher_id))?;

    Ok(Json(teacher.into()))
}

/// Update profile fields. `password` and `teacherId` in the body are ignored.
pub async fn update_teacher(
    State(state): State<AppState>,
    Path(teacher_id): Path<String>,
    AppJson(update): AppJson<TeacherUpdate>,
) -> Result<Json<ProfileUpdateResponse>> {
    if let Some(ref email) = update.email {
        super::require(email, "email")?;
    }

    let teacher = state
        .store
        .update_teacher(&teacher_id, &update)
        .await?
        .ok_or_else(|| AppError::not_found("Teacher", &teacher_id))?;

    tracing::info!(teacher_id = %teacher_id, "Profile updated");

    Ok(Json(ProfileUpdateResponse {
        message: "Profile updated successfully".to_string(),
        teacher: teacher.into(),
    }))
}

#[cfg(test)]
mod tests {
    use crate::handlers::test_support::{test_app, TestApp};
    use axum::http::StatusCode;
    use serde_json::json;

    async fn register(app: &TestApp) {
        let (status, body) = app
            .post(
                "/api/signup",
                json!({
                    "name": "Meena",
                    "email": "meena@school.test",
                    "teacherId": "T100",
                    "dob": "1988-07-14",
                    "password": "s3cret!"
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{}", body);
        assert_eq!(body["message"], "Teacher registered successfully");
    }

    #[tokio::test]
    async fn test_signup_rejects_duplicates() {
        let app = test_app();
        register(&app).await;

        let (status, body) = app
            .post(
                "/api/signup",
                json!({ "email": "meena@school.test", "teacherId": "T200", "password": "x" }),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Teacher with this email or ID already exists");

        let (status, _) = app
            .post(
                "/api/signup",
                json!({ "email": "other@school.test", "teacherId": "T100", "password": "x" }),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_signup_requires_fields() {
        let app = test_app();
        let (status, body) = app
            .post("/api/signup", json!({ "email": "a@school.test", "teacherId": "T1" }))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["field"], "password");

        let (status, _) = app.post("/api/signup", json!("not an object")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_login() {
        let app = test_app();
        register(&app).await;

        let (status, body) = app
            .post("/api/login", json!({ "identifier": "meena@school.test", "password": "s3cret!" }))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["teacherId"], "T100");
        assert_eq!(body["name"], "Meena");

        let (status, _) = app
            .post("/api/login", json!({ "identifier": "T100", "password": "s3cret!" }))
            .await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = app
            .post("/api/login", json!({ "identifier": "T100", "password": "wrong" }))
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["message"], "Invalid credentials");

        let (status, _) = app
            .post("/api/login", json!({ "identifier": "nobody", "password": "s3cret!" }))
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_profile_hides_password() {
        let app = test_app();
        register(&app).await;

        let (status, body) = app.get("/api/teacher/T100").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["email"], "meena@school.test");
        assert_eq!(body["dob"], "1988-07-14");
        assert!(body.get("password").is_none());

        let (status, _) = app.get("/api/teacher/T999").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_update_cannot_change_password_or_id() {
        let app = test_app();
        register(&app).await;

        let (status, body) = app
            .put(
                "/api/teacher/T100",
                json!({
                    "specialization": "Physics",
                    "password": "hijacked",
                    "teacherId": "T999"
                }),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Profile updated successfully");
        assert_eq!(body["teacher"]["specialization"], "Physics");
        assert_eq!(body["teacher"]["teacherId"], "T100");
        assert!(body["teacher"].get("password").is_none());

        let (status, _) = app
            .post("/api/login", json!({ "identifier": "T100", "password": "s3cret!" }))
            .await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = app.put("/api/teacher/T404", json!({ "name": "x" })).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
