//! Live session scheduling

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use super::AppJson;
use crate::AppState;
use classdesk_common::{
    db::models::{lenient, LiveSession},
    errors::{AppError, Result},
    new_document_id,
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionRequest {
    #[serde(default)]
    pub teacher_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub time: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub link: String,
}

#[derive(Debug, Serialize)]
pub struct SessionCreated {
    pub message: String,
    pub session: LiveSession,
}

pub async fn create_session(
    State(state): State<AppState>,
    AppJson(request): AppJson<CreateSessionRequest>,
) -> Result<(StatusCode, Json<SessionCreated>)> {
    let all_present = [
        &request.teacher_id,
        &request.name,
        &request.time,
        &request.date,
        &request.link,
    ]
    .iter()
    .all(|v| !v.trim().is_empty());
    if !all_present {
        return Err(AppError::validation("All fields are required"));
    }

    let date = lenient::parse_date(&request.date).ok_or_else(|| AppError::Validation {
        message: "date must be a YYYY-MM-DD date".to_string(),
        field: Some("date".to_string()),
    })?;

    let session = LiveSession {
        id: new_document_id(),
        teacher_id: request.teacher_id,
        name: request.name,
        time: request.time,
        date,
        link: request.link,
    };
    state.store.insert_live_session(session.clone()).await?;

    tracing::info!(session_id = %session.id, teacher_id = %session.teacher_id, date = %session.date, "Live session scheduled");

    Ok((
        StatusCode::CREATED,
        Json(SessionCreated {
            message: "Live session created successfully".to_string(),
            session,
        }),
    ))
}

pub async fn list_sessions(
    State(state): State<AppState>,
    Path(teacher_id): Path<String>,
) -> Result<Json<Vec<LiveSession>>> {
    Ok(Json(state.store.list_live_sessions(&teacher_id).await?))
}
