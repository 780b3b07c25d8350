//! Learning platform handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use super::{AppJson, AppQuery, MessageResponse};
use crate::AppState;
use classdesk_common::{
    db::models::{Platform, PlatformInput},
    errors::{AppError, Result},
    new_document_id,
};

#[derive(Debug, Default, Deserialize)]
pub struct PlatformQuery {
    pub teacherid: Option<String>,
}

pub async fn list_platforms(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<PlatformQuery>,
) -> Result<Json<Vec<Platform>>> {
    let teacherid = query.teacherid.as_deref().filter(|t| !t.is_empty());
    Ok(Json(state.store.list_platforms(teacherid).await?))
}

pub async fn create_platform(
    State(state): State<AppState>,
    AppJson(input): AppJson<PlatformInput>,
) -> Result<(StatusCode, Json<Platform>)> {
    let platform = Platform::from_input(new_document_id(), input);
    state.store.insert_platform(platform.clone()).await?;

    tracing::info!(platform_id = %platform.id, teacherid = %platform.teacherid, "Platform added");

    Ok((StatusCode::CREATED, Json(platform)))
}

pub async fn update_platform(
    State(state): State<AppState>,
    Path(id): Path<String>,
    AppJson(input): AppJson<PlatformInput>,
) -> Result<Json<Platform>> {
    state
        .store
        .update_platform(&id, &input)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::not_found("Platform", id))
}

pub async fn delete_platform(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>> {
    if !state.store.delete_platform(&id).await? {
        return Err(AppError::not_found("Platform", id));
    }

    tracing::info!(platform_id = %id, "Platform deleted");
    Ok(Json(MessageResponse::new("Platform deleted")))
}
