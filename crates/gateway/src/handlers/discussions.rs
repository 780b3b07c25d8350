//! Discussion board handlers

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
    db::models::{Discussion, Reply},
    errors::{AppError, Result},
    new_document_id,
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddDiscussionRequest {
    #[serde(default)]
    pub teacher_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct EditDiscussionRequest {
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddReplyRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub reply_message: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscussionCreated {
    pub success: bool,
    pub message: String,
    pub new_discussion: Discussion,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscussionUpdated {
    pub success: bool,
    pub updated_discussion: Discussion,
}

pub async fn add_discussion(
    State(state): State<AppState>,
    AppJson(request): AppJson<AddDiscussionRequest>,
) -> Result<(StatusCode, Json<DiscussionCreated>)> {
    require(&request.teacher_id, "teacherId")?;
    require(&request.message, "message")?;

    let discussion = Discussion {
        id: new_document_id(),
        teacher_id: request.teacher_id,
        name: request.name,
        message: request.message,
        replies: Vec::new(),
        created_at: Utc::now(),
    };
    state.store.insert_discussion(discussion.clone()).await?;

    tracing::info!(discussion_id = %discussion.id, teacher_id = %discussion.teacher_id, "Discussion added");

    Ok((
        StatusCode::CREATED,
        Json(DiscussionCreated {
            success: true,
            message: "Discussion added".to_string(),
            new_discussion: discussion,
        }),
    ))
}

pub async fn edit_discussion(
    State(state): State<AppState>,
    Path(id): Path<String>,
    AppJson(request): AppJson<EditDiscussionRequest>,
) -> Result<Json<DiscussionUpdated>> {
    require(&request.message, "message")?;

    let updated = state
        .store
        .update_discussion_message(&id, &request.message)
        .await?
        .ok_or_else(|| AppError::not_found("Discussion", &id))?;

    Ok(Json(DiscussionUpdated {
        success: true,
        updated_discussion: updated,
    }))
}

pub async fn add_reply(
    State(state): State<AppState>,
    Path(id): Path<String>,
    AppJson(request): AppJson<AddReplyRequest>,
) -> Result<Json<DiscussionUpdated>> {
    require(&request.reply_message, "replyMessage")?;

    let reply = Reply {
        id: new_document_id(),
        name: request.name,
        reply_message: request.reply_message,
        date: Utc::now(),
    };

    let updated = state
        .store
        .push_discussion_reply(&id, reply)
        .await?
        .ok_or_else(|| AppError::not_found("Discussion", &id))?;

    tracing::debug!(discussion_id = %id, replies = updated.replies.len(), "Reply added");

    Ok(Json(DiscussionUpdated {
        success: true,
        updated_discussion: updated,
    }))
}

pub async fn list_discussions(
    State(state): State<AppState>,
    Path(teacher_id): Path<String>,
) -> Result<Json<Vec<Discussion>>> {
    Ok(Json(state.store.list_discussions(&teacher_id).await?))
}

#[cfg(test)]
mod tests {
    use crate::handlers::test_support::test_app;
    use axum::http::StatusCode;
    use serde_json::json;

    #[tokio::test]
    async fn test_discussion_thread() {
        let app = test_app();

        let (status, body) = app
            .post(
                "/addDiscussion",
                json!({ "teacherId": "T1", "name": "Meena", "message": "Lab moved to Friday" }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["success"], true);
        let id = body["newDiscussion"]["_id"].as_str().unwrap().to_string();

        let (status, body) = app
            .put(&format!("/editDiscussion/{}", id), json!({ "message": "Lab moved to Monday" }))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["updatedDiscussion"]["message"], "Lab moved to Monday");

        let (status, body) = app
            .post(
                &format!("/addReply/{}", id),
                json!({ "name": "Ravi", "replyMessage": "Noted" }),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        let replies = body["updatedDiscussion"]["replies"].as_array().unwrap();
        assert_eq!(replies.len(), 1);
        assert_eq!(replies[0]["replyMessage"], "Noted");
        assert!(replies[0]["date"].is_string());

        let (status, body) = app.get("/getDiscussions/T1").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 1);

        let (_, body) = app.get("/getDiscussions/T2").await;
        assert_eq!(body, json!([]));
    }

    #[tokio::test]
    async fn test_unknown_discussion_is_404() {
        let app = test_app();

        let (status, _) = app
            .put("/editDiscussion/missing", json!({ "message": "x" }))
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = app
            .post("/addReply/missing", json!({ "name": "x", "replyMessage": "y" }))
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
