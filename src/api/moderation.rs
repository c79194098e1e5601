use axum::{
    extract::{Path, Query, State},
    routing::{get, patch},
    Json, Router,
};
use serde::Deserialize;

use crate::api::errors::ApiError;
use crate::api::guards::CurrentAdmin;
use crate::api::pagination::PaginatedResponse;
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::db::types::QuestionStatus;
use crate::repositories;
use crate::schemas::question::{format_primitive, QuestionSummaryResponse};

#[derive(Debug, Deserialize)]
struct ReviewQueueQuery {
    #[serde(default)]
    skip: i64,
    #[serde(default = "crate::api::pagination::default_limit")]
    limit: i64,
    #[serde(default = "default_review_status")]
    status: QuestionStatus,
}

#[derive(Debug, Deserialize)]
struct StatusUpdate {
    status: QuestionStatus,
}

fn default_review_status() -> QuestionStatus {
    QuestionStatus::Pending
}

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/questions", get(review_queue))
        .route("/questions/:question_id/status", patch(set_question_status))
}

async fn review_queue(
    CurrentAdmin(_admin): CurrentAdmin,
    State(state): State<AppState>,
    Query(params): Query<ReviewQueueQuery>,
) -> Result<Json<PaginatedResponse<QuestionSummaryResponse>>, ApiError> {
    let skip = params.skip.max(0);
    let limit = params.limit.clamp(1, 1000);

    let rows = repositories::questions::list(
        state.db(),
        repositories::questions::ListQuestionsParams {
            status: Some(params.status),
            skip,
            limit,
            ..Default::default()
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to list review queue"))?;

    let total_count = rows.first().map(|row| row.total_count).unwrap_or(0);
    let items = rows.into_iter().map(QuestionSummaryResponse::from_row).collect();

    Ok(Json(PaginatedResponse { items, total_count, skip, limit }))
}

async fn set_question_status(
    Path(question_id): Path<String>,
    CurrentAdmin(admin): CurrentAdmin,
    State(state): State<AppState>,
    Json(payload): Json<StatusUpdate>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let question = repositories::questions::find_by_id(state.db(), &question_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch question"))?;

    let Some(question) = question else {
        return Err(ApiError::NotFound("Question not found".to_string()));
    };

    let now = primitive_now_utc();
    repositories::questions::update_status(state.db(), &question.id, payload.status, now)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to update question status"))?;

    metrics::counter!("moderation_status_changes_total").increment(1);
    tracing::info!(
        admin_id = %admin.id,
        question_id = %question.id,
        from = ?question.status,
        to = ?payload.status,
        action = "question_status_update",
        "Admin changed question status"
    );

    Ok(Json(serde_json::json!({
        "id": question.id,
        "status": payload.status,
        "updated_at": format_primitive(now),
    })))
}
