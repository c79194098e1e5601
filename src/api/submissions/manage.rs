use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use crate::api::errors::ApiError;
use crate::api::guards::CurrentUser;
use crate::api::pagination::PaginatedResponse;
use crate::core::state::AppState;
use crate::db::types::UserRole;
use crate::repositories;
use crate::schemas::submission::{DownloadResponse, OwnSubmissionResponse};

use super::helpers;

#[derive(Debug, Deserialize)]
pub(super) struct ListMineQuery {
    #[serde(default)]
    skip: i64,
    #[serde(default = "crate::api::pagination::default_limit")]
    limit: i64,
}

pub(super) async fn list_my_submissions(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Query(params): Query<ListMineQuery>,
) -> Result<Json<PaginatedResponse<OwnSubmissionResponse>>, ApiError> {
    let skip = params.skip.max(0);
    let limit = params.limit.clamp(1, 1000);

    let rows = repositories::submissions::list_by_uploader(state.db(), &user.id, skip, limit)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list submissions"))?;

    let total_count = rows.first().map(|row| row.total_count).unwrap_or(0);
    let items = rows.into_iter().map(OwnSubmissionResponse::from_row).collect();

    Ok(Json(PaginatedResponse { items, total_count, skip, limit }))
}

pub(super) async fn download_url(
    Path(submission_id): Path<String>,
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<DownloadResponse>, ApiError> {
    let submission = helpers::fetch_submission(state.db(), &submission_id).await?;
    let question = helpers::fetch_question(state.db(), &submission.question_id).await?;

    if !helpers::can_access_submission(&user, &question, &submission.uploader_id) {
        return Err(ApiError::NotFound("Submission not found".to_string()));
    }

    let storage = state.storage().ok_or_else(|| {
        ApiError::ServiceUnavailable("S3 storage is not configured".to_string())
    })?;

    let expires_in_seconds = state.settings().storage().presigned_url_expire_minutes * 60;
    let download_url = storage
        .presign_get(&submission.file_path, std::time::Duration::from_secs(expires_in_seconds))
        .await
        .map_err(|e| ApiError::internal(e, "Failed to generate download URL"))?;

    Ok(Json(DownloadResponse { download_url, expires_in_seconds }))
}

pub(super) async fn delete_submission(
    Path(submission_id): Path<String>,
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> Result<StatusCode, ApiError> {
    let submission = helpers::fetch_submission(state.db(), &submission_id).await?;

    if user.role != UserRole::Admin && user.id != submission.uploader_id {
        return Err(ApiError::Forbidden("You can only delete your own submissions"));
    }

    repositories::submissions::delete_by_id(state.db(), &submission.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to delete submission"))?;

    // The S3 object stays behind; log the key for out-of-band cleanup.
    tracing::info!(
        user_id = %user.id,
        submission_id = %submission.id,
        file_path = %submission.file_path,
        action = "submission_delete",
        "Deleted submission"
    );

    Ok(StatusCode::NO_CONTENT)
}
