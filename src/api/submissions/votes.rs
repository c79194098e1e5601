use axum::{
    extract::{Path, State},
    Json,
};

use crate::api::errors::ApiError;
use crate::api::guards::CurrentUser;
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::repositories;
use crate::schemas::submission::{VoteRequest, VoteResponse};

use super::helpers;

/// One active vote per (user, submission): +1/-1 upsert, 0 retracts.
pub(super) async fn cast_vote(
    Path(submission_id): Path<String>,
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Json(payload): Json<VoteRequest>,
) -> Result<Json<VoteResponse>, ApiError> {
    if !matches!(payload.value, -1 | 0 | 1) {
        return Err(ApiError::BadRequest("Vote value must be -1, 0 or 1".to_string()));
    }

    let submission = helpers::fetch_submission(state.db(), &submission_id).await?;
    let question = helpers::fetch_question(state.db(), &submission.question_id).await?;

    if !helpers::can_access_submission(&user, &question, &submission.uploader_id) {
        return Err(ApiError::NotFound("Submission not found".to_string()));
    }

    if payload.value == 0 {
        repositories::votes::delete(state.db(), &submission.id, &user.id)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to retract vote"))?;
    } else {
        repositories::votes::upsert(
            state.db(),
            &submission.id,
            &user.id,
            payload.value,
            primitive_now_utc(),
        )
        .await
        .map_err(|e| ApiError::internal(e, "Failed to store vote"))?;
    }

    metrics::counter!("votes_cast_total").increment(1);

    let my_vote = repositories::votes::find_value(state.db(), &submission.id, &user.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to read vote"))?;
    let score = repositories::votes::score(state.db(), &submission.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to compute score"))?;

    Ok(Json(VoteResponse { submission_id: submission.id, my_vote, score }))
}
