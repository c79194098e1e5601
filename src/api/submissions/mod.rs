mod helpers;
mod manage;
mod upload;
mod votes;

use axum::{
    routing::{delete, get, post, put},
    Router,
};

use crate::core::state::AppState;

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(upload::register_submission))
        .route("/presign", post(upload::presigned_upload_url))
        .route("/upload", post(upload::upload_document))
        .route("/mine", get(manage::list_my_submissions))
        .route("/:submission_id", delete(manage::delete_submission))
        .route("/:submission_id/download", get(manage::download_url))
        .route("/:submission_id/vote", put(votes::cast_vote))
}

#[cfg(test)]
mod tests;
