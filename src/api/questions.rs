use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use crate::api::errors::ApiError;
use crate::api::guards::CurrentUser;
use crate::api::pagination::PaginatedResponse;
use crate::core::state::AppState;
use crate::db::types::{QuestionStatus, UserRole};
use crate::repositories;
use crate::schemas::question::{format_primitive, QuestionDetailResponse, QuestionSummaryResponse};
use crate::schemas::submission::SubmissionResponse;

#[derive(Debug, Deserialize)]
struct ListQuestionsQuery {
    #[serde(default)]
    skip: i64,
    #[serde(default = "crate::api::pagination::default_limit")]
    limit: i64,
    #[serde(default)]
    #[serde(alias = "departmentId")]
    department_id: Option<String>,
    #[serde(default)]
    #[serde(alias = "courseId")]
    course_id: Option<String>,
    #[serde(default)]
    #[serde(alias = "semesterId")]
    semester_id: Option<String>,
    #[serde(default)]
    #[serde(alias = "examTypeId")]
    exam_type_id: Option<String>,
    #[serde(default)]
    status: Option<QuestionStatus>,
}

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_questions))
        .route("/:question_id", get(get_question))
}

async fn list_questions(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Query(params): Query<ListQuestionsQuery>,
) -> Result<Json<PaginatedResponse<QuestionSummaryResponse>>, ApiError> {
    let skip = params.skip.max(0);
    let limit = params.limit.clamp(1, 1000);

    // Students browse the published catalog; only admins see other statuses.
    let status = if user.role == UserRole::Admin {
        params.status
    } else {
        Some(QuestionStatus::Published)
    };

    let rows = repositories::questions::list(
        state.db(),
        repositories::questions::ListQuestionsParams {
            department_id: params.department_id,
            course_id: params.course_id,
            semester_id: params.semester_id,
            exam_type_id: params.exam_type_id,
            status,
            skip,
            limit,
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to list questions"))?;

    let total_count = rows.first().map(|row| row.total_count).unwrap_or(0);
    let items = rows.into_iter().map(QuestionSummaryResponse::from_row).collect();

    Ok(Json(PaginatedResponse { items, total_count, skip, limit }))
}

async fn get_question(
    Path(question_id): Path<String>,
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<QuestionDetailResponse>, ApiError> {
    let question = repositories::questions::find_by_id(state.db(), &question_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch question"))?;

    let Some(question) = question else {
        return Err(ApiError::NotFound("Question not found".to_string()));
    };

    if question.status != QuestionStatus::Published && user.role != UserRole::Admin {
        // Uploaders keep sight of their own unpublished questions.
        let own = repositories::submissions::exists_by_question_and_uploader(
            state.db(),
            &question.id,
            &user.id,
        )
        .await
        .map_err(|e| ApiError::internal(e, "Failed to check question ownership"))?;

        if !own {
            return Err(ApiError::NotFound("Question not found".to_string()));
        }
    }

    let labels = repositories::questions::labels_for(state.db(), &question)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch question labels"))?;

    let submissions =
        repositories::submissions::list_ranked_by_question(state.db(), &question.id, &user.id)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to list submissions"))?;

    Ok(Json(QuestionDetailResponse {
        id: question.id,
        department_id: question.department_id,
        course_id: question.course_id,
        semester_id: question.semester_id,
        exam_type_id: question.exam_type_id,
        section: question.section,
        status: question.status,
        department_code: labels.department_code,
        department_name: labels.department_name,
        course_code: labels.course_code,
        course_title: labels.course_title,
        semester_name: labels.semester_name,
        exam_type_name: labels.exam_type_name,
        created_at: format_primitive(question.created_at),
        submissions: submissions.into_iter().map(SubmissionResponse::from_row).collect(),
    }))
}
