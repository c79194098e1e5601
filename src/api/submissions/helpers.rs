use sqlx::PgPool;

use crate::api::errors::ApiError;
use crate::core::state::AppState;
use crate::db::models::{Question, Submission, User};
use crate::db::types::{QuestionStatus, UserRole};
use crate::repositories;
use crate::repositories::questions::QuestionKey;
use crate::services::consolidation;

/// Object keys handed out by presign and accepted at registration.
pub(super) const OBJECT_KEY_PREFIX: &str = "papers/";

pub(super) async fn fetch_submission(
    pool: &PgPool,
    submission_id: &str,
) -> Result<Submission, ApiError> {
    repositories::submissions::find_by_id(pool, submission_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch submission"))?
        .ok_or_else(|| ApiError::NotFound("Submission not found".to_string()))
}

pub(super) async fn fetch_question(
    pool: &PgPool,
    question_id: &str,
) -> Result<Question, ApiError> {
    repositories::questions::find_by_id(pool, question_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch question"))?
        .ok_or_else(|| ApiError::NotFound("Question not found".to_string()))
}

/// Published questions are visible to everyone; anything else only to admins
/// and the submission's own uploader.
pub(super) fn can_access_submission(user: &User, question: &Question, uploader_id: &str) -> bool {
    question.status == QuestionStatus::Published
        || user.role == UserRole::Admin
        || user.id == uploader_id
}

/// Validates the taxonomy references of an upload and builds the identity key.
pub(super) async fn build_question_key(
    state: &AppState,
    department_id: String,
    course_id: String,
    semester_id: String,
    exam_type_id: String,
    section: Option<String>,
) -> Result<QuestionKey, ApiError> {
    let department = repositories::catalog::find_department_by_id(state.db(), &department_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch department"))?;
    if department.is_none() {
        return Err(ApiError::BadRequest("Unknown department".to_string()));
    }

    let course = repositories::catalog::find_course_by_id(state.db(), &course_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch course"))?;
    let Some(course) = course else {
        return Err(ApiError::BadRequest("Unknown course".to_string()));
    };
    if course.department_id != department_id {
        return Err(ApiError::BadRequest("Course does not belong to the department".to_string()));
    }

    let semester = repositories::catalog::find_semester_by_id(state.db(), &semester_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch semester"))?;
    if semester.is_none() {
        return Err(ApiError::BadRequest("Unknown semester".to_string()));
    }

    let exam_type = repositories::catalog::find_exam_type_by_id(state.db(), &exam_type_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch exam type"))?;
    if exam_type.is_none() {
        return Err(ApiError::BadRequest("Unknown exam type".to_string()));
    }

    Ok(QuestionKey {
        department_id,
        course_id,
        semester_id,
        exam_type_id,
        section: consolidation::normalize_section(section),
    })
}

pub(super) fn max_upload_bytes(state: &AppState) -> u64 {
    state.settings().storage().max_upload_size_mb * 1024 * 1024
}
