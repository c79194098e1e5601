use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::api::errors::ApiError;
use crate::api::guards::CurrentUser;
use crate::api::validation::{sanitized_filename, validate_document_upload};
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::repositories;
use crate::schemas::submission::{
    format_primitive, PresignRequest, PresignResponse, SubmissionRegister, SubmissionResponse,
};
use crate::services::consolidation;

use super::helpers;

pub(super) async fn presigned_upload_url(
    CurrentUser(_user): CurrentUser,
    State(state): State<AppState>,
    Json(payload): Json<PresignRequest>,
) -> Result<Json<PresignResponse>, ApiError> {
    validate_document_upload(
        &payload.filename,
        &payload.content_type,
        &state.settings().storage().allowed_document_extensions,
    )?;

    let storage = state.storage().ok_or_else(|| {
        ApiError::ServiceUnavailable(
            "Direct upload not available. Use the standard upload endpoint.".to_string(),
        )
    })?;

    let object_id = Uuid::new_v4().to_string();
    let key = format!(
        "{}{}_{}",
        helpers::OBJECT_KEY_PREFIX,
        object_id,
        sanitized_filename(&payload.filename)
    );
    let expires = std::time::Duration::from_secs(
        state.settings().storage().presigned_url_expire_minutes * 60,
    );

    let upload_url = storage
        .presign_put(&key, &payload.content_type, expires)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to generate upload URL"))?;

    Ok(Json(PresignResponse {
        upload_url,
        s3_key: key,
        method: "PUT",
        content_type: payload.content_type,
    }))
}

/// Registers a paper the client already pushed through a presigned PUT.
pub(super) async fn register_submission(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Json(payload): Json<SubmissionRegister>,
) -> Result<(StatusCode, Json<SubmissionResponse>), ApiError> {
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;

    validate_document_upload(
        &payload.filename,
        &payload.content_type,
        &state.settings().storage().allowed_document_extensions,
    )?;

    if !payload.s3_key.starts_with(helpers::OBJECT_KEY_PREFIX) || payload.s3_key.contains("..") {
        return Err(ApiError::BadRequest("Invalid object key".to_string()));
    }

    let max_bytes = helpers::max_upload_bytes(&state);
    if payload.file_size as u64 > max_bytes {
        return Err(ApiError::BadRequest(format!(
            "File size exceeds {}MB limit",
            state.settings().storage().max_upload_size_mb
        )));
    }

    let key = helpers::build_question_key(
        &state,
        payload.department_id,
        payload.course_id,
        payload.semester_id,
        payload.exam_type_id,
        payload.section,
    )
    .await?;

    let resolved = consolidation::resolve_question(state.db(), &key, &user.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to resolve question"))?;

    let submission = repositories::submissions::insert(
        state.db(),
        repositories::submissions::CreateSubmission {
            id: &Uuid::new_v4().to_string(),
            question_id: &resolved.question.id,
            uploader_id: &user.id,
            filename: &sanitized_filename(&payload.filename),
            file_path: &payload.s3_key,
            file_size: payload.file_size,
            mime_type: &payload.content_type,
            sha256: None,
            created_at: primitive_now_utc(),
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to store submission"))?;

    metrics::counter!("submissions_registered_total").increment(1);
    tracing::info!(
        submission_id = %submission.id,
        question_id = %resolved.question.id,
        question_created = resolved.created,
        "Registered submission"
    );

    Ok((
        StatusCode::CREATED,
        Json(SubmissionResponse {
            id: submission.id,
            question_id: submission.question_id,
            uploader_id: submission.uploader_id,
            uploader_name: user.full_name,
            filename: submission.filename,
            file_size: submission.file_size,
            mime_type: submission.mime_type,
            score: 0,
            my_vote: None,
            created_at: format_primitive(submission.created_at),
        }),
    ))
}

/// Multipart fallback for clients that cannot PUT to S3 directly.
pub(super) async fn upload_document(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<SubmissionResponse>), ApiError> {
    let storage = state.storage().ok_or_else(|| {
        ApiError::ServiceUnavailable("S3 storage is not configured".to_string())
    })?;

    let max_bytes = helpers::max_upload_bytes(&state);

    let mut file_bytes: Option<Vec<u8>> = None;
    let mut filename: Option<String> = None;
    let mut content_type: Option<String> = None;
    let mut department_id: Option<String> = None;
    let mut course_id: Option<String> = None;
    let mut semester_id: Option<String> = None;
    let mut exam_type_id: Option<String> = None;
    let mut section: Option<String> = None;

    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|_| ApiError::BadRequest("Invalid multipart data".to_string()))?
    {
        let name = field.name().unwrap_or("").to_string();
        if name == "file" {
            filename = field.file_name().map(|s| s.to_string());
            content_type = field.content_type().map(|s| s.to_string());
            let mut bytes = Vec::new();
            while let Some(chunk) = field
                .chunk()
                .await
                .map_err(|_| ApiError::BadRequest("Failed to read file".to_string()))?
            {
                let next_size = bytes.len() as u64 + chunk.len() as u64;
                if next_size > max_bytes {
                    return Err(ApiError::BadRequest(format!(
                        "File size exceeds {}MB limit",
                        state.settings().storage().max_upload_size_mb
                    )));
                }
                bytes.extend_from_slice(&chunk);
            }
            file_bytes = Some(bytes);
        } else {
            let text = field
                .text()
                .await
                .map_err(|_| ApiError::BadRequest(format!("Invalid field '{name}'")))?;
            match name.as_str() {
                "department_id" => department_id = Some(text),
                "course_id" => course_id = Some(text),
                "semester_id" => semester_id = Some(text),
                "exam_type_id" => exam_type_id = Some(text),
                "section" => section = Some(text),
                _ => {}
            }
        }
    }

    let file_bytes =
        file_bytes.ok_or_else(|| ApiError::BadRequest("File is required".to_string()))?;
    let filename = filename.unwrap_or_else(|| "paper.pdf".to_string());
    let content_type = content_type.unwrap_or_else(|| "application/octet-stream".to_string());
    let department_id = department_id
        .ok_or_else(|| ApiError::BadRequest("department_id is required".to_string()))?;
    let course_id =
        course_id.ok_or_else(|| ApiError::BadRequest("course_id is required".to_string()))?;
    let semester_id =
        semester_id.ok_or_else(|| ApiError::BadRequest("semester_id is required".to_string()))?;
    let exam_type_id = exam_type_id
        .ok_or_else(|| ApiError::BadRequest("exam_type_id is required".to_string()))?;

    validate_document_upload(
        &filename,
        &content_type,
        &state.settings().storage().allowed_document_extensions,
    )?;

    if file_bytes.is_empty() {
        return Err(ApiError::BadRequest("File must not be empty".to_string()));
    }

    let key = helpers::build_question_key(
        &state,
        department_id,
        course_id,
        semester_id,
        exam_type_id,
        section,
    )
    .await?;

    let resolved = consolidation::resolve_question(state.db(), &key, &user.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to resolve question"))?;

    let submission_id = Uuid::new_v4().to_string();
    let safe_filename = sanitized_filename(&filename);
    let object_key = format!("{}{}_{}", helpers::OBJECT_KEY_PREFIX, submission_id, safe_filename);

    let (file_size, hash) = storage
        .upload_bytes(&object_key, &content_type, file_bytes)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to upload file to S3"))?;

    let submission = repositories::submissions::insert(
        state.db(),
        repositories::submissions::CreateSubmission {
            id: &submission_id,
            question_id: &resolved.question.id,
            uploader_id: &user.id,
            filename: &safe_filename,
            file_path: &object_key,
            file_size,
            mime_type: &content_type,
            sha256: Some(hash),
            created_at: primitive_now_utc(),
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to store submission"))?;

    metrics::counter!("submissions_uploaded_total").increment(1);
    tracing::info!(
        submission_id = %submission.id,
        question_id = %resolved.question.id,
        question_created = resolved.created,
        "Uploaded submission"
    );

    Ok((
        StatusCode::CREATED,
        Json(SubmissionResponse {
            id: submission.id,
            question_id: submission.question_id,
            uploader_id: submission.uploader_id,
            uploader_name: user.full_name,
            filename: submission.filename,
            file_size: submission.file_size,
            mime_type: submission.mime_type,
            score: 0,
            my_vote: None,
            created_at: format_primitive(submission.created_at),
        }),
    ))
}
