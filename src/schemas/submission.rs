use serde::{Deserialize, Serialize};
use validator::Validate;

pub(crate) use crate::core::time::format_primitive;
use crate::db::types::QuestionStatus;
use crate::repositories::submissions::{OwnSubmissionRow, RankedSubmissionRow};

#[derive(Debug, Deserialize)]
pub(crate) struct PresignRequest {
    pub(crate) filename: String,
    #[serde(alias = "contentType")]
    pub(crate) content_type: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct PresignResponse {
    pub(crate) upload_url: String,
    pub(crate) s3_key: String,
    pub(crate) method: &'static str,
    pub(crate) content_type: String,
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct SubmissionRegister {
    #[serde(alias = "departmentId")]
    pub(crate) department_id: String,
    #[serde(alias = "courseId")]
    pub(crate) course_id: String,
    #[serde(alias = "semesterId")]
    pub(crate) semester_id: String,
    #[serde(alias = "examTypeId")]
    pub(crate) exam_type_id: String,
    #[serde(default)]
    pub(crate) section: Option<String>,
    #[serde(alias = "s3Key")]
    #[validate(length(min = 1, message = "s3_key must not be empty"))]
    pub(crate) s3_key: String,
    #[validate(length(min = 1, message = "filename must not be empty"))]
    pub(crate) filename: String,
    #[serde(alias = "fileSize")]
    #[validate(range(min = 1, message = "file_size must be positive"))]
    pub(crate) file_size: i64,
    #[serde(alias = "contentType")]
    pub(crate) content_type: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct VoteRequest {
    pub(crate) value: i16,
}

#[derive(Debug, Serialize)]
pub(crate) struct SubmissionResponse {
    pub(crate) id: String,
    pub(crate) question_id: String,
    pub(crate) uploader_id: String,
    pub(crate) uploader_name: String,
    pub(crate) filename: String,
    pub(crate) file_size: i64,
    pub(crate) mime_type: String,
    pub(crate) score: i64,
    pub(crate) my_vote: Option<i16>,
    pub(crate) created_at: String,
}

impl SubmissionResponse {
    pub(crate) fn from_row(row: RankedSubmissionRow) -> Self {
        Self {
            id: row.id,
            question_id: row.question_id,
            uploader_id: row.uploader_id,
            uploader_name: row.uploader_name,
            filename: row.filename,
            file_size: row.file_size,
            mime_type: row.mime_type,
            score: row.score,
            my_vote: row.my_vote,
            created_at: format_primitive(row.created_at),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct OwnSubmissionResponse {
    pub(crate) id: String,
    pub(crate) question_id: String,
    pub(crate) question_status: QuestionStatus,
    pub(crate) filename: String,
    pub(crate) file_size: i64,
    pub(crate) mime_type: String,
    pub(crate) score: i64,
    pub(crate) created_at: String,
}

impl OwnSubmissionResponse {
    pub(crate) fn from_row(row: OwnSubmissionRow) -> Self {
        Self {
            id: row.id,
            question_id: row.question_id,
            question_status: row.question_status,
            filename: row.filename,
            file_size: row.file_size,
            mime_type: row.mime_type,
            score: row.score,
            created_at: format_primitive(row.created_at),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct DownloadResponse {
    pub(crate) download_url: String,
    pub(crate) expires_in_seconds: u64,
}

#[derive(Debug, Serialize)]
pub(crate) struct VoteResponse {
    pub(crate) submission_id: String,
    pub(crate) my_vote: Option<i16>,
    pub(crate) score: i64,
}
