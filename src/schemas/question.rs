use serde::Serialize;

pub(crate) use crate::core::time::format_primitive;
use crate::db::types::QuestionStatus;
use crate::repositories::questions::QuestionListRow;
use crate::schemas::submission::SubmissionResponse;

#[derive(Debug, Serialize)]
pub(crate) struct QuestionSummaryResponse {
    pub(crate) id: String,
    pub(crate) department_id: String,
    pub(crate) course_id: String,
    pub(crate) semester_id: String,
    pub(crate) exam_type_id: String,
    pub(crate) section: Option<String>,
    pub(crate) status: QuestionStatus,
    pub(crate) department_code: String,
    pub(crate) course_code: String,
    pub(crate) course_title: String,
    pub(crate) semester_name: String,
    pub(crate) exam_type_name: String,
    pub(crate) submission_count: i64,
    pub(crate) created_at: String,
}

impl QuestionSummaryResponse {
    pub(crate) fn from_row(row: QuestionListRow) -> Self {
        Self {
            id: row.id,
            department_id: row.department_id,
            course_id: row.course_id,
            semester_id: row.semester_id,
            exam_type_id: row.exam_type_id,
            section: row.section,
            status: row.status,
            department_code: row.department_code,
            course_code: row.course_code,
            course_title: row.course_title,
            semester_name: row.semester_name,
            exam_type_name: row.exam_type_name,
            submission_count: row.submission_count,
            created_at: format_primitive(row.created_at),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct QuestionDetailResponse {
    pub(crate) id: String,
    pub(crate) department_id: String,
    pub(crate) course_id: String,
    pub(crate) semester_id: String,
    pub(crate) exam_type_id: String,
    pub(crate) section: Option<String>,
    pub(crate) status: QuestionStatus,
    pub(crate) department_code: String,
    pub(crate) department_name: String,
    pub(crate) course_code: String,
    pub(crate) course_title: String,
    pub(crate) semester_name: String,
    pub(crate) exam_type_name: String,
    pub(crate) created_at: String,
    pub(crate) submissions: Vec<SubmissionResponse>,
}
