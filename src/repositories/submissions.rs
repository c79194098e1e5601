use sqlx::PgPool;
use time::PrimitiveDateTime;

use crate::db::models::Submission;
use crate::db::types::QuestionStatus;

pub(crate) const COLUMNS: &str = "\
    id, question_id, uploader_id, filename, file_path, file_size, mime_type, sha256, created_at";

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct RankedSubmissionRow {
    pub(crate) id: String,
    pub(crate) question_id: String,
    pub(crate) uploader_id: String,
    pub(crate) uploader_name: String,
    pub(crate) filename: String,
    pub(crate) file_size: i64,
    pub(crate) mime_type: String,
    pub(crate) score: i64,
    pub(crate) my_vote: Option<i16>,
    pub(crate) created_at: PrimitiveDateTime,
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct OwnSubmissionRow {
    pub(crate) id: String,
    pub(crate) question_id: String,
    pub(crate) question_status: QuestionStatus,
    pub(crate) filename: String,
    pub(crate) file_size: i64,
    pub(crate) mime_type: String,
    pub(crate) score: i64,
    pub(crate) created_at: PrimitiveDateTime,
    pub(crate) total_count: i64,
}

pub(crate) async fn find_by_id(
    pool: &PgPool,
    id: &str,
) -> Result<Option<Submission>, sqlx::Error> {
    sqlx::query_as::<_, Submission>(&format!("SELECT {COLUMNS} FROM submissions WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub(crate) struct CreateSubmission<'a> {
    pub id: &'a str,
    pub question_id: &'a str,
    pub uploader_id: &'a str,
    pub filename: &'a str,
    pub file_path: &'a str,
    pub file_size: i64,
    pub mime_type: &'a str,
    pub sha256: Option<String>,
    pub created_at: PrimitiveDateTime,
}

pub(crate) async fn insert(
    pool: &PgPool,
    params: CreateSubmission<'_>,
) -> Result<Submission, sqlx::Error> {
    sqlx::query_as::<_, Submission>(&format!(
        "INSERT INTO submissions (
            id, question_id, uploader_id, filename, file_path, file_size, mime_type,
            sha256, created_at
        ) VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9)
        RETURNING {COLUMNS}",
    ))
    .bind(params.id)
    .bind(params.question_id)
    .bind(params.uploader_id)
    .bind(params.filename)
    .bind(params.file_path)
    .bind(params.file_size)
    .bind(params.mime_type)
    .bind(params.sha256)
    .bind(params.created_at)
    .fetch_one(pool)
    .await
}

pub(crate) async fn delete_by_id(pool: &PgPool, id: &str) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM submissions WHERE id = $1").bind(id).execute(pool).await?;
    Ok(())
}

pub(crate) async fn exists_by_question_and_uploader(
    pool: &PgPool,
    question_id: &str,
    uploader_id: &str,
) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM submissions WHERE question_id = $1 AND uploader_id = $2)",
    )
    .bind(question_id)
    .bind(uploader_id)
    .fetch_one(pool)
    .await
}

/// Submissions of a question, best-voted first, oldest breaking ties.
pub(crate) async fn list_ranked_by_question(
    pool: &PgPool,
    question_id: &str,
    viewer_id: &str,
) -> Result<Vec<RankedSubmissionRow>, sqlx::Error> {
    sqlx::query_as::<_, RankedSubmissionRow>(
        "SELECT s.id,
                s.question_id,
                s.uploader_id,
                u.full_name AS uploader_name,
                s.filename,
                s.file_size,
                s.mime_type,
                COALESCE(vs.score, 0) AS score,
                mv.value AS my_vote,
                s.created_at
         FROM submissions s
         JOIN users u ON u.id = s.uploader_id
         LEFT JOIN (
             SELECT submission_id, SUM(value) AS score FROM votes GROUP BY submission_id
         ) vs ON vs.submission_id = s.id
         LEFT JOIN votes mv ON mv.submission_id = s.id AND mv.user_id = $2
         WHERE s.question_id = $1
         ORDER BY COALESCE(vs.score, 0) DESC, s.created_at ASC",
    )
    .bind(question_id)
    .bind(viewer_id)
    .fetch_all(pool)
    .await
}

pub(crate) async fn list_by_uploader(
    pool: &PgPool,
    uploader_id: &str,
    skip: i64,
    limit: i64,
) -> Result<Vec<OwnSubmissionRow>, sqlx::Error> {
    sqlx::query_as::<_, OwnSubmissionRow>(
        "SELECT s.id,
                s.question_id,
                q.status AS question_status,
                s.filename,
                s.file_size,
                s.mime_type,
                COALESCE(vs.score, 0) AS score,
                s.created_at,
                COUNT(*) OVER () AS total_count
         FROM submissions s
         JOIN questions q ON q.id = s.question_id
         LEFT JOIN (
             SELECT submission_id, SUM(value) AS score FROM votes GROUP BY submission_id
         ) vs ON vs.submission_id = s.id
         WHERE s.uploader_id = $1
         ORDER BY s.created_at DESC
         OFFSET $2 LIMIT $3",
    )
    .bind(uploader_id)
    .bind(skip.max(0))
    .bind(limit.clamp(1, 1000))
    .fetch_all(pool)
    .await
}
