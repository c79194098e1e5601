use sqlx::PgPool;
use sqlx::{Postgres, QueryBuilder};
use time::PrimitiveDateTime;

use crate::db::models::Question;
use crate::db::types::QuestionStatus;

pub(crate) const COLUMNS: &str = "\
    id, department_id, course_id, semester_id, exam_type_id, section, status, \
    created_by, created_at, updated_at";

/// The identity of a logical question: one row per distinct key.
#[derive(Debug, Clone)]
pub(crate) struct QuestionKey {
    pub(crate) department_id: String,
    pub(crate) course_id: String,
    pub(crate) semester_id: String,
    pub(crate) exam_type_id: String,
    pub(crate) section: Option<String>,
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct PublishHistory {
    pub(crate) department_published: bool,
    pub(crate) course_published: bool,
    pub(crate) semester_published: bool,
    pub(crate) exam_type_published: bool,
}

impl PublishHistory {
    pub(crate) fn all_published(&self) -> bool {
        self.department_published
            && self.course_published
            && self.semester_published
            && self.exam_type_published
    }
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct QuestionListRow {
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
    pub(crate) created_at: PrimitiveDateTime,
    pub(crate) total_count: i64,
}

#[derive(Debug, Default)]
pub(crate) struct ListQuestionsParams {
    pub(crate) department_id: Option<String>,
    pub(crate) course_id: Option<String>,
    pub(crate) semester_id: Option<String>,
    pub(crate) exam_type_id: Option<String>,
    pub(crate) status: Option<QuestionStatus>,
    pub(crate) skip: i64,
    pub(crate) limit: i64,
}

pub(crate) async fn find_by_id(pool: &PgPool, id: &str) -> Result<Option<Question>, sqlx::Error> {
    sqlx::query_as::<_, Question>(&format!("SELECT {COLUMNS} FROM questions WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub(crate) async fn find_by_key(
    pool: &PgPool,
    key: &QuestionKey,
) -> Result<Option<Question>, sqlx::Error> {
    sqlx::query_as::<_, Question>(&format!(
        "SELECT {COLUMNS} FROM questions
         WHERE department_id = $1
           AND course_id = $2
           AND semester_id = $3
           AND exam_type_id = $4
           AND COALESCE(section, '') = COALESCE($5, '')"
    ))
    .bind(&key.department_id)
    .bind(&key.course_id)
    .bind(&key.semester_id)
    .bind(&key.exam_type_id)
    .bind(&key.section)
    .fetch_optional(pool)
    .await
}

/// Does each foreign key of the identity already have at least one
/// historically published question?
pub(crate) async fn publish_history(
    pool: &PgPool,
    key: &QuestionKey,
) -> Result<PublishHistory, sqlx::Error> {
    sqlx::query_as::<_, PublishHistory>(
        "SELECT
            EXISTS(SELECT 1 FROM questions WHERE department_id = $1 AND status = 'published')
                AS department_published,
            EXISTS(SELECT 1 FROM questions WHERE course_id = $2 AND status = 'published')
                AS course_published,
            EXISTS(SELECT 1 FROM questions WHERE semester_id = $3 AND status = 'published')
                AS semester_published,
            EXISTS(SELECT 1 FROM questions WHERE exam_type_id = $4 AND status = 'published')
                AS exam_type_published",
    )
    .bind(&key.department_id)
    .bind(&key.course_id)
    .bind(&key.semester_id)
    .bind(&key.exam_type_id)
    .fetch_one(pool)
    .await
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct QuestionLabels {
    pub(crate) department_code: String,
    pub(crate) department_name: String,
    pub(crate) course_code: String,
    pub(crate) course_title: String,
    pub(crate) semester_name: String,
    pub(crate) exam_type_name: String,
}

pub(crate) async fn labels_for(
    pool: &PgPool,
    question: &Question,
) -> Result<QuestionLabels, sqlx::Error> {
    sqlx::query_as::<_, QuestionLabels>(
        "SELECT d.code AS department_code,
                d.name AS department_name,
                c.code AS course_code,
                c.title AS course_title,
                s.name AS semester_name,
                e.name AS exam_type_name
         FROM departments d, courses c, semesters s, exam_types e
         WHERE d.id = $1 AND c.id = $2 AND s.id = $3 AND e.id = $4",
    )
    .bind(&question.department_id)
    .bind(&question.course_id)
    .bind(&question.semester_id)
    .bind(&question.exam_type_id)
    .fetch_one(pool)
    .await
}

pub(crate) struct CreateQuestion<'a> {
    pub id: &'a str,
    pub key: &'a QuestionKey,
    pub status: QuestionStatus,
    pub created_by: &'a str,
    pub created_at: PrimitiveDateTime,
    pub updated_at: PrimitiveDateTime,
}

pub(crate) async fn create(
    pool: &PgPool,
    params: CreateQuestion<'_>,
) -> Result<Question, sqlx::Error> {
    sqlx::query_as::<_, Question>(&format!(
        "INSERT INTO questions (
            id, department_id, course_id, semester_id, exam_type_id, section,
            status, created_by, created_at, updated_at
        ) VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10)
        RETURNING {COLUMNS}",
    ))
    .bind(params.id)
    .bind(&params.key.department_id)
    .bind(&params.key.course_id)
    .bind(&params.key.semester_id)
    .bind(&params.key.exam_type_id)
    .bind(&params.key.section)
    .bind(params.status)
    .bind(params.created_by)
    .bind(params.created_at)
    .bind(params.updated_at)
    .fetch_one(pool)
    .await
}

pub(crate) async fn update_status(
    pool: &PgPool,
    id: &str,
    status: QuestionStatus,
    now: PrimitiveDateTime,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE questions SET status = $1, updated_at = $2 WHERE id = $3")
        .bind(status)
        .bind(now)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

pub(crate) async fn list(
    pool: &PgPool,
    params: ListQuestionsParams,
) -> Result<Vec<QuestionListRow>, sqlx::Error> {
    let mut builder = QueryBuilder::<Postgres>::new(
        "SELECT q.id,
                q.department_id,
                q.course_id,
                q.semester_id,
                q.exam_type_id,
                q.section,
                q.status,
                d.code AS department_code,
                c.code AS course_code,
                c.title AS course_title,
                s.name AS semester_name,
                e.name AS exam_type_name,
                (SELECT COUNT(*) FROM submissions sub WHERE sub.question_id = q.id)
                    AS submission_count,
                q.created_at,
                COUNT(*) OVER () AS total_count
         FROM questions q
         JOIN departments d ON d.id = q.department_id
         JOIN courses c ON c.id = q.course_id
         JOIN semesters s ON s.id = q.semester_id
         JOIN exam_types e ON e.id = q.exam_type_id
         WHERE 1 = 1",
    );

    if let Some(department_id) = params.department_id.as_ref() {
        builder.push(" AND q.department_id = ");
        builder.push_bind(department_id);
    }
    if let Some(course_id) = params.course_id.as_ref() {
        builder.push(" AND q.course_id = ");
        builder.push_bind(course_id);
    }
    if let Some(semester_id) = params.semester_id.as_ref() {
        builder.push(" AND q.semester_id = ");
        builder.push_bind(semester_id);
    }
    if let Some(exam_type_id) = params.exam_type_id.as_ref() {
        builder.push(" AND q.exam_type_id = ");
        builder.push_bind(exam_type_id);
    }
    if let Some(status) = params.status {
        builder.push(" AND q.status = ");
        builder.push_bind(status);
    }

    builder.push(" ORDER BY q.created_at DESC");
    builder.push(" OFFSET ");
    builder.push_bind(params.skip.max(0));
    builder.push(" LIMIT ");
    builder.push_bind(params.limit.clamp(1, 1000));

    builder.build_query_as::<QuestionListRow>().fetch_all(pool).await
}
