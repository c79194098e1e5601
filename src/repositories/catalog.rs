use sqlx::PgPool;
use time::PrimitiveDateTime;

use crate::db::models::{Course, Department, ExamType, Semester};

const DEPARTMENT_COLUMNS: &str = "id, code, name, created_at";
const COURSE_COLUMNS: &str = "id, department_id, code, title, created_at";
const SEMESTER_COLUMNS: &str = "id, name, position, created_at";
const EXAM_TYPE_COLUMNS: &str = "id, name, created_at";

pub(crate) async fn list_departments(pool: &PgPool) -> Result<Vec<Department>, sqlx::Error> {
    sqlx::query_as::<_, Department>(&format!(
        "SELECT {DEPARTMENT_COLUMNS} FROM departments ORDER BY code"
    ))
    .fetch_all(pool)
    .await
}

pub(crate) async fn find_department_by_id(
    pool: &PgPool,
    id: &str,
) -> Result<Option<Department>, sqlx::Error> {
    sqlx::query_as::<_, Department>(&format!(
        "SELECT {DEPARTMENT_COLUMNS} FROM departments WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await
}

pub(crate) async fn exists_department_code(
    pool: &PgPool,
    code: &str,
) -> Result<Option<String>, sqlx::Error> {
    sqlx::query_scalar::<_, String>("SELECT id FROM departments WHERE code = $1")
        .bind(code)
        .fetch_optional(pool)
        .await
}

pub(crate) async fn create_department(
    pool: &PgPool,
    id: &str,
    code: &str,
    name: &str,
    created_at: PrimitiveDateTime,
) -> Result<Department, sqlx::Error> {
    sqlx::query_as::<_, Department>(&format!(
        "INSERT INTO departments (id, code, name, created_at)
         VALUES ($1,$2,$3,$4)
         RETURNING {DEPARTMENT_COLUMNS}"
    ))
    .bind(id)
    .bind(code)
    .bind(name)
    .bind(created_at)
    .fetch_one(pool)
    .await
}

pub(crate) async fn list_courses_by_department(
    pool: &PgPool,
    department_id: &str,
) -> Result<Vec<Course>, sqlx::Error> {
    sqlx::query_as::<_, Course>(&format!(
        "SELECT {COURSE_COLUMNS} FROM courses WHERE department_id = $1 ORDER BY code"
    ))
    .bind(department_id)
    .fetch_all(pool)
    .await
}

pub(crate) async fn find_course_by_id(
    pool: &PgPool,
    id: &str,
) -> Result<Option<Course>, sqlx::Error> {
    sqlx::query_as::<_, Course>(&format!("SELECT {COURSE_COLUMNS} FROM courses WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub(crate) async fn exists_course_code(
    pool: &PgPool,
    department_id: &str,
    code: &str,
) -> Result<Option<String>, sqlx::Error> {
    sqlx::query_scalar::<_, String>(
        "SELECT id FROM courses WHERE department_id = $1 AND code = $2",
    )
    .bind(department_id)
    .bind(code)
    .fetch_optional(pool)
    .await
}

pub(crate) async fn create_course(
    pool: &PgPool,
    id: &str,
    department_id: &str,
    code: &str,
    title: &str,
    created_at: PrimitiveDateTime,
) -> Result<Course, sqlx::Error> {
    sqlx::query_as::<_, Course>(&format!(
        "INSERT INTO courses (id, department_id, code, title, created_at)
         VALUES ($1,$2,$3,$4,$5)
         RETURNING {COURSE_COLUMNS}"
    ))
    .bind(id)
    .bind(department_id)
    .bind(code)
    .bind(title)
    .bind(created_at)
    .fetch_one(pool)
    .await
}

pub(crate) async fn list_semesters(pool: &PgPool) -> Result<Vec<Semester>, sqlx::Error> {
    sqlx::query_as::<_, Semester>(&format!(
        "SELECT {SEMESTER_COLUMNS} FROM semesters ORDER BY position, name"
    ))
    .fetch_all(pool)
    .await
}

pub(crate) async fn find_semester_by_id(
    pool: &PgPool,
    id: &str,
) -> Result<Option<Semester>, sqlx::Error> {
    sqlx::query_as::<_, Semester>(&format!(
        "SELECT {SEMESTER_COLUMNS} FROM semesters WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await
}

pub(crate) async fn exists_semester_name(
    pool: &PgPool,
    name: &str,
) -> Result<Option<String>, sqlx::Error> {
    sqlx::query_scalar::<_, String>("SELECT id FROM semesters WHERE name = $1")
        .bind(name)
        .fetch_optional(pool)
        .await
}

pub(crate) async fn create_semester(
    pool: &PgPool,
    id: &str,
    name: &str,
    position: i32,
    created_at: PrimitiveDateTime,
) -> Result<Semester, sqlx::Error> {
    sqlx::query_as::<_, Semester>(&format!(
        "INSERT INTO semesters (id, name, position, created_at)
         VALUES ($1,$2,$3,$4)
         RETURNING {SEMESTER_COLUMNS}"
    ))
    .bind(id)
    .bind(name)
    .bind(position)
    .bind(created_at)
    .fetch_one(pool)
    .await
}

pub(crate) async fn list_exam_types(pool: &PgPool) -> Result<Vec<ExamType>, sqlx::Error> {
    sqlx::query_as::<_, ExamType>(&format!(
        "SELECT {EXAM_TYPE_COLUMNS} FROM exam_types ORDER BY name"
    ))
    .fetch_all(pool)
    .await
}

pub(crate) async fn find_exam_type_by_id(
    pool: &PgPool,
    id: &str,
) -> Result<Option<ExamType>, sqlx::Error> {
    sqlx::query_as::<_, ExamType>(&format!(
        "SELECT {EXAM_TYPE_COLUMNS} FROM exam_types WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await
}

pub(crate) async fn exists_exam_type_name(
    pool: &PgPool,
    name: &str,
) -> Result<Option<String>, sqlx::Error> {
    sqlx::query_scalar::<_, String>("SELECT id FROM exam_types WHERE name = $1")
        .bind(name)
        .fetch_optional(pool)
        .await
}

pub(crate) async fn create_exam_type(
    pool: &PgPool,
    id: &str,
    name: &str,
    created_at: PrimitiveDateTime,
) -> Result<ExamType, sqlx::Error> {
    sqlx::query_as::<_, ExamType>(&format!(
        "INSERT INTO exam_types (id, name, created_at)
         VALUES ($1,$2,$3)
         RETURNING {EXAM_TYPE_COLUMNS}"
    ))
    .bind(id)
    .bind(name)
    .bind(created_at)
    .fetch_one(pool)
    .await
}
