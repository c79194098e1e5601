use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use uuid::Uuid;
use validator::Validate;

use crate::api::errors::ApiError;
use crate::api::guards::{CurrentAdmin, CurrentUser};
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::repositories;
use crate::schemas::catalog::{
    CourseCreate, CourseResponse, DepartmentCreate, DepartmentResponse, ExamTypeCreate,
    ExamTypeResponse, SemesterCreate, SemesterResponse,
};

const DEPARTMENTS_CACHE_KEY: &str = "catalog:departments";
const SEMESTERS_CACHE_KEY: &str = "catalog:semesters";
const EXAM_TYPES_CACHE_KEY: &str = "catalog:exam-types";

fn courses_cache_key(department_id: &str) -> String {
    format!("catalog:courses:{department_id}")
}

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/departments", get(list_departments).post(create_department))
        .route("/departments/:department_id/courses", get(list_courses))
        .route("/courses", post(create_course))
        .route("/semesters", get(list_semesters).post(create_semester))
        .route("/exam-types", get(list_exam_types).post(create_exam_type))
}

async fn list_departments(
    CurrentUser(_user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<DepartmentResponse>>, ApiError> {
    if let Some(cached) =
        state.redis().cache_get::<Vec<DepartmentResponse>>(DEPARTMENTS_CACHE_KEY).await
    {
        return Ok(Json(cached));
    }

    let departments = repositories::catalog::list_departments(state.db())
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list departments"))?;

    let response: Vec<DepartmentResponse> =
        departments.into_iter().map(DepartmentResponse::from_db).collect();

    state
        .redis()
        .cache_set(
            DEPARTMENTS_CACHE_KEY,
            &response,
            state.settings().storage().catalog_cache_ttl_seconds,
        )
        .await;

    Ok(Json(response))
}

async fn create_department(
    CurrentAdmin(admin): CurrentAdmin,
    State(state): State<AppState>,
    Json(payload): Json<DepartmentCreate>,
) -> Result<(StatusCode, Json<DepartmentResponse>), ApiError> {
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let code = payload.code.trim().to_uppercase();
    let existing = repositories::catalog::exists_department_code(state.db(), &code)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to check existing department"))?;
    if existing.is_some() {
        return Err(ApiError::Conflict("Department with this code already exists".to_string()));
    }

    let department = repositories::catalog::create_department(
        state.db(),
        &Uuid::new_v4().to_string(),
        &code,
        payload.name.trim(),
        primitive_now_utc(),
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to create department"))?;

    state.redis().cache_delete(DEPARTMENTS_CACHE_KEY).await;

    tracing::info!(
        admin_id = %admin.id,
        department_id = %department.id,
        action = "department_create",
        "Admin created department"
    );

    Ok((StatusCode::CREATED, Json(DepartmentResponse::from_db(department))))
}

async fn list_courses(
    Path(department_id): Path<String>,
    CurrentUser(_user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<CourseResponse>>, ApiError> {
    let department = repositories::catalog::find_department_by_id(state.db(), &department_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch department"))?;
    if department.is_none() {
        return Err(ApiError::NotFound("Department not found".to_string()));
    }

    let cache_key = courses_cache_key(&department_id);
    if let Some(cached) = state.redis().cache_get::<Vec<CourseResponse>>(&cache_key).await {
        return Ok(Json(cached));
    }

    let courses = repositories::catalog::list_courses_by_department(state.db(), &department_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list courses"))?;

    let response: Vec<CourseResponse> = courses.into_iter().map(CourseResponse::from_db).collect();

    state
        .redis()
        .cache_set(&cache_key, &response, state.settings().storage().catalog_cache_ttl_seconds)
        .await;

    Ok(Json(response))
}

async fn create_course(
    CurrentAdmin(admin): CurrentAdmin,
    State(state): State<AppState>,
    Json(payload): Json<CourseCreate>,
) -> Result<(StatusCode, Json<CourseResponse>), ApiError> {
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let department =
        repositories::catalog::find_department_by_id(state.db(), &payload.department_id)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to fetch department"))?;
    if department.is_none() {
        return Err(ApiError::NotFound("Department not found".to_string()));
    }

    let code = payload.code.trim().to_uppercase();
    let existing =
        repositories::catalog::exists_course_code(state.db(), &payload.department_id, &code)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to check existing course"))?;
    if existing.is_some() {
        return Err(ApiError::Conflict(
            "Course with this code already exists in the department".to_string(),
        ));
    }

    let course = repositories::catalog::create_course(
        state.db(),
        &Uuid::new_v4().to_string(),
        &payload.department_id,
        &code,
        payload.title.trim(),
        primitive_now_utc(),
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to create course"))?;

    state.redis().cache_delete(&courses_cache_key(&payload.department_id)).await;

    tracing::info!(
        admin_id = %admin.id,
        course_id = %course.id,
        action = "course_create",
        "Admin created course"
    );

    Ok((StatusCode::CREATED, Json(CourseResponse::from_db(course))))
}

async fn list_semesters(
    CurrentUser(_user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<SemesterResponse>>, ApiError> {
    if let Some(cached) =
        state.redis().cache_get::<Vec<SemesterResponse>>(SEMESTERS_CACHE_KEY).await
    {
        return Ok(Json(cached));
    }

    let semesters = repositories::catalog::list_semesters(state.db())
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list semesters"))?;

    let response: Vec<SemesterResponse> =
        semesters.into_iter().map(SemesterResponse::from_db).collect();

    state
        .redis()
        .cache_set(
            SEMESTERS_CACHE_KEY,
            &response,
            state.settings().storage().catalog_cache_ttl_seconds,
        )
        .await;

    Ok(Json(response))
}

async fn create_semester(
    CurrentAdmin(admin): CurrentAdmin,
    State(state): State<AppState>,
    Json(payload): Json<SemesterCreate>,
) -> Result<(StatusCode, Json<SemesterResponse>), ApiError> {
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let name = payload.name.trim().to_string();
    let existing = repositories::catalog::exists_semester_name(state.db(), &name)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to check existing semester"))?;
    if existing.is_some() {
        return Err(ApiError::Conflict("Semester with this name already exists".to_string()));
    }

    let semester = repositories::catalog::create_semester(
        state.db(),
        &Uuid::new_v4().to_string(),
        &name,
        payload.position,
        primitive_now_utc(),
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to create semester"))?;

    state.redis().cache_delete(SEMESTERS_CACHE_KEY).await;

    tracing::info!(
        admin_id = %admin.id,
        semester_id = %semester.id,
        action = "semester_create",
        "Admin created semester"
    );

    Ok((StatusCode::CREATED, Json(SemesterResponse::from_db(semester))))
}

async fn list_exam_types(
    CurrentUser(_user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<ExamTypeResponse>>, ApiError> {
    if let Some(cached) =
        state.redis().cache_get::<Vec<ExamTypeResponse>>(EXAM_TYPES_CACHE_KEY).await
    {
        return Ok(Json(cached));
    }

    let exam_types = repositories::catalog::list_exam_types(state.db())
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list exam types"))?;

    let response: Vec<ExamTypeResponse> =
        exam_types.into_iter().map(ExamTypeResponse::from_db).collect();

    state
        .redis()
        .cache_set(
            EXAM_TYPES_CACHE_KEY,
            &response,
            state.settings().storage().catalog_cache_ttl_seconds,
        )
        .await;

    Ok(Json(response))
}

async fn create_exam_type(
    CurrentAdmin(admin): CurrentAdmin,
    State(state): State<AppState>,
    Json(payload): Json<ExamTypeCreate>,
) -> Result<(StatusCode, Json<ExamTypeResponse>), ApiError> {
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let name = payload.name.trim().to_string();
    let existing = repositories::catalog::exists_exam_type_name(state.db(), &name)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to check existing exam type"))?;
    if existing.is_some() {
        return Err(ApiError::Conflict("Exam type with this name already exists".to_string()));
    }

    let exam_type = repositories::catalog::create_exam_type(
        state.db(),
        &Uuid::new_v4().to_string(),
        &name,
        primitive_now_utc(),
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to create exam type"))?;

    state.redis().cache_delete(EXAM_TYPES_CACHE_KEY).await;

    tracing::info!(
        admin_id = %admin.id,
        exam_type_id = %exam_type.id,
        action = "exam_type_create",
        "Admin created exam type"
    );

    Ok((StatusCode::CREATED, Json(ExamTypeResponse::from_db(exam_type))))
}

#[cfg(test)]
mod tests;
