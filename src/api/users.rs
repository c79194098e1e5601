use axum::{extract::Query, routing::get, Json, Router};
use serde::Deserialize;
use uuid::Uuid;

use crate::api::errors::ApiError;
use crate::api::guards::{CurrentAdmin, CurrentUser};
use crate::api::validation::{validate_password_len, validate_username};
use crate::core::security;
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::db::models::User;
use crate::db::types::UserRole;
use crate::repositories;
use crate::schemas::user::{AdminUserCreate, AdminUserUpdate, UserResponse};
use sqlx::{Postgres, QueryBuilder};

#[derive(Debug, Deserialize)]
pub(crate) struct UserListQuery {
    #[serde(default)]
    skip: i64,
    #[serde(default = "crate::api::pagination::default_limit")]
    limit: i64,
    #[serde(default)]
    username: Option<String>,
    #[serde(default)]
    role: Option<UserRole>,
    #[serde(default)]
    #[serde(alias = "isActive")]
    is_active: Option<bool>,
}

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/me", get(me))
        .route("/", get(list_users).post(create_user))
        .route("/:user_id", get(get_user).patch(update_user))
}

async fn me(CurrentUser(user): CurrentUser) -> Json<UserResponse> {
    Json(UserResponse::from_db(user))
}

async fn list_users(
    Query(params): Query<UserListQuery>,
    CurrentAdmin(_admin): CurrentAdmin,
    state: axum::extract::State<AppState>,
) -> Result<Json<Vec<UserResponse>>, ApiError> {
    let mut builder = QueryBuilder::<Postgres>::new(
        "SELECT id, username, hashed_password, full_name, role, is_active, created_at, updated_at
         FROM users WHERE 1 = 1",
    );

    if let Some(username) = params.username.as_ref() {
        builder.push(" AND username = ");
        builder.push_bind(username);
    }
    if let Some(role) = params.role {
        builder.push(" AND role = ");
        builder.push_bind(role);
    }
    if let Some(is_active) = params.is_active {
        builder.push(" AND is_active = ");
        builder.push_bind(is_active);
    }

    builder.push(" ORDER BY created_at DESC");
    builder.push(" OFFSET ");
    builder.push_bind(params.skip.max(0));
    builder.push(" LIMIT ");
    builder.push_bind(params.limit.clamp(1, 1000));

    let users = builder
        .build_query_as::<User>()
        .fetch_all(state.db())
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list users"))?;

    Ok(Json(users.into_iter().map(UserResponse::from_db).collect()))
}

async fn get_user(
    axum::extract::Path(user_id): axum::extract::Path<String>,
    CurrentAdmin(_admin): CurrentAdmin,
    state: axum::extract::State<AppState>,
) -> Result<Json<UserResponse>, ApiError> {
    let user = repositories::users::find_by_id(state.db(), &user_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch user"))?;

    let Some(user) = user else {
        return Err(ApiError::NotFound("User not found".to_string()));
    };

    Ok(Json(UserResponse::from_db(user)))
}

async fn create_user(
    CurrentAdmin(admin): CurrentAdmin,
    state: axum::extract::State<AppState>,
    Json(payload): Json<AdminUserCreate>,
) -> Result<(axum::http::StatusCode, Json<UserResponse>), ApiError> {
    validate_username(&payload.username)?;
    validate_password_len(&payload.password)?;

    let existing = repositories::users::exists_by_username(state.db(), &payload.username)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to check existing user"))?;

    if existing.is_some() {
        return Err(ApiError::Conflict("User with this username already exists".to_string()));
    }

    let hashed_password = security::hash_password(&payload.password)
        .map_err(|e| ApiError::internal(e, "Failed to hash password"))?;

    let now = primitive_now_utc();

    let user = repositories::users::create(
        state.db(),
        repositories::users::CreateUser {
            id: &Uuid::new_v4().to_string(),
            username: &payload.username,
            hashed_password,
            full_name: &payload.full_name,
            role: payload.role,
            is_active: payload.is_active,
            created_at: now,
            updated_at: now,
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to create user"))?;

    tracing::info!(
        admin_id = %admin.id,
        user_id = %user.id,
        action = "user_create",
        "Admin created user"
    );

    Ok((axum::http::StatusCode::CREATED, Json(UserResponse::from_db(user))))
}

async fn update_user(
    axum::extract::Path(user_id): axum::extract::Path<String>,
    CurrentAdmin(admin): CurrentAdmin,
    state: axum::extract::State<AppState>,
    Json(payload): Json<AdminUserUpdate>,
) -> Result<Json<UserResponse>, ApiError> {
    let user = repositories::users::find_by_id(state.db(), &user_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch user"))?;

    let Some(_user) = user else {
        return Err(ApiError::NotFound("User not found".to_string()));
    };

    let hashed_password = if let Some(password) = payload.password.as_ref() {
        validate_password_len(password)?;
        Some(
            security::hash_password(password)
                .map_err(|e| ApiError::internal(e, "Failed to hash password"))?,
        )
    } else {
        None
    };

    repositories::users::update(
        state.db(),
        &user_id,
        repositories::users::UpdateUser {
            full_name: payload.full_name,
            role: payload.role,
            is_active: payload.is_active,
            hashed_password,
            updated_at: primitive_now_utc(),
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to update user"))?;

    let updated = repositories::users::fetch_one_by_id(state.db(), &user_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch updated user"))?;

    tracing::info!(
        admin_id = %admin.id,
        user_id = %updated.id,
        action = "user_update",
        "Admin updated user"
    );

    Ok(Json(UserResponse::from_db(updated)))
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};
    use serde_json::json;
    use tower::ServiceExt;

    use crate::test_support;

    #[tokio::test]
    async fn admin_can_create_and_update_user() {
        let ctx = test_support::setup_test_context().await;

        let admin =
            test_support::insert_admin(ctx.state.db(), "useradmin", "Admin User", "admin-pass")
                .await;
        let token = test_support::bearer_token(&admin.id, ctx.state.settings());

        let create_payload = json!({
            "username": "student.01",
            "full_name": "Student User",
            "password": "student-pass",
            "role": "student",
            "is_active": true
        });

        let response = ctx
            .app
            .clone()
            .oneshot(test_support::json_request(
                Method::POST,
                "/api/v1/users",
                Some(&token),
                Some(create_payload),
            ))
            .await
            .expect("create user");

        let status = response.status();
        let created = test_support::read_json(response).await;
        assert_eq!(status, StatusCode::CREATED, "response: {created}");
        let user_id = created["id"].as_str().expect("user id").to_string();
        assert_eq!(created["username"], "student.01");
        assert_eq!(created["role"], "student");

        let update_payload = json!({
            "full_name": "Updated Student",
            "is_active": false
        });

        let response = ctx
            .app
            .clone()
            .oneshot(test_support::json_request(
                Method::PATCH,
                &format!("/api/v1/users/{user_id}"),
                Some(&token),
                Some(update_payload),
            ))
            .await
            .expect("update user");

        let status = response.status();
        let updated = test_support::read_json(response).await;
        assert_eq!(status, StatusCode::OK, "response: {updated}");
        assert_eq!(updated["full_name"], "Updated Student");
        assert_eq!(updated["is_active"], false);
    }

    #[tokio::test]
    async fn non_admin_cannot_list_users() {
        let ctx = test_support::setup_test_context().await;

        let user =
            test_support::insert_user(ctx.state.db(), "plain.user", "Plain User", "some-password")
                .await;
        let token = test_support::bearer_token(&user.id, ctx.state.settings());

        let response = ctx
            .app
            .oneshot(test_support::json_request(Method::GET, "/api/v1/users", Some(&token), None))
            .await
            .expect("list users as non-admin");
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }
}
