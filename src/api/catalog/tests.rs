use axum::http::{Method, StatusCode};
use serde_json::json;
use tower::ServiceExt;

use crate::test_support;

#[tokio::test]
async fn admin_creates_department_and_everyone_lists_it() {
    let ctx = test_support::setup_test_context().await;

    let admin =
        test_support::insert_admin(ctx.state.db(), "cat.admin1", "Catalog Admin", "admin-pass")
            .await;
    let admin_token = test_support::bearer_token(&admin.id, ctx.state.settings());

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/v1/catalog/departments",
            Some(&admin_token),
            Some(json!({"code": "cse", "name": "Computer Science"})),
        ))
        .await
        .expect("create department");

    let status = response.status();
    let created = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::CREATED, "response: {created}");
    assert_eq!(created["code"], "CSE");

    let student =
        test_support::insert_user(ctx.state.db(), "cat.student", "Student", "student-pass").await;
    let student_token = test_support::bearer_token(&student.id, ctx.state.settings());

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::GET,
            "/api/v1/catalog/departments",
            Some(&student_token),
            None,
        ))
        .await
        .expect("list departments");

    let status = response.status();
    let listed = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::OK, "response: {listed}");
    assert_eq!(listed.as_array().expect("array").len(), 1);
    assert_eq!(listed[0]["code"], "CSE");

    // Second read comes from the redis cache and must agree.
    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::GET,
            "/api/v1/catalog/departments",
            Some(&student_token),
            None,
        ))
        .await
        .expect("list departments cached");

    let cached = test_support::read_json(response).await;
    assert_eq!(cached, listed);
}

#[tokio::test]
async fn duplicate_department_code_conflicts() {
    let ctx = test_support::setup_test_context().await;

    let admin =
        test_support::insert_admin(ctx.state.db(), "cat.admin2", "Catalog Admin", "admin-pass")
            .await;
    let token = test_support::bearer_token(&admin.id, ctx.state.settings());

    let payload = json!({"code": "EEE", "name": "Electrical Engineering"});

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/v1/catalog/departments",
            Some(&token),
            Some(payload.clone()),
        ))
        .await
        .expect("first create");
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/v1/catalog/departments",
            Some(&token),
            Some(payload),
        ))
        .await
        .expect("duplicate create");
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn course_creation_invalidates_department_courses_cache() {
    let ctx = test_support::setup_test_context().await;

    let admin =
        test_support::insert_admin(ctx.state.db(), "cat.admin3", "Catalog Admin", "admin-pass")
            .await;
    let token = test_support::bearer_token(&admin.id, ctx.state.settings());

    let department = test_support::insert_department(ctx.state.db(), "MTH", "Mathematics").await;

    // Prime the cache with an empty course list.
    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::GET,
            &format!("/api/v1/catalog/departments/{}/courses", department.id),
            Some(&token),
            None,
        ))
        .await
        .expect("list courses");
    let listed = test_support::read_json(response).await;
    assert_eq!(listed.as_array().expect("array").len(), 0);

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/v1/catalog/courses",
            Some(&token),
            Some(json!({
                "department_id": department.id,
                "code": "mth101",
                "title": "Calculus I"
            })),
        ))
        .await
        .expect("create course");
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::GET,
            &format!("/api/v1/catalog/departments/{}/courses", department.id),
            Some(&token),
            None,
        ))
        .await
        .expect("list courses again");

    let listed = test_support::read_json(response).await;
    assert_eq!(listed.as_array().expect("array").len(), 1);
    assert_eq!(listed[0]["code"], "MTH101");
}

#[tokio::test]
async fn non_admin_cannot_create_taxonomy() {
    let ctx = test_support::setup_test_context().await;

    let student =
        test_support::insert_user(ctx.state.db(), "cat.student2", "Student", "student-pass").await;
    let token = test_support::bearer_token(&student.id, ctx.state.settings());

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/v1/catalog/exam-types",
            Some(&token),
            Some(json!({"name": "Midterm"})),
        ))
        .await
        .expect("create exam type as student");
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn semesters_and_exam_types_roundtrip() {
    let ctx = test_support::setup_test_context().await;

    let admin =
        test_support::insert_admin(ctx.state.db(), "cat.admin4", "Catalog Admin", "admin-pass")
            .await;
    let token = test_support::bearer_token(&admin.id, ctx.state.settings());

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/v1/catalog/semesters",
            Some(&token),
            Some(json!({"name": "Fall 2025", "position": 1})),
        ))
        .await
        .expect("create semester");
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/v1/catalog/exam-types",
            Some(&token),
            Some(json!({"name": "Final"})),
        ))
        .await
        .expect("create exam type");
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::GET,
            "/api/v1/catalog/semesters",
            Some(&token),
            None,
        ))
        .await
        .expect("list semesters");
    let semesters = test_support::read_json(response).await;
    assert_eq!(semesters[0]["name"], "Fall 2025");

    let response = ctx
        .app
        .oneshot(test_support::json_request(
            Method::GET,
            "/api/v1/catalog/exam-types",
            Some(&token),
            None,
        ))
        .await
        .expect("list exam types");
    let exam_types = test_support::read_json(response).await;
    assert_eq!(exam_types[0]["name"], "Final");
}
