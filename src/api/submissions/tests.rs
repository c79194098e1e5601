use axum::http::{Method, StatusCode};
use serde_json::json;
use tower::ServiceExt;

use crate::db::types::QuestionStatus;
use crate::test_support;

fn register_payload(
    taxonomy: &test_support::Taxonomy,
    s3_key: &str,
    filename: &str,
) -> serde_json::Value {
    json!({
        "department_id": taxonomy.department.id,
        "course_id": taxonomy.course.id,
        "semester_id": taxonomy.semester.id,
        "exam_type_id": taxonomy.exam_type.id,
        "s3_key": s3_key,
        "filename": filename,
        "file_size": 2048,
        "content_type": "application/pdf"
    })
}

#[tokio::test]
async fn register_accepts_valid_payload() {
    let ctx = test_support::setup_test_context().await;

    let user = test_support::insert_user(ctx.state.db(), "reg.user", "Reg User", "reg-password")
        .await;
    let taxonomy = test_support::seed_taxonomy(ctx.state.db(), "REG").await;
    let token = test_support::bearer_token(&user.id, ctx.state.settings());

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/v1/submissions",
            Some(&token),
            Some(register_payload(&taxonomy, "papers/abc_midterm.pdf", "midterm.pdf")),
        ))
        .await
        .expect("register");

    let status = response.status();
    let body = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::CREATED, "response: {body}");
    assert_eq!(body["filename"], "midterm.pdf");
    assert_eq!(body["score"], 0);
    assert!(body["question_id"].as_str().is_some_and(|id| !id.is_empty()));
}

#[tokio::test]
async fn register_rejects_bad_inputs() {
    let ctx = test_support::setup_test_context().await;

    let user = test_support::insert_user(ctx.state.db(), "bad.user", "Bad User", "bad-password")
        .await;
    let taxonomy = test_support::seed_taxonomy(ctx.state.db(), "BAD").await;
    let token = test_support::bearer_token(&user.id, ctx.state.settings());

    // Wrong extension.
    let mut payload = register_payload(&taxonomy, "papers/abc_notes.docx", "notes.docx");
    payload["content_type"] = json!("application/msword");
    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/v1/submissions",
            Some(&token),
            Some(payload),
        ))
        .await
        .expect("register docx");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Key outside the papers/ prefix.
    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/v1/submissions",
            Some(&token),
            Some(register_payload(&taxonomy, "private/abc.pdf", "abc.pdf")),
        ))
        .await
        .expect("register bad key");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Declared size above the cap.
    let mut payload = register_payload(&taxonomy, "papers/abc_big.pdf", "big.pdf");
    payload["file_size"] = json!(1024_i64 * 1024 * 1024);
    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/v1/submissions",
            Some(&token),
            Some(payload),
        ))
        .await
        .expect("register oversized");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Unknown course.
    let mut payload = register_payload(&taxonomy, "papers/abc_x.pdf", "x.pdf");
    payload["course_id"] = json!("no-such-course");
    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/v1/submissions",
            Some(&token),
            Some(payload),
        ))
        .await
        .expect("register unknown course");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn register_rejects_course_from_other_department() {
    let ctx = test_support::setup_test_context().await;

    let user =
        test_support::insert_user(ctx.state.db(), "cross.user", "Cross User", "cross-password")
            .await;
    let taxonomy = test_support::seed_taxonomy(ctx.state.db(), "CRS").await;
    let other = test_support::seed_taxonomy(ctx.state.db(), "OTH").await;
    let token = test_support::bearer_token(&user.id, ctx.state.settings());

    let mut payload = register_payload(&taxonomy, "papers/abc_y.pdf", "y.pdf");
    payload["course_id"] = json!(other.course.id);

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/v1/submissions",
            Some(&token),
            Some(payload),
        ))
        .await
        .expect("register cross-department course");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn presign_requires_storage_and_pdf() {
    let ctx = test_support::setup_test_context().await;

    let user = test_support::insert_user(ctx.state.db(), "pre.user", "Pre User", "pre-password")
        .await;
    let token = test_support::bearer_token(&user.id, ctx.state.settings());

    // No storage configured: 503.
    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/v1/submissions/presign",
            Some(&token),
            Some(json!({"filename": "midterm.pdf", "content_type": "application/pdf"})),
        ))
        .await
        .expect("presign without storage");
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn presign_returns_scoped_object_key() {
    let ctx = test_support::setup_test_context_with_storage().await;

    let user = test_support::insert_user(ctx.state.db(), "pre.user2", "Pre User", "pre-password")
        .await;
    let token = test_support::bearer_token(&user.id, ctx.state.settings());

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/v1/submissions/presign",
            Some(&token),
            Some(json!({"filename": "final exam.pdf", "content_type": "application/pdf"})),
        ))
        .await
        .expect("presign");

    let status = response.status();
    let body = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::OK, "response: {body}");
    assert_eq!(body["method"], "PUT");
    let s3_key = body["s3_key"].as_str().expect("s3 key");
    assert!(s3_key.starts_with("papers/"));
    assert!(s3_key.ends_with("final_exam.pdf"));
    assert!(body["upload_url"].as_str().is_some_and(|url| !url.is_empty()));

    // Refused for non-PDF uploads.
    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/v1/submissions/presign",
            Some(&token),
            Some(json!({"filename": "photo.png", "content_type": "image/png"})),
        ))
        .await
        .expect("presign png");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn mine_lists_own_submissions_only() {
    let ctx = test_support::setup_test_context().await;

    let alice =
        test_support::insert_user(ctx.state.db(), "mine.alice", "Alice", "alice-password").await;
    let bob = test_support::insert_user(ctx.state.db(), "mine.bob", "Bob", "bob-password").await;
    let taxonomy = test_support::seed_taxonomy(ctx.state.db(), "MINE").await;

    let question = test_support::insert_question(
        ctx.state.db(),
        &taxonomy.key(None),
        QuestionStatus::Published,
        &alice.id,
    )
    .await;
    test_support::insert_submission(ctx.state.db(), &question, &alice, "alice.pdf").await;
    test_support::insert_submission(ctx.state.db(), &question, &bob, "bob.pdf").await;

    let token = test_support::bearer_token(&alice.id, ctx.state.settings());
    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::GET,
            "/api/v1/submissions/mine",
            Some(&token),
            None,
        ))
        .await
        .expect("mine");

    let body = test_support::read_json(response).await;
    assert_eq!(body["total_count"], 1);
    assert_eq!(body["items"][0]["filename"], "alice.pdf");
    assert_eq!(body["items"][0]["question_status"], "published");
}

#[tokio::test]
async fn vote_upsert_retract_flow() {
    let ctx = test_support::setup_test_context().await;

    let uploader =
        test_support::insert_user(ctx.state.db(), "vote.up", "Uploader", "uploader-password")
            .await;
    let voter =
        test_support::insert_user(ctx.state.db(), "vote.er", "Voter", "voter-password").await;
    let taxonomy = test_support::seed_taxonomy(ctx.state.db(), "VOTE").await;

    let question = test_support::insert_question(
        ctx.state.db(),
        &taxonomy.key(None),
        QuestionStatus::Published,
        &uploader.id,
    )
    .await;
    let submission =
        test_support::insert_submission(ctx.state.db(), &question, &uploader, "paper.pdf").await;

    let token = test_support::bearer_token(&voter.id, ctx.state.settings());
    let vote_uri = format!("/api/v1/submissions/{}/vote", submission.id);

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::PUT,
            &vote_uri,
            Some(&token),
            Some(json!({"value": 1})),
        ))
        .await
        .expect("upvote");
    let body = test_support::read_json(response).await;
    assert_eq!(body["score"], 1);
    assert_eq!(body["my_vote"], 1);

    // Flipping the vote replaces it instead of stacking.
    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::PUT,
            &vote_uri,
            Some(&token),
            Some(json!({"value": -1})),
        ))
        .await
        .expect("downvote");
    let body = test_support::read_json(response).await;
    assert_eq!(body["score"], -1);
    assert_eq!(body["my_vote"], -1);

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::PUT,
            &vote_uri,
            Some(&token),
            Some(json!({"value": 0})),
        ))
        .await
        .expect("retract");
    let body = test_support::read_json(response).await;
    assert_eq!(body["score"], 0);
    assert!(body["my_vote"].is_null());

    // Retracting again is still a success.
    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::PUT,
            &vote_uri,
            Some(&token),
            Some(json!({"value": 0})),
        ))
        .await
        .expect("retract again");
    assert_eq!(response.status(), StatusCode::OK);

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::PUT,
            &vote_uri,
            Some(&token),
            Some(json!({"value": 2})),
        ))
        .await
        .expect("invalid value");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn vote_on_pending_submission_hidden_from_strangers() {
    let ctx = test_support::setup_test_context().await;

    let uploader =
        test_support::insert_user(ctx.state.db(), "hid.up", "Uploader", "uploader-password").await;
    let stranger =
        test_support::insert_user(ctx.state.db(), "hid.str", "Stranger", "stranger-password")
            .await;
    let taxonomy = test_support::seed_taxonomy(ctx.state.db(), "HID").await;

    let question = test_support::insert_question(
        ctx.state.db(),
        &taxonomy.key(None),
        QuestionStatus::Pending,
        &uploader.id,
    )
    .await;
    let submission =
        test_support::insert_submission(ctx.state.db(), &question, &uploader, "paper.pdf").await;

    let token = test_support::bearer_token(&stranger.id, ctx.state.settings());
    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::PUT,
            &format!("/api/v1/submissions/{}/vote", submission.id),
            Some(&token),
            Some(json!({"value": 1})),
        ))
        .await
        .expect("vote on hidden");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_is_restricted_to_uploader_and_admin() {
    let ctx = test_support::setup_test_context().await;

    let uploader =
        test_support::insert_user(ctx.state.db(), "del.up", "Uploader", "uploader-password").await;
    let other =
        test_support::insert_user(ctx.state.db(), "del.other", "Other", "other-password").await;
    let admin =
        test_support::insert_admin(ctx.state.db(), "del.admin", "Admin", "admin-password").await;
    let taxonomy = test_support::seed_taxonomy(ctx.state.db(), "DEL").await;

    let question = test_support::insert_question(
        ctx.state.db(),
        &taxonomy.key(None),
        QuestionStatus::Published,
        &uploader.id,
    )
    .await;
    let first =
        test_support::insert_submission(ctx.state.db(), &question, &uploader, "first.pdf").await;
    let second =
        test_support::insert_submission(ctx.state.db(), &question, &uploader, "second.pdf").await;

    let other_token = test_support::bearer_token(&other.id, ctx.state.settings());
    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::DELETE,
            &format!("/api/v1/submissions/{}", first.id),
            Some(&other_token),
            None,
        ))
        .await
        .expect("delete as other");
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let uploader_token = test_support::bearer_token(&uploader.id, ctx.state.settings());
    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::DELETE,
            &format!("/api/v1/submissions/{}", first.id),
            Some(&uploader_token),
            None,
        ))
        .await
        .expect("delete as uploader");
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let admin_token = test_support::bearer_token(&admin.id, ctx.state.settings());
    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::DELETE,
            &format!("/api/v1/submissions/{}", second.id),
            Some(&admin_token),
            None,
        ))
        .await
        .expect("delete as admin");
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    // The question row survives even with no submissions left.
    let remaining = crate::repositories::questions::find_by_id(ctx.state.db(), &question.id)
        .await
        .expect("find question");
    assert!(remaining.is_some());
}

#[tokio::test]
async fn download_returns_presigned_url_for_published() {
    let ctx = test_support::setup_test_context_with_storage().await;

    let uploader =
        test_support::insert_user(ctx.state.db(), "dl.up", "Uploader", "uploader-password").await;
    let reader =
        test_support::insert_user(ctx.state.db(), "dl.reader", "Reader", "reader-password").await;
    let taxonomy = test_support::seed_taxonomy(ctx.state.db(), "DLD").await;

    let question = test_support::insert_question(
        ctx.state.db(),
        &taxonomy.key(None),
        QuestionStatus::Published,
        &uploader.id,
    )
    .await;
    let submission =
        test_support::insert_submission(ctx.state.db(), &question, &uploader, "exam.pdf").await;

    let token = test_support::bearer_token(&reader.id, ctx.state.settings());
    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::GET,
            &format!("/api/v1/submissions/{}/download", submission.id),
            Some(&token),
            None,
        ))
        .await
        .expect("download");

    let status = response.status();
    let body = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::OK, "response: {body}");
    assert!(body["download_url"].as_str().is_some_and(|url| url.contains("exam.pdf")));
    assert_eq!(body["expires_in_seconds"], 300);
}
