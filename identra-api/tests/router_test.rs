/// Router tests
///
/// Exercise request validation, auth-header handling, and the uniform
/// error envelope through the real router. The pool behind the state is
/// lazy and unreachable, so only paths that answer before touching the
/// database are covered here; persistence flows live in the shared
/// crate's service tests.

mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::json;
use tower::ServiceExt;

#[tokio::test]
async fn test_health_reports_degraded_without_database() {
    let app = common::test_app();

    let response = app
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = common::body_json(response).await;
    assert_eq!(body["status"], "degraded");
    assert_eq!(body["database"], "disconnected");
    assert!(body["version"].is_string());
}

#[tokio::test]
async fn test_create_user_rejects_missing_fields() {
    let app = common::test_app();

    let response = app
        .oneshot(common::json_request(
            "POST",
            "/users",
            json!({
                "username": "",
                "first_name": "Ada",
                "last_name": "Lovelace",
                "password": "s3cret",
                "email": "ada@example.com"
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = common::body_json(response).await;
    assert_eq!(body["status"], 400);
    assert_eq!(body["message"], "username is required");
}

#[tokio::test]
async fn test_login_rejects_empty_password() {
    let app = common::test_app();

    let response = app
        .oneshot(common::json_request(
            "POST",
            "/users/login",
            json!({ "username": "ada", "password": "" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_current_user_requires_authorization_header() {
    let app = common::test_app();

    let response = app
        .oneshot(Request::get("/users/me").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_current_user_rejects_non_bearer_scheme() {
    let app = common::test_app();

    let response = app
        .oneshot(
            Request::get("/users/me")
                .header("authorization", "Basic YWRhOnMzY3JldA==")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_current_user_rejects_garbage_token() {
    let app = common::test_app();

    let response = app
        .oneshot(
            Request::get("/users/me")
                .header("authorization", "Bearer not-a-token")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    // Token verification fails before any lookup
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body = common::body_json(response).await;
    assert_eq!(body["message"], "invalid authentication");
}

#[tokio::test]
async fn test_list_users_rejects_malformed_id_filter() {
    let app = common::test_app();

    let response = app
        .oneshot(
            Request::get("/users?ids=not-a-uuid")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_update_user_rejects_present_but_empty_email() {
    let app = common::test_app();
    let id = uuid::Uuid::new_v4();

    let response = app
        .oneshot(common::json_request(
            "PATCH",
            &format!("/users/{}", id),
            json!({ "email": "" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = common::body_json(response).await;
    assert_eq!(body["message"], "email is required");
}

#[tokio::test]
async fn test_delete_user_answers_ok() {
    let app = common::test_app();
    let id = uuid::Uuid::new_v4();

    let response = app
        .oneshot(
            Request::delete(format!("/users/{}", id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_update_password_rejects_empty_old_password() {
    let app = common::test_app();
    let id = uuid::Uuid::new_v4();

    let response = app
        .oneshot(common::json_request(
            "PUT",
            &format!("/users/{}/password", id),
            json!({ "old_password": "", "new_password": "fresh" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = common::body_json(response).await;
    assert_eq!(body["message"], "old_password is required");
}

#[tokio::test]
async fn test_add_roles_rejects_unknown_role_name() {
    let app = common::test_app();
    let id = uuid::Uuid::new_v4();

    let response = app
        .oneshot(common::json_request(
            "PUT",
            &format!("/users/{}/apps/calendar", id),
            json!({ "roles": ["admin", "wizard"] }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = common::body_json(response).await;
    assert_eq!(body["message"], "the 'wizard' role isn't valid");
}

#[tokio::test]
async fn test_create_app_rejects_empty_app() {
    let app = common::test_app();
    let id = uuid::Uuid::new_v4();

    let response = app
        .oneshot(common::json_request(
            "POST",
            &format!("/users/{}/apps", id),
            json!({ "app": "" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_token_access_with_wrong_subject_is_unauthorized() {
    use identra_shared::auth::token::TokenCodec;

    let app = common::test_app();
    let codec = TokenCodec::new(common::TEST_JWT_SECRET);
    let token = codec.issue(uuid::Uuid::new_v4(), "ada", 0).unwrap();

    // Token is valid but signed for a different user id
    let other = uuid::Uuid::new_v4();
    let response = app
        .oneshot(
            Request::get(format!("/users/{}/token/{}", other, token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_unknown_route_is_404() {
    let app = common::test_app();

    let response = app
        .oneshot(Request::get("/nope").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
