use std::sync::Arc;

use assert_matches::assert_matches;
use axum::extract::{Extension, State};
use axum_extra::TypedHeader;
use headers::{authorization::Bearer, Authorization};
use serde_json::json;
use wiremock::matchers::{method, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

use media_cell::handlers::*;
use shared_config::AppConfig;
use shared_models::auth::User;
use shared_models::error::AppError;
use shared_utils::test_utils::{JwtTestUtils, TestUser};

fn mock_config(server: &MockServer) -> Arc<AppConfig> {
    Arc::new(AppConfig {
        supabase_url: server.uri(),
        supabase_anon_key: "test-anon-key".to_string(),
        supabase_jwt_secret: "test-secret-key-for-jwt-validation-must-be-long-enough".to_string(),
    })
}

fn user_extension(test_user: &TestUser) -> Extension<User> {
    Extension(test_user.to_user())
}

fn auth_header(token: &str) -> TypedHeader<Authorization<Bearer>> {
    TypedHeader(Authorization::bearer(token).unwrap())
}

#[tokio::test]
async fn test_upload_grant_is_scoped_to_caller() {
    let mock_server = MockServer::start().await;
    let config = mock_config(&mock_server);

    let patient = TestUser::patient("patient@example.com");
    let token = JwtTestUtils::create_test_token(&patient, &config.supabase_jwt_secret, Some(24));

    Mock::given(method("POST"))
        .and(path_regex(
            r"^/storage/v1/object/upload/sign/consultation-videos/[0-9a-f-]+/[0-9a-f-]+\.webm$",
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "url": "/object/upload/sign/consultation-videos/abc.webm?token=upload-token-123"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let result = create_upload_url(
        State(config),
        auth_header(&token),
        user_extension(&patient),
    )
    .await;

    assert!(result.is_ok());
    let response = result.unwrap().0;

    let object_path = response["path"].as_str().unwrap();
    assert!(object_path.starts_with(&format!("{}/", patient.id)));
    assert!(object_path.ends_with(".webm"));

    let signed_url = response["signed_url"].as_str().unwrap();
    assert!(signed_url.contains("/storage/v1/object/upload/sign/consultation-videos/"));
    assert_eq!(response["token"], "upload-token-123");
}

#[tokio::test]
async fn test_fresh_grants_use_distinct_paths() {
    let mock_server = MockServer::start().await;
    let config = mock_config(&mock_server);

    let patient = TestUser::patient("patient@example.com");
    let token = JwtTestUtils::create_test_token(&patient, &config.supabase_jwt_secret, Some(24));

    Mock::given(method("POST"))
        .and(path_regex(r"^/storage/v1/object/upload/sign/consultation-videos/.+$"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "url": "/object/upload/sign/consultation-videos/abc.webm?token=t"
        })))
        .mount(&mock_server)
        .await;

    let first = create_upload_url(
        State(config.clone()),
        auth_header(&token),
        user_extension(&patient),
    )
    .await
    .unwrap()
    .0;

    let second = create_upload_url(
        State(config),
        auth_header(&token),
        user_extension(&patient),
    )
    .await
    .unwrap()
    .0;

    assert_ne!(first["path"], second["path"]);
}

#[tokio::test]
async fn test_storage_failure_maps_to_internal_error() {
    let mock_server = MockServer::start().await;
    let config = mock_config(&mock_server);

    let patient = TestUser::patient("patient@example.com");
    let token = JwtTestUtils::create_test_token(&patient, &config.supabase_jwt_secret, Some(24));

    Mock::given(method("POST"))
        .and(path_regex(r"^/storage/v1/object/upload/sign/.+$"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "error": "bucket unavailable"
        })))
        .mount(&mock_server)
        .await;

    let result = create_upload_url(
        State(config),
        auth_header(&token),
        user_extension(&patient),
    )
    .await;

    assert_matches!(result, Err(AppError::Internal(_)));
}
