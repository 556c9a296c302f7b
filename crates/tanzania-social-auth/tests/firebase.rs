//! Sign-in and session renewal against a mocked identity service.

use std::time::Duration;

use serde_json::json;
use tanzania_social_auth::{
    AuthError, FirebaseAuthClient, FirebaseConfig, FirebaseSession, SessionProvider,
};
use wiremock::matchers::{body_json, body_string_contains, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const API_KEY: &str = "test-api-key";

fn config_for(server: &MockServer) -> FirebaseConfig {
    FirebaseConfig {
        api_key: API_KEY.to_string(),
        project_id: "tz-social".to_string(),
        identity_base_url: server.uri(),
        secure_token_base_url: server.uri(),
        ..FirebaseConfig::default()
    }
}

fn sign_in_body(id_token: &str, expires_in: &str) -> serde_json::Value {
    json!({
        "kind": "identitytoolkit#VerifyPasswordResponse",
        "localId": "uid-42",
        "email": "analyst@example.com",
        "displayName": "",
        "idToken": id_token,
        "registered": true,
        "refreshToken": "refresh-1",
        "expiresIn": expires_in
    })
}

fn refresh_body(id_token: &str) -> serde_json::Value {
    json!({
        "access_token": id_token,
        "expires_in": "3600",
        "token_type": "Bearer",
        "refresh_token": "refresh-2",
        "id_token": id_token,
        "user_id": "uid-42",
        "project_id": "123456"
    })
}

#[tokio::test]
async fn sign_in_sends_password_grant() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/accounts:signInWithPassword"))
        .and(query_param("key", API_KEY))
        .and(body_json(json!({
            "email": "analyst@example.com",
            "password": "hunter2",
            "returnSecureToken": true
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(sign_in_body("id-1", "3600")))
        .expect(1)
        .mount(&server)
        .await;

    let client = FirebaseAuthClient::new(config_for(&server));
    let resp = client
        .sign_in_with_password("analyst@example.com", "hunter2")
        .await
        .unwrap();

    assert_eq!(resp.user_id.as_str(), "uid-42");
    assert_eq!(resp.id_token, "id-1");
    assert_eq!(resp.refresh_token, "refresh-1");
}

#[tokio::test]
async fn sign_in_maps_bad_password() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/accounts:signInWithPassword"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": { "code": 400, "message": "INVALID_LOGIN_CREDENTIALS", "errors": [] }
        })))
        .mount(&server)
        .await;

    let client = FirebaseAuthClient::new(config_for(&server));
    let result = client.sign_in_with_password("a@b.c", "wrong").await;
    assert!(matches!(result, Err(AuthError::InvalidCredentials)));
}

#[tokio::test]
async fn sign_in_maps_rate_limit_with_suffix() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/accounts:signInWithPassword"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": {
                "code": 400,
                "message": "TOO_MANY_ATTEMPTS_TRY_LATER : Access to this account has been temporarily disabled."
            }
        })))
        .mount(&server)
        .await;

    let client = FirebaseAuthClient::new(config_for(&server));
    let result = client.sign_in_with_password("a@b.c", "pw").await;
    assert!(matches!(result, Err(AuthError::RateLimited)));
}

#[tokio::test]
async fn refresh_sends_form_grant() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/token"))
        .and(query_param("key", API_KEY))
        .and(body_string_contains("grant_type=refresh_token"))
        .and(body_string_contains("refresh_token=refresh-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(refresh_body("id-2")))
        .expect(1)
        .mount(&server)
        .await;

    let client = FirebaseAuthClient::new(config_for(&server));
    let resp = client.refresh("refresh-1").await.unwrap();
    assert_eq!(resp.id_token, "id-2");
    assert_eq!(resp.refresh_token, "refresh-2");
}

#[tokio::test]
async fn non_json_error_falls_back_to_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/token"))
        .respond_with(ResponseTemplate::new(503).set_body_string("upstream unavailable"))
        .mount(&server)
        .await;

    let client = FirebaseAuthClient::new(config_for(&server));
    let result = client.refresh("refresh-1").await;
    assert!(matches!(result, Err(AuthError::Internal(_))));
}

#[tokio::test]
async fn session_reuses_fresh_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/accounts:signInWithPassword"))
        .respond_with(ResponseTemplate::new(200).set_body_json(sign_in_body("id-1", "3600")))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(refresh_body("id-2")))
        .expect(0)
        .mount(&server)
        .await;

    let session = FirebaseSession::new(FirebaseAuthClient::new(config_for(&server)));
    let user = session
        .sign_in_with_password("analyst@example.com", "hunter2")
        .await
        .unwrap();

    assert_eq!(session.current_user(), Some(user));
    assert_eq!(session.id_token().await.unwrap(), "id-1");
    assert_eq!(session.id_token().await.unwrap(), "id-1");
}

#[tokio::test]
async fn session_renews_near_expiry() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/accounts:signInWithPassword"))
        .respond_with(ResponseTemplate::new(200).set_body_json(sign_in_body("id-1", "60")))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/token"))
        .and(body_string_contains("refresh_token=refresh-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(refresh_body("id-2")))
        .expect(1)
        .mount(&server)
        .await;

    let session = FirebaseSession::new(FirebaseAuthClient::new(config_for(&server)));
    session
        .sign_in_with_password("analyst@example.com", "hunter2")
        .await
        .unwrap();

    assert_eq!(session.id_token().await.unwrap(), "id-2");
    // Renewed credential lasts an hour; no second refresh.
    assert_eq!(session.id_token().await.unwrap(), "id-2");
    assert_eq!(session.refresh_token().as_deref(), Some("refresh-2"));
}

#[tokio::test]
async fn rejected_refresh_ends_session() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/accounts:signInWithPassword"))
        .respond_with(ResponseTemplate::new(200).set_body_json(sign_in_body("id-1", "0")))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/token"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": { "code": 400, "message": "TOKEN_EXPIRED" }
        })))
        .mount(&server)
        .await;

    let session = FirebaseSession::new(FirebaseAuthClient::new(config_for(&server)));
    session
        .sign_in_with_password("analyst@example.com", "hunter2")
        .await
        .unwrap();

    let result = session.id_token().await;
    assert!(matches!(result, Err(AuthError::TokenRefreshFailed(code)) if code == "TOKEN_EXPIRED"));
    assert!(session.current_user().is_none());
}

#[tokio::test]
async fn restore_and_sign_out() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(refresh_body("id-2")))
        .mount(&server)
        .await;

    let session = FirebaseSession::new(FirebaseAuthClient::new(config_for(&server)));
    let user = session.restore("refresh-1").await.unwrap();
    assert_eq!(user.as_str(), "uid-42");
    assert_eq!(session.id_token().await.unwrap(), "id-2");

    session.sign_out();
    assert!(session.current_user().is_none());
    assert!(matches!(
        session.id_token().await,
        Err(AuthError::NotSignedIn)
    ));
}

#[tokio::test]
async fn out_of_range_expiry_is_internal_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/accounts:signInWithPassword"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(sign_in_body("id-1", "9223372036854775807")),
        )
        .mount(&server)
        .await;

    let session = FirebaseSession::new(FirebaseAuthClient::new(config_for(&server)));
    let result = session.sign_in_with_password("analyst@example.com", "hunter2").await;

    assert!(matches!(result, Err(AuthError::Internal(msg)) if msg.contains("expiresIn")));
    assert!(session.current_user().is_none());
}

#[tokio::test]
async fn sign_out_during_renewal_wins() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/accounts:signInWithPassword"))
        .respond_with(ResponseTemplate::new(200).set_body_json(sign_in_body("id-1", "60")))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/token"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(refresh_body("id-2"))
                .set_delay(Duration::from_millis(300)),
        )
        .mount(&server)
        .await;

    let session = FirebaseSession::new(FirebaseAuthClient::new(config_for(&server)));
    session
        .sign_in_with_password("analyst@example.com", "hunter2")
        .await
        .unwrap();

    let (token, ()) = tokio::join!(session.id_token(), async {
        tokio::time::sleep(Duration::from_millis(50)).await;
        session.sign_out();
    });

    assert!(matches!(token, Err(AuthError::NotSignedIn)));
    assert!(session.current_user().is_none());
}

#[tokio::test]
async fn concurrent_renewals_share_result() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/accounts:signInWithPassword"))
        .respond_with(ResponseTemplate::new(200).set_body_json(sign_in_body("id-1", "60")))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/token"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(refresh_body("id-2"))
                .set_delay(Duration::from_millis(100)),
        )
        .mount(&server)
        .await;

    let session = FirebaseSession::new(FirebaseAuthClient::new(config_for(&server)));
    session
        .sign_in_with_password("analyst@example.com", "hunter2")
        .await
        .unwrap();

    let (first, second) = tokio::join!(session.id_token(), session.id_token());

    assert_eq!(first.unwrap(), "id-2");
    assert_eq!(second.unwrap(), "id-2");
    assert_eq!(session.refresh_token().as_deref(), Some("refresh-2"));
}
