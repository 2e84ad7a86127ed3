#![allow(clippy::unwrap_used, clippy::expect_used)]

use secrecy::SecretString;
use serde_json::json;
use std::sync::Arc;
use suppleit::suppleit::{
    login::{MSG_LOGIN_FAILED, MSG_MISSING_FIELDS, MSG_NO_TOKEN, MSG_PROFILE_FAILED},
    session::{MemoryStorage, StorageSessionStore},
    ApiClient, AppConfig, AuthContext, AuthError, CredentialLogin, RecordingNavigator, Role,
    Route, Session, SessionEvent, SessionEvents, SessionStore,
};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

struct Harness {
    login: CredentialLogin,
    store: Arc<StorageSessionStore<MemoryStorage>>,
    navigator: Arc<RecordingNavigator>,
    events: SessionEvents,
}

fn harness(server: &MockServer) -> anyhow::Result<Harness> {
    let config = AppConfig {
        api_base_url: server.uri(),
        ..AppConfig::default()
    };
    let store = Arc::new(StorageSessionStore::new(MemoryStorage::new()));
    let navigator = Arc::new(RecordingNavigator::new());
    let events = SessionEvents::new();
    let context = AuthContext::new(store.clone(), events.clone(), navigator.clone());

    Ok(Harness {
        login: CredentialLogin::new(ApiClient::new(&config)?, context),
        store,
        navigator,
        events,
    })
}

fn password(value: &str) -> SecretString {
    SecretString::from(value.to_string())
}

#[tokio::test]
async fn empty_fields_send_no_request() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let h = harness(&server)?;
    let missing = Err(AuthError::Validation(MSG_MISSING_FIELDS.to_string()));

    assert_eq!(h.login.submit("", &password("pw")).await, missing);
    assert_eq!(h.login.submit("a@b.com", &password("")).await, missing);
    assert_eq!(h.login.submit("   ", &password("pw")).await, missing);

    assert_eq!(h.store.get()?, None);
    assert!(h.navigator.routes().is_empty());
    Ok(())
}

#[tokio::test]
async fn whitespace_password_is_submitted_as_is() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .and(body_json(json!({ "email": "a@b.com", "password": "   " })))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_json(json!({ "message": "Invalid email or password." })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let h = harness(&server)?;
    let result = h.login.submit("a@b.com", &password("   ")).await;

    assert_eq!(
        result,
        Err(AuthError::Request("Invalid email or password.".to_string()))
    );
    assert_eq!(h.store.get()?, None);
    Ok(())
}

#[tokio::test]
async fn success_commits_session_then_notifies_and_navigates_home() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .and(body_json(json!({ "email": "a@b.com", "password": "pw" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "accessToken": "T",
            "refreshToken": "R"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/member/info"))
        .and(header("authorization", "Bearer T"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "email": "a@b.com",
            "memberId": 42,
            "memberRole": "ADMIN"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let h = harness(&server)?;
    let mut events = h.events.subscribe();

    let session = h.login.submit(" a@b.com ", &password("pw")).await?;

    let expected = Session::new("T", "R", "42", "a@b.com", Role::Admin);
    assert_eq!(session, expected);
    assert_eq!(h.store.get()?, Some(expected));
    assert_eq!(events.try_recv().ok(), Some(SessionEvent::Changed));
    assert_eq!(h.navigator.routes(), vec![Route::Home]);
    assert!(!h.login.is_loading());
    Ok(())
}

#[tokio::test]
async fn profile_without_email_or_role_falls_back() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "accessToken": "T",
            "refreshToken": "R"
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/member/info"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "memberId": "m-7" })))
        .mount(&server)
        .await;

    let h = harness(&server)?;
    let session = h.login.submit("a@b.com", &password("pw")).await?;

    assert_eq!(session, Session::new("T", "R", "m-7", "a@b.com", Role::User));
    Ok(())
}

#[tokio::test]
async fn profile_failure_keeps_previous_session() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "accessToken": "NEW",
            "refreshToken": "NEW-R"
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/member/info"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let h = harness(&server)?;
    let previous = Session::new("OLD", "OLD-R", "u0", "old@b.com", Role::Admin);
    h.store.set(&previous)?;
    let mut events = h.events.subscribe();

    let result = h.login.submit("new@b.com", &password("pw")).await;

    assert_eq!(
        result,
        Err(AuthError::Profile(MSG_PROFILE_FAILED.to_string()))
    );
    assert_eq!(h.store.get()?, Some(previous));
    assert!(events.try_recv().is_err());
    assert!(h.navigator.routes().is_empty());
    assert!(!h.login.is_loading());
    Ok(())
}

#[tokio::test]
async fn backend_message_is_surfaced() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_json(json!({ "message": "Invalid email or password." })),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/member/info"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let h = harness(&server)?;
    let result = h.login.submit("a@b.com", &password("wrong")).await;

    assert_eq!(
        result,
        Err(AuthError::Request("Invalid email or password.".to_string()))
    );
    assert_eq!(h.store.get()?, None);
    Ok(())
}

#[tokio::test]
async fn failure_without_message_uses_generic_text() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(ResponseTemplate::new(502).set_body_string("Bad Gateway"))
        .mount(&server)
        .await;

    let h = harness(&server)?;
    let result = h.login.submit("a@b.com", &password("pw")).await;

    assert_eq!(result, Err(AuthError::Request(MSG_LOGIN_FAILED.to_string())));
    Ok(())
}

#[tokio::test]
async fn missing_access_token_skips_profile_lookup() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "refreshToken": "R" })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/member/info"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let h = harness(&server)?;
    let result = h.login.submit("a@b.com", &password("pw")).await;

    assert_eq!(result, Err(AuthError::Protocol(MSG_NO_TOKEN.to_string())));
    assert_eq!(h.store.get()?, None);
    Ok(())
}

#[tokio::test]
async fn second_submission_while_loading_is_rejected() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "accessToken": "T", "refreshToken": "R" }))
                .set_delay(std::time::Duration::from_millis(200)),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/member/info"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "email": "a@b.com",
            "memberId": "u1",
            "memberRole": "USER"
        })))
        .mount(&server)
        .await;

    let h = harness(&server)?;
    let pw = password("pw");

    let (first, second) = tokio::join!(
        h.login.submit("a@b.com", &pw),
        h.login.submit("a@b.com", &pw)
    );

    assert!(first.is_ok());
    assert_eq!(second, Err(AuthError::Busy));
    assert!(!h.login.is_loading());
    Ok(())
}
