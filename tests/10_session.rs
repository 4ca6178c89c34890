mod common;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, ResponseTemplate};

use common::{fail, ok, TestBackend};
use ebbing_console::apis::{self, LoginRequest};
use ebbing_console::error::RequestError;
use ebbing_console::router::Admission;
use ebbing_console::session::{
    CredentialKind, CredentialStore, FileCredentialStore, MemoryCredentialStore, SessionSettings,
    SessionStore, TokenPair,
};

fn profile(roles: serde_json::Value) -> serde_json::Value {
    json!({
        "id": 7,
        "email": "ada@example.com",
        "nickname": "Ada",
        "avatar": null,
        "timezone": "Asia/Shanghai",
        "roles": roles
    })
}

#[tokio::test]
async fn login_then_profile_admits_landing_route() -> Result<()> {
    let backend = TestBackend::start().await?;

    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .and(body_json(json!({"account": "ada@example.com", "password": "secret"})))
        .respond_with(ok(json!({
            "user_id": 7,
            "tokens": {"access": "acc", "refresh": "ref"}
        })))
        .expect(1)
        .mount(&backend.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/user/profile"))
        .and(header("authorization", "Bearer acc"))
        .respond_with(ok(profile(json!(["admin"]))))
        .expect(1)
        .mount(&backend.server)
        .await;

    let session = &backend.console.session;
    assert_eq!(backend.console.guard.check("/knowledge"), Admission::Login {
        return_to: "/knowledge".into()
    });

    let response = session
        .login(
            &backend.console.client,
            &LoginRequest {
                account: "ada@example.com".into(),
                password: "secret".into(),
            },
        )
        .await?;
    assert_eq!(response.user_id, 7);

    let user = session.get_info(&backend.console.client).await?;
    assert_eq!(user.display_name, "Ada");
    assert!(user.roles.contains("admin"));

    assert_eq!(backend.console.guard.check("/knowledge"), Admission::Admit);
    assert_eq!(backend.console.guard.check("/login"), Admission::Landing);

    let navigation = backend.console.guard.navigate("/")?;
    assert_eq!(navigation.resolved, "/knowledge");
    assert_eq!(session.views().visited().len(), 1);
    Ok(())
}

#[tokio::test]
async fn empty_role_list_falls_back_to_default_roles() -> Result<()> {
    let backend = TestBackend::logged_in().await?;
    Mock::given(method("GET"))
        .and(path("/api/user/profile"))
        .respond_with(ok(profile(json!([]))))
        .mount(&backend.server)
        .await;

    let user = backend.console.session.get_info(&backend.console.client).await?;

    assert_eq!(user.roles.iter().collect::<Vec<_>>(), vec!["user"]);
    Ok(())
}

#[tokio::test]
async fn invalid_session_code_clears_session_and_guard_sends_to_login() -> Result<()> {
    let backend = TestBackend::logged_in().await?;
    backend.console.guard.navigate("/plans")?;
    assert_eq!(backend.console.session.views().visited().len(), 1);

    Mock::given(method("GET"))
        .and(path("/api/plans"))
        .respond_with(fail(200, 1002, "invalid_token"))
        .mount(&backend.server)
        .await;

    let err = apis::plans::list_plans(&backend.console.client, &Default::default())
        .await
        .unwrap_err();

    assert_eq!(err, RequestError::AuthExpired);
    let session = backend.console.session.snapshot();
    assert!(session.is_anonymous());
    assert!(session.roles.is_empty());
    assert!(backend.console.session.views().visited().is_empty());
    assert_eq!(backend.console.session.teardown_generation(), 1);
    assert!(backend.notices.messages().is_empty());
    assert_eq!(
        backend.console.guard.check("/plans"),
        Admission::Login {
            return_to: "/plans".into()
        }
    );
    Ok(())
}

#[tokio::test]
async fn refresh_replaces_access_token_for_later_calls() -> Result<()> {
    let backend = TestBackend::logged_in().await?;
    Mock::given(method("POST"))
        .and(path("/api/auth/refresh"))
        .and(header("authorization", "Bearer refresh-1"))
        .respond_with(ok(json!({"access": "access-2"})))
        .expect(1)
        .mount(&backend.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/knowledge/topics"))
        .and(header("authorization", "Bearer access-2"))
        .respond_with(ok(json!({"items": [], "total": 0})))
        .expect(1)
        .mount(&backend.server)
        .await;

    backend
        .console
        .session
        .refresh_access(&backend.console.client)
        .await?;
    let topics = apis::knowledge::list_topics(&backend.console.client).await?;

    assert_eq!(topics.total, 0);
    assert_eq!(backend.console.session.refresh_token().as_deref(), Some("refresh-1"));
    Ok(())
}

#[tokio::test]
async fn refresh_landing_after_logout_does_not_revive_the_session() -> Result<()> {
    let credentials = Arc::new(MemoryCredentialStore::new());
    let backend = TestBackend::start_with(credentials.clone(), 2000).await?;
    backend
        .console
        .session
        .establish(&TokenPair::new("access-1", "refresh-1"))?;
    Mock::given(method("POST"))
        .and(path("/api/auth/refresh"))
        .respond_with(ok(json!({"access": "access-2"})).set_delay(Duration::from_millis(300)))
        .expect(1)
        .mount(&backend.server)
        .await;

    let session = &backend.console.session;
    let (refreshed, cleared) = tokio::join!(session.refresh_access(&backend.console.client), async {
        tokio::time::sleep(Duration::from_millis(50)).await;
        session.terminate()
    });

    assert!(refreshed.is_ok());
    assert!(cleared);
    assert_eq!(session.access_token(), None);
    assert_eq!(credentials.get(CredentialKind::Access), None);

    let restarted = SessionStore::new(credentials, SessionSettings::default());
    assert!(!restarted.is_authenticated());
    Ok(())
}

#[tokio::test]
async fn sign_out_clears_locally_even_when_server_fails() -> Result<()> {
    let backend = TestBackend::logged_in().await?;
    Mock::given(method("POST"))
        .and(path("/api/auth/logout"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&backend.server)
        .await;

    assert!(backend.console.session.sign_out(&backend.console.client).await);
    assert!(!backend.console.session.is_authenticated());
    // logout is a manual clear, not a forced teardown
    assert_eq!(backend.console.session.teardown_generation(), 0);
    Ok(())
}

#[tokio::test]
async fn tokens_survive_a_restart_through_the_credential_file() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let file = dir.path().join("credentials.json");

    {
        let backend = TestBackend::start_with(Arc::new(FileCredentialStore::new(&file)), 2000).await?;
        backend
            .console
            .session
            .establish(&TokenPair::new("persisted", "persisted-refresh"))?;
    }

    let backend = TestBackend::start_with(Arc::new(FileCredentialStore::new(&file)), 2000).await?;
    Mock::given(method("GET"))
        .and(path("/api/knowledge/topics"))
        .and(header("authorization", "Bearer persisted"))
        .respond_with(fail(200, 2003, "token_revoked"))
        .expect(1)
        .mount(&backend.server)
        .await;

    assert!(backend.console.session.is_authenticated());
    let err = apis::knowledge::list_topics(&backend.console.client)
        .await
        .unwrap_err();
    assert!(err.is_session_terminating());
    assert!(!file.exists());
    Ok(())
}
