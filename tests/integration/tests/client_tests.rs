//! Client Integration Tests
//!
//! Drive the app shell through the real HTTP transport and identity adapter
//! against the fake backend started by `TestServer`.
//!
//! Run with: cargo test -p integration-tests --test client_tests

use integration_tests::{eventually, fixtures::*, TestServer};
use pairing_app::screens::{PairingsScreen, PairingsTab};
use pairing_app::{NoticeLevel, Placement, Route, RouteDecision};
use pairing_client::forms::{LoginForm, RegisterForm, ResetPasswordForm, UpdatePasswordForm};
use pairing_client::operations::MyPairings;
use pairing_client::storage::keys;
use pairing_client::NoVariables;
use pairing_core::{AppRole, SessionStorage};
use serde_json::json;
use uuid::Uuid;

// ============================================================================
// Sign-in
// ============================================================================

#[tokio::test]
async fn test_sign_in_lands_on_role_home() {
    let server = TestServer::start().await.expect("Failed to start server");
    let member = Account::member(Uuid::new_v4());
    let shell = server.signed_in(&member).await.unwrap();

    assert_eq!(shell.current_route(), Route::Dashboard);
    assert_eq!(shell.session().user_id(), Some(member.id()));
    assert_eq!(shell.session().role(), Some(AppRole::User));

    let grants = server.backend.identity_calls("token");
    assert_eq!(grants.len(), 1);
    assert_eq!(grants[0].query["grant_type"], "password");

    let profile = server.backend.requests("CurrentUser");
    assert_eq!(profile.len(), 1);
    assert_eq!(profile[0].token, shell.session().access_token());
}

#[tokio::test]
async fn test_org_admin_lands_on_statistics() {
    let server = TestServer::start().await.expect("Failed to start server");
    let admin = Account::org_admin(Uuid::new_v4());
    let shell = server.signed_in(&admin).await.unwrap();

    assert_eq!(shell.current_route(), Route::Statistics);
    assert!(shell.sidebar().is_some());
}

#[tokio::test]
async fn test_wrong_password_stays_inline() {
    let server = TestServer::start().await.expect("Failed to start server");
    let member = Account::member(Uuid::new_v4());
    server.backend.add_account(&member);
    let shell = server.shell().unwrap();
    shell.bootstrap("/login").await;

    let notice = shell
        .sign_in(&LoginForm {
            email: member.email().to_string(),
            password: "not the password".to_string(),
        })
        .await
        .unwrap_err();

    assert_eq!(notice.placement, Placement::Inline);
    assert!(!shell.session().is_authenticated());
    assert_eq!(server.backend.calls("CurrentUser"), 0);
}

#[tokio::test]
async fn test_protected_route_redirects_to_login_when_signed_out() {
    let server = TestServer::start().await.expect("Failed to start server");
    let shell = server.shell().unwrap();

    let decision = shell.bootstrap("/pairings").await;
    assert_eq!(decision, RouteDecision::Redirect(Route::Login));
}

// ============================================================================
// Refresh and replay
// ============================================================================

#[tokio::test]
async fn test_expired_token_is_refreshed_and_replayed() {
    let server = TestServer::start().await.expect("Failed to start server");
    let member = Account::member(Uuid::new_v4());
    let partner = Account::member(member.user.organization_id.unwrap());
    let shell = server.signed_in(&member).await.unwrap();
    server
        .backend
        .on("MyPairings", json!({ "myPairings": [pairing(&member, &partner)] }));

    let stale = shell.session().access_token().unwrap();
    server.backend.expire(&stale);

    let data = shell
        .client()
        .refetch::<MyPairings>(&NoVariables {})
        .await
        .unwrap();
    assert_eq!(data.my_pairings.len(), 1);

    let requests = server.backend.requests("MyPairings");
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].token.as_deref(), Some(stale.as_str()));
    assert_ne!(requests[1].token, requests[0].token);
    assert_eq!(requests[1].token, shell.session().access_token());

    let grants = server.backend.identity_calls("token");
    assert_eq!(grants.last().unwrap().query["grant_type"], "refresh_token");
}

#[tokio::test]
async fn test_failed_refresh_signs_out() {
    let server = TestServer::start().await.expect("Failed to start server");
    let member = Account::member(Uuid::new_v4());
    let shell = server.signed_in(&member).await.unwrap();
    let watcher = shell.watch_session();

    server.backend.expire(&shell.session().access_token().unwrap());
    server.backend.revoke_refresh_tokens();

    let err = shell
        .client()
        .refetch::<MyPairings>(&NoVariables {})
        .await
        .unwrap_err();
    assert!(err.is_unauthenticated());
    assert!(!shell.session().is_authenticated());
    assert_eq!(server.backend.calls("MyPairings"), 1);

    eventually("login route", || shell.current_route() == Route::Login)
        .await
        .unwrap();
    watcher.abort();
}

// ============================================================================
// Cache
// ============================================================================

#[tokio::test]
async fn test_algorithm_run_invalidates_cached_pairings() {
    let server = TestServer::start().await.expect("Failed to start server");
    let org = Uuid::new_v4();
    let admin = Account::org_admin(org);
    let shell = server.signed_in(&admin).await.unwrap();
    server.backend.on("MyPairings", json!({ "myPairings": [] }));
    server.backend.on(
        "ExecutePairingAlgorithm",
        json!({
            "executePairingAlgorithm": { "pairsCreated": 4, "usersUnpaired": 1, "warnings": [] }
        }),
    );

    let mut screen = PairingsScreen::new(shell.client().clone()).unwrap();
    screen.load().await.unwrap();
    screen.load().await.unwrap();
    assert_eq!(server.backend.calls("MyPairings"), 1);

    let mut algorithm = pairing_app::screens::AlgorithmScreen::new(shell.client().clone(), org);
    let notice = algorithm.execute().await;
    assert_eq!(notice.level, NoticeLevel::Success);

    screen.load().await.unwrap();
    assert_eq!(server.backend.calls("MyPairings"), 2);
    assert!(screen.tab(PairingsTab::Active, chrono::Utc::now()).is_empty());
}

// ============================================================================
// Ban
// ============================================================================

#[tokio::test]
async fn test_ban_signs_out_and_shows_banned_screen() {
    let server = TestServer::start().await.expect("Failed to start server");
    let member = Account::member(Uuid::new_v4());
    let shell = server.signed_in(&member).await.unwrap();
    let watcher = shell.watch_session();
    server.backend.on("MyPairings", json!({ "myPairings": [] }));
    server.backend.ban(member.email());

    let first = shell.client().refetch::<MyPairings>(&NoVariables {}).await;
    assert!(first.unwrap_err().is_banned());

    eventually("banned route", || shell.current_route() == Route::Banned)
        .await
        .unwrap();
    assert!(!shell.session().is_authenticated());
    assert_eq!(shell.ban_message().as_deref(), Some("User is banned"));
    assert_eq!(server.backend.identity_calls("logout").len(), 1);

    watcher.abort();
}

#[tokio::test]
async fn test_banned_profile_on_sign_in() {
    let server = TestServer::start().await.expect("Failed to start server");
    let mut member = Account::member(Uuid::new_v4());
    member.user.is_banned = true;
    server.backend.add_account(&member);
    let shell = server.shell().unwrap();
    shell.bootstrap("/login").await;

    // The fake refuses banned accounts outright, like the real API
    let notice = shell
        .sign_in(&LoginForm {
            email: member.email().to_string(),
            password: member.password.clone(),
        })
        .await
        .unwrap_err();
    assert!(notice.is_error());
    assert!(!shell.session().is_authenticated());
}

// ============================================================================
// Registration and passwords
// ============================================================================

#[tokio::test]
async fn test_register_waits_for_email_confirmation() {
    let server = TestServer::start().await.expect("Failed to start server");
    let shell = server.shell().unwrap();
    shell.bootstrap("/register").await;
    let suffix = unique_suffix();
    let email = format!("new{suffix}@example.com");

    let notice = shell
        .auth_screen()
        .register(&RegisterForm {
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            email: email.clone(),
            password: TEST_PASSWORD.to_string(),
            confirm_password: TEST_PASSWORD.to_string(),
            invite_code: None,
        })
        .await;

    assert_eq!(notice.level, NoticeLevel::Info);
    assert!(!shell.session().is_authenticated());

    let signups = server.backend.identity_calls("signup");
    assert_eq!(signups.len(), 1);
    assert_eq!(signups[0].body["data"]["first_name"], "Ada");
    assert!(signups[0].query["redirect_to"].ends_with("/auth/callback"));
    assert!(server.backend.user(&email).is_some());
}

#[tokio::test]
async fn test_reset_request_never_reveals_unknown_email() {
    let server = TestServer::start().await.expect("Failed to start server");
    let shell = server.shell().unwrap();

    let notice = shell
        .auth_screen()
        .request_reset(&ResetPasswordForm {
            email: "nobody@example.com".to_string(),
        })
        .await;

    assert_eq!(notice.level, NoticeLevel::Info);
    let recover = server.backend.identity_calls("recover");
    assert_eq!(recover.len(), 1);
    assert!(recover[0].query["redirect_to"].ends_with("/update-password"));
}

#[tokio::test]
async fn test_recovery_link_then_update_password() {
    let server = TestServer::start().await.expect("Failed to start server");
    let member = Account::member(Uuid::new_v4());
    let token = access_token_for(&member);
    server.backend.adopt_token(&token, &member);
    let shell = server.shell().unwrap();
    shell.bootstrap("/update-password").await;

    let callback = callback_url(
        &format!("{}/auth/callback", server.base_url()),
        "recovery",
        &token,
        "refresh-from-link",
    );
    let route = shell.complete_auth_callback(&callback).await.unwrap();
    assert_eq!(route, Route::UpdatePassword);

    let notice = shell
        .auth_screen()
        .update_password(&UpdatePasswordForm {
            password: "a brand new secret".to_string(),
            confirm_password: "a brand new secret".to_string(),
        })
        .await;
    assert!(!notice.is_error());
    assert_eq!(
        server.backend.password_of(member.email()).as_deref(),
        Some("a brand new secret")
    );
}

// ============================================================================
// Sign-out
// ============================================================================

#[tokio::test]
async fn test_sign_out_revokes_session() {
    let server = TestServer::start().await.expect("Failed to start server");
    let member = Account::member(Uuid::new_v4());
    let shell = server.signed_in(&member).await.unwrap();
    assert!(shell.storage().get(keys::AUTH_SESSION).is_some());

    let route = shell.sign_out().await;
    assert_eq!(route, Route::Login);
    assert!(!shell.session().is_authenticated());
    assert_eq!(server.backend.identity_calls("logout").len(), 1);

    assert!(shell.storage().get(keys::AUTH_SESSION).is_none());
}
