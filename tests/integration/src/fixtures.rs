//! Test fixtures and data generators
//!
//! Provides reusable accounts, pairings and chat messages for integration tests.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Duration, Utc};
use pairing_common::SessionClaims;
use pairing_core::{AppRole, ChatMessage, Pairing, PairingStatus, TypingStatus, User};
use serde_json::{json, Value};
use url::Url;
use uuid::Uuid;

/// Counter for unique test data
static COUNTER: AtomicU64 = AtomicU64::new(1);

/// Get a unique suffix for test data
pub fn unique_suffix() -> u64 {
    COUNTER.fetch_add(1, Ordering::SeqCst)
}

/// Password every generated account signs in with
pub const TEST_PASSWORD: &str = "TestPass123!";

/// Public API key the fake identity service expects
pub const TEST_API_KEY: &str = "anon-test-key";

/// Identity account plus the app profile behind it
#[derive(Debug, Clone)]
pub struct Account {
    pub password: String,
    pub user: User,
}

impl Account {
    pub fn unique(role: AppRole, organization_id: Option<Uuid>) -> Self {
        let suffix = unique_suffix();
        Self {
            password: TEST_PASSWORD.to_string(),
            user: User {
                id: Uuid::new_v4(),
                email: format!("member{suffix}@example.com"),
                first_name: format!("Member{suffix}"),
                last_name: "Tester".to_string(),
                role,
                organization_id,
                is_banned: false,
                avatar_url: None,
                bio: None,
                created_at: Utc::now(),
            },
        }
    }

    pub fn member(organization_id: Uuid) -> Self {
        Self::unique(AppRole::User, Some(organization_id))
    }

    pub fn org_admin(organization_id: Uuid) -> Self {
        Self::unique(AppRole::OrgAdmin, Some(organization_id))
    }

    pub fn email(&self) -> &str {
        &self.user.email
    }

    pub fn id(&self) -> Uuid {
        self.user.id
    }
}

/// Active pairing between two accounts, running for the current week
pub fn pairing(a: &Account, b: &Account) -> Pairing {
    let start = Utc::now() - Duration::days(2);
    Pairing {
        id: Uuid::new_v4(),
        organization_id: a.user.organization_id.unwrap_or_else(Uuid::new_v4),
        user_a: a.user.clone(),
        user_b: b.user.clone(),
        period_start: start,
        period_end: start + Duration::days(7),
        status: PairingStatus::Active,
    }
}

pub fn message(pairing_id: Uuid, sender: &Account, content: &str, at: DateTime<Utc>) -> ChatMessage {
    ChatMessage {
        id: Uuid::new_v4(),
        pairing_id,
        sender_id: sender.id(),
        content: content.to_string(),
        is_read: false,
        created_at: at,
    }
}

/// `data` of a `messageSent` subscription event
pub fn message_sent(message: &ChatMessage) -> Value {
    json!({ "messageSent": message })
}

/// `data` of a `typingStatus` subscription event
pub fn typing(pairing_id: Uuid, who: &Account, is_typing: bool) -> Value {
    json!({
        "typingStatus": TypingStatus {
            pairing_id,
            user_id: who.id(),
            is_typing,
        }
    })
}

/// Signed access token as the identity service puts it in redirect fragments
pub fn access_token_for(account: &Account) -> String {
    let now = Utc::now().timestamp();
    let claims = SessionClaims {
        sub: account.id(),
        email: Some(account.email().to_string()),
        exp: now + 3600,
        iat: now,
        role: Some("authenticated".to_string()),
    };
    jsonwebtoken::encode(
        &jsonwebtoken::Header::default(),
        &claims,
        &jsonwebtoken::EncodingKey::from_secret(b"fake-identity-secret"),
    )
    .expect("Failed to sign test token")
}

/// Redirect URL carrying a session in its fragment
pub fn callback_url(base: &str, kind: &str, access_token: &str, refresh_token: &str) -> Url {
    let fragment = url::form_urlencoded::Serializer::new(String::new())
        .append_pair("access_token", access_token)
        .append_pair("refresh_token", refresh_token)
        .append_pair("expires_in", "3600")
        .append_pair("token_type", "bearer")
        .append_pair("type", kind)
        .finish();
    let mut url = Url::parse(base).expect("Invalid callback base");
    url.set_fragment(Some(&fragment));
    url
}
