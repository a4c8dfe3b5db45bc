//! Realtime Integration Tests
//!
//! Open chat rooms over a real `graphql-transport-ws` socket served by the
//! fake backend and push subscription events through it.
//!
//! Run with: cargo test -p integration-tests --test realtime_tests

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use integration_tests::{eventually, fixtures::*, TestServer};
use pairing_app::screens::ChatScreen;
use pairing_app::AppShell;
use pairing_realtime::{
    ChatRoom, ChatUpdate, CloseCode, RealtimeError, Recovery, SubscriptionClient,
};
use serde_json::json;
use tokio::sync::broadcast;
use uuid::Uuid;

const TYPING_IDLE: Duration = Duration::from_millis(300);

/// Signed-in member with a partner and an empty chat history
struct ChatFixture {
    server: TestServer,
    shell: Arc<AppShell>,
    partner: Account,
    pairing_id: Uuid,
}

impl ChatFixture {
    async fn new() -> Self {
        let server = TestServer::start().await.expect("Failed to start server");
        let org = Uuid::new_v4();
        let member = Account::member(org);
        let partner = Account::member(org);
        let shell = server.signed_in(&member).await.unwrap();
        let pairing_id = pairing(&member, &partner).id;
        server
            .backend
            .on("PairingMessages", json!({ "pairingMessages": [] }));
        server
            .backend
            .on("MarkMessagesRead", json!({ "markMessagesRead": 1 }));
        server
            .backend
            .on("SetTypingStatus", json!({ "setTypingStatus": true }));
        Self {
            server,
            shell,
            partner,
            pairing_id,
        }
    }

    async fn connect(&self) -> SubscriptionClient {
        SubscriptionClient::connect_for(&self.shell.config().graphql, self.shell.session())
            .await
            .expect("Failed to connect")
    }

    async fn open(&self, realtime: &SubscriptionClient) -> ChatScreen {
        let screen = ChatScreen::open(
            self.shell.client().clone(),
            realtime,
            self.pairing_id,
            self.partner.user.first_name.clone(),
            TYPING_IDLE,
        )
        .await
        .expect("Failed to open chat");
        eventually("chat subscriptions", || {
            self.server.backend.subscriptions().len() >= 3
        })
        .await
        .unwrap();
        screen
    }
}

async fn next_update(updates: &mut broadcast::Receiver<ChatUpdate>) -> ChatUpdate {
    tokio::time::timeout(Duration::from_secs(5), updates.recv())
        .await
        .expect("Timed out waiting for a chat update")
        .expect("Update channel closed")
}

// ============================================================================
// Connection
// ============================================================================

#[tokio::test]
async fn test_connection_init_carries_bearer_token() {
    let f = ChatFixture::new().await;
    let realtime = f.connect().await;

    let inits = f.server.backend.connection_inits();
    assert_eq!(inits.len(), 1);
    let token = f.shell.session().access_token().unwrap();
    assert_eq!(
        inits[0].as_ref().unwrap()["Authorization"],
        format!("Bearer {token}")
    );
    assert!(!realtime.is_closed());
    realtime.close();
}

#[tokio::test]
async fn test_rejected_init_reports_close_code() {
    let f = ChatFixture::new().await;
    f.server
        .backend
        .reject_connections(CloseCode::Forbidden.as_u16());

    let err = SubscriptionClient::connect_for(&f.shell.config().graphql, f.shell.session())
        .await
        .err()
        .expect("Connection should be refused");
    assert!(matches!(
        err,
        RealtimeError::ConnectionClosed { code: Some(4403), .. }
    ));
}

#[tokio::test]
async fn test_chat_subscribes_to_all_three_feeds() {
    let f = ChatFixture::new().await;
    let realtime = f.connect().await;
    let screen = f.open(&realtime).await;

    let mut operations: Vec<String> = f
        .server
        .backend
        .subscriptions()
        .into_iter()
        .map(|s| {
            assert_eq!(s.variables["pairingId"], json!(f.pairing_id));
            s.operation
        })
        .collect();
    operations.sort();
    assert_eq!(operations, ["OnMessageSent", "OnMessagesRead", "OnTyping"]);
    assert_eq!(realtime.active_subscriptions(), 3);

    screen.close().await;
}

// ============================================================================
// Messages
// ============================================================================

#[tokio::test]
async fn test_partner_message_arrives_and_is_marked_read() {
    let f = ChatFixture::new().await;
    let realtime = f.connect().await;
    let screen = f.open(&realtime).await;
    let mut updates = screen.updates();

    let incoming = message(f.pairing_id, &f.partner, "Coffee at ten?", Utc::now());
    f.server
        .backend
        .push_event("OnMessageSent", message_sent(&incoming));

    assert_eq!(
        next_update(&mut updates).await,
        ChatUpdate::ScrollToBottom(incoming.id)
    );
    let rows = screen.rows();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].content, "Coffee at ten?");
    assert!(!rows[0].mine);

    eventually("read receipt", || {
        f.server.backend.calls("MarkMessagesRead") == 1
    })
    .await
    .unwrap();
    assert_eq!(screen.unread_count(), 0);

    screen.close().await;
}

#[tokio::test]
async fn test_own_message_echo_is_not_duplicated() {
    let f = ChatFixture::new().await;
    let realtime = f.connect().await;
    let mut screen = f.open(&realtime).await;
    let mut updates = screen.updates();

    let me = f.shell.session().user().unwrap();
    let mine = pairing_core::ChatMessage {
        id: Uuid::new_v4(),
        pairing_id: f.pairing_id,
        sender_id: me.id,
        content: "See you there".to_string(),
        is_read: false,
        created_at: Utc::now(),
    };
    f.server
        .backend
        .on("SendMessage", json!({ "sendMessage": mine }));

    screen.set_draft("See you there").await;
    let sent = screen.submit().await.unwrap().unwrap();
    assert_eq!(sent.id, mine.id);
    assert_eq!(screen.draft(), "");
    assert_eq!(
        next_update(&mut updates).await,
        ChatUpdate::ScrollToBottom(mine.id)
    );

    // The subscription echoes our own message back
    f.server
        .backend
        .push_event("OnMessageSent", json!({ "messageSent": mine }));
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(screen.rows().len(), 1);
    assert!(screen.rows()[0].mine);

    let sends = f.server.backend.requests("SendMessage");
    assert_eq!(sends.len(), 1);
    assert_eq!(sends[0].variables["content"], "See you there");

    screen.close().await;
}

#[tokio::test]
async fn test_blank_message_never_reaches_the_server() {
    let f = ChatFixture::new().await;
    let realtime = f.connect().await;
    let mut screen = f.open(&realtime).await;

    screen.set_draft("  \n\t ").await;
    assert_eq!(screen.submit().await.unwrap(), None);
    assert_eq!(screen.draft(), "  \n\t ");

    let me = f.shell.session().user_id().unwrap();
    let room = ChatRoom::open(f.shell.client().clone(), &realtime, f.pairing_id, me)
        .await
        .expect("Failed to open room");
    let err = room.send("  \n ").await.unwrap_err();
    assert!(matches!(
        err,
        RealtimeError::Domain(pairing_core::DomainError::EmptyMessage)
    ));

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(f.server.backend.requests("SendMessage").is_empty());
    assert!(screen.rows().is_empty());

    room.close().await;
    screen.close().await;
}

// ============================================================================
// Typing
// ============================================================================

#[tokio::test]
async fn test_partner_typing_shows_then_expires() {
    let f = ChatFixture::new().await;
    let realtime = f.connect().await;
    let screen = f.open(&realtime).await;
    let mut updates = screen.updates();

    f.server
        .backend
        .push_event("OnTyping", typing(f.pairing_id, &f.partner, true));

    assert_eq!(next_update(&mut updates).await, ChatUpdate::TypingChanged(true));
    let expected = format!("{} is typing...", f.partner.user.first_name);
    assert_eq!(screen.typing_line(), Some(expected));

    // No further typing events: the indicator times out on its own
    assert_eq!(next_update(&mut updates).await, ChatUpdate::TypingChanged(false));
    assert_eq!(screen.typing_line(), None);

    screen.close().await;
}

#[tokio::test]
async fn test_keystrokes_publish_typing_status() {
    let f = ChatFixture::new().await;
    let realtime = f.connect().await;
    let mut screen = f.open(&realtime).await;

    screen.set_draft("H").await;
    screen.set_draft("He").await;
    screen.set_draft("Hel").await;

    eventually("typing started", || {
        f.server.backend.calls("SetTypingStatus") >= 1
    })
    .await
    .unwrap();
    let first = &f.server.backend.requests("SetTypingStatus")[0];
    assert_eq!(first.variables["isTyping"], true);

    eventually("typing stopped", || {
        f.server
            .backend
            .requests("SetTypingStatus")
            .last()
            .is_some_and(|r| r.variables["isTyping"] == false)
    })
    .await
    .unwrap();

    screen.close().await;
}

// ============================================================================
// Disconnects
// ============================================================================

#[tokio::test]
async fn test_server_close_reports_disconnected() {
    let f = ChatFixture::new().await;
    let realtime = f.connect().await;
    let screen = f.open(&realtime).await;
    let mut updates = screen.updates();

    f.server.backend.close_sockets(
        CloseCode::InternalServerError.as_u16(),
        "Internal server error",
    );

    assert_eq!(
        next_update(&mut updates).await,
        ChatUpdate::Disconnected(Recovery::Reconnect)
    );
    eventually("client closed", || realtime.is_closed())
        .await
        .unwrap();
}

#[tokio::test]
async fn test_unauthorized_close_asks_for_sign_in() {
    let f = ChatFixture::new().await;
    let realtime = f.connect().await;
    let screen = f.open(&realtime).await;
    let mut updates = screen.updates();

    f.server
        .backend
        .close_sockets(CloseCode::Unauthorized.as_u16(), "Unauthorized");

    assert_eq!(
        next_update(&mut updates).await,
        ChatUpdate::Disconnected(Recovery::Reauthenticate)
    );
}
