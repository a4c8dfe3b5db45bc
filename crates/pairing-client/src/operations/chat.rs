//! Chat queries, mutations and subscriptions

use pairing_core::{ChatMessage, ReadReceipt, TypingStatus};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::PairingIdVariables;
use crate::graphql::{Operation, OperationKind};

/// Message history of a pairing, oldest first
pub struct PairingMessages;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PairingMessagesData {
    pub pairing_messages: Vec<ChatMessage>,
}

impl Operation for PairingMessages {
    const NAME: &'static str = "PairingMessages";
    const DOCUMENT: &'static str = r"query PairingMessages($pairingId: ID!) {
  pairingMessages(pairingId: $pairingId) { id pairingId senderId content isRead createdAt }
}";
    const KIND: OperationKind = OperationKind::Query;
    type Variables = PairingIdVariables;
    type Data = PairingMessagesData;
}

pub struct SendMessage;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageVariables {
    pub pairing_id: Uuid,
    pub content: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageData {
    pub send_message: ChatMessage,
}

impl Operation for SendMessage {
    const NAME: &'static str = "SendMessage";
    const DOCUMENT: &'static str = r"mutation SendMessage($pairingId: ID!, $content: String!) {
  sendMessage(pairingId: $pairingId, content: $content) {
    id pairingId senderId content isRead createdAt
  }
}";
    const KIND: OperationKind = OperationKind::Mutation;
    const INVALIDATES: &'static [&'static str] = &["PairingMessages"];
    type Variables = SendMessageVariables;
    type Data = SendMessageData;
}

/// Mark every incoming message of a pairing as read
pub struct MarkMessagesRead;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkMessagesReadData {
    pub mark_messages_read: i64,
}

impl Operation for MarkMessagesRead {
    const NAME: &'static str = "MarkMessagesRead";
    const DOCUMENT: &'static str = r"mutation MarkMessagesRead($pairingId: ID!) {
  markMessagesRead(pairingId: $pairingId)
}";
    const KIND: OperationKind = OperationKind::Mutation;
    const INVALIDATES: &'static [&'static str] = &["PairingMessages"];
    type Variables = PairingIdVariables;
    type Data = MarkMessagesReadData;
}

pub struct SetTypingStatus;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SetTypingStatusVariables {
    pub pairing_id: Uuid,
    pub is_typing: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetTypingStatusData {
    pub set_typing_status: bool,
}

impl Operation for SetTypingStatus {
    const NAME: &'static str = "SetTypingStatus";
    const DOCUMENT: &'static str = r"mutation SetTypingStatus($pairingId: ID!, $isTyping: Boolean!) {
  setTypingStatus(pairingId: $pairingId, isTyping: $isTyping)
}";
    const KIND: OperationKind = OperationKind::Mutation;
    type Variables = SetTypingStatusVariables;
    type Data = SetTypingStatusData;
}

// === Subscriptions ===

pub struct OnMessageSent;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OnMessageSentData {
    pub message_sent: ChatMessage,
}

impl Operation for OnMessageSent {
    const NAME: &'static str = "OnMessageSent";
    const DOCUMENT: &'static str = r"subscription OnMessageSent($pairingId: ID!) {
  messageSent(pairingId: $pairingId) { id pairingId senderId content isRead createdAt }
}";
    const KIND: OperationKind = OperationKind::Subscription;
    type Variables = PairingIdVariables;
    type Data = OnMessageSentData;
}

pub struct OnTyping;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OnTypingData {
    pub typing_status: TypingStatus,
}

impl Operation for OnTyping {
    const NAME: &'static str = "OnTyping";
    const DOCUMENT: &'static str = r"subscription OnTyping($pairingId: ID!) {
  typingStatus(pairingId: $pairingId) { pairingId userId isTyping }
}";
    const KIND: OperationKind = OperationKind::Subscription;
    type Variables = PairingIdVariables;
    type Data = OnTypingData;
}

pub struct OnMessagesRead;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OnMessagesReadData {
    pub messages_read: ReadReceipt,
}

impl Operation for OnMessagesRead {
    const NAME: &'static str = "OnMessagesRead";
    const DOCUMENT: &'static str = r"subscription OnMessagesRead($pairingId: ID!) {
  messagesRead(pairingId: $pairingId) { pairingId readerId readAt }
}";
    const KIND: OperationKind = OperationKind::Subscription;
    type Variables = PairingIdVariables;
    type Data = OnMessagesReadData;
}
