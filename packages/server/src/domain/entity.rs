//! Entities

use serde_json::Value;

use super::{
    error::ValueObjectError,
    value_object::{ConversationId, MessageId, MessageStatus, MessageType, Timestamp, UserId},
};

/// 永続化前のメッセージ
///
/// 本文が空（空白のみを含む）かつ添付が無いメッセージは生成できない。
#[derive(Debug, Clone, PartialEq)]
pub struct NewMessage {
    pub conversation_id: ConversationId,
    pub sender_id: UserId,
    pub body: Option<String>,
    pub attachments: Vec<Value>,
    pub message_type: MessageType,
}

impl NewMessage {
    pub fn new(
        conversation_id: ConversationId,
        sender_id: UserId,
        body: Option<String>,
        attachments: Vec<Value>,
        message_type: MessageType,
    ) -> Result<Self, ValueObjectError> {
        let body = body.filter(|b| !b.trim().is_empty());
        if body.is_none() && attachments.is_empty() {
            return Err(ValueObjectError::EmptyMessage);
        }

        Ok(Self {
            conversation_id,
            sender_id,
            body,
            attachments,
            message_type,
        })
    }

    /// サーバー採番の ID と作成時刻を付与して送信済みメッセージにする
    pub fn into_sent(self, id: MessageId, created_at: Timestamp) -> ChatMessage {
        ChatMessage {
            id,
            conversation_id: self.conversation_id,
            sender_id: self.sender_id,
            body: self.body,
            attachments: self.attachments,
            message_type: self.message_type,
            status: MessageStatus::Sent,
            created_at,
        }
    }
}

/// 永続化済みのチャットメッセージ
///
/// 作成後は不変。ステータス遷移は永続化層の責務。
#[derive(Debug, Clone, PartialEq)]
pub struct ChatMessage {
    pub id: MessageId,
    pub conversation_id: ConversationId,
    pub sender_id: UserId,
    pub body: Option<String>,
    pub attachments: Vec<Value>,
    pub message_type: MessageType,
    pub status: MessageStatus,
    pub created_at: Timestamp,
}
