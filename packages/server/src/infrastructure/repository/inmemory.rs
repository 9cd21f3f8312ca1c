//! InMemory Chat Repository 実装
//!
//! ドメイン層が定義する ChatRepository trait の具体的な実装。
//! 会話メンバーは `add_member` で事前に登録する（このコアは会話を作成しない）。
//! 保存したメッセージは破棄しないため、テストやライブラリ利用者が状態を検査する用途に限る。

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{ChatMessage, ChatRepository, ConversationId, RepositoryError, UserId};

/// インメモリ Chat Repository 実装
#[derive(Default)]
pub struct InMemoryChatRepository {
    /// 保存済みメッセージ（保存順）
    messages: Mutex<Vec<ChatMessage>>,
    /// 会話 ID → メンバー
    members: Mutex<HashMap<ConversationId, Vec<UserId>>>,
}

impl InMemoryChatRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// 会話にメンバーを追加する（重複は無視）
    pub async fn add_member(&self, conversation_id: ConversationId, user_id: UserId) {
        let mut members = self.members.lock().await;
        let entry = members.entry(conversation_id).or_default();
        if !entry.contains(&user_id) {
            entry.push(user_id);
        }
    }

    /// 保存済みメッセージのスナップショット
    pub async fn messages(&self) -> Vec<ChatMessage> {
        self.messages.lock().await.clone()
    }
}

#[async_trait]
impl ChatRepository for InMemoryChatRepository {
    async fn insert_message(&self, message: &ChatMessage) -> Result<(), RepositoryError> {
        let mut messages = self.messages.lock().await;
        if messages.iter().any(|m| m.id == message.id) {
            return Err(RepositoryError::Database(format!(
                "duplicate message id '{}'",
                message.id
            )));
        }
        messages.push(message.clone());
        Ok(())
    }

    async fn conversation_members(
        &self,
        conversation_id: &ConversationId,
    ) -> Result<Vec<UserId>, RepositoryError> {
        let members = self.members.lock().await;
        Ok(members.get(conversation_id).cloned().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{MessageId, MessageStatus, MessageType, Timestamp};

    fn message(id: &str) -> ChatMessage {
        ChatMessage {
            id: MessageId::from_persisted(id.to_string()),
            conversation_id: ConversationId::new("conv_1".to_string()).unwrap(),
            sender_id: UserId::new("u1".to_string()).unwrap(),
            body: Some("hi".to_string()),
            attachments: vec![],
            message_type: MessageType::default(),
            status: MessageStatus::Sent,
            created_at: Timestamp::new(1),
        }
    }

    #[tokio::test]
    async fn test_insert_message_success() {
        // テスト項目: メッセージを保存すると読み出せる
        // given (前提条件):
        let repo = InMemoryChatRepository::new();

        // when (操作):
        let result = repo.insert_message(&message("msg_1")).await;

        // then (期待する結果):
        assert!(result.is_ok());
        assert_eq!(repo.messages().await, vec![message("msg_1")]);
    }

    #[tokio::test]
    async fn test_insert_duplicate_id_fails() {
        // テスト項目: 同じ ID のメッセージは二重に保存されない
        // given (前提条件):
        let repo = InMemoryChatRepository::new();
        repo.insert_message(&message("msg_1")).await.unwrap();

        // when (操作):
        let result = repo.insert_message(&message("msg_1")).await;

        // then (期待する結果):
        assert!(matches!(result, Err(RepositoryError::Database(_))));
        assert_eq!(repo.messages().await.len(), 1);
    }

    #[tokio::test]
    async fn test_conversation_members() {
        // テスト項目: 会話メンバーを取得でき、未知の会話は空になる
        // given (前提条件):
        let repo = InMemoryChatRepository::new();
        let conv = ConversationId::new("conv_1".to_string()).unwrap();
        let alice = UserId::new("alice".to_string()).unwrap();
        repo.add_member(conv.clone(), alice.clone()).await;
        repo.add_member(conv.clone(), alice.clone()).await;

        // when (操作):
        let members = repo.conversation_members(&conv).await.unwrap();
        let unknown = repo
            .conversation_members(&ConversationId::new("conv_x".to_string()).unwrap())
            .await
            .unwrap();

        // then (期待する結果):
        assert_eq!(members, vec![alice]);
        assert!(unknown.is_empty());
    }
}
