//! Repository trait 定義
//!
//! 永続化サービスへのインターフェース。UseCase 層はこの trait に依存し、
//! PostgreSQL などの具体的な実装には依存しない（依存性の逆転）。

use async_trait::async_trait;

use super::{
    entity::ChatMessage,
    error::RepositoryError,
    value_object::{ConversationId, UserId},
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChatRepository: Send + Sync {
    /// メッセージを 1 件保存する
    async fn insert_message(&self, message: &ChatMessage) -> Result<(), RepositoryError>;

    /// 会話のメンバー一覧を取得する
    async fn conversation_members(
        &self,
        conversation_id: &ConversationId,
    ) -> Result<Vec<UserId>, RepositoryError>;
}
