//! PostgreSQL Chat Repository 実装
//!
//! `public.message` と `public.conversation_member` を sqlx で読み書きする。
//! SQL はすべてパラメータバインドで組み立てる。

use std::time::Duration;

use async_trait::async_trait;
use sqlx::{
    PgPool,
    postgres::PgPoolOptions,
    types::Json,
};

use crate::domain::{ChatMessage, ChatRepository, ConversationId, RepositoryError, UserId};

const INSERT_MESSAGE: &str = r#"
    INSERT INTO public.message
        (id, conversation_id, sender_id, body, type, attachments, status, created_at)
    VALUES
        ($1, $2, $3, $4, $5, $6, $7, to_timestamp($8::double precision / 1000.0))
"#;

const SELECT_MEMBERS: &str = r#"
    SELECT memberid FROM public.conversation_member WHERE conversation_id = $1
"#;

/// PostgreSQL Chat Repository 実装
#[derive(Clone)]
pub struct PgChatRepository {
    pool: PgPool,
}

impl PgChatRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// 接続プールを作成して Repository を返す
    pub async fn connect(
        database_url: &str,
        max_connections: u32,
        acquire_timeout: Duration,
    ) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(acquire_timeout)
            .connect(database_url)
            .await?;
        Ok(Self::new(pool))
    }
}

fn database_error(error: sqlx::Error) -> RepositoryError {
    RepositoryError::Database(error.to_string())
}

#[async_trait]
impl ChatRepository for PgChatRepository {
    async fn insert_message(&self, message: &ChatMessage) -> Result<(), RepositoryError> {
        sqlx::query(INSERT_MESSAGE)
            .bind(message.id.as_str())
            .bind(message.conversation_id.as_str())
            .bind(message.sender_id.as_str())
            .bind(message.body.as_deref())
            .bind(message.message_type.as_str())
            .bind(Json(&message.attachments))
            .bind(message.status.as_str())
            .bind(message.created_at.value())
            .execute(&self.pool)
            .await
            .map_err(database_error)?;
        Ok(())
    }

    async fn conversation_members(
        &self,
        conversation_id: &ConversationId,
    ) -> Result<Vec<UserId>, RepositoryError> {
        let rows: Vec<String> = sqlx::query_scalar(SELECT_MEMBERS)
            .bind(conversation_id.as_str())
            .fetch_all(&self.pool)
            .await
            .map_err(database_error)?;

        // 空の memberid は配送対象にならないので読み飛ばす
        Ok(rows
            .into_iter()
            .filter_map(|member| UserId::new(member).ok())
            .collect())
    }
}
