//! UseCase 層のエラー定義

use thiserror::Error;

use crate::domain::{MessagePushError, RepositoryError};

/// 接続認証のエラー
///
/// 復号失敗・署名不一致・期限切れのいずれもこの 1 種類で返し、
/// どの段階で失敗したかをクライアントに漏らさない。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthenticationError {
    #[error("Authentication error")]
    Unauthorized,
}

/// メッセージ送信のエラー
///
/// どちらも ack としてクライアントに返され、接続は維持される。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SendMessageError {
    /// リクエストの内容が不正
    #[error("invalid payload: {0}")]
    InvalidPayload(String),

    /// 永続化に失敗（詳細はサーバーログのみ）
    #[error("failed to send message")]
    PersistenceFailure,
}

/// 永続化成功後の配信欠落
///
/// 書き込み自体は成功しているため送信者にはエラーとして返さず、警告ログのみ残す。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeliveryGap {
    #[error("membership lookup failed: {0}")]
    Membership(RepositoryError),

    #[error("fan-out failed: {0}")]
    Push(MessagePushError),
}
