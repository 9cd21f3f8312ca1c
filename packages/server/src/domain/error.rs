//! ドメイン層のエラー定義

use thiserror::Error;

/// Value Object の生成エラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueObjectError {
    #[error("user id must not be empty")]
    EmptyUserId,

    #[error("conversation id must not be empty")]
    EmptyConversationId,

    #[error("message type must not be empty")]
    EmptyMessageType,

    #[error("message must have a body or at least one attachment")]
    EmptyMessage,
}

/// 資格情報の検証エラー
///
/// どの段階で失敗したかはサーバー側のログにのみ残し、クライアントには
/// `AuthenticationError` として一律に返す。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CredentialError {
    #[error("token decode failed: {0}")]
    Decode(String),

    #[error("signature verification failed: {0}")]
    Verification(String),

    #[error("token expired")]
    Expired,

    #[error("token carries no user identity")]
    MissingIdentity,
}

/// Repository（永続化サービス）のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(String),

    #[error("persistence call timed out")]
    Timeout,
}

/// MessagePusher のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MessagePushError {
    #[error("failed to encode message: {0}")]
    Encode(String),
}
