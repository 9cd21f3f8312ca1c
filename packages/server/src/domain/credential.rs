//! 資格情報検証のインターフェース
//!
//! ハンドシェイクで受け取ったトークンは「復号」→「署名検証」の順に処理する。
//! 具体的なアルゴリズム（AES-CBC, RS256）は Infrastructure 層が提供する。

use async_trait::async_trait;
use serde_json::{Map, Value};

use super::{error::CredentialError, value_object::UserId};

/// 検証済みのセッション情報
#[derive(Debug, Clone, PartialEq)]
pub struct Identity {
    pub user_id: UserId,
    /// 署名検証済みのクレーム全体
    pub claims: Map<String, Value>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CredentialVerifier: Send + Sync {
    /// 暗号化されたトークンを復号し、署名付きトークンを取り出す
    async fn decode(&self, token: &str) -> Result<String, CredentialError>;

    /// 署名付きトークンを公開鍵で検証し、ユーザー識別子を取り出す
    async fn verify_signature(&self, raw_token: &str) -> Result<Identity, CredentialError>;
}
