//! UseCase: 接続認証処理（Connection Gatekeeper）
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - AuthenticateConnectionUseCase::execute() メソッド
//! - 資格情報の有無チェック、"Bearer " プレフィックスの除去、復号 → 署名検証の順序
//!
//! ### なぜこのテストが必要か
//! - 認証を通過しない接続は Presence Registry に一切登録してはならない
//! - 失敗段階に関わらず同じエラーを返すことを保証する（情報漏洩の防止）
//!
//! ### どのような状況を想定しているか
//! - 正常系：有効なトークン
//! - 異常系：資格情報なし、復号失敗、署名検証失敗、期限切れ

use std::sync::Arc;

use crate::domain::{CredentialVerifier, Identity};

use super::error::AuthenticationError;

/// 認識するプレフィックス
const BEARER_PREFIX: &str = "Bearer ";

/// 接続認証のユースケース
///
/// 共有状態を一切変更しない。各接続の検証は独立して行われる。
pub struct AuthenticateConnectionUseCase {
    /// CredentialVerifier（復号・署名検証の抽象化）
    verifier: Arc<dyn CredentialVerifier>,
}

impl AuthenticateConnectionUseCase {
    /// 新しい AuthenticateConnectionUseCase を作成
    pub fn new(verifier: Arc<dyn CredentialVerifier>) -> Self {
        Self { verifier }
    }

    /// 接続認証を実行
    ///
    /// # Arguments
    ///
    /// * `credential` - ハンドシェイクで受け取った資格情報（無い場合は `None`）
    ///
    /// # Returns
    ///
    /// * `Ok(Identity)` - 検証済みのユーザー情報
    /// * `Err(AuthenticationError)` - 認証失敗（失敗段階は区別しない）
    pub async fn execute(
        &self,
        credential: Option<&str>,
    ) -> Result<Identity, AuthenticationError> {
        let Some(token) = credential.map(strip_prefix).filter(|t| !t.is_empty()) else {
            tracing::warn!("Connection rejected: no credential supplied");
            return Err(AuthenticationError::Unauthorized);
        };

        // 1. 復号
        let raw_token = self.verifier.decode(token).await.map_err(|e| {
            tracing::warn!("Token decryption failed: {}", e);
            AuthenticationError::Unauthorized
        })?;

        // 2. 署名検証
        let identity = self
            .verifier
            .verify_signature(&raw_token)
            .await
            .map_err(|e| {
                tracing::warn!("JWT verify error: {}", e);
                AuthenticationError::Unauthorized
            })?;

        tracing::debug!("Credential verified for user '{}'", identity.user_id);
        Ok(identity)
    }
}

fn strip_prefix(credential: &str) -> &str {
    let credential = credential.trim();
    credential
        .strip_prefix(BEARER_PREFIX)
        .map(str::trim)
        .unwrap_or(credential)
}
