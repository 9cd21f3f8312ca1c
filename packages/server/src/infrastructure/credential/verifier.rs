//! 暗号化 JWT の CredentialVerifier 実装
//!
//! クライアントが持つトークンは「RS256 で署名された JWT を AES-256-CBC で暗号化したもの」。

use async_trait::async_trait;

use crate::domain::{CredentialError, CredentialVerifier, Identity};

use super::{cipher::AesCbcTokenCipher, jwt::Rs256SignatureVerifier};

pub struct EncryptedJwtVerifier {
    cipher: AesCbcTokenCipher,
    signature: Rs256SignatureVerifier,
}

impl EncryptedJwtVerifier {
    pub fn new(cipher: AesCbcTokenCipher, signature: Rs256SignatureVerifier) -> Self {
        Self { cipher, signature }
    }
}

#[async_trait]
impl CredentialVerifier for EncryptedJwtVerifier {
    async fn decode(&self, token: &str) -> Result<String, CredentialError> {
        self.cipher.decrypt(token)
    }

    async fn verify_signature(&self, raw_token: &str) -> Result<Identity, CredentialError> {
        self.signature.verify(raw_token)
    }
}
