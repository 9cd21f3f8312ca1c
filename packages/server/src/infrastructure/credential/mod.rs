//! 資格情報検証の実装
//!
//! - `cipher`: AES-256-CBC によるトークンの暗号化・復号
//! - `jwt`: RS256 署名の検証
//! - `verifier`: 両者を組み合わせた `CredentialVerifier` 実装

pub mod cipher;
pub mod jwt;
pub mod verifier;

pub use cipher::AesCbcTokenCipher;
pub use jwt::Rs256SignatureVerifier;
pub use verifier::EncryptedJwtVerifier;
