//! AES-256-CBC token cipher.
//!
//! Tokens travel as `base64(iv):base64(ciphertext)`. The key is the SHA-256
//! digest of the configured secret, and the plaintext is PKCS#7 padded.

use aes::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit, block_padding::Pkcs7};
use base64::{Engine as _, engine::general_purpose::STANDARD};
use sha2::{Digest, Sha256};

use crate::domain::CredentialError;

type Aes256CbcEnc = cbc::Encryptor<aes::Aes256>;
type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;

const IV_LEN: usize = 16;

pub struct AesCbcTokenCipher {
    key: [u8; 32],
}

impl AesCbcTokenCipher {
    /// Secret used by deployments that never configured one.
    pub const LEGACY_DEFAULT_SECRET: &'static str = "default_change_this";

    pub fn new(secret: &str) -> Self {
        Self {
            key: Sha256::digest(secret.as_bytes()).into(),
        }
    }

    /// Encrypt `plain_text` under a fresh random IV.
    pub fn encrypt(&self, plain_text: &str) -> String {
        let iv: [u8; IV_LEN] = rand::random();
        let cipher_text = Aes256CbcEnc::new(&self.key.into(), &iv.into())
            .encrypt_padded_vec_mut::<Pkcs7>(plain_text.as_bytes());
        format!("{}:{}", STANDARD.encode(iv), STANDARD.encode(cipher_text))
    }

    pub fn decrypt(&self, token: &str) -> Result<String, CredentialError> {
        let parts: Vec<&str> = token.split(':').collect();
        let [iv_part, data_part] = parts.as_slice() else {
            return Err(CredentialError::Decode("invalid encrypted data".to_string()));
        };

        let iv = STANDARD
            .decode(iv_part)
            .map_err(|e| CredentialError::Decode(format!("iv: {}", e)))?;
        let data = STANDARD
            .decode(data_part)
            .map_err(|e| CredentialError::Decode(format!("ciphertext: {}", e)))?;

        let plain = Aes256CbcDec::new_from_slices(&self.key, &iv)
            .map_err(|_| CredentialError::Decode(format!("iv must be {} bytes", IV_LEN)))?
            .decrypt_padded_vec_mut::<Pkcs7>(&data)
            .map_err(|_| CredentialError::Decode("bad decrypt".to_string()))?;

        String::from_utf8(plain).map_err(|_| CredentialError::Decode("not utf-8".to_string()))
    }
}
