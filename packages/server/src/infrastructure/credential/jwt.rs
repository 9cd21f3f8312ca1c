//! RS256 signature verification.

use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode, errors::ErrorKind};
use serde_json::{Map, Value};

use crate::domain::{CredentialError, Identity, UserId};

/// Claim names that may carry the user identifier, in lookup order.
const USER_ID_CLAIMS: [&str; 2] = ["id", "sub"];

/// Verifies tokens against a single RSA public key. Only RS256 is accepted.
pub struct Rs256SignatureVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl Rs256SignatureVerifier {
    /// Build a verifier from a PEM encoded RSA public key.
    pub fn from_pem(pem: &[u8]) -> Result<Self, jsonwebtoken::errors::Error> {
        let key = DecodingKey::from_rsa_pem(pem)?;
        let mut validation = Validation::new(Algorithm::RS256);
        validation.validate_aud = false;
        Ok(Self { key, validation })
    }

    pub fn verify(&self, raw_token: &str) -> Result<Identity, CredentialError> {
        let data =
            decode::<Map<String, Value>>(raw_token, &self.key, &self.validation).map_err(|e| {
                match e.kind() {
                    ErrorKind::ExpiredSignature => CredentialError::Expired,
                    _ => CredentialError::Verification(e.to_string()),
                }
            })?;

        let user_id = user_id_from_claims(&data.claims).ok_or(CredentialError::MissingIdentity)?;

        Ok(Identity {
            user_id,
            claims: data.claims,
        })
    }
}

fn user_id_from_claims(claims: &Map<String, Value>) -> Option<UserId> {
    USER_ID_CLAIMS
        .iter()
        .filter_map(|name| match claims.get(*name)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
        .find_map(|raw| UserId::new(raw).ok())
}
