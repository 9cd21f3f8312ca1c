//! Server setup errors.

use thiserror::Error;

/// サーバー起動時のエラー
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to read public key '{path}': {source}")]
    PublicKeyRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid public key: {0}")]
    PublicKey(#[from] jsonwebtoken::errors::Error),

    #[error("database connection failed: {0}")]
    Database(#[from] sqlx::Error),

    #[error("server I/O error: {0}")]
    Io(#[from] std::io::Error),
}
