//! Real-time messaging server for the Bazaar marketplace.
//!
//! Authenticates WebSocket connections with an encrypted RS256 JWT, tracks
//! presence per user and fans out chat messages to every online member of a
//! conversation.
//!
//! Run with:
//! ```not_rust
//! DATABASE_URL=postgres://localhost/bazaar cargo run --bin bazaar-server
//! cargo run --bin bazaar-server -- --host 0.0.0.0 --port 1789 --database-url postgres://localhost/bazaar
//! ```

use std::{sync::Arc, time::Duration};

use bazaar_server::{
    infrastructure::{
        credential::{AesCbcTokenCipher, EncryptedJwtVerifier, Rs256SignatureVerifier},
        message_pusher::WebSocketMessagePusher,
        presence::InMemoryPresenceRegistry,
        repository::PgChatRepository,
    },
    ui::{Server, ServerError},
    usecase::{
        AuthenticateConnectionUseCase, ConnectClientUseCase, DisconnectConnectionUseCase,
        SendMessageUseCase,
    },
};
use bazaar_shared::logger::setup_logger;
use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "bazaar-server")]
#[command(about = "Real-time messaging and presence server", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, env = "HOST", default_value = "127.0.0.1")]
    host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, env = "APPPORT", default_value = "1789")]
    port: u16,

    /// PEM file holding the RS256 public key used to verify tokens
    #[arg(long, env = "JWT_PUBLIC_KEY_PATH", default_value = "key/public.key")]
    public_key: String,

    /// Secret the AES-256-CBC token key is derived from (falls back to JWT_SECRET)
    #[arg(long, env = "CRYPTO_SECRET")]
    crypto_secret: Option<String>,

    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL")]
    database_url: String,

    /// Maximum number of pooled database connections
    #[arg(long, env = "DB_MAX_CONNECTIONS", default_value = "100")]
    db_max_connections: u32,

    /// Seconds to wait for a pooled database connection
    #[arg(long, env = "DB_ACQUIRE_TIMEOUT_SECS", default_value = "90")]
    db_acquire_timeout_secs: u64,

    /// Upper bound for a single store call, in milliseconds
    #[arg(long, env = "STORE_TIMEOUT_MS", default_value = "5000")]
    store_timeout_ms: u64,

    /// Default log level (overridden by RUST_LOG)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), &args.log_level);

    if let Err(e) = run(args).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<(), ServerError> {
    // Initialize dependencies in order:
    // 1. CredentialVerifier
    // 2. Repository
    // 3. PresenceRegistry / MessagePusher
    // 4. UseCases
    // 5. Server

    // 1. Create CredentialVerifier (AES-256-CBC + RS256)
    let pem = tokio::fs::read(&args.public_key)
        .await
        .map_err(|source| ServerError::PublicKeyRead {
            path: args.public_key.clone(),
            source,
        })?;
    let signature = Rs256SignatureVerifier::from_pem(&pem)?;
    let cipher = AesCbcTokenCipher::new(&crypto_secret(args.crypto_secret));
    let verifier = Arc::new(EncryptedJwtVerifier::new(cipher, signature));

    // 2. Create Repository (PostgreSQL)
    let repository = Arc::new(
        PgChatRepository::connect(
            &args.database_url,
            args.db_max_connections,
            Duration::from_secs(args.db_acquire_timeout_secs),
        )
        .await?,
    );
    tracing::info!("Connected to PostgreSQL");

    // 3. Create PresenceRegistry and MessagePusher
    let presence = Arc::new(InMemoryPresenceRegistry::new());
    let message_pusher = Arc::new(WebSocketMessagePusher::new());

    // 4. Create UseCases
    let authenticate_connection_usecase = Arc::new(AuthenticateConnectionUseCase::new(verifier));
    let connect_client_usecase = Arc::new(ConnectClientUseCase::new(
        presence.clone(),
        message_pusher.clone(),
    ));
    let send_message_usecase = Arc::new(
        SendMessageUseCase::new(repository, presence.clone(), message_pusher.clone())
            .with_store_timeout(Duration::from_millis(args.store_timeout_ms)),
    );
    let disconnect_connection_usecase = Arc::new(DisconnectConnectionUseCase::new(
        presence,
        message_pusher,
    ));

    // 5. Create and run the server
    let server = Server::new(
        authenticate_connection_usecase,
        connect_client_usecase,
        send_message_usecase,
        disconnect_connection_usecase,
    );
    server.run(args.host, args.port).await
}

/// CRYPTO_SECRET → JWT_SECRET → 旧来の既定値 の順で鍵の元を決める
fn crypto_secret(configured: Option<String>) -> String {
    if let Some(secret) = configured.filter(|s| !s.is_empty()) {
        return secret;
    }
    if let Ok(secret) = std::env::var("JWT_SECRET")
        && !secret.is_empty()
    {
        return secret;
    }
    tracing::warn!("CRYPTO_SECRET is not set, using the built-in default secret");
    AesCbcTokenCipher::LEGACY_DEFAULT_SECRET.to_string()
}
