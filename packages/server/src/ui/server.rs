//! Server execution logic.

use std::{future::Future, sync::Arc};

use axum::{Router, routing::get};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::usecase::{
    AuthenticateConnectionUseCase, ConnectClientUseCase, DisconnectConnectionUseCase,
    SendMessageUseCase,
};

use super::{error::ServerError, handler::websocket_handler, signal::shutdown_signal, state::AppState};

/// WebSocket messaging server
///
/// # Example
///
/// ```ignore
/// let server = Server::new(
///     authenticate_connection_usecase,
///     connect_client_usecase,
///     send_message_usecase,
///     disconnect_connection_usecase,
/// );
/// server.run("127.0.0.1".to_string(), 1789).await?;
/// ```
pub struct Server {
    state: Arc<AppState>,
}

impl Server {
    pub fn new(
        authenticate_connection_usecase: Arc<AuthenticateConnectionUseCase>,
        connect_client_usecase: Arc<ConnectClientUseCase>,
        send_message_usecase: Arc<SendMessageUseCase>,
        disconnect_connection_usecase: Arc<DisconnectConnectionUseCase>,
    ) -> Self {
        Self {
            state: Arc::new(AppState {
                authenticate_connection_usecase,
                connect_client_usecase,
                send_message_usecase,
                disconnect_connection_usecase,
            }),
        }
    }

    /// ルーティングを組み立てる
    pub fn router(&self) -> Router {
        Router::new()
            // WebSocket エンドポイント
            .route("/ws", get(websocket_handler))
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    /// Run the server until Ctrl+C / SIGTERM
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails to bind to the specified address or
    /// if there's an error during server execution.
    pub async fn run(self, host: String, port: u16) -> Result<(), ServerError> {
        let bind_addr = format!("{}:{}", host, port);
        let listener = TcpListener::bind(&bind_addr).await?;

        tracing::info!("Messaging server listening on {}", listener.local_addr()?);
        tracing::info!("Connect to: ws://{}/ws", bind_addr);

        self.serve(listener, shutdown_signal()).await?;

        tracing::info!("Server shutdown complete");
        Ok(())
    }

    /// 既にバインド済みのリスナーで待ち受ける（テストではポート 0 を渡す）
    pub async fn serve<F>(self, listener: TcpListener, shutdown: F) -> Result<(), ServerError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown)
            .await?;
        Ok(())
    }
}
