//! UseCase 層
//!
//! - `AuthenticateConnectionUseCase`: ハンドシェイク時の認証（Connection Gatekeeper）
//! - `ConnectClientUseCase`: 認証済み接続の登録
//! - `SendMessageUseCase`: メッセージの検証・永続化・配信（Message Pipeline）
//! - `DisconnectConnectionUseCase`: 切断時の後始末（Lifecycle Handler）

mod authenticate_connection;
mod connect_client;
mod disconnect_connection;
mod error;
mod send_message;

pub use authenticate_connection::AuthenticateConnectionUseCase;
pub use connect_client::ConnectClientUseCase;
pub use disconnect_connection::DisconnectConnectionUseCase;
pub use error::{AuthenticationError, DeliveryGap, SendMessageError};
pub use send_message::{SendMessageRequest, SendMessageUseCase};
