//! Server state shared by every connection.

use std::sync::Arc;

use crate::usecase::{
    AuthenticateConnectionUseCase, ConnectClientUseCase, DisconnectConnectionUseCase,
    SendMessageUseCase,
};

/// Shared application state
pub struct AppState {
    /// AuthenticateConnectionUseCase（ハンドシェイク時の認証）
    pub authenticate_connection_usecase: Arc<AuthenticateConnectionUseCase>,
    /// ConnectClientUseCase（接続の登録）
    pub connect_client_usecase: Arc<ConnectClientUseCase>,
    /// SendMessageUseCase（メッセージ送信）
    pub send_message_usecase: Arc<SendMessageUseCase>,
    /// DisconnectConnectionUseCase（切断時の後始末）
    pub disconnect_connection_usecase: Arc<DisconnectConnectionUseCase>,
}
