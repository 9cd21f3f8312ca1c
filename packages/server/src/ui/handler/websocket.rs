//! WebSocket connection handlers.

use std::sync::Arc;

use axum::{
    extract::{
        Query, State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    http::{HeaderMap, StatusCode, header::AUTHORIZATION},
    response::IntoResponse,
};
use futures_util::{sink::SinkExt, stream::StreamExt};
use serde::Deserialize;
use serde_json::Value;
use tokio::sync::mpsc;

use crate::{
    domain::{ConnectionId, PusherChannel, UserId},
    infrastructure::dto::websocket::{AckEvent, ConnectedEvent, InboundFrame, MessageDto, SendMessagePayload},
    ui::state::AppState,
};

const SEND_MESSAGE_EVENT: &str = "send_message";

/// Query parameters for WebSocket connection
///
/// ブラウザの WebSocket はヘッダーを付けられないため、`token` クエリでも受け付ける。
#[derive(Debug, Default, Deserialize)]
pub struct ConnectQuery {
    pub token: Option<String>,
}

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    Query(query): Query<ConnectQuery>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, StatusCode> {
    let credential = extract_credential(&headers, query.token.as_deref());

    // 認証はアップグレード前に行い、失敗は 401 のみ返す
    let identity = state
        .authenticate_connection_usecase
        .execute(credential)
        .await
        .map_err(|_| StatusCode::UNAUTHORIZED)?;

    tracing::info!("User '{}' authenticated, upgrading connection", identity.user_id);
    Ok(ws.on_upgrade(move |socket| handle_socket(socket, state, identity.user_id)))
}

/// `Authorization` ヘッダーを優先し、無ければクエリの `token` を使う
fn extract_credential<'a>(headers: &'a HeaderMap, query_token: Option<&'a str>) -> Option<&'a str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.trim().is_empty())
        .or(query_token)
}

/// Spawns a task that receives frames from the rx channel and pushes them to the WebSocket sender.
fn pusher_loop(
    mut rx: mpsc::UnboundedReceiver<String>,
    mut sender: futures_util::stream::SplitSink<WebSocket, Message>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sender.send(Message::Text(msg.into())).await.is_err() {
                break;
            }
        }
    })
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>, user_id: UserId) {
    let (sender, mut receiver) = socket.split();
    let (tx, rx) = mpsc::unbounded_channel::<String>();

    let connection_id = state
        .connect_client_usecase
        .execute(user_id.clone(), tx.clone())
        .await;

    // 接続完了の通知
    if !send_connected(&tx, &user_id, connection_id) {
        tracing::warn!("Connection {} closed before greeting", connection_id);
        state
            .disconnect_connection_usecase
            .execute(&user_id, &connection_id)
            .await;
        return;
    }

    let recv_state = state.clone();
    let recv_user_id = user_id.clone();
    let ack_tx = tx;

    // Spawn a task to receive frames from this connection (processed in arrival order)
    let mut recv_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            let msg = match msg {
                Ok(msg) => msg,
                Err(e) => {
                    tracing::warn!("WebSocket error on {}: {}", connection_id, e);
                    break;
                }
            };

            match msg {
                Message::Text(text) => {
                    let Some(ack) = handle_frame(&recv_state, &recv_user_id, text.as_str()).await
                    else {
                        continue;
                    };
                    match serde_json::to_string(&ack) {
                        Ok(json) => {
                            if ack_tx.send(json).is_err() {
                                break;
                            }
                        }
                        Err(e) => tracing::error!("Failed to serialize ack: {}", e),
                    }
                }
                Message::Close(_) => {
                    tracing::info!("Connection {} requested close", connection_id);
                    break;
                }
                _ => {}
            }
        }
    });

    // Spawn a task to push frames (acks and deliveries) to this connection
    let mut send_task = pusher_loop(rx, sender);

    // If any one of the tasks completes, abort the other
    tokio::select! {
        _ = &mut recv_task => send_task.abort(),
        _ = &mut send_task => recv_task.abort(),
    };

    state
        .disconnect_connection_usecase
        .execute(&user_id, &connection_id)
        .await;
}

/// `connected` フレームを送信キューに積む。チャンネルが閉じていれば `false`。
fn send_connected(tx: &PusherChannel, user_id: &UserId, connection_id: ConnectionId) -> bool {
    let connected = ConnectedEvent::new(user_id.to_string(), connection_id.to_string());
    match serde_json::to_string(&connected) {
        Ok(json) => tx.send(json).is_ok(),
        Err(e) => {
            tracing::error!("Failed to serialize connected event: {}", e);
            false
        }
    }
}

/// 受信フレームを 1 件処理し、返すべき ack を組み立てる
///
/// ack id の無いフレームには応答しない。どんな入力でも接続は切らない。
async fn handle_frame(state: &AppState, user_id: &UserId, text: &str) -> Option<AckEvent> {
    let frame = match serde_json::from_str::<InboundFrame>(text) {
        Ok(frame) => frame,
        Err(e) => {
            tracing::warn!("Failed to parse frame from '{}': {}", user_id, e);
            let ack = recover_ack(text)?;
            return Some(AckEvent::failure(Some(ack), "invalid frame"));
        }
    };

    let ack = frame.ack;
    let result = match frame.event.as_str() {
        SEND_MESSAGE_EVENT => send_message(state, user_id, frame.data).await,
        other => {
            tracing::warn!("Unknown event '{}' from '{}'", other, user_id);
            Err(format!("unknown event '{}'", other))
        }
    };

    // ack id が無いイベントは処理だけ行う
    ack?;
    Some(match result {
        Ok(dto) => AckEvent::success(ack, dto),
        Err(reason) => AckEvent::failure(ack, reason),
    })
}

async fn send_message(state: &AppState, user_id: &UserId, data: Value) -> Result<MessageDto, String> {
    let payload = serde_json::from_value::<SendMessagePayload>(data).map_err(|e| {
        tracing::warn!("Invalid send_message payload from '{}': {}", user_id, e);
        format!("invalid payload: {}", e)
    })?;

    state
        .send_message_usecase
        .execute(user_id.clone(), payload.into())
        .await
        .map(MessageDto::from)
        .map_err(|e| e.to_string())
}

/// パースできなかったフレームから ack id だけでも取り出す
fn recover_ack(text: &str) -> Option<u64> {
    serde_json::from_str::<Value>(text)
        .ok()?
        .get("ack")
        .and_then(Value::as_u64)
}
