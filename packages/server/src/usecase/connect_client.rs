//! UseCase: 認証済み接続の登録処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - ConnectClientUseCase::execute() メソッド
//! - MessagePusher と PresenceRegistry の両方への登録
//!
//! ### なぜこのテストが必要か
//! - 認証済みの接続のみがファンアウトの対象になることを保証する
//! - 同一ユーザーの複数接続（複数タブ・複数端末）が共存できることを確認
//!
//! ### どのような状況を想定しているか
//! - 正常系：新規接続
//! - エッジケース：同一ユーザーによる複数接続

use std::sync::Arc;

use crate::domain::{ConnectionId, MessagePusher, PresenceRegistry, PusherChannel, UserId};

/// 接続登録のユースケース
pub struct ConnectClientUseCase {
    /// PresenceRegistry（ユーザー → 接続集合）
    presence: Arc<dyn PresenceRegistry>,
    /// MessagePusher（接続 → 送信チャンネル）
    message_pusher: Arc<dyn MessagePusher>,
}

impl ConnectClientUseCase {
    /// 新しい ConnectClientUseCase を作成
    pub fn new(presence: Arc<dyn PresenceRegistry>, message_pusher: Arc<dyn MessagePusher>) -> Self {
        Self {
            presence,
            message_pusher,
        }
    }

    /// 接続登録を実行
    ///
    /// 送信チャンネルを先に登録してから Presence に載せる。
    /// Presence から引ける接続には必ず送信先が存在する。
    ///
    /// # Arguments
    ///
    /// * `user_id` - 認証済みのユーザー ID
    /// * `sender` - この接続へのメッセージ送信用チャンネル
    ///
    /// # Returns
    ///
    /// 新しく払い出した接続 ID
    pub async fn execute(&self, user_id: UserId, sender: PusherChannel) -> ConnectionId {
        let connection_id = ConnectionId::generate();

        self.message_pusher
            .register_connection(connection_id, sender)
            .await;
        self.presence.register(user_id.clone(), connection_id).await;

        tracing::info!(
            "Connection '{}' admitted for user '{}' ({} users online)",
            connection_id,
            user_id,
            self.presence.online_user_count().await
        );

        connection_id
    }
}
