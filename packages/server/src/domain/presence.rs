//! Presence Registry のインターフェース
//!
//! ユーザー ID から現在接続中の接続 ID 集合を引く。
//! インメモリ実装の他、共有キャッシュ等に差し替えられるよう trait として定義する。

use async_trait::async_trait;

use super::value_object::{ConnectionId, UserId};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PresenceRegistry: Send + Sync {
    /// 接続を登録する（同じ組の二重登録は冪等）
    async fn register(&self, user_id: UserId, connection_id: ConnectionId);

    /// 接続を削除する。集合が空になったユーザーのエントリは削除する。
    /// 未登録の組に対しては何もしない。
    async fn unregister(&self, user_id: &UserId, connection_id: &ConnectionId);

    /// ユーザーの接続 ID 一覧（スナップショット）。オフラインなら空。
    async fn connections_for(&self, user_id: &UserId) -> Vec<ConnectionId>;

    /// オンラインのユーザー数
    async fn online_user_count(&self) -> usize;
}
