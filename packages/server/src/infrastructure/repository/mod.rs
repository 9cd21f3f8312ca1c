//! ChatRepository の実装
//!
//! - `inmemory`: プロセス内のメモリに保持する実装（テスト・組み込み用。バイナリは PostgreSQL のみ）
//! - `postgres`: PostgreSQL（sqlx）を使った実装

pub mod inmemory;
pub mod postgres;

pub use inmemory::InMemoryChatRepository;
pub use postgres::PgChatRepository;
