//! Presence Registry の実装
//!
//! - `inmemory`: プロセス内の HashMap による実装（再起動で空に戻る）

pub mod inmemory;

pub use inmemory::InMemoryPresenceRegistry;
