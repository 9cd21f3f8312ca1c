//! Infrastructure 層
//!
//! ドメイン層が定義する trait の具体的な実装を提供する。

pub mod credential;
pub mod dto;
pub mod message_pusher;
pub mod presence;
pub mod repository;
