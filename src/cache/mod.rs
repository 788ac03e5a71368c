//! # 缓存模块
//!
//! Redis 客户端、缓存键规范和账号凭据存储

pub mod client;
pub mod credential_store;
pub mod keys;

pub use client::CacheClient;
pub use credential_store::{CredentialStore, MemoryCredentialStore, RedisCredentialStore};
pub use keys::CacheKey;
