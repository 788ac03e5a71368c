//! # Social Feed Library
//!
//! Instagram 账号授权与最近媒体列表服务核心库：
//! OAuth 授权码交换长期令牌、按用户名保存凭据、代理获取最近 12 条媒体。

pub mod app;
pub mod cache;
pub mod config;
pub mod error;
pub mod instagram;
pub mod logging;
pub mod server;

// Re-export commonly used types
pub use config::AppConfig;
pub use error::{Result, ServiceError};
