//! # Instagram 接入模块
//!
//! OAuth 授权码交换、账号凭据以及媒体列表获取。
//!
//! ## 流程
//! 1. 生成授权地址，用户在 Instagram 完成授权
//! 2. Instagram 携带 `code` 回调本服务
//! 3. `code` → 短期令牌 → 长期令牌 → 用户名
//! 4. 凭据写入存储，重定向到该账号的 feed
//!
//! 授权地址签发与回调之间不保存任何本地会话，依赖 Instagram 对
//! `redirect_uri` 的严格匹配。

pub mod feed;
pub mod flow;
mod remote;
pub mod token_exchange;

pub use feed::{FEED_PAGE_SIZE, FeedClient, FeedService, MEDIA_FIELDS, truncate_feed};
pub use flow::{AuthFlow, AuthFlowState, AuthorizedAccount, FlowStage};
pub use token_exchange::{InstagramUser, LongLivedToken, ShortLivedToken, TokenExchangeClient};

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::InstagramConfig;
use crate::error::{Result, ServiceError};

/// 已授权账号的凭据
///
/// 存储格式：`{"access_token": .., "username": .., "user_id": ..}`
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    /// 长期访问令牌
    pub access_token: String,
    /// Instagram 用户名，同时作为存储键
    #[serde(rename = "username")]
    pub user_name: String,
    /// Instagram 内部数字ID
    pub user_id: i64,
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("access_token", &"***")
            .field("user_name", &self.user_name)
            .field("user_id", &self.user_id)
            .finish()
    }
}

/// feed 中的单条媒体
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaItem {
    pub id: String,
    #[serde(default)]
    pub media_url: String,
    #[serde(default)]
    pub timestamp: String,
    #[serde(default)]
    pub thumbnail_url: String,
    #[serde(default)]
    pub caption: String,
    #[serde(default)]
    pub permalink: String,
}

/// 令牌交换步骤
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExchangeStep {
    /// 授权码换取短期令牌
    ShortLivedToken,
    /// 短期令牌换取长期令牌
    LongLivedToken,
    /// 查询用户名
    Identity,
}

impl ExchangeStep {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::ShortLivedToken => "short_lived_token",
            Self::LongLivedToken => "long_lived_token",
            Self::Identity => "identity",
        }
    }
}

impl fmt::Display for ExchangeStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 构建访问 Instagram 的 HTTP 客户端
///
/// 未配置超时时沿用 reqwest 默认行为（不设总超时）。
pub fn build_http_client(config: &InstagramConfig) -> Result<reqwest::Client> {
    let mut builder =
        reqwest::Client::builder().user_agent(concat!("social-feed/", env!("CARGO_PKG_VERSION")));
    if let Some(secs) = config.request_timeout {
        builder = builder.timeout(Duration::from_secs(secs));
    }
    builder
        .build()
        .map_err(|e| ServiceError::config_with_source("创建 HTTP 客户端失败", e))
}
