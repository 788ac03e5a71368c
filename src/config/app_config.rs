//! # 应用配置结构定义

use serde::{Deserialize, Serialize};

/// 应用主配置结构
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP 服务配置
    #[serde(default)]
    pub server: ServerConfig,
    /// 凭据存储配置
    #[serde(default)]
    pub store: StoreConfig,
    /// Instagram 应用配置
    #[serde(default)]
    pub instagram: InstagramConfig,
}

/// HTTP 服务配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// 监听地址
    pub bind_address: String,
    /// 监听端口
    pub port: u16,
    /// 访问 API 所需的共享密钥
    pub api_key: String,
    /// 是否启用CORS
    pub enable_cors: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            port: 8080,
            api_key: String::new(),
            enable_cors: true,
        }
    }
}

/// 存储类型
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreType {
    /// Redis存储
    #[default]
    Redis,
    /// 内存存储（进程重启后丢失）
    Memory,
}

/// 凭据存储配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// 存储类型
    pub store_type: StoreType,
    /// Redis 配置
    pub redis: RedisConfig,
}

/// Redis配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RedisConfig {
    /// Redis连接URL
    pub url: String,
    /// 连接超时时间（秒）
    pub connection_timeout: u64,
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            url: "redis://127.0.0.1:6379/0".to_string(),
            connection_timeout: 10,
        }
    }
}

/// Instagram 应用配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InstagramConfig {
    /// 应用ID（OAuth client_id）
    pub app_id: String,
    /// 应用密钥（OAuth client_secret）
    pub app_secret: String,
    /// 本服务的外部访问地址，用于拼接回调地址
    pub app_url: String,
    /// 授权作用域
    pub scope: String,
    /// 授权页面地址
    pub authorize_url: String,
    /// 短期令牌交换地址
    pub token_url: String,
    /// Graph API 根地址
    pub graph_url: String,
    /// 用户信息接口版本
    pub me_version: String,
    /// 媒体列表接口版本
    pub media_version: String,
    /// 上游请求超时（秒），未设置时使用 HTTP 客户端默认行为
    pub request_timeout: Option<u64>,
}

impl Default for InstagramConfig {
    fn default() -> Self {
        Self {
            app_id: String::new(),
            app_secret: String::new(),
            app_url: String::new(),
            scope: "user_profile,user_media".to_string(),
            authorize_url: "https://api.instagram.com/oauth/authorize".to_string(),
            token_url: "https://api.instagram.com/oauth/access_token".to_string(),
            graph_url: "https://graph.instagram.com".to_string(),
            me_version: "v19.0".to_string(),
            media_version: "v11.0".to_string(),
            request_timeout: None,
        }
    }
}

impl InstagramConfig {
    /// 长期令牌交换地址
    #[must_use]
    pub fn long_lived_token_url(&self) -> String {
        format!("{}/access_token", self.graph_url.trim_end_matches('/'))
    }

    /// 当前用户信息地址
    #[must_use]
    pub fn me_url(&self) -> String {
        format!("{}/{}/me", self.graph_url.trim_end_matches('/'), self.me_version)
    }

    /// 指定用户的媒体列表地址
    #[must_use]
    pub fn media_url(&self, user_id: i64) -> String {
        format!(
            "{}/{}/{user_id}/media",
            self.graph_url.trim_end_matches('/'),
            self.media_version
        )
    }
}

impl AppConfig {
    /// 验证配置的有效性
    pub fn validate(&self) -> crate::error::Result<()> {
        crate::ensure_config!(self.server.port != 0, "无效的服务器端口: {}", self.server.port);
        crate::ensure_config!(!self.server.api_key.is_empty(), "API_KEY 不能为空");
        crate::ensure_config!(!self.instagram.app_id.is_empty(), "INSTAGRAM_APP_ID 不能为空");
        crate::ensure_config!(!self.instagram.app_secret.is_empty(), "INSTAGRAM_SECRET 不能为空");

        crate::instagram::flow::build_redirect_uri(&self.instagram.app_url)?;

        if self.store.store_type == StoreType::Redis {
            crate::ensure_config!(!self.store.redis.url.is_empty(), "Redis URL不能为空");
        }

        Ok(())
    }
}
