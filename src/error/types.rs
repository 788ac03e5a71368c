//! # 错误类型定义

use axum::http::StatusCode;
use thiserror::Error;

use crate::instagram::ExchangeStep;

/// 应用主要错误类型
#[derive(Debug, Error)]
pub enum ServiceError {
    /// 配置相关错误（如应用地址格式错误）
    #[error("配置错误: {message}")]
    Config {
        message: String,
        #[source]
        source: Option<anyhow::Error>,
    },

    /// OAuth 回调参数错误（缺少或重复的 code）
    #[error("回调错误: {message}")]
    Callback { message: String },

    /// 令牌交换失败
    #[error("令牌交换失败 [{step}]: {message}")]
    Exchange {
        step: ExchangeStep,
        message: String,
        #[source]
        source: Option<anyhow::Error>,
    },

    /// 凭据存储错误
    #[error("存储错误: {message}")]
    Store {
        message: String,
        #[source]
        source: Option<anyhow::Error>,
    },

    /// 凭据不存在
    #[error("凭据不存在: {username}")]
    NotFound { username: String },

    /// 媒体列表获取失败
    #[error("媒体获取失败: {message}")]
    Fetch {
        message: String,
        #[source]
        source: Option<anyhow::Error>,
    },

    /// API 密钥校验失败
    #[error("未授权: {message}")]
    Unauthorized { message: String },

    /// 请求参数错误
    #[error("请求错误: {message}")]
    BadRequest { message: String },

    /// IO相关错误
    #[error("IO错误: {message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// 序列化/反序列化错误
    #[error("序列化错误: {message}")]
    Serialization {
        message: String,
        #[source]
        source: anyhow::Error,
    },

    /// 服务器启动错误
    #[error("服务器启动错误: {message}")]
    ServerStart {
        message: String,
        #[source]
        source: Option<anyhow::Error>,
    },

    /// 系统内部错误
    #[error("内部错误: {message}")]
    Internal {
        message: String,
        #[source]
        source: Option<anyhow::Error>,
    },
}

impl ServiceError {
    /// 将错误转换为HTTP状态码和错误代码
    ///
    /// 除请求本身不合法（401/400）外，所有失败都以不透明的 500 返回，
    /// 不向调用方暴露上游服务的响应内容。
    #[must_use]
    pub const fn to_http_response_parts(&self) -> (StatusCode, &'static str) {
        match self {
            Self::Unauthorized { .. } => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            Self::BadRequest { .. } => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            Self::Config { .. } => (StatusCode::INTERNAL_SERVER_ERROR, "CONFIG_ERROR"),
            Self::Callback { .. } => (StatusCode::INTERNAL_SERVER_ERROR, "CALLBACK_ERROR"),
            Self::Exchange { .. } => (StatusCode::INTERNAL_SERVER_ERROR, "EXCHANGE_ERROR"),
            Self::Store { .. } => (StatusCode::INTERNAL_SERVER_ERROR, "STORE_ERROR"),
            Self::NotFound { .. } | Self::Fetch { .. } => {
                (StatusCode::INTERNAL_SERVER_ERROR, "FETCH_ERROR")
            }
            Self::Io { .. }
            | Self::Serialization { .. }
            | Self::ServerStart { .. }
            | Self::Internal { .. } => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }

    /// 创建配置错误
    pub fn config<T: Into<String>>(message: T) -> Self {
        Self::Config {
            message: message.into(),
            source: None,
        }
    }

    /// 创建带来源的配置错误
    pub fn config_with_source<T: Into<String>, E: Into<anyhow::Error>>(
        message: T,
        source: E,
    ) -> Self {
        Self::Config {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// 创建回调错误
    pub fn callback<T: Into<String>>(message: T) -> Self {
        Self::Callback {
            message: message.into(),
        }
    }

    /// 创建令牌交换错误
    pub fn exchange<T: Into<String>>(step: ExchangeStep, message: T) -> Self {
        Self::Exchange {
            step,
            message: message.into(),
            source: None,
        }
    }

    /// 创建带来源的令牌交换错误
    pub fn exchange_with_source<T: Into<String>, E: Into<anyhow::Error>>(
        step: ExchangeStep,
        message: T,
        source: E,
    ) -> Self {
        Self::Exchange {
            step,
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// 创建存储错误
    pub fn store<T: Into<String>>(message: T) -> Self {
        Self::Store {
            message: message.into(),
            source: None,
        }
    }

    /// 创建带来源的存储错误
    pub fn store_with_source<T: Into<String>, E: Into<anyhow::Error>>(
        message: T,
        source: E,
    ) -> Self {
        Self::Store {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// 创建凭据不存在错误
    pub fn not_found<T: Into<String>>(username: T) -> Self {
        Self::NotFound {
            username: username.into(),
        }
    }

    /// 创建带来源的媒体获取错误
    pub fn fetch_with_source<T: Into<String>, E: Into<anyhow::Error>>(
        message: T,
        source: E,
    ) -> Self {
        Self::Fetch {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    pub fn unauthorized<T: Into<String>>(message: T) -> Self {
        Self::Unauthorized {
            message: message.into(),
        }
    }

    pub fn bad_request<T: Into<String>>(message: T) -> Self {
        Self::BadRequest {
            message: message.into(),
        }
    }

    /// 创建带来源的服务器启动错误
    pub fn server_start_with_source<T: Into<String>, E: Into<anyhow::Error>>(
        message: T,
        source: E,
    ) -> Self {
        Self::ServerStart {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// 创建内部错误
    pub fn internal<T: Into<String>>(message: T) -> Self {
        Self::Internal {
            message: message.into(),
            source: None,
        }
    }

    /// 令牌交换失败的步骤
    #[must_use]
    pub const fn exchange_step(&self) -> Option<ExchangeStep> {
        match self {
            Self::Exchange { step, .. } => Some(*step),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ServiceError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<toml::de::Error> for ServiceError {
    fn from(err: toml::de::Error) -> Self {
        Self::config_with_source("TOML 配置解析失败", err)
    }
}

impl From<serde_json::Error> for ServiceError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            message: "JSON 序列化失败".to_string(),
            source: err.into(),
        }
    }
}

impl From<redis::RedisError> for ServiceError {
    fn from(err: redis::RedisError) -> Self {
        Self::store_with_source("Redis 操作失败", err)
    }
}

impl From<url::ParseError> for ServiceError {
    fn from(err: url::ParseError) -> Self {
        Self::config_with_source("URL 解析失败", err)
    }
}
