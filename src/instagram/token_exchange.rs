//! # Token交换逻辑
//!
//! 授权码 → 短期令牌 → 长期令牌 → 用户名，三次调用顺序执行，
//! 任一步失败立即返回，不做重试。

use std::fmt;
use std::sync::Arc;

use serde::Deserialize;

use super::ExchangeStep;
use super::flow::build_redirect_uri;
use super::remote::{RemoteError, send_json};
use crate::config::InstagramConfig;
use crate::error::{Result, ServiceError};
use crate::ldebug;
use crate::logging::{LogComponent, LogStage};

/// 短期令牌响应（约 1 小时有效）
#[derive(Clone, Deserialize)]
pub struct ShortLivedToken {
    pub access_token: String,
    pub user_id: i64,
}

impl fmt::Debug for ShortLivedToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShortLivedToken")
            .field("access_token", &"***")
            .field("user_id", &self.user_id)
            .finish()
    }
}

/// 长期令牌响应（约 60 天有效）
#[derive(Clone, Deserialize)]
pub struct LongLivedToken {
    pub access_token: String,
    #[serde(default)]
    pub token_type: String,
    /// 有效期（秒）
    #[serde(default)]
    pub expires_in: i64,
}

impl fmt::Debug for LongLivedToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LongLivedToken")
            .field("access_token", &"***")
            .field("token_type", &self.token_type)
            .field("expires_in", &self.expires_in)
            .finish()
    }
}

/// `me` 接口返回的用户信息
#[derive(Debug, Clone, Deserialize)]
pub struct InstagramUser {
    #[serde(rename = "username")]
    pub user_name: String,
}

/// Token交换客户端
#[derive(Clone)]
pub struct TokenExchangeClient {
    http_client: reqwest::Client,
    config: Arc<InstagramConfig>,
}

impl TokenExchangeClient {
    #[must_use]
    pub const fn new(http_client: reqwest::Client, config: Arc<InstagramConfig>) -> Self {
        Self {
            http_client,
            config,
        }
    }

    /// 授权码换取短期令牌
    ///
    /// `redirect_uri` 必须与生成授权地址时完全一致，否则 Instagram 拒绝交换。
    pub async fn exchange_code(&self, request_id: &str, code: &str) -> Result<ShortLivedToken> {
        let step = ExchangeStep::ShortLivedToken;
        let redirect_uri = build_redirect_uri(&self.config.app_url)?;

        let form_params = [
            ("client_id", self.config.app_id.as_str()),
            ("client_secret", self.config.app_secret.as_str()),
            ("grant_type", "authorization_code"),
            ("redirect_uri", redirect_uri.as_str()),
            ("code", code),
        ];

        log_request(request_id, step);
        let request = self
            .http_client
            .post(&self.config.token_url)
            .header("Accept", "application/json")
            .form(&form_params);

        send_json::<ShortLivedToken>(request)
            .await
            .map_err(|e| exchange_error(step, e))
    }

    /// 短期令牌换取长期令牌
    pub async fn exchange_long_lived(
        &self,
        request_id: &str,
        short_lived_token: &str,
    ) -> Result<LongLivedToken> {
        let step = ExchangeStep::LongLivedToken;
        let query = [
            ("grant_type", "ig_exchange_token"),
            ("client_secret", self.config.app_secret.as_str()),
            ("access_token", short_lived_token),
        ];

        log_request(request_id, step);
        let request = self
            .http_client
            .get(self.config.long_lived_token_url())
            .query(&query);

        send_json::<LongLivedToken>(request)
            .await
            .map_err(|e| exchange_error(step, e))
    }

    /// 使用长期令牌查询用户名
    pub async fn fetch_identity(
        &self,
        request_id: &str,
        long_lived_token: &str,
    ) -> Result<InstagramUser> {
        let step = ExchangeStep::Identity;
        let query = [("fields", "username"), ("access_token", long_lived_token)];

        log_request(request_id, step);
        let request = self.http_client.get(self.config.me_url()).query(&query);

        send_json::<InstagramUser>(request)
            .await
            .map_err(|e| exchange_error(step, e))
    }
}

fn log_request(request_id: &str, step: ExchangeStep) {
    ldebug!(
        request_id,
        LogStage::ExternalApi,
        LogComponent::TokenExchange,
        "exchange_request",
        &format!("发送令牌交换请求: step={step}")
    );
}

fn exchange_error(step: ExchangeStep, err: RemoteError) -> ServiceError {
    let message = match &err {
        RemoteError::Transport(_) => "请求发送失败",
        RemoteError::Status(_) => "上游返回非成功状态",
        RemoteError::Decode(_) => "响应格式错误",
    };
    ServiceError::exchange_with_source(step, message, err)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_lived_token_parsing() {
        let json = r#"{"access_token": "IGQVJ...", "user_id": 17841400000000000}"#;
        let token: ShortLivedToken = serde_json::from_str(json).unwrap();
        assert_eq!(token.user_id, 17_841_400_000_000_000);
        assert!(!format!("{token:?}").contains("IGQVJ"));
    }

    #[test]
    fn test_long_lived_token_parsing() {
        let json = r#"{"access_token": "long", "token_type": "bearer", "expires_in": 5183944}"#;
        let token: LongLivedToken = serde_json::from_str(json).unwrap();
        assert_eq!(token.access_token, "long");
        assert_eq!(token.token_type, "bearer");
        assert_eq!(token.expires_in, 5_183_944);
    }

    #[test]
    fn test_error_body_is_not_a_token() {
        let json = r#"{"error_type": "OAuthException", "code": 400, "error_message": "Invalid code"}"#;
        assert!(serde_json::from_str::<ShortLivedToken>(json).is_err());
    }

    #[test]
    fn test_exchange_error_message_is_generic() {
        let decode = serde_json::from_str::<InstagramUser>("{}").unwrap_err();
        let err = exchange_error(ExchangeStep::Identity, RemoteError::Decode(decode));
        assert_eq!(err.exchange_step(), Some(ExchangeStep::Identity));
        assert_eq!(err.to_string(), "令牌交换失败 [identity]: 响应格式错误");
    }
}
