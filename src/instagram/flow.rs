//! # 授权流程编排
//!
//! 状态：`Idle → AuthUrlIssued → CallbackReceived → TokenExchanged →
//! IdentityResolved → CredentialPersisted`，任一非终止状态都可能进入
//! `Failed(stage)`。流程本身是线性的，状态只用于日志追踪；两次请求之间
//! 不保存任何内存状态。

use std::fmt;
use std::sync::Arc;

use url::Url;

use super::{Credential, TokenExchangeClient};
use crate::cache::CredentialStore;
use crate::config::InstagramConfig;
use crate::error::{Result, ServiceError};
use crate::logging::{LogComponent, LogStage};
use crate::{ldebug, lerror, linfo};

/// 回调路径
pub const CALLBACK_PATH: &str = "/instagram/auth/callback";

/// feed 路径前缀
pub const FEED_PATH_PREFIX: &str = "/instagram/feed/";

/// 由应用地址拼接回调地址：`{app_url}/instagram/auth/callback`
///
/// `app_url` 必须是带 host 的 http/https 绝对地址，且不含查询串和片段。
/// 校验通过后按原文拼接，不做规范化（默认端口、大小写均保留）。
pub fn build_redirect_uri(app_url: &str) -> Result<String> {
    let app_url = app_url.trim();
    let base = Url::parse(app_url)
        .map_err(|e| ServiceError::config_with_source(format!("应用地址格式错误: {app_url}"), e))?;

    if !matches!(base.scheme(), "http" | "https") || base.host_str().is_none() {
        return Err(ServiceError::config(format!("应用地址必须为 http(s) 绝对地址: {app_url}")));
    }
    if base.query().is_some() || base.fragment().is_some() {
        return Err(ServiceError::config(format!("应用地址不能包含查询串或片段: {app_url}")));
    }

    Ok(format!("{}{CALLBACK_PATH}", app_url.trim_end_matches('/')))
}

/// 从回调查询串中取出唯一的 `code`
///
/// 没有或出现多个 `code` 都视为失败。
pub fn extract_code(raw_query: Option<&str>) -> Result<String> {
    let query = raw_query.unwrap_or_default();
    let mut codes = url::form_urlencoded::parse(query.as_bytes())
        .filter(|(key, _)| key == "code")
        .map(|(_, value)| value.into_owned());

    match (codes.next(), codes.next()) {
        (Some(code), None) => Ok(code),
        (None, _) => Err(ServiceError::callback("回调缺少 code 参数")),
        (Some(_), Some(_)) => Err(ServiceError::callback("回调包含多个 code 参数")),
    }
}

/// 流程失败所处阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowStage {
    AuthUrl,
    Callback,
    Exchange,
    Persist,
}

impl fmt::Display for FlowStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::AuthUrl => "auth_url",
            Self::Callback => "callback",
            Self::Exchange => "exchange",
            Self::Persist => "persist",
        })
    }
}

/// 授权流程状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthFlowState {
    Idle,
    AuthUrlIssued,
    CallbackReceived,
    TokenExchanged,
    IdentityResolved,
    CredentialPersisted,
    Failed(FlowStage),
}

impl AuthFlowState {
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::CredentialPersisted | Self::Failed(_))
    }
}

impl fmt::Display for AuthFlowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => f.write_str("idle"),
            Self::AuthUrlIssued => f.write_str("auth_url_issued"),
            Self::CallbackReceived => f.write_str("callback_received"),
            Self::TokenExchanged => f.write_str("token_exchanged"),
            Self::IdentityResolved => f.write_str("identity_resolved"),
            Self::CredentialPersisted => f.write_str("credential_persisted"),
            Self::Failed(stage) => write!(f, "failed({stage})"),
        }
    }
}

/// 单次请求内的状态跟踪
struct Transitions<'a> {
    request_id: &'a str,
    state: AuthFlowState,
}

impl<'a> Transitions<'a> {
    const fn new(request_id: &'a str, initial: AuthFlowState) -> Self {
        Self {
            request_id,
            state: initial,
        }
    }

    fn advance(&mut self, next: AuthFlowState) {
        ldebug!(
            self.request_id,
            LogStage::Authentication,
            LogComponent::OAuth,
            "state_transition",
            &format!("{} -> {}", self.state, next)
        );
        self.state = next;
    }

    fn fail(&mut self, stage: FlowStage, err: &ServiceError) {
        lerror!(
            self.request_id,
            LogStage::Error,
            LogComponent::OAuth,
            "auth_flow_failed",
            &format!("授权流程失败: state={}, error={err}", self.state)
        );
        self.advance(AuthFlowState::Failed(stage));
    }
}

/// 授权成功结果
#[derive(Debug, Clone)]
pub struct AuthorizedAccount {
    /// 已写入存储的凭据
    pub credential: Credential,
    /// 该账号的 feed 路径
    pub feed_path: String,
}

/// 授权流程编排器
#[derive(Clone)]
pub struct AuthFlow {
    config: Arc<InstagramConfig>,
    exchange: TokenExchangeClient,
    store: Arc<dyn CredentialStore>,
}

impl AuthFlow {
    #[must_use]
    pub fn new(
        config: Arc<InstagramConfig>,
        exchange: TokenExchangeClient,
        store: Arc<dyn CredentialStore>,
    ) -> Self {
        Self {
            config,
            exchange,
            store,
        }
    }

    /// 生成 Instagram 授权地址
    pub fn authorization_url(&self, request_id: &str) -> Result<Url> {
        let mut transitions = Transitions::new(request_id, AuthFlowState::Idle);

        let result = build_redirect_uri(&self.config.app_url).and_then(|redirect_uri| {
            Url::parse_with_params(
                &self.config.authorize_url,
                &[
                    ("client_id", self.config.app_id.as_str()),
                    ("redirect_uri", redirect_uri.as_str()),
                    ("scope", self.config.scope.as_str()),
                    ("response_type", "code"),
                ],
            )
            .map_err(|e| ServiceError::config_with_source("授权地址格式错误", e))
        });

        match &result {
            Ok(_) => transitions.advance(AuthFlowState::AuthUrlIssued),
            Err(e) => transitions.fail(FlowStage::AuthUrl, e),
        }
        result
    }

    /// 处理授权回调：交换令牌、查询用户名并保存凭据
    ///
    /// 任一步失败都不会写入存储。
    pub async fn handle_callback(
        &self,
        request_id: &str,
        raw_query: Option<&str>,
    ) -> Result<AuthorizedAccount> {
        let mut transitions = Transitions::new(request_id, AuthFlowState::AuthUrlIssued);

        let code = extract_code(raw_query).inspect_err(|e| transitions.fail(FlowStage::Callback, e))?;
        transitions.advance(AuthFlowState::CallbackReceived);

        let short_lived = self
            .exchange
            .exchange_code(request_id, &code)
            .await
            .inspect_err(|e| transitions.fail(FlowStage::Exchange, e))?;

        let long_lived = self
            .exchange
            .exchange_long_lived(request_id, &short_lived.access_token)
            .await
            .inspect_err(|e| transitions.fail(FlowStage::Exchange, e))?;
        transitions.advance(AuthFlowState::TokenExchanged);

        let user = self
            .exchange
            .fetch_identity(request_id, &long_lived.access_token)
            .await
            .inspect_err(|e| transitions.fail(FlowStage::Exchange, e))?;
        transitions.advance(AuthFlowState::IdentityResolved);

        let credential = Credential {
            access_token: long_lived.access_token,
            user_name: user.user_name,
            user_id: short_lived.user_id,
        };

        self.store
            .put(&credential.user_name, &credential)
            .await
            .inspect_err(|e| transitions.fail(FlowStage::Persist, e))?;
        transitions.advance(AuthFlowState::CredentialPersisted);

        linfo!(
            request_id,
            LogStage::Authentication,
            LogComponent::OAuth,
            "account_connected",
            &format!(
                "账号已连接: username={}, user_id={}, expires_in={}s",
                credential.user_name, credential.user_id, long_lived.expires_in
            )
        );

        let feed_path = format!("{FEED_PATH_PREFIX}{}", credential.user_name);
        Ok(AuthorizedAccount {
            credential,
            feed_path,
        })
    }
}
