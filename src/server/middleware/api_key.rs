//! # API 密钥中间件
//!
//! 校验查询参数 `api_key`。Instagram 授权回调由第三方重定向发起，
//! 无法携带密钥，因此与健康检查一起放行。

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use subtle::ConstantTimeEq;

use super::RequestId;
use crate::error::ServiceError;
use crate::instagram::flow::CALLBACK_PATH;
use crate::logging::{LogComponent, LogStage};
use crate::lwarn;
use crate::server::AppState;

/// 查询参数名
pub const API_KEY_PARAM: &str = "api_key";

/// 免校验路径
#[must_use]
pub fn is_public_path(path: &str) -> bool {
    matches!(path, CALLBACK_PATH | "/ping")
}

/// 从查询串中取出 `api_key`
fn api_key_from_query(query: Option<&str>) -> Option<String> {
    url::form_urlencoded::parse(query.unwrap_or_default().as_bytes())
        .find(|(key, _)| key == API_KEY_PARAM)
        .map(|(_, value)| value.into_owned())
}

/// 常量时间比较，耗时与首个差异位置无关
fn keys_match(provided: &str, expected: &str) -> bool {
    provided.as_bytes().ct_eq(expected.as_bytes()).into()
}

/// API 密钥中间件
pub async fn api_key_middleware(State(state): State<AppState>, request: Request, next: Next) -> Response {
    if is_public_path(request.uri().path()) {
        return next.run(request).await;
    }

    let provided = api_key_from_query(request.uri().query());
    let authorized = provided
        .as_deref()
        .is_some_and(|key| keys_match(key, &state.config.server.api_key));

    if authorized {
        return next.run(request).await;
    }

    let request_id = request
        .extensions()
        .get::<RequestId>()
        .map_or("unknown", RequestId::as_str);
    lwarn!(
        request_id,
        LogStage::Authentication,
        LogComponent::Middleware,
        "api_key_rejected",
        &format!(
            "API 密钥校验失败: path={}, provided={}",
            request.uri().path(),
            provided.is_some()
        )
    );

    ServiceError::unauthorized("API 密钥无效").into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_key_from_query() {
        assert_eq!(api_key_from_query(Some("api_key=abc")).as_deref(), Some("abc"));
        assert_eq!(
            api_key_from_query(Some("x=1&api_key=a%2Bb")).as_deref(),
            Some("a+b")
        );
        assert_eq!(api_key_from_query(Some("key=abc")), None);
        assert_eq!(api_key_from_query(None), None);
    }

    #[test]
    fn test_keys_match() {
        assert!(keys_match("secret", "secret"));
        assert!(!keys_match("secreT", "secret"));
        assert!(!keys_match("secret1", "secret"));
        assert!(!keys_match("", "secret"));
    }

    #[test]
    fn test_public_paths() {
        assert!(is_public_path("/instagram/auth/callback"));
        assert!(is_public_path("/ping"));
        assert!(!is_public_path("/instagram/auth"));
        assert!(!is_public_path("/"));
    }
}
