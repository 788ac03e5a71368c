//! # Instagram 接口处理器

use axum::Json;
use axum::extract::{Extension, Path, RawQuery, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde_json::json;

use crate::error::ServiceError;
use crate::linfo;
use crate::logging::{LogComponent, LogStage};
use crate::server::AppState;
use crate::server::middleware::RequestId;
use crate::server::middleware::api_key::API_KEY_PARAM;

/// 在路径后追加 `api_key` 查询参数
pub fn with_api_key(path: &str, api_key: &str) -> String {
    let query = url::form_urlencoded::Serializer::new(String::new())
        .append_pair(API_KEY_PARAM, api_key)
        .finish();
    format!("{path}?{query}")
}

/// `GET /instagram/auth`：返回授权地址
pub async fn get_auth_url(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
) -> Response {
    match state.auth_flow.authorization_url(&request_id) {
        Ok(url) => Json(json!({ "url": url.as_str() })).into_response(),
        Err(e) => e.into_response(),
    }
}

/// `GET /instagram/auth/callback`：完成授权后 302 跳转到 feed
pub async fn auth_callback(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    RawQuery(query): RawQuery,
) -> Response {
    let account = match state.auth_flow.handle_callback(&request_id, query.as_deref()).await {
        Ok(account) => account,
        Err(e) => return e.into_response(),
    };

    linfo!(
        &request_id,
        LogStage::Response,
        LogComponent::Handler,
        "auth_callback_redirect",
        &format!("授权完成，跳转到 {}", account.feed_path)
    );

    let location = with_api_key(&account.feed_path, &state.config.server.api_key);
    (StatusCode::FOUND, [(header::LOCATION, location)]).into_response()
}

/// `GET /instagram/feed/{username}`：最近的媒体列表
pub async fn get_feed(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Path(username): Path<String>,
) -> Response {
    if username.trim().is_empty() {
        return ServiceError::bad_request("username 不能为空").into_response();
    }

    match state.feed.recent_media(&request_id, &username).await {
        Ok(items) => Json(json!({ "data": items })).into_response(),
        Err(e) => e.into_response(),
    }
}
