//! 上游响应读取

use reqwest::StatusCode;
use serde::de::DeserializeOwned;

/// 上游调用失败原因
#[derive(Debug, thiserror::Error)]
pub(crate) enum RemoteError {
    #[error("request failed: {0}")]
    Transport(reqwest::Error),

    #[error("unexpected status {0}")]
    Status(StatusCode),

    #[error("malformed response body: {0}")]
    Decode(#[from] serde_json::Error),
}

impl From<reqwest::Error> for RemoteError {
    // 请求地址中带有 access_token，错误信息里去掉 URL
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err.without_url())
    }
}

/// 发送请求，检查状态码并将响应体解析为 JSON
///
/// 非 2xx 响应体只写入 debug 日志，不进入错误信息。
pub(crate) async fn send_json<T: DeserializeOwned>(
    request: reqwest::RequestBuilder,
) -> Result<T, RemoteError> {
    let response = request.send().await?;
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        tracing::debug!(status = %status, body = %body, "upstream returned error response");
        return Err(RemoteError::Status(status));
    }

    Ok(serde_json::from_str(&body)?)
}
