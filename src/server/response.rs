//! # API 响应结构
//!
//! 错误响应只包含固定的错误代码与提示语，不透传内部错误详情或上游响应内容。

use axum::Json;
use axum::response::{IntoResponse, Response};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ServiceError;

/// # 标准错误信息
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorInfo {
    pub code: String,
    pub message: String,
}

/// # 标准错误响应
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: ErrorInfo,
    pub timestamp: DateTime<Utc>,
}

impl ErrorResponse {
    #[must_use]
    pub fn new(code: &str) -> Self {
        Self {
            success: false,
            error: ErrorInfo {
                code: code.to_string(),
                message: public_message(code).to_string(),
            },
            timestamp: Utc::now(),
        }
    }
}

/// 错误代码对应的对外提示语
fn public_message(code: &str) -> &'static str {
    match code {
        "UNAUTHORIZED" => "Unauthorized",
        "BAD_REQUEST" => "Bad request",
        "FETCH_ERROR" => "Failed to fetch feed",
        "CALLBACK_ERROR" | "EXCHANGE_ERROR" => "Authorization failed",
        _ => "Internal server error",
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let (status, code) = self.to_http_response_parts();
        (status, Json(ErrorResponse::new(code))).into_response()
    }
}
