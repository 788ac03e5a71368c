//! # 媒体列表获取

use std::sync::Arc;

use serde::Deserialize;

use super::remote::send_json;
use super::{Credential, MediaItem};
use crate::cache::CredentialStore;
use crate::config::InstagramConfig;
use crate::error::{Result, ServiceError};
use crate::logging::{LogComponent, LogStage};
use crate::{ldebug, lerror};

/// feed 最多返回的条目数
pub const FEED_PAGE_SIZE: usize = 12;

/// 媒体列表请求字段
pub const MEDIA_FIELDS: &str = "id,media_url,timestamp,thumbnail_url,caption,permalink";

/// 媒体列表响应，`data` 缺失视为格式错误
#[derive(Deserialize)]
struct MediaListResponse {
    data: Vec<MediaItem>,
}

/// 截取前 `limit` 条，不足时原样返回
#[must_use]
pub fn truncate_feed(mut items: Vec<MediaItem>, limit: usize) -> Vec<MediaItem> {
    items.truncate(limit);
    items
}

/// 媒体列表客户端
#[derive(Clone)]
pub struct FeedClient {
    http_client: reqwest::Client,
    config: Arc<InstagramConfig>,
}

impl FeedClient {
    #[must_use]
    pub const fn new(http_client: reqwest::Client, config: Arc<InstagramConfig>) -> Self {
        Self {
            http_client,
            config,
        }
    }

    /// 获取账号的媒体列表，保持 Instagram 返回的顺序（新→旧）
    pub async fn fetch_media(&self, request_id: &str, credential: &Credential) -> Result<Vec<MediaItem>> {
        ldebug!(
            request_id,
            LogStage::ExternalApi,
            LogComponent::FeedClient,
            "fetch_media",
            &format!("获取媒体列表: user_id={}", credential.user_id)
        );

        let request = self
            .http_client
            .get(self.config.media_url(credential.user_id))
            .query(&[
                ("access_token", credential.access_token.as_str()),
                ("fields", MEDIA_FIELDS),
            ]);

        let response: MediaListResponse = send_json(request)
            .await
            .map_err(|e| ServiceError::fetch_with_source("获取媒体列表失败", e))?;

        Ok(response.data)
    }
}

/// feed 服务：读取凭据 → 拉取媒体 → 截断
#[derive(Clone)]
pub struct FeedService {
    client: FeedClient,
    store: Arc<dyn CredentialStore>,
}

impl FeedService {
    #[must_use]
    pub fn new(client: FeedClient, store: Arc<dyn CredentialStore>) -> Self {
        Self { client, store }
    }

    /// 获取账号最近的媒体，最多 [`FEED_PAGE_SIZE`] 条
    pub async fn recent_media(&self, request_id: &str, username: &str) -> Result<Vec<MediaItem>> {
        if username.is_empty() {
            return Err(ServiceError::bad_request("username 不能为空"));
        }

        let result = self.load_media(request_id, username).await;
        if let Err(e) = &result {
            lerror!(
                request_id,
                LogStage::Error,
                LogComponent::FeedClient,
                "recent_media_failed",
                &format!("获取 feed 失败: username={username}, error={e}")
            );
        }
        result
    }

    async fn load_media(&self, request_id: &str, username: &str) -> Result<Vec<MediaItem>> {
        let credential = self.store.get(username).await?;
        let items = self.client.fetch_media(request_id, &credential).await?;
        Ok(truncate_feed(items, FEED_PAGE_SIZE))
    }
}
