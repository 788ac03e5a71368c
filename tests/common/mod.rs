//! # 集成测试公共工具
//!
//! 使用 wiremock 模拟 Instagram 接口，内存存储代替 Redis。

#![allow(dead_code)]

use std::sync::Arc;

use serde_json::json;
use social_feed::app::AppContext;
use social_feed::cache::{CredentialStore, MemoryCredentialStore};
use social_feed::config::{AppConfig, StoreType};
use wiremock::matchers::{body_string_contains, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const API_KEY: &str = "test-key";
pub const APP_URL: &str = "http://localhost:8080";
pub const REDIRECT_URI_FORM: &str =
    "redirect_uri=http%3A%2F%2Flocalhost%3A8080%2Finstagram%2Fauth%2Fcallback";

pub struct Harness {
    pub server: MockServer,
    pub store: Arc<dyn CredentialStore>,
    pub context: AppContext,
}

impl Harness {
    pub async fn start() -> Self {
        let server = MockServer::start().await;
        let store: Arc<dyn CredentialStore> = Arc::new(MemoryCredentialStore::new());
        let context = AppContext::new(test_config(&server.uri()), Arc::clone(&store))
            .expect("构建应用上下文失败");
        Self {
            server,
            store,
            context,
        }
    }
}

/// 指向模拟服务器的配置
pub fn test_config(mock_uri: &str) -> AppConfig {
    let mut config = AppConfig::default();
    config.server.api_key = API_KEY.to_string();
    config.store.store_type = StoreType::Memory;
    config.instagram.app_id = "app-1".to_string();
    config.instagram.app_secret = "secret-1".to_string();
    config.instagram.app_url = APP_URL.to_string();
    config.instagram.token_url = format!("{mock_uri}/oauth/access_token");
    config.instagram.graph_url = mock_uri.to_string();
    config
}

pub async fn mount_short_lived(server: &MockServer, code: &str, status: u16, token: &str, user_id: i64) {
    Mock::given(method("POST"))
        .and(path("/oauth/access_token"))
        .and(body_string_contains("grant_type=authorization_code"))
        .and(body_string_contains("client_id=app-1"))
        .and(body_string_contains(REDIRECT_URI_FORM))
        .and(body_string_contains(format!("code={code}")))
        .respond_with(
            ResponseTemplate::new(status).set_body_json(json!({
                "access_token": token,
                "user_id": user_id
            })),
        )
        .mount(server)
        .await;
}

pub async fn mount_long_lived(server: &MockServer, short_token: &str, status: u16, token: &str) {
    Mock::given(method("GET"))
        .and(path("/access_token"))
        .and(query_param("grant_type", "ig_exchange_token"))
        .and(query_param("client_secret", "secret-1"))
        .and(query_param("access_token", short_token))
        .respond_with(ResponseTemplate::new(status).set_body_json(json!({
            "access_token": token,
            "token_type": "bearer",
            "expires_in": 5_183_944
        })))
        .mount(server)
        .await;
}

pub async fn mount_identity(server: &MockServer, long_token: &str, status: u16, username: &str) {
    Mock::given(method("GET"))
        .and(path("/v19.0/me"))
        .and(query_param("fields", "username"))
        .and(query_param("access_token", long_token))
        .respond_with(ResponseTemplate::new(status).set_body_json(json!({
            "id": "1789",
            "username": username
        })))
        .mount(server)
        .await;
}

/// 完整的成功交换链路
pub async fn mount_exchange_chain(server: &MockServer, code: &str, username: &str, user_id: i64) {
    let short = format!("short-{username}");
    let long = format!("long-{username}");
    mount_short_lived(server, code, 200, &short, user_id).await;
    mount_long_lived(server, &short, 200, &long).await;
    mount_identity(server, &long, 200, username).await;
}

pub async fn mount_media(server: &MockServer, user_id: i64, access_token: &str, count: usize) {
    let data: Vec<_> = (0..count)
        .map(|i| {
            json!({
                "id": format!("m{i}"),
                "media_url": format!("https://cdn.example.com/{i}.jpg"),
                "timestamp": format!("2024-01-{:02}T00:00:00+0000", 28 - i.min(27)),
                "caption": format!("post {i}"),
                "permalink": format!("https://www.instagram.com/p/{i}/")
            })
        })
        .collect();

    Mock::given(method("GET"))
        .and(path(format!("/v11.0/{user_id}/media")))
        .and(query_param("access_token", access_token))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": data })))
        .mount(server)
        .await;
}
