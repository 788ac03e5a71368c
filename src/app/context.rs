//! 应用上下文（DI 容器）
//!
//! 统一持有跨模块共享的服务实例，启动时显式构建并注入到 HTTP 层，
//! 测试中可替换存储实现。

use std::sync::Arc;

use crate::cache::{CacheClient, CredentialStore, MemoryCredentialStore, RedisCredentialStore};
use crate::config::{AppConfig, StoreConfig, StoreType};
use crate::error::Result;
use crate::instagram::{self, AuthFlow, FeedClient, FeedService, TokenExchangeClient};
use crate::linfo;
use crate::logging::{LogComponent, LogStage};

#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<AppConfig>,
    pub store: Arc<dyn CredentialStore>,
    pub auth_flow: AuthFlow,
    pub feed: FeedService,
}

impl AppContext {
    /// 使用给定的凭据存储构建上下文
    pub fn new(config: AppConfig, store: Arc<dyn CredentialStore>) -> Result<Self> {
        let config = Arc::new(config);
        let instagram_config = Arc::new(config.instagram.clone());
        let http_client = instagram::build_http_client(&instagram_config)?;

        let exchange = TokenExchangeClient::new(http_client.clone(), Arc::clone(&instagram_config));
        let auth_flow = AuthFlow::new(Arc::clone(&instagram_config), exchange, Arc::clone(&store));
        let feed = FeedService::new(
            FeedClient::new(http_client, instagram_config),
            Arc::clone(&store),
        );

        Ok(Self {
            config,
            store,
            auth_flow,
            feed,
        })
    }

    /// 按配置构建凭据存储并创建上下文
    pub async fn from_config(config: AppConfig) -> Result<Self> {
        let store = build_credential_store(&config.store).await?;
        Self::new(config, store)
    }
}

/// 按配置创建凭据存储，Redis 后端会先做连通性检查
pub async fn build_credential_store(config: &StoreConfig) -> Result<Arc<dyn CredentialStore>> {
    match config.store_type {
        StoreType::Redis => {
            let client = CacheClient::new(&config.redis).await?;
            client.ping().await?;
            Ok(Arc::new(RedisCredentialStore::new(client)))
        }
        StoreType::Memory => {
            linfo!(
                "system",
                LogStage::Startup,
                LogComponent::CredentialStore,
                "memory_store",
                "使用内存凭据存储，重启后凭据将丢失"
            );
            Ok(Arc::new(MemoryCredentialStore::new()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_store_from_config() {
        let config = StoreConfig {
            store_type: StoreType::Memory,
            ..StoreConfig::default()
        };
        let store = build_credential_store(&config).await.unwrap();
        assert!(store.list_usernames().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_context_shares_store() {
        let store: Arc<dyn CredentialStore> = Arc::new(MemoryCredentialStore::new());
        let context = AppContext::new(AppConfig::default(), Arc::clone(&store)).unwrap();
        assert!(Arc::ptr_eq(&context.store, &store));
    }
}
