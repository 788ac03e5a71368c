//! # Redis 缓存客户端
//!
//! 提供 Redis 连接管理和基础操作

use std::time::Duration;

use redis::{AsyncCommands, Client, aio::ConnectionManager};

use crate::config::RedisConfig;
use crate::error::{Result, ServiceError};
use crate::logging::{LogComponent, LogStage};
use crate::{ldebug, lerror, linfo};

/// Redis 缓存客户端
#[derive(Clone)]
pub struct CacheClient {
    /// Redis 连接管理器
    connection_manager: ConnectionManager,
}

impl CacheClient {
    /// 创建新的缓存客户端
    pub async fn new(config: &RedisConfig) -> Result<Self> {
        linfo!(
            "system",
            LogStage::Cache,
            LogComponent::Cache,
            "connect_to_redis",
            "正在连接 Redis 服务器"
        );

        let client = Client::open(config.url.as_str())
            .map_err(|e| ServiceError::store_with_source("创建 Redis 客户端失败", e))?;

        let timeout = Duration::from_secs(config.connection_timeout);
        let connection_manager = tokio::time::timeout(timeout, ConnectionManager::new(client))
            .await
            .map_err(|e| ServiceError::store_with_source("建立 Redis 连接超时", e))?
            .map_err(|e| ServiceError::store_with_source("建立 Redis 连接失败", e))?;

        linfo!(
            "system",
            LogStage::Cache,
            LogComponent::Cache,
            "redis_connected",
            "Redis 连接建立成功"
        );

        Ok(Self { connection_manager })
    }

    /// 设置不过期的缓存值
    pub async fn set_persistent(&self, key: &str, value: &str) -> Result<()> {
        ldebug!(
            "system",
            LogStage::Cache,
            LogComponent::Cache,
            "set_cache",
            &format!("设置缓存: key={key}")
        );

        let mut conn = self.connection_manager.clone();
        conn.set::<_, _, ()>(key, value)
            .await
            .map_err(|e| ServiceError::store_with_source(format!("设置缓存失败: {key}"), e))
    }

    /// 获取缓存原始值
    pub async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut conn = self.connection_manager.clone();
        let result: Option<String> = conn
            .get(key)
            .await
            .map_err(|e| ServiceError::store_with_source(format!("获取缓存失败: {key}"), e))?;

        ldebug!(
            "system",
            LogStage::Cache,
            LogComponent::Cache,
            if result.is_some() { "cache_hit" } else { "cache_miss" },
            &format!("获取缓存: key={key}")
        );
        Ok(result)
    }

    /// 查找符合模式的缓存键
    pub async fn keys(&self, pattern: &str) -> Result<Vec<String>> {
        let mut conn = self.connection_manager.clone();
        conn.keys(pattern).await.map_err(|e| {
            ServiceError::store_with_source(format!("查找匹配的缓存键失败: {pattern}"), e)
        })
    }

    /// 测试连接
    pub async fn ping(&self) -> Result<()> {
        let mut conn = self.connection_manager.clone();

        let response: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(|e| ServiceError::store_with_source("Redis ping 失败", e))?;

        if response == "PONG" {
            linfo!(
                "system",
                LogStage::Cache,
                LogComponent::Cache,
                "ping_success",
                "Redis 连接测试成功"
            );
            Ok(())
        } else {
            lerror!(
                "system",
                LogStage::Cache,
                LogComponent::Cache,
                "ping_fail",
                &format!("Redis ping 响应异常: {response}")
            );
            Err(ServiceError::store("Redis 连接测试失败"))
        }
    }
}
