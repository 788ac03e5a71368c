//! # 凭据存储
//!
//! 以用户名为键持久化账号凭据，无过期时间、无版本控制。
//! 同一用户名的并发写入以最后一次为准，不做合并也不加锁。

use std::collections::{BTreeSet, HashMap};

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{CacheClient, CacheKey};
use crate::error::{Result, ServiceError};
use crate::instagram::Credential;
use crate::ldebug;
use crate::logging::{LogComponent, LogStage};

/// 凭据存储抽象
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// 写入凭据，覆盖同名账号的旧值
    async fn put(&self, username: &str, credential: &Credential) -> Result<()>;

    /// 读取凭据，不存在时返回 `ServiceError::NotFound`
    async fn get(&self, username: &str) -> Result<Credential>;

    /// 列出所有已保存凭据的用户名（顺序不保证）
    async fn list_usernames(&self) -> Result<BTreeSet<String>>;
}

fn encode(credential: &Credential) -> Result<String> {
    serde_json::to_string(credential)
        .map_err(|e| ServiceError::store_with_source("序列化凭据失败", e))
}

fn decode(username: &str, raw: &str) -> Result<Credential> {
    serde_json::from_str(raw)
        .map_err(|e| ServiceError::store_with_source(format!("反序列化凭据失败: {username}"), e))
}

/// 基于 Redis 的凭据存储
#[derive(Clone)]
pub struct RedisCredentialStore {
    client: CacheClient,
}

impl RedisCredentialStore {
    #[must_use]
    pub const fn new(client: CacheClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl CredentialStore for RedisCredentialStore {
    async fn put(&self, username: &str, credential: &Credential) -> Result<()> {
        let value = encode(credential)?;
        self.client
            .set_persistent(&CacheKey::credential(username).build(), &value)
            .await
    }

    async fn get(&self, username: &str) -> Result<Credential> {
        let raw = self
            .client
            .get(&CacheKey::credential(username).build())
            .await?
            .ok_or_else(|| ServiceError::not_found(username))?;
        decode(username, &raw)
    }

    async fn list_usernames(&self) -> Result<BTreeSet<String>> {
        let keys = self.client.keys(&CacheKey::credential_pattern()).await?;
        Ok(keys
            .iter()
            .filter_map(|key| CacheKey::parse_credential(key))
            .map(str::to_string)
            .collect())
    }
}

/// 内存凭据存储，用于开发和测试
///
/// 与 Redis 实现使用相同的键和序列化格式。
#[derive(Default)]
pub struct MemoryCredentialStore {
    data: RwLock<HashMap<String, String>>,
}

impl MemoryCredentialStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn put(&self, username: &str, credential: &Credential) -> Result<()> {
        let value = encode(credential)?;
        let key = CacheKey::credential(username).build();
        ldebug!(
            "system",
            LogStage::Cache,
            LogComponent::CredentialStore,
            "memory_put",
            &format!("写入内存凭据: key={key}")
        );
        self.data.write().await.insert(key, value);
        Ok(())
    }

    async fn get(&self, username: &str) -> Result<Credential> {
        let data = self.data.read().await;
        let raw = data
            .get(&CacheKey::credential(username).build())
            .ok_or_else(|| ServiceError::not_found(username))?;
        decode(username, raw)
    }

    async fn list_usernames(&self) -> Result<BTreeSet<String>> {
        let data = self.data.read().await;
        Ok(data
            .keys()
            .filter_map(|key| CacheKey::parse_credential(key))
            .map(str::to_string)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credential(token: &str, name: &str, id: i64) -> Credential {
        Credential {
            access_token: token.to_string(),
            user_name: name.to_string(),
            user_id: id,
        }
    }

    #[tokio::test]
    async fn test_put_then_get() {
        let store = MemoryCredentialStore::new();
        let cred = credential("l1", "alice", 42);
        store.put("alice", &cred).await.unwrap();
        assert_eq!(store.get("alice").await.unwrap(), cred);
    }

    #[tokio::test]
    async fn test_get_missing_is_not_found() {
        let store = MemoryCredentialStore::new();
        let err = store.get("nobody").await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound { username } if username == "nobody"));
    }

    #[tokio::test]
    async fn test_put_overwrites_previous_value() {
        let store = MemoryCredentialStore::new();
        store.put("alice", &credential("old", "alice", 1)).await.unwrap();
        store.put("alice", &credential("new", "alice", 1)).await.unwrap();

        assert_eq!(store.get("alice").await.unwrap().access_token, "new");
        assert_eq!(store.list_usernames().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_list_usernames() {
        let store = MemoryCredentialStore::new();
        for (i, name) in ["alice", "bob", "carol"].iter().enumerate() {
            store
                .put(name, &credential("t", name, i64::try_from(i).unwrap()))
                .await
                .unwrap();
        }
        let names = store.list_usernames().await.unwrap();
        assert_eq!(
            names.into_iter().collect::<Vec<_>>(),
            vec!["alice", "bob", "carol"]
        );
    }

    #[tokio::test]
    async fn test_corrupt_record_is_store_error() {
        let store = MemoryCredentialStore::new();
        store
            .data
            .write()
            .await
            .insert(CacheKey::credential("eve").build(), "{not json".to_string());
        let err = store.get("eve").await.unwrap_err();
        assert!(matches!(err, ServiceError::Store { .. }));
    }
}
