//! # 缓存键命名规范

use std::fmt;

/// 凭据键前缀
const CREDENTIAL_PREFIX: &str = "credential_";

/// 缓存键类型
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheKey {
    /// 账号凭据 - `credential_{username}`
    Credential { username: String },
}

impl CacheKey {
    /// 账号凭据键
    pub fn credential(username: impl Into<String>) -> Self {
        Self::Credential {
            username: username.into(),
        }
    }

    /// 生成缓存键字符串
    #[must_use]
    pub fn build(&self) -> String {
        match self {
            Self::Credential { username } => format!("{CREDENTIAL_PREFIX}{username}"),
        }
    }

    /// 获取同一命名空间下所有键的匹配模式
    #[must_use]
    pub fn credential_pattern() -> String {
        format!("{CREDENTIAL_PREFIX}*")
    }

    /// 从完整键中还原用户名，不属于凭据命名空间时返回 None
    #[must_use]
    pub fn parse_credential(key: &str) -> Option<&str> {
        key.strip_prefix(CREDENTIAL_PREFIX)
            .filter(|username| !username.is_empty())
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.build())
    }
}
