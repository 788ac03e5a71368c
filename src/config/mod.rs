//! # 配置管理模块
//!
//! 处理应用配置加载、环境变量覆盖和验证

mod app_config;

pub use app_config::{AppConfig, InstagramConfig, RedisConfig, ServerConfig, StoreConfig, StoreType};

use std::env;
use std::path::{Path, PathBuf};

use crate::error::{Result, ServiceError};
use crate::logging::{LogComponent, LogStage};
use crate::{linfo, lwarn};

/// 配置文件路径环境变量
pub const CONFIG_PATH_ENV: &str = "SOCIAL_FEED_CONFIG_PATH";

/// 解析配置文件路径
///
/// 优先级：显式传入 > `SOCIAL_FEED_CONFIG_PATH` > `config/config.{RUST_ENV}.toml`
#[must_use]
pub fn resolve_config_path(explicit: Option<&Path>) -> PathBuf {
    if let Some(path) = explicit {
        return path.to_path_buf();
    }
    if let Ok(path) = env::var(CONFIG_PATH_ENV) {
        return PathBuf::from(path);
    }
    let env = env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());
    PathBuf::from(format!("config/config.{env}.toml"))
}

/// 加载配置文件，应用环境变量覆盖并验证
pub fn load_config(explicit: Option<&Path>) -> Result<AppConfig> {
    let config_file = resolve_config_path(explicit);
    let mut config = load_config_file(&config_file)?;
    apply_env_overrides(&mut config, |key| env::var(key).ok());
    config.validate()?;
    Ok(config)
}

/// 读取配置文件，文件不存在时使用默认配置
pub fn load_config_file(path: &Path) -> Result<AppConfig> {
    if !path.exists() {
        lwarn!(
            "system",
            LogStage::Configuration,
            LogComponent::Config,
            "config_file_missing",
            &format!("配置文件不存在: {}，使用默认配置", path.display())
        );
        return Ok(AppConfig::default());
    }

    let content = std::fs::read_to_string(path).map_err(|e| {
        ServiceError::config_with_source(format!("读取配置文件失败: {}", path.display()), e)
    })?;
    let config: AppConfig = toml::from_str(&content)?;

    linfo!(
        "system",
        LogStage::Configuration,
        LogComponent::Config,
        "config_file_loaded",
        &format!("已加载配置文件: {}", path.display())
    );
    Ok(config)
}

/// 应用环境变量覆盖
///
/// `lookup` 通常为 `std::env::var`，测试中可替换为固定映射。
pub fn apply_env_overrides<F>(config: &mut AppConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(value) = lookup("INSTAGRAM_APP_ID") {
        config.instagram.app_id = value;
    }
    if let Some(value) = lookup("INSTAGRAM_SECRET") {
        config.instagram.app_secret = value;
    }
    if let Some(value) = lookup("APP_URL") {
        config.instagram.app_url = value;
    }
    if let Some(value) = lookup("API_KEY") {
        config.server.api_key = value;
    }
    if let Some(value) = lookup("REDIS_URL") {
        config.store.redis.url = value;
    }
    if let Some(value) = lookup("PORT") {
        match value.parse::<u16>() {
            Ok(port) => config.server.port = port,
            Err(e) => lwarn!(
                "system",
                LogStage::Configuration,
                LogComponent::Config,
                "invalid_port_override",
                &format!("忽略无效的 PORT 环境变量 '{value}': {e}")
            ),
        }
    }
}
