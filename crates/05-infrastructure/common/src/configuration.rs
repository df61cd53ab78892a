//! 注册表配置
//!
//! 配置来源按优先级从低到高：`config/app`、`config/local`、`LORN__` 前缀的环境变量。

use crate::errors::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, error};

/// 重复槽位处理策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicateSlotPolicy {
    /// 允许重复，缓存中先注册者生效
    #[default]
    FirstWins,
    /// 注册时拒绝已被其他定义占用的槽位
    Reject,
}

/// 停止顺序
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShutdownOrder {
    /// 与实例数组顺序一致
    #[default]
    Registration,
    /// 与实例数组顺序相反
    Reverse,
}

/// 单例注册表配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryOptions {
    /// 重复槽位处理策略
    pub duplicate_slots: DuplicateSlotPolicy,
    /// 停止顺序
    pub shutdown_order: ShutdownOrder,
    /// 是否启用抽象类型到具体类型的查找
    pub abstraction_lookup: bool,
}

impl Default for RegistryOptions {
    fn default() -> Self {
        Self {
            duplicate_slots: DuplicateSlotPolicy::FirstWins,
            shutdown_order: ShutdownOrder::Registration,
            abstraction_lookup: true,
        }
    }
}

impl RegistryOptions {
    /// 配置节名称
    pub const CONFIG_SECTION: &'static str = "registry";
    /// 环境变量前缀
    pub const ENV_PREFIX: &'static str = "LORN";

    /// 从默认配置文件和环境变量加载
    pub fn load() -> ConfigResult<Self> {
        let builder = config::Config::builder()
            .add_source(config::File::with_name("config/app").required(false))
            .add_source(config::File::with_name("config/local").required(false));

        Self::bind(builder)
    }

    /// 从指定配置文件和环境变量加载
    pub fn load_from(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(ConfigError::ValidationFailed {
                message: format!("配置文件不存在: {}", path.display()),
            });
        }

        let builder = config::Config::builder().add_source(config::File::from(path));

        Self::bind(builder)
    }

    fn bind(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> ConfigResult<Self> {
        let settings = builder
            .add_source(config::Environment::with_prefix(Self::ENV_PREFIX).separator("__"))
            .build()
            .map_err(|e| {
                error!("配置构建失败: {}", e);
                ConfigError::from(e)
            })?;

        let options = match settings.get::<Self>(Self::CONFIG_SECTION) {
            Ok(options) => options,
            Err(config::ConfigError::NotFound(_)) => {
                debug!("未找到配置节 {}, 使用默认配置", Self::CONFIG_SECTION);
                Self::default()
            }
            Err(e) => {
                error!("配置绑定失败: section={}, error={}", Self::CONFIG_SECTION, e);
                return Err(e.into());
            }
        };

        debug!("注册表配置加载完成: {:?}", options);
        Ok(options)
    }
}
