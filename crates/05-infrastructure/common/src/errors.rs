//! 错误类型定义

use thiserror::Error;

/// 工厂和生命周期钩子返回的动态错误
pub type DynError = Box<dyn std::error::Error + Send + Sync>;

/// 配置错误类型
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("配置加载失败: {source}")]
    LoadFailed {
        #[from]
        source: config::ConfigError,
    },

    #[error("配置验证失败: {message}")]
    ValidationFailed { message: String },
}

/// 依赖注入错误类型
#[derive(Error, Debug)]
pub enum DependencyError {
    #[error("组件定义无效: {type_name}, 原因: {message}")]
    InvalidRegistration { type_name: String, message: String },

    #[error("注册阶段已结束, 无法继续注册组件: {type_name}")]
    RegistrationClosed { type_name: String },

    #[error("单例已经实例化, 不能重复执行实例化")]
    AlreadyInstantiated,

    #[error("检测到循环依赖: {}", .cycle.join(" -> "))]
    CyclicDependency { cycle: Vec<String> },

    #[error("组件创建失败: {type_name}, 原因: {source}")]
    ComponentCreationFailed { type_name: String, source: DynError },

    #[error("缺少依赖: {slot_name}")]
    MissingDependency { slot_name: String },

    #[error("依赖类型不匹配: {slot_name}, 期望 {expected}, 实际 {actual}")]
    TypeMismatch {
        slot_name: String,
        expected: String,
        actual: String,
    },
}

impl DependencyError {
    /// 创建组件定义无效错误
    pub fn invalid_registration(type_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidRegistration {
            type_name: type_name.into(),
            message: message.into(),
        }
    }

    /// 创建组件创建失败错误
    pub fn creation_failed(type_name: impl Into<String>, source: DynError) -> Self {
        Self::ComponentCreationFailed {
            type_name: type_name.into(),
            source,
        }
    }
}

/// 生命周期管理错误类型
#[derive(Error, Debug)]
pub enum LifecycleError {
    #[error("组件启动失败: {type_name}, 原因: {source}")]
    StartFailed { type_name: String, source: DynError },

    #[error("组件停止失败: {type_name}, 原因: {source}")]
    StopFailed { type_name: String, source: DynError },

    #[error("组件生命周期钩子发生 panic: {type_name}, 信息: {message}")]
    Panicked { type_name: String, message: String },
}

impl LifecycleError {
    /// 出错组件的类型名称
    pub fn type_name(&self) -> &str {
        match self {
            Self::StartFailed { type_name, .. }
            | Self::StopFailed { type_name, .. }
            | Self::Panicked { type_name, .. } => type_name,
        }
    }
}

/// 结果类型别名
pub type ConfigResult<T> = Result<T, ConfigError>;
pub type DependencyResult<T> = Result<T, DependencyError>;
pub type LifecycleResult<T> = Result<T, LifecycleError>;
