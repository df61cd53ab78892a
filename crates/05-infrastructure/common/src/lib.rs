//! # Infrastructure Common
//!
//! 组件生命周期管理的公共类型和工具。
//!
//! ## 核心组件
//!
//! - [`TypeInfo`] - 类型元数据，依赖槽位以其简单名称命名
//! - [`NamingConventions`] - 槽位命名约定
//! - [`Lifecycle`] - 组件启动/停止能力
//! - [`RegistryOptions`] - 单例注册表配置
//! - [`DependencyError`] / [`LifecycleError`] - 错误类型

pub mod configuration;
pub mod conventions;
pub mod errors;
pub mod lifecycle;
pub mod metadata;

pub use configuration::*;
pub use conventions::*;
pub use errors::*;
pub use lifecycle::*;
pub use metadata::*;
