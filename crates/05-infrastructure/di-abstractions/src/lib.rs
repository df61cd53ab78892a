//! # Dependency Injection Abstractions
//!
//! 依赖注入抽象层，定义单例注册、依赖检查与解析的核心接口。
//!
//! ## 核心接口
//!
//! - [`ComponentDefinition`] - 组件定义
//! - [`Instance`] / [`Injectable`] - 组件实例与可注入组件
//! - [`DependencyInspector`] - 依赖检查器接口
//! - [`DependencyResolver`] - 依赖解析器接口
//! - [`ComponentFactory`] - 组件工厂接口
//! - [`SingletonContainer`] - 单例容器接口

pub mod container;
pub mod factory;
pub mod injectable;
pub mod inspector;
pub mod registry;
pub mod resolver;

pub use container::*;
pub use factory::*;
pub use injectable::*;
pub use inspector::*;
pub use registry::*;
pub use resolver::*;

// 过程宏生成的代码只引用本 crate
pub use infrastructure_common::{
    DependencyError, DependencyResult, DynError, Lifecycle, LifecycleError, TypeInfo,
};
