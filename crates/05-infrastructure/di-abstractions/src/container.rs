//! 单例容器抽象接口

use crate::factory::ComponentFactory;
use crate::injectable::Instance;
use crate::registry::ComponentDefinition;
use infrastructure_common::{DependencyResult, LifecycleReport};
use serde::{Deserialize, Serialize};

/// 单例容器 trait
///
/// 调用顺序：注册 -> 实例化 -> 启动 -> 停止。注册只能发生在实例化之前，
/// 实例化只能执行一次。
pub trait SingletonContainer: Send + Sync {
    /// 注册单例定义
    fn register_singleton(&mut self, definition: ComponentDefinition) -> DependencyResult<()>;

    /// 按依赖顺序实例化所有非延迟单例
    fn instantiate_singletons(
        &mut self,
        factory: &dyn ComponentFactory,
    ) -> DependencyResult<&[Instance]>;

    /// 按槽位名称解析实例，必要时创建延迟组件
    fn resolve_dependency(
        &self,
        slot_name: &str,
        factory: &dyn ComponentFactory,
    ) -> DependencyResult<Option<Instance>>;

    /// 启动所有非延迟单例
    fn start(&self) -> LifecycleReport;

    /// 停止所有非延迟单例
    fn shutdown(&self) -> LifecycleReport;
}

/// 注册表统计信息
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryStats {
    /// 已注册定义数量
    pub registered_definitions: usize,
    /// 延迟定义数量
    pub lazy_definitions: usize,
    /// 已创建的非延迟实例数量
    pub eager_instances: usize,
    /// 已创建的延迟实例数量
    pub lazy_instances: usize,
    /// 缓存中的槽位数量
    pub cached_slots: usize,
    /// 是否已完成实例化
    pub instantiated: bool,
}
