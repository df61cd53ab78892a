//! 组件工厂抽象接口
//!
//! 提供组件实例创建以及抽象类型到具体类型的查找

use crate::injectable::Instance;
use crate::resolver::DependencyResolver;
use infrastructure_common::{DynError, TypeInfo};

/// 组件工厂 trait
pub trait ComponentFactory: Send + Sync {
    /// 创建组件实例
    ///
    /// 组件的依赖通过 `resolver` 获取。
    fn create(
        &self,
        component_type: &TypeInfo,
        resolver: &dyn DependencyResolver,
    ) -> Result<Instance, DynError>;

    /// 查找抽象类型（按简单名称）对应的具体类型
    fn find_concrete_type(&self, _abstract_name: &str) -> Option<TypeInfo> {
        None
    }
}

/// Lambda 工厂包装器
///
/// 用闭包实现 [`ComponentFactory`]，不支持抽象类型查找。
pub struct LambdaFactory<F>
where
    F: Fn(&TypeInfo, &dyn DependencyResolver) -> Result<Instance, DynError> + Send + Sync,
{
    factory_fn: F,
}

impl<F> LambdaFactory<F>
where
    F: Fn(&TypeInfo, &dyn DependencyResolver) -> Result<Instance, DynError> + Send + Sync,
{
    /// 创建工厂
    pub fn new(factory_fn: F) -> Self {
        Self { factory_fn }
    }
}

impl<F> ComponentFactory for LambdaFactory<F>
where
    F: Fn(&TypeInfo, &dyn DependencyResolver) -> Result<Instance, DynError> + Send + Sync,
{
    fn create(
        &self,
        component_type: &TypeInfo,
        resolver: &dyn DependencyResolver,
    ) -> Result<Instance, DynError> {
        (self.factory_fn)(component_type, resolver)
    }
}

impl<F> std::fmt::Debug for LambdaFactory<F>
where
    F: Fn(&TypeInfo, &dyn DependencyResolver) -> Result<Instance, DynError> + Send + Sync,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LambdaFactory")
            .field("factory_fn", &"<function>")
            .finish()
    }
}
