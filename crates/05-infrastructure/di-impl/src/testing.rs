//! 单元测试用的检查器和工厂

use di_abstractions::{
    ComponentFactory, DependencyInspector, DependencyRequirement, DependencyResolver, Instance,
};
use infrastructure_common::{DynError, NamingConventions, TypeInfo};
use std::any::TypeId;
use std::collections::HashMap;

/// 手工声明依赖的检查器
#[derive(Debug, Default)]
pub struct StaticInspector {
    requirements: HashMap<TypeId, Vec<DependencyRequirement>>,
}

impl StaticInspector {
    /// 声明 `C` 的构造参数依赖 `D`
    pub fn requires<C: ?Sized + 'static, D: ?Sized + 'static>(mut self) -> Self {
        self.requirements
            .entry(TypeId::of::<C>())
            .or_default()
            .push(DependencyRequirement::constructor(TypeInfo::of::<D>()));
        self
    }
}

impl DependencyInspector for StaticInspector {
    fn inspect(&self, component_type: &TypeInfo) -> Vec<DependencyRequirement> {
        self.requirements
            .get(&component_type.id)
            .cloned()
            .unwrap_or_default()
    }
}

/// 只提供抽象类型绑定的工厂
#[derive(Debug, Default)]
pub struct StaticFactory {
    bindings: HashMap<String, TypeInfo>,
}

impl StaticFactory {
    /// 把抽象类型 `A` 绑定到具体类型 `C`
    pub fn binds<A: ?Sized + 'static, C: 'static>(mut self) -> Self {
        self.bindings
            .insert(NamingConventions::slot_name_of::<A>(), TypeInfo::of::<C>());
        self
    }
}

impl ComponentFactory for StaticFactory {
    fn create(
        &self,
        component_type: &TypeInfo,
        _resolver: &dyn DependencyResolver,
    ) -> Result<Instance, DynError> {
        Err(format!("StaticFactory 不创建实例: {component_type}").into())
    }

    fn find_concrete_type(&self, abstract_name: &str) -> Option<TypeInfo> {
        self.bindings.get(abstract_name).cloned()
    }
}
