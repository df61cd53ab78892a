//! 类型目录
//!
//! 默认的组件工厂兼依赖检查器：登记 [`Injectable`] 类型的构造方式和元数据，
//! 并维护抽象类型到具体类型的绑定。

use crate::inspector::MetadataInspector;
use di_abstractions::{
    ComponentFactory, DependencyInspector, DependencyRequirement, DependencyResolver, Injectable,
    Instance, TypeMetadata,
};
use infrastructure_common::{DynError, TypeInfo};
use std::any::TypeId;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

type Constructor = Arc<dyn Fn(&dyn DependencyResolver) -> Result<Instance, DynError> + Send + Sync>;
type ViewFn = Arc<dyn Fn(Instance) -> Instance + Send + Sync>;

/// 类型目录
#[derive(Default, Clone)]
pub struct TypeCatalog {
    inspector: MetadataInspector,
    constructors: HashMap<TypeId, Constructor>,
    // 抽象类型简单名称 -> 具体类型
    bindings: HashMap<String, TypeInfo>,
    // 具体类型 -> 创建后附加的抽象视图
    views: HashMap<TypeId, Vec<ViewFn>>,
}

impl TypeCatalog {
    /// 创建空目录
    pub fn new() -> Self {
        Self::default()
    }

    /// 登记可注入类型
    pub fn register<T: Injectable>(&mut self) -> &mut Self {
        let constructor: Constructor = Arc::new(
            |resolver: &dyn DependencyResolver| -> Result<Instance, DynError> {
                Ok(T::construct(resolver)?.into_instance())
            },
        );

        self.inspector.register::<T>();
        self.constructors.insert(TypeId::of::<T>(), constructor);
        debug!("登记组件类型: {}", std::any::type_name::<T>());
        self
    }

    /// 把抽象类型 `A` 绑定到具体类型 `T`
    ///
    /// `T` 的实例创建后会以 `A` 暴露，`find_concrete_type` 对 `A` 的简单名称返回 `T`。
    pub fn bind<A, T>(&mut self, upcast: fn(Arc<T>) -> Arc<A>) -> &mut Self
    where
        A: ?Sized + Send + Sync + 'static,
        T: Injectable,
    {
        if !self.contains::<T>() {
            self.register::<T>();
        }

        let abstract_type = TypeInfo::of::<A>();
        let concrete_type = TypeInfo::of::<T>();
        debug!("绑定抽象类型: {} -> {}", abstract_type, concrete_type);

        self.bindings
            .insert(abstract_type.short_name().to_string(), concrete_type);
        self.views
            .entry(TypeId::of::<T>())
            .or_default()
            .push(Arc::new(move |instance: Instance| {
                match instance.downcast::<T>() {
                    Some(concrete) => instance.expose::<A>(upcast(concrete)),
                    None => instance,
                }
            }));
        self
    }

    /// 是否登记了类型 `T`
    pub fn contains<T: 'static>(&self) -> bool {
        self.constructors.contains_key(&TypeId::of::<T>())
    }

    /// 查询类型元数据
    pub fn metadata(&self, component_type: &TypeInfo) -> Option<&TypeMetadata> {
        self.inspector.get(component_type)
    }
}

impl ComponentFactory for TypeCatalog {
    fn create(
        &self,
        component_type: &TypeInfo,
        resolver: &dyn DependencyResolver,
    ) -> Result<Instance, DynError> {
        let constructor = self.constructors.get(&component_type.id).ok_or_else(|| {
            DynError::from(format!("类型未在目录中登记: {}", component_type.module_path))
        })?;

        let mut instance = constructor(resolver)?;
        if let Some(views) = self.views.get(&component_type.id) {
            for view in views {
                instance = view(instance);
            }
        }
        Ok(instance)
    }

    fn find_concrete_type(&self, abstract_name: &str) -> Option<TypeInfo> {
        self.bindings.get(abstract_name).cloned()
    }
}

impl DependencyInspector for TypeCatalog {
    fn inspect(&self, component_type: &TypeInfo) -> Vec<DependencyRequirement> {
        self.inspector.inspect(component_type)
    }
}

impl fmt::Debug for TypeCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeCatalog")
            .field("types", &self.constructors.len())
            .field("bindings", &self.bindings)
            .finish()
    }
}
