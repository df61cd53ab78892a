//! 可注入组件与实例
//!
//! [`Instance`] 是注册表持有的共享实例，[`Injectable`] 由组件类型实现（通常由
//! `component-macros` 生成），描述构造参数、注入成员以及构造方式。

use crate::inspector::DependencyRequirement;
use crate::resolver::DependencyResolver;
use infrastructure_common::{DynError, Lifecycle, TypeInfo};
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// 类型擦除的共享值
pub type AnyArc = Arc<dyn Any + Send + Sync>;

/// 组件实例
///
/// 克隆只复制引用，所有克隆指向同一个底层对象。除具体类型外，实例还可以通过
/// [`Instance::expose`] 以 trait object 的形式被取出。
#[derive(Clone)]
pub struct Instance {
    info: TypeInfo,
    value: AnyArc,
    lifecycle: Option<Arc<dyn Lifecycle>>,
    // TypeId(U) -> Arc<Arc<U>>
    views: HashMap<TypeId, AnyArc>,
}

impl Instance {
    /// 包装一个值
    pub fn new<T: Send + Sync + 'static>(value: T) -> Self {
        Self::from_arc(Arc::new(value))
    }

    /// 包装一个已共享的值
    pub fn from_arc<T: Send + Sync + 'static>(value: Arc<T>) -> Self {
        let mut views: HashMap<TypeId, AnyArc> = HashMap::new();
        views.insert(TypeId::of::<T>(), Arc::new(Arc::clone(&value)));

        Self {
            info: TypeInfo::of::<T>(),
            value,
            lifecycle: None,
            views,
        }
    }

    /// 包装一个具有生命周期能力的值
    pub fn with_lifecycle<T: Lifecycle + 'static>(value: T) -> Self {
        let value = Arc::new(value);
        let mut instance = Self::from_arc(Arc::clone(&value));
        instance.lifecycle = Some(value as Arc<dyn Lifecycle>);
        instance
    }

    /// 以类型 `U`（通常是 trait object）暴露实例
    pub fn expose<U: ?Sized + Send + Sync + 'static>(mut self, view: Arc<U>) -> Self {
        self.views.insert(TypeId::of::<U>(), Arc::new(view));
        self
    }

    /// 以类型 `U` 取出实例
    pub fn get<U: ?Sized + Send + Sync + 'static>(&self) -> Option<Arc<U>> {
        self.views
            .get(&TypeId::of::<U>())
            .and_then(|view| view.downcast_ref::<Arc<U>>())
            .cloned()
    }

    /// 以具体类型取出实例
    pub fn downcast<T: Send + Sync + 'static>(&self) -> Option<Arc<T>> {
        Arc::clone(&self.value).downcast::<T>().ok()
    }

    /// 是否可以以类型 `U` 取出
    pub fn exposes<U: ?Sized + 'static>(&self) -> bool {
        self.views.contains_key(&TypeId::of::<U>())
    }

    /// 生命周期能力
    pub fn lifecycle(&self) -> Option<&Arc<dyn Lifecycle>> {
        self.lifecycle.as_ref()
    }

    /// 实例的具体类型
    pub fn type_info(&self) -> &TypeInfo {
        &self.info
    }

    /// 实例的具体类型名称
    pub fn type_name(&self) -> &str {
        self.info.short_name()
    }

    /// 两个句柄是否指向同一个对象
    pub fn ptr_eq(&self, other: &Self) -> bool {
        std::ptr::eq(
            Arc::as_ptr(&self.value).cast::<u8>(),
            Arc::as_ptr(&other.value).cast::<u8>(),
        )
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instance")
            .field("type", &self.info.module_path)
            .field("lifecycle", &self.lifecycle.is_some())
            .field("views", &self.views.len())
            .finish()
    }
}

/// 可注入组件
///
/// 构造参数与注入成员都以类型描述，槽位名称取类型的简单名称。
pub trait Injectable: Sized + Send + Sync + 'static {
    /// 构造参数类型（按参数顺序）
    fn constructor_parameters() -> Vec<TypeInfo> {
        Vec::new()
    }

    /// 标记为注入的成员类型（按声明顺序）
    fn injected_members() -> Vec<TypeInfo> {
        Vec::new()
    }

    /// 使用解析器提供的依赖构造组件
    fn construct(resolver: &dyn DependencyResolver) -> Result<Self, DynError>;

    /// 把构造好的组件包装为实例
    fn into_instance(self) -> Instance {
        Instance::new(self)
    }
}

/// 类型的依赖元数据
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeMetadata {
    /// 组件类型
    pub type_info: TypeInfo,
    /// 构造参数类型
    pub constructor_parameters: Vec<TypeInfo>,
    /// 注入成员类型
    pub injected_members: Vec<TypeInfo>,
}

impl TypeMetadata {
    /// 从 [`Injectable`] 实现收集元数据
    pub fn of<T: Injectable>() -> Self {
        Self {
            type_info: TypeInfo::of::<T>(),
            constructor_parameters: T::constructor_parameters(),
            injected_members: T::injected_members(),
        }
    }

    /// 依赖需求：先构造参数，后注入成员
    pub fn requirements(&self) -> Vec<DependencyRequirement> {
        self.constructor_parameters
            .iter()
            .cloned()
            .map(DependencyRequirement::constructor)
            .chain(
                self.injected_members
                    .iter()
                    .cloned()
                    .map(DependencyRequirement::member),
            )
            .collect()
    }
}
