//! 依赖解析器抽象接口
//!
//! 组件在构造时通过解析器按槽位名称获取依赖

use crate::injectable::Instance;
use infrastructure_common::{DependencyError, DependencyResult, NamingConventions};
use std::sync::Arc;

/// 依赖解析器 trait
pub trait DependencyResolver {
    /// 按槽位名称解析实例
    ///
    /// 未知槽位返回 `Ok(None)`，只有创建失败或循环依赖等情况才返回错误。
    fn resolve(&self, slot_name: &str) -> DependencyResult<Option<Instance>>;
}

/// 按类型解析的便捷方法
///
/// 槽位名称取 `T` 的简单名称，`T` 可以是 trait object。
pub trait DependencyResolverExt: DependencyResolver {
    /// 解析必需依赖
    fn require<T: ?Sized + Send + Sync + 'static>(&self) -> DependencyResult<Arc<T>> {
        let slot_name = NamingConventions::slot_name_of::<T>();
        match self.resolve(&slot_name)? {
            Some(instance) => view_of::<T>(slot_name, &instance),
            None => Err(DependencyError::MissingDependency { slot_name }),
        }
    }

    /// 解析可选依赖
    fn optional<T: ?Sized + Send + Sync + 'static>(&self) -> DependencyResult<Option<Arc<T>>> {
        let slot_name = NamingConventions::slot_name_of::<T>();
        self.resolve(&slot_name)?
            .map(|instance| view_of::<T>(slot_name, &instance))
            .transpose()
    }
}

impl<R: DependencyResolver + ?Sized> DependencyResolverExt for R {}

fn view_of<T: ?Sized + Send + Sync + 'static>(
    slot_name: String,
    instance: &Instance,
) -> DependencyResult<Arc<T>> {
    instance
        .get::<T>()
        .ok_or_else(|| DependencyError::TypeMismatch {
            slot_name,
            expected: std::any::type_name::<T>().to_string(),
            actual: instance.type_info().module_path.clone(),
        })
}

/// 不提供任何依赖的解析器
#[derive(Debug, Default, Clone, Copy)]
pub struct NoDependencies;

impl DependencyResolver for NoDependencies {
    fn resolve(&self, _slot_name: &str) -> DependencyResult<Option<Instance>> {
        Ok(None)
    }
}
