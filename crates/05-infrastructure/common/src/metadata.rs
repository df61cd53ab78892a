//! 元数据定义
//!
//! 提供组件和类型的元数据信息

use crate::conventions::NamingConventions;
use std::any::TypeId;
use std::fmt;

/// 类型信息
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeInfo {
    /// 简单类型名称（不含模块路径和泛型参数）
    pub name: String,
    /// 类型ID
    pub id: TypeId,
    /// 完整类型路径
    pub module_path: String,
}

impl TypeInfo {
    /// 从类型获取类型信息
    ///
    /// 支持 trait object，例如 `TypeInfo::of::<dyn Cache>()`。
    pub fn of<T: ?Sized + 'static>() -> Self {
        let full_name = std::any::type_name::<T>();
        Self {
            name: NamingConventions::simple_type_name(full_name).to_string(),
            id: TypeId::of::<T>(),
            module_path: full_name.to_string(),
        }
    }

    /// 获取简短的类型名称（不包含模块路径）
    pub fn short_name(&self) -> &str {
        &self.name
    }

    /// 是否为抽象类型（trait object）
    pub fn is_abstract(&self) -> bool {
        self.module_path.starts_with("dyn ")
    }
}

impl fmt::Display for TypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
