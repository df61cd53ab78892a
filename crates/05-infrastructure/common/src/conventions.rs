//! 约定规范定义
//!
//! 依赖槽位按约定以类型的简单名称命名

use crate::metadata::TypeInfo;

/// 命名约定规范
#[derive(Debug)]
pub struct NamingConventions;

impl NamingConventions {
    /// 从完整类型路径提取简单类型名称
    ///
    /// `dyn app::Cache + Send` -> `Cache`，`app::Repo<alloc::string::String>` -> `Repo`
    pub fn simple_type_name(full_name: &str) -> &str {
        let name = full_name.strip_prefix("dyn ").unwrap_or(full_name);
        let end = name.find(['<', ' ']).unwrap_or(name.len());
        let base = &name[..end];

        base.rsplit("::").next().unwrap_or(base)
    }

    /// 从类型信息获取依赖槽位名称
    pub fn slot_name(type_info: &TypeInfo) -> &str {
        type_info.short_name()
    }

    /// 获取类型 `T` 的依赖槽位名称
    pub fn slot_name_of<T: ?Sized + 'static>() -> String {
        Self::simple_type_name(std::any::type_name::<T>()).to_string()
    }

    /// 验证槽位名称
    pub fn validate_slot_name(name: &str) -> bool {
        !name.is_empty() && !name.chars().any(char::is_whitespace)
    }
}
