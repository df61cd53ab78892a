//! 组件定义
//!
//! 注册表的输入：组件类型、声明的依赖槽位以及是否延迟创建

use infrastructure_common::{DependencyError, DependencyResult, NamingConventions, TypeInfo};
use std::collections::HashSet;

/// 组件定义
///
/// 一个定义描述一个单例组件以及它可以被解析的槽位名称。多个槽位名称互为别名，
/// 共享同一个实例。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComponentDefinition {
    component_type: Option<TypeInfo>,
    slot_names: Vec<String>,
    lazy: bool,
}

impl ComponentDefinition {
    /// 为类型 `T` 创建定义
    pub fn of<T: 'static>() -> Self {
        Self::new(TypeInfo::of::<T>())
    }

    /// 为给定类型信息创建定义
    pub fn new(component_type: TypeInfo) -> Self {
        Self {
            component_type: Some(component_type),
            slot_names: Vec::new(),
            lazy: false,
        }
    }

    /// 声明可以通过类型 `U` 的槽位解析
    ///
    /// `U` 可以是 trait object，例如 `provides::<dyn Cache>()` 声明槽位 `Cache`。
    pub fn provides<U: ?Sized + 'static>(self) -> Self {
        self.provides_name(NamingConventions::slot_name_of::<U>())
    }

    /// 声明一个显式命名的槽位
    pub fn provides_name(mut self, slot_name: impl Into<String>) -> Self {
        self.slot_names.push(slot_name.into());
        self
    }

    /// 声明组件自身类型的槽位
    pub fn provides_self(self) -> Self {
        match self.component_type.as_ref().map(|t| t.short_name().to_string()) {
            Some(name) => self.provides_name(name),
            None => self,
        }
    }

    /// 标记为延迟创建
    pub fn lazy(mut self) -> Self {
        self.lazy = true;
        self
    }

    /// 组件类型
    pub fn component_type(&self) -> Option<&TypeInfo> {
        self.component_type.as_ref()
    }

    /// 组件类型，未设置时返回注册错误
    pub fn require_type(&self) -> DependencyResult<&TypeInfo> {
        self.component_type
            .as_ref()
            .ok_or_else(|| DependencyError::invalid_registration(self.type_name(), "未指定组件类型"))
    }

    /// 组件类型的简单名称
    pub fn type_name(&self) -> &str {
        self.component_type
            .as_ref()
            .map_or("<unknown>", TypeInfo::short_name)
    }

    /// 声明的槽位名称（按声明顺序）
    pub fn slot_names(&self) -> &[String] {
        &self.slot_names
    }

    /// 是否延迟创建
    pub fn is_lazy(&self) -> bool {
        self.lazy
    }

    /// 是否声明了指定槽位
    pub fn satisfies(&self, slot_name: &str) -> bool {
        self.slot_names.iter().any(|s| s == slot_name)
    }

    /// 验证定义
    pub fn validate(&self) -> DependencyResult<()> {
        let type_name = self.require_type()?.short_name();

        if self.lazy && self.slot_names.is_empty() {
            return Err(DependencyError::invalid_registration(
                type_name,
                "延迟组件必须至少声明一个槽位",
            ));
        }

        let mut seen = HashSet::with_capacity(self.slot_names.len());
        for slot in &self.slot_names {
            if !NamingConventions::validate_slot_name(slot) {
                return Err(DependencyError::invalid_registration(
                    type_name,
                    format!("槽位名称无效: '{slot}'"),
                ));
            }
            if !seen.insert(slot.as_str()) {
                return Err(DependencyError::invalid_registration(
                    type_name,
                    format!("槽位名称重复: {slot}"),
                ));
            }
        }

        Ok(())
    }
}
