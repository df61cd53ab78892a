//! 依赖检查器抽象接口
//!
//! 检查器枚举一个组件类型的依赖需求，取代运行时反射

use infrastructure_common::{NamingConventions, TypeInfo};
use serde::{Deserialize, Serialize};

/// 注入点
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InjectionPoint {
    /// 构造参数
    Constructor,
    /// 标记为注入的成员
    Member,
}

/// 依赖需求
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyRequirement {
    /// 所需类型
    pub required_type: TypeInfo,
    /// 注入点
    pub point: InjectionPoint,
}

impl DependencyRequirement {
    /// 构造参数需求
    pub fn constructor(required_type: TypeInfo) -> Self {
        Self {
            required_type,
            point: InjectionPoint::Constructor,
        }
    }

    /// 注入成员需求
    pub fn member(required_type: TypeInfo) -> Self {
        Self {
            required_type,
            point: InjectionPoint::Member,
        }
    }

    /// 所需的槽位名称
    pub fn slot_name(&self) -> &str {
        NamingConventions::slot_name(&self.required_type)
    }

    /// 所需类型是否为抽象类型
    pub fn is_abstract(&self) -> bool {
        self.required_type.is_abstract()
    }
}

/// 依赖检查器 trait
pub trait DependencyInspector: Send + Sync {
    /// 按顺序返回类型的依赖需求：先构造参数，后注入成员
    ///
    /// 未知类型返回空列表。
    fn inspect(&self, component_type: &TypeInfo) -> Vec<DependencyRequirement>;
}
