//! 基于显式元数据的依赖检查器

use di_abstractions::{DependencyInspector, DependencyRequirement, Injectable, TypeMetadata};
use infrastructure_common::TypeInfo;
use std::any::TypeId;
use std::collections::HashMap;

/// 元数据检查器
///
/// 持有按类型登记的 [`TypeMetadata`]，未登记的类型没有依赖需求。
#[derive(Debug, Default, Clone)]
pub struct MetadataInspector {
    metadata: HashMap<TypeId, TypeMetadata>,
}

impl MetadataInspector {
    /// 创建空检查器
    pub fn new() -> Self {
        Self::default()
    }

    /// 登记可注入类型的元数据
    pub fn register<T: Injectable>(&mut self) -> &mut Self {
        self.insert(TypeMetadata::of::<T>())
    }

    /// 登记元数据，同一类型后登记者覆盖先登记者
    pub fn insert(&mut self, metadata: TypeMetadata) -> &mut Self {
        self.metadata.insert(metadata.type_info.id, metadata);
        self
    }

    /// 查询类型元数据
    pub fn get(&self, component_type: &TypeInfo) -> Option<&TypeMetadata> {
        self.metadata.get(&component_type.id)
    }

    /// 已登记的类型数量
    pub fn len(&self) -> usize {
        self.metadata.len()
    }

    /// 是否没有登记任何类型
    pub fn is_empty(&self) -> bool {
        self.metadata.is_empty()
    }
}

impl DependencyInspector for MetadataInspector {
    fn inspect(&self, component_type: &TypeInfo) -> Vec<DependencyRequirement> {
        self.get(component_type)
            .map(TypeMetadata::requirements)
            .unwrap_or_default()
    }
}
