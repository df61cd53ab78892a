//! 依赖关系图
//!
//! 节点是组件定义（按注册顺序编号），边从使用方指向提供方。

use di_abstractions::{ComponentDefinition, ComponentFactory, DependencyInspector};
use infrastructure_common::{DependencyError, DependencyResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, error};

/// 边的来源
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeKind {
    /// 需求的槽位直接由提供方声明
    Direct,
    /// 经抽象类型查找到的具体类型槽位
    Abstraction,
}

/// 依赖边
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyEdge {
    /// 使用方下标
    pub consumer: usize,
    /// 提供方下标
    pub provider: usize,
    /// 匹配到的槽位名称
    pub slot_name: String,
    /// 边的来源
    pub kind: EdgeKind,
}

/// 依赖关系图
#[derive(Debug, Clone)]
pub struct DependencyGraph {
    /// 节点（按注册顺序）
    definitions: Vec<ComponentDefinition>,
    /// 边列表
    edges: Vec<DependencyEdge>,
    /// 邻接表：使用方 -> 提供方
    adjacency_list: Vec<Vec<usize>>,
    /// 反向邻接表：提供方 -> 使用方
    reverse_adjacency_list: Vec<Vec<usize>>,
}

impl DependencyGraph {
    /// 构建依赖关系图
    ///
    /// 需求按检查器给出的顺序处理。槽位先按名称直接匹配（同名槽位取最先注册的定义），
    /// 未匹配且需求为抽象类型时通过工厂查找具体类型再匹配，仍未匹配的需求被忽略。
    /// 定义依赖自身声明的槽位视为长度为一的循环。
    pub fn build(
        definitions: &[ComponentDefinition],
        inspector: &dyn DependencyInspector,
        factory: &dyn ComponentFactory,
        abstraction_lookup: bool,
    ) -> DependencyResult<Self> {
        for definition in definitions {
            definition.validate()?;
        }

        let mut slot_index: HashMap<&str, usize> = HashMap::new();
        for (index, definition) in definitions.iter().enumerate() {
            for slot in definition.slot_names() {
                slot_index.entry(slot.as_str()).or_insert(index);
            }
        }

        let mut graph = Self::with_nodes(definitions.to_vec());

        for (consumer, definition) in definitions.iter().enumerate() {
            let component_type = definition.require_type()?;

            for requirement in inspector.inspect(component_type) {
                let slot = requirement.slot_name();

                let (provider_slot, kind) =
                    if slot_index.contains_key(slot) || definition.satisfies(slot) {
                        (slot.to_string(), EdgeKind::Direct)
                    } else if abstraction_lookup && requirement.is_abstract() {
                        match factory.find_concrete_type(slot) {
                            Some(concrete) => {
                                debug!(
                                    "抽象类型查找: {} -> {} (使用方 {})",
                                    slot,
                                    concrete.short_name(),
                                    definition.type_name()
                                );
                                (concrete.short_name().to_string(), EdgeKind::Abstraction)
                            }
                            None => {
                                debug!("忽略无法解析的依赖: {} 需要 {}", definition.type_name(), slot);
                                continue;
                            }
                        }
                    } else {
                        debug!("忽略无法解析的依赖: {} 需要 {}", definition.type_name(), slot);
                        continue;
                    };

                if definition.satisfies(&provider_slot) {
                    let name = definition.type_name().to_string();
                    error!(component = %name, slot = %provider_slot, "组件依赖自身");
                    return Err(DependencyError::CyclicDependency {
                        cycle: vec![name.clone(), name],
                    });
                }

                match slot_index.get(provider_slot.as_str()) {
                    Some(&provider) => graph.add_edge(consumer, provider, provider_slot, kind),
                    None => {
                        debug!(
                            "忽略无法解析的依赖: {} 需要 {}",
                            definition.type_name(),
                            provider_slot
                        );
                    }
                }
            }
        }

        debug!(
            "依赖关系图构建完成: {} 个节点, {} 条边",
            graph.len(),
            graph.edges.len()
        );
        Ok(graph)
    }

    fn with_nodes(definitions: Vec<ComponentDefinition>) -> Self {
        let count = definitions.len();
        Self {
            definitions,
            edges: Vec::new(),
            adjacency_list: vec![Vec::new(); count],
            reverse_adjacency_list: vec![Vec::new(); count],
        }
    }

    /// 添加依赖边，同一对节点只保留第一条
    fn add_edge(&mut self, consumer: usize, provider: usize, slot_name: String, kind: EdgeKind) {
        if self.adjacency_list[consumer].contains(&provider) {
            return;
        }

        self.adjacency_list[consumer].push(provider);
        self.reverse_adjacency_list[provider].push(consumer);
        self.edges.push(DependencyEdge {
            consumer,
            provider,
            slot_name,
            kind,
        });
    }

    /// 节点数量
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    /// 是否没有节点
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// 所有节点
    pub fn definitions(&self) -> &[ComponentDefinition] {
        &self.definitions
    }

    /// 声明该槽位的第一个定义（按注册顺序）
    pub fn slot_owner(&self, slot_name: &str) -> Option<usize> {
        self.definitions.iter().position(|d| d.satisfies(slot_name))
    }

    /// 所有边
    pub fn edges(&self) -> &[DependencyEdge] {
        &self.edges
    }

    /// 节点的提供方（按需求顺序）
    pub fn providers_of(&self, index: usize) -> &[usize] {
        self.adjacency_list
            .get(index)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// 节点的使用方
    pub fn consumers_of(&self, index: usize) -> &[usize] {
        self.reverse_adjacency_list
            .get(index)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// 导出可序列化的快照
    pub fn snapshot(&self) -> GraphSnapshot {
        let name = |index: usize| self.definitions[index].type_name().to_string();

        GraphSnapshot {
            nodes: self
                .definitions
                .iter()
                .enumerate()
                .map(|(index, definition)| NodeSnapshot {
                    index,
                    type_name: definition.type_name().to_string(),
                    slot_names: definition.slot_names().to_vec(),
                    lazy: definition.is_lazy(),
                })
                .collect(),
            edges: self
                .edges
                .iter()
                .map(|edge| EdgeSnapshot {
                    consumer: name(edge.consumer),
                    provider: name(edge.provider),
                    slot_name: edge.slot_name.clone(),
                    kind: edge.kind,
                })
                .collect(),
        }
    }
}

/// 依赖关系图快照
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphSnapshot {
    /// 节点
    pub nodes: Vec<NodeSnapshot>,
    /// 边
    pub edges: Vec<EdgeSnapshot>,
}

/// 节点快照
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeSnapshot {
    /// 注册顺序下标
    pub index: usize,
    /// 组件类型名称
    pub type_name: String,
    /// 声明的槽位
    pub slot_names: Vec<String>,
    /// 是否延迟创建
    pub lazy: bool,
}

/// 边快照
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeSnapshot {
    /// 使用方类型名称
    pub consumer: String,
    /// 提供方类型名称
    pub provider: String,
    /// 匹配到的槽位名称
    pub slot_name: String,
    /// 边的来源
    pub kind: EdgeKind,
}
