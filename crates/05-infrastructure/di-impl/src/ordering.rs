//! 拓扑排序
//!
//! Kahn 算法：每一轮在所有提供方都已放置的定义中选择注册顺序最小的一个。

use crate::graph::DependencyGraph;
use di_abstractions::{ComponentDefinition, ComponentFactory, DependencyInspector};
use infrastructure_common::{DependencyError, DependencyResult};
use std::cmp::Reverse;
use std::collections::BinaryHeap;
use tracing::{debug, error};

/// 计算实例化顺序（节点下标）
///
/// 存在循环时返回 [`DependencyError::CyclicDependency`]，其中给出一条代表性的循环路径。
pub fn topological_order(graph: &DependencyGraph) -> DependencyResult<Vec<usize>> {
    let count = graph.len();
    let mut in_degree: Vec<usize> = (0..count).map(|i| graph.providers_of(i).len()).collect();
    let mut ready: BinaryHeap<Reverse<usize>> = in_degree
        .iter()
        .enumerate()
        .filter(|(_, degree)| **degree == 0)
        .map(|(index, _)| Reverse(index))
        .collect();
    let mut placed = vec![false; count];
    let mut order = Vec::with_capacity(count);

    while let Some(Reverse(index)) = ready.pop() {
        placed[index] = true;
        order.push(index);

        for &consumer in graph.consumers_of(index) {
            in_degree[consumer] -= 1;
            if in_degree[consumer] == 0 {
                ready.push(Reverse(consumer));
            }
        }
    }

    if order.len() == count {
        return Ok(order);
    }

    let cycle = find_cycle(graph, &placed);
    error!(cycle = %cycle.join(" -> "), "检测到循环依赖");
    Err(DependencyError::CyclicDependency { cycle })
}

/// 从未放置的最小下标出发，沿第一个未放置的提供方前进，直到遇到重复节点
///
/// 每个未放置的节点至少有一个未放置的提供方，所以这条路径一定会闭合。
fn find_cycle(graph: &DependencyGraph, placed: &[bool]) -> Vec<String> {
    let name = |index: usize| graph.definitions()[index].type_name().to_string();
    let mut path: Vec<usize> = Vec::new();
    let mut current = placed.iter().position(|p| !p);

    while let Some(index) = current {
        if let Some(start) = path.iter().position(|&visited| visited == index) {
            return path[start..]
                .iter()
                .copied()
                .chain(std::iter::once(index))
                .map(name)
                .collect();
        }

        path.push(index);
        current = graph
            .providers_of(index)
            .iter()
            .copied()
            .find(|&provider| !placed[provider]);
    }

    path.into_iter().map(name).collect()
}

/// 按依赖顺序排列图中的定义
pub fn order_graph(graph: &DependencyGraph) -> DependencyResult<Vec<ComponentDefinition>> {
    let order = topological_order(graph)?;
    let definitions = graph.definitions();

    debug!(
        "实例化顺序: {}",
        order
            .iter()
            .map(|&i| definitions[i].type_name())
            .collect::<Vec<_>>()
            .join(", ")
    );

    Ok(order.into_iter().map(|i| definitions[i].clone()).collect())
}

/// 按依赖顺序排列组件定义
///
/// 每个提供方都排在其使用方之前，互不依赖的定义保持注册顺序。
pub fn order_by_dependencies(
    definitions: &[ComponentDefinition],
    inspector: &dyn DependencyInspector,
    factory: &dyn ComponentFactory,
) -> DependencyResult<Vec<ComponentDefinition>> {
    let graph = DependencyGraph::build(definitions, inspector, factory, true)?;
    order_graph(&graph)
}
