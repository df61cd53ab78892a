//! # 依赖注入具体实现
//!
//! 提供依赖关系图、拓扑排序、单例注册表和生命周期控制器的具体实现。
//!
//! ```ignore
//! let mut catalog = TypeCatalog::new();
//! catalog.register::<Database>().register::<UserService>();
//! let catalog = Arc::new(catalog);
//!
//! let mut registry = SingletonRegistry::new(catalog.clone());
//! registry.register_singleton(ComponentDefinition::of::<Database>().provides_self())?;
//! registry.register_singleton(ComponentDefinition::of::<UserService>().provides_self())?;
//! registry.instantiate_singletons(catalog.as_ref())?;
//! registry.start();
//! ```

pub mod factory;
pub mod graph;
pub mod inspector;
pub mod lifecycle;
pub mod ordering;
pub mod registry;

#[cfg(test)]
mod testing;

pub use factory::TypeCatalog;
pub use graph::{DependencyEdge, DependencyGraph, EdgeKind, EdgeSnapshot, GraphSnapshot, NodeSnapshot};
pub use inspector::MetadataInspector;
pub use lifecycle::LifecycleController;
pub use ordering::{order_by_dependencies, order_graph, topological_order};
pub use registry::SingletonRegistry;
