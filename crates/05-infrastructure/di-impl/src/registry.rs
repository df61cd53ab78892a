//! 单例注册表
//!
//! 持有组件定义、按依赖顺序创建的实例数组以及槽位缓存。非延迟定义在
//! [`SingletonRegistry::instantiate_singletons`] 中一次性创建，延迟定义在其任一槽位
//! 第一次被解析时创建，且只创建一次。

use crate::graph::DependencyGraph;
use crate::lifecycle::LifecycleController;
use crate::ordering;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use di_abstractions::{
    ComponentDefinition, ComponentFactory, DependencyInspector, DependencyResolver, Instance,
    RegistryStats, SingletonContainer,
};
use infrastructure_common::{
    DependencyError, DependencyResult, DuplicateSlotPolicy, LifecycleReport, LifecycleState,
    RegistryOptions,
};
use once_cell::sync::OnceCell;
use std::sync::Arc;
use tracing::{debug, error, info};

/// 延迟组件
#[derive(Debug)]
struct LazyComponent {
    definition: ComponentDefinition,
    cell: OnceCell<Instance>,
}

/// 单例注册表
pub struct SingletonRegistry {
    inspector: Arc<dyn DependencyInspector>,
    options: RegistryOptions,
    /// 按注册顺序的全部定义
    definitions: Vec<ComponentDefinition>,
    /// 按依赖顺序的非延迟定义，与 `instances` 下标对齐
    ordered: Vec<ComponentDefinition>,
    instances: Vec<Instance>,
    slots: DashMap<String, Instance>,
    lazy: Vec<LazyComponent>,
    lifecycle: LifecycleController,
    instantiated: bool,
}

impl SingletonRegistry {
    /// 使用默认配置创建注册表
    pub fn new(inspector: Arc<dyn DependencyInspector>) -> Self {
        Self::with_options(inspector, RegistryOptions::default())
    }

    /// 使用指定配置创建注册表
    pub fn with_options(inspector: Arc<dyn DependencyInspector>, options: RegistryOptions) -> Self {
        Self {
            inspector,
            options,
            definitions: Vec::new(),
            ordered: Vec::new(),
            instances: Vec::new(),
            slots: DashMap::new(),
            lazy: Vec::new(),
            lifecycle: LifecycleController::new(),
            instantiated: false,
        }
    }

    /// 注册单例定义
    ///
    /// 只做校验和追加，不涉及依赖图。实例化之后不再接受注册。
    pub fn register_singleton(&mut self, definition: ComponentDefinition) -> DependencyResult<()> {
        if self.instantiated {
            return Err(DependencyError::RegistrationClosed {
                type_name: definition.type_name().to_string(),
            });
        }

        definition.validate()?;

        if self.options.duplicate_slots == DuplicateSlotPolicy::Reject {
            for slot in definition.slot_names() {
                if let Some(owner) = self.definitions.iter().find(|d| d.satisfies(slot)) {
                    return Err(DependencyError::invalid_registration(
                        definition.type_name(),
                        format!("槽位 {} 已被 {} 占用", slot, owner.type_name()),
                    ));
                }
            }
        }

        info!(
            "注册单例组件: {} (槽位: [{}], 延迟: {})",
            definition.type_name(),
            definition.slot_names().join(", "),
            definition.is_lazy()
        );

        if definition.is_lazy() {
            self.lazy.push(LazyComponent {
                definition: definition.clone(),
                cell: OnceCell::new(),
            });
        }
        self.definitions.push(definition);
        Ok(())
    }

    /// 按依赖顺序实例化所有非延迟单例
    ///
    /// 只能成功执行一次。排序失败时不创建任何实例；工厂失败时撤销本轮写入的槽位，
    /// 实例数组保持为空。
    pub fn instantiate_singletons(
        &mut self,
        factory: &dyn ComponentFactory,
    ) -> DependencyResult<&[Instance]> {
        if self.instantiated {
            return Err(DependencyError::AlreadyInstantiated);
        }

        let graph = self.dependency_graph(factory)?;
        let order = ordering::topological_order(&graph)?;
        let instances = self.create_all(&graph, &order, factory)?;
        let ordered = order
            .iter()
            .map(|&i| graph.definitions()[i].clone())
            .collect();

        info!("单例实例化完成: {} 个实例", instances.len());

        self.lifecycle.track(instances.len());
        self.ordered = ordered;
        self.instances = instances;
        self.instantiated = true;
        Ok(&self.instances)
    }

    /// 非延迟定义的依赖关系图
    pub fn dependency_graph(
        &self,
        factory: &dyn ComponentFactory,
    ) -> DependencyResult<DependencyGraph> {
        let eager: Vec<ComponentDefinition> = self
            .definitions
            .iter()
            .filter(|d| !d.is_lazy())
            .cloned()
            .collect();

        DependencyGraph::build(
            &eager,
            self.inspector.as_ref(),
            factory,
            self.options.abstraction_lookup,
        )
    }

    /// 按 `order` 创建实例
    ///
    /// 同一槽位只由最先注册的声明者写入缓存，与依赖图的连边保持一致。
    fn create_all(
        &self,
        graph: &DependencyGraph,
        order: &[usize],
        factory: &dyn ComponentFactory,
    ) -> DependencyResult<Vec<Instance>> {
        let mut instances = Vec::with_capacity(order.len());
        let mut inserted: Vec<&str> = Vec::new();

        for &index in order {
            let definition = &graph.definitions()[index];
            let scope = ResolutionScope::new(self, factory, Vec::new());
            let instance = match create(definition, factory, &scope) {
                Ok(instance) => instance,
                Err(e) => {
                    error!(component = %definition.type_name(), error = %e, "单例创建失败");
                    for slot in inserted {
                        self.slots.remove(slot);
                    }
                    return Err(e);
                }
            };

            info!("创建单例组件: {}", definition.type_name());

            for slot in definition.slot_names() {
                if graph.slot_owner(slot) != Some(index) {
                    debug!("槽位 {} 由先注册的定义提供, {} 不写入", slot, definition.type_name());
                } else if self.cache(slot, &instance) {
                    inserted.push(slot);
                } else {
                    debug!("槽位 {} 已被占用, {} 不覆盖", slot, definition.type_name());
                }
            }
            instances.push(instance);
        }

        Ok(instances)
    }

    /// 写入槽位缓存，已有条目时保持不变
    fn cache(&self, slot: &str, instance: &Instance) -> bool {
        match self.slots.entry(slot.to_string()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(entry) => {
                entry.insert(instance.clone());
                true
            }
        }
    }

    /// 按槽位名称解析实例
    ///
    /// 缓存命中直接返回；否则创建第一个声明该槽位的延迟定义；未知槽位返回 `None`。
    pub fn resolve_dependency(
        &self,
        slot_name: &str,
        factory: &dyn ComponentFactory,
    ) -> DependencyResult<Option<Instance>> {
        let resolved = self.lookup(slot_name, factory, &[])?;
        if resolved.is_none() {
            debug!("未找到槽位: {}", slot_name);
        }
        Ok(resolved)
    }

    /// 组件构造过程中的解析
    ///
    /// 与依赖图一致：槽位未被任何定义声明时，按工厂给出的具体类型再查找一次。
    fn resolve_in(
        &self,
        slot_name: &str,
        factory: &dyn ComponentFactory,
        chain: &[usize],
    ) -> DependencyResult<Option<Instance>> {
        if let Some(instance) = self.lookup(slot_name, factory, chain)? {
            return Ok(Some(instance));
        }

        if self.options.abstraction_lookup {
            if let Some(concrete) = factory.find_concrete_type(slot_name) {
                let concrete_slot = concrete.short_name();
                if concrete_slot != slot_name {
                    debug!("抽象类型查找: {} -> {}", slot_name, concrete_slot);
                    return self.lookup(concrete_slot, factory, chain);
                }
            }
        }

        debug!("未找到槽位: {}", slot_name);
        Ok(None)
    }

    fn lookup(
        &self,
        slot_name: &str,
        factory: &dyn ComponentFactory,
        chain: &[usize],
    ) -> DependencyResult<Option<Instance>> {
        let cached = self.slots.get(slot_name).map(|entry| entry.value().clone());
        if cached.is_some() {
            debug!("槽位缓存命中: {}", slot_name);
            return Ok(cached);
        }

        match self
            .lazy
            .iter()
            .position(|lazy| lazy.definition.satisfies(slot_name))
        {
            Some(index) => self.instantiate_lazy(index, factory, chain).map(Some),
            None => Ok(None),
        }
    }

    fn instantiate_lazy(
        &self,
        index: usize,
        factory: &dyn ComponentFactory,
        chain: &[usize],
    ) -> DependencyResult<Instance> {
        if let Some(start) = chain.iter().position(|&i| i == index) {
            let cycle: Vec<String> = chain[start..]
                .iter()
                .chain(std::iter::once(&index))
                .map(|&i| self.lazy[i].definition.type_name().to_string())
                .collect();
            error!(cycle = %cycle.join(" -> "), "检测到循环依赖");
            return Err(DependencyError::CyclicDependency { cycle });
        }

        let lazy = &self.lazy[index];
        let instance = lazy
            .cell
            .get_or_try_init(|| {
                let mut nested = chain.to_vec();
                nested.push(index);
                let scope = ResolutionScope::new(self, factory, nested);
                let instance = create(&lazy.definition, factory, &scope)?;
                info!("创建延迟单例组件: {}", lazy.definition.type_name());
                Ok::<_, DependencyError>(instance)
            })?
            .clone();

        for slot in lazy.definition.slot_names() {
            self.cache(slot, &instance);
        }
        Ok(instance)
    }

    /// 启动所有非延迟单例
    pub fn start(&self) -> LifecycleReport {
        self.lifecycle.start(&self.instances)
    }

    /// 停止所有非延迟单例
    pub fn shutdown(&self) -> LifecycleReport {
        self.lifecycle
            .shutdown(&self.instances, self.options.shutdown_order)
    }

    /// 按依赖顺序的实例数组
    pub fn instances(&self) -> &[Instance] {
        &self.instances
    }

    /// 与实例数组对齐的定义
    pub fn ordered_definitions(&self) -> &[ComponentDefinition] {
        &self.ordered
    }

    /// 按注册顺序的全部定义
    pub fn definitions(&self) -> &[ComponentDefinition] {
        &self.definitions
    }

    /// 注册表配置
    pub fn options(&self) -> &RegistryOptions {
        &self.options
    }

    /// 是否已完成实例化
    pub fn is_instantiated(&self) -> bool {
        self.instantiated
    }

    /// 各非延迟实例的生命周期状态
    pub fn lifecycle_states(&self) -> Vec<LifecycleState> {
        self.lifecycle.states()
    }

    /// 统计信息
    pub fn stats(&self) -> RegistryStats {
        RegistryStats {
            registered_definitions: self.definitions.len(),
            lazy_definitions: self.lazy.len(),
            eager_instances: self.instances.len(),
            lazy_instances: self.lazy.iter().filter(|l| l.cell.get().is_some()).count(),
            cached_slots: self.slots.len(),
            instantiated: self.instantiated,
        }
    }
}

fn create(
    definition: &ComponentDefinition,
    factory: &dyn ComponentFactory,
    resolver: &dyn DependencyResolver,
) -> DependencyResult<Instance> {
    let component_type = definition.require_type()?;
    factory
        .create(component_type, resolver)
        .map_err(|e| match e.downcast::<DependencyError>() {
            // 循环依赖原样上抛，其余错误归到当前组件
            Ok(inner) if matches!(*inner, DependencyError::CyclicDependency { .. }) => *inner,
            Ok(inner) => DependencyError::creation_failed(definition.type_name(), inner),
            Err(e) => DependencyError::creation_failed(definition.type_name(), e),
        })
}

/// 一次创建过程中的解析器
///
/// `chain` 记录正在创建的延迟定义，用于发现延迟组件之间的循环依赖。
struct ResolutionScope<'a> {
    registry: &'a SingletonRegistry,
    factory: &'a dyn ComponentFactory,
    chain: Vec<usize>,
}

impl<'a> ResolutionScope<'a> {
    fn new(
        registry: &'a SingletonRegistry,
        factory: &'a dyn ComponentFactory,
        chain: Vec<usize>,
    ) -> Self {
        Self {
            registry,
            factory,
            chain,
        }
    }
}

impl DependencyResolver for ResolutionScope<'_> {
    fn resolve(&self, slot_name: &str) -> DependencyResult<Option<Instance>> {
        self.registry.resolve_in(slot_name, self.factory, &self.chain)
    }
}

impl SingletonContainer for SingletonRegistry {
    fn register_singleton(&mut self, definition: ComponentDefinition) -> DependencyResult<()> {
        SingletonRegistry::register_singleton(self, definition)
    }

    fn instantiate_singletons(
        &mut self,
        factory: &dyn ComponentFactory,
    ) -> DependencyResult<&[Instance]> {
        SingletonRegistry::instantiate_singletons(self, factory)
    }

    fn resolve_dependency(
        &self,
        slot_name: &str,
        factory: &dyn ComponentFactory,
    ) -> DependencyResult<Option<Instance>> {
        SingletonRegistry::resolve_dependency(self, slot_name, factory)
    }

    fn start(&self) -> LifecycleReport {
        SingletonRegistry::start(self)
    }

    fn shutdown(&self) -> LifecycleReport {
        SingletonRegistry::shutdown(self)
    }
}

impl std::fmt::Debug for SingletonRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SingletonRegistry")
            .field("options", &self.options)
            .field("definitions", &self.definitions.len())
            .field("instances", &self.instances.len())
            .field("cached_slots", &self.slots.len())
            .field("instantiated", &self.instantiated)
            .finish()
    }
}
