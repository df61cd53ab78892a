//! 组件宏集成测试

use component_macros::{component, Injectable};
use di_abstractions::{
    ComponentDefinition, DependencyError, DependencyResolver, Injectable, InjectionPoint,
    NoDependencies, TypeMetadata,
};
use di_impl::{SingletonRegistry, TypeCatalog};
use infrastructure_common::{DynError, Lifecycle, TypeInfo};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[derive(Debug, Injectable)]
pub struct DatabasePool;

pub trait Cache: Send + Sync {
    fn name(&self) -> &'static str;
}

#[derive(Debug, Injectable)]
pub struct MemoryCache;

impl Cache for MemoryCache {
    fn name(&self) -> &'static str {
        "memory"
    }
}

/// 字段注入 + 生命周期能力
#[derive(Injectable)]
#[injectable(lifecycle)]
pub struct ReportService {
    #[inject]
    database: Arc<DatabasePool>,
    #[inject]
    cache: Option<Arc<dyn Cache>>,
    running: AtomicBool,
}

impl Lifecycle for ReportService {
    fn on_start(&self) -> Result<(), DynError> {
        self.running.store(true, Ordering::SeqCst);
        Ok(())
    }
}

/// 元组结构体
#[derive(Injectable)]
pub struct AuditTrail(#[inject] Arc<DatabasePool>, Vec<String>);

/// 构造函数注入
pub struct UserService {
    database: Arc<DatabasePool>,
    cache: Option<Arc<dyn Cache>>,
}

#[component]
impl UserService {
    #[constructor]
    pub fn new(database: Arc<DatabasePool>, cache: Option<Arc<dyn Cache>>) -> Self {
        Self { database, cache }
    }

    pub fn cache_name(&self) -> Option<&'static str> {
        self.cache.as_ref().map(|c| c.name())
    }
}

/// 返回 Result 的构造函数
pub struct QuotaGuard {
    limit: usize,
}

#[derive(Debug)]
pub struct QuotaError;

impl std::fmt::Display for QuotaError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("配额为零")
    }
}

impl std::error::Error for QuotaError {}

#[component]
impl QuotaGuard {
    #[constructor]
    fn build(database: Arc<DatabasePool>) -> Result<Self, QuotaError> {
        let _ = database;
        Err(QuotaError)
    }

    pub fn limit(&self) -> usize {
        self.limit
    }
}

#[test]
fn test_derive_collects_injected_members() {
    let metadata = TypeMetadata::of::<ReportService>();

    assert!(metadata.constructor_parameters.is_empty());
    assert_eq!(
        metadata.injected_members,
        vec![TypeInfo::of::<DatabasePool>(), TypeInfo::of::<dyn Cache>()]
    );
    let requirements = metadata.requirements();
    assert_eq!(requirements[1].slot_name(), "Cache");
    assert_eq!(requirements[1].point, InjectionPoint::Member);
}

#[test]
fn test_component_collects_constructor_parameters() {
    assert_eq!(
        UserService::constructor_parameters(),
        vec![TypeInfo::of::<DatabasePool>(), TypeInfo::of::<dyn Cache>()]
    );
    assert!(UserService::injected_members().is_empty());
    assert_eq!(AuditTrail::injected_members().len(), 1);
}

#[test]
fn test_missing_required_dependency_fails() {
    let error = match ReportService::construct(&NoDependencies) {
        Ok(_) => panic!("缺少依赖时不应构造成功"),
        Err(e) => e,
    };

    let error = error.downcast::<DependencyError>().unwrap();
    assert!(matches!(
        *error,
        DependencyError::MissingDependency { ref slot_name } if slot_name == "DatabasePool"
    ));
}

#[test]
fn test_generated_components_in_registry() {
    let mut catalog = TypeCatalog::new();
    catalog
        .register::<DatabasePool>()
        .register::<ReportService>()
        .register::<AuditTrail>()
        .register::<UserService>()
        .bind::<dyn Cache, MemoryCache>(|cache| cache as Arc<dyn Cache>);
    let catalog = Arc::new(catalog);

    let mut registry = SingletonRegistry::new(catalog.clone());
    for definition in [
        ComponentDefinition::of::<UserService>().provides_self(),
        ComponentDefinition::of::<ReportService>().provides_self(),
        ComponentDefinition::of::<AuditTrail>().provides_self(),
        ComponentDefinition::of::<DatabasePool>().provides_self(),
        ComponentDefinition::of::<MemoryCache>()
            .provides_self()
            .provides::<dyn Cache>()
            .lazy(),
    ] {
        registry.register_singleton(definition).unwrap();
    }

    let instances = registry.instantiate_singletons(catalog.as_ref()).unwrap().to_vec();

    assert_eq!(instances[0].type_name(), "DatabasePool");
    let database = instances[0].get::<DatabasePool>().unwrap();

    let users = registry
        .resolve_dependency("UserService", catalog.as_ref())
        .unwrap()
        .and_then(|i| i.get::<UserService>())
        .unwrap();
    assert!(Arc::ptr_eq(&users.database, &database));
    assert_eq!(users.cache_name(), Some("memory"));

    let reports = registry
        .resolve_dependency("ReportService", catalog.as_ref())
        .unwrap()
        .unwrap();
    assert!(reports.lifecycle().is_some());
    let service = reports.get::<ReportService>().unwrap();
    assert!(Arc::ptr_eq(&service.database, &database));
    assert!(service.cache.is_some());

    let audit = registry
        .resolve_dependency("AuditTrail", catalog.as_ref())
        .unwrap()
        .and_then(|i| i.get::<AuditTrail>())
        .unwrap();
    assert!(Arc::ptr_eq(&audit.0, &database));
    assert!(audit.1.is_empty());

    let report = registry.start();
    assert!(report.is_clean());
    assert!(service.running.load(Ordering::SeqCst));
}

#[test]
fn test_result_constructor_error_propagates() {
    struct Pool(Arc<DatabasePool>);

    impl DependencyResolver for Pool {
        fn resolve(
            &self,
            _slot_name: &str,
        ) -> di_abstractions::DependencyResult<Option<di_abstractions::Instance>> {
            Ok(Some(di_abstractions::Instance::from_arc(Arc::clone(&self.0))))
        }
    }

    let result = QuotaGuard::construct(&Pool(Arc::new(DatabasePool)));

    assert_eq!(result.err().map(|e| e.to_string()).as_deref(), Some("配额为零"));
    assert_eq!(QuotaGuard { limit: 3 }.limit(), 3);
}
