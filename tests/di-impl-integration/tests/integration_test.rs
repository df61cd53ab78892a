//! 跨 crate 的端到端测试：生命周期故障隔离、并发延迟解析、抽象类型绑定与配置

use di_abstractions::{
    ComponentDefinition, ComponentFactory, DependencyResolver, DependencyResolverExt, Injectable,
    Instance,
};
use di_impl::{SingletonRegistry, TypeCatalog};
use infrastructure_common::{
    DynError, Lifecycle, LifecycleError, LifecycleState, RegistryOptions, ShutdownOrder, TypeInfo,
};
use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// 写入内存的日志输出
#[derive(Clone, Default)]
struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl LogBuffer {
    fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for LogBuffer {
    type Writer = LogBuffer;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

static EVENTS: Mutex<Vec<String>> = Mutex::new(Vec::new());

fn record(event: String) {
    EVENTS.lock().unwrap().push(event);
}

struct HttpServer;

impl Injectable for HttpServer {
    fn construct(_resolver: &dyn DependencyResolver) -> Result<Self, DynError> {
        Ok(Self)
    }

    fn into_instance(self) -> Instance {
        Instance::with_lifecycle(self)
    }
}

impl Lifecycle for HttpServer {
    fn on_start(&self) -> Result<(), DynError> {
        record("start:HttpServer".into());
        Ok(())
    }
}

struct MailRelay;

impl Injectable for MailRelay {
    fn construct(_resolver: &dyn DependencyResolver) -> Result<Self, DynError> {
        Ok(Self)
    }

    fn into_instance(self) -> Instance {
        Instance::with_lifecycle(self)
    }
}

impl Lifecycle for MailRelay {
    fn on_start(&self) -> Result<(), DynError> {
        Err("smtp 连接被拒绝".into())
    }
}

struct JobQueue;

impl Injectable for JobQueue {
    fn construct(_resolver: &dyn DependencyResolver) -> Result<Self, DynError> {
        Ok(Self)
    }

    fn into_instance(self) -> Instance {
        Instance::with_lifecycle(self)
    }
}

impl Lifecycle for JobQueue {
    fn on_start(&self) -> Result<(), DynError> {
        record("start:JobQueue".into());
        Ok(())
    }

    fn on_stop(&self) -> Result<(), DynError> {
        record("stop:JobQueue".into());
        Ok(())
    }
}

#[test]
fn test_start_isolates_faulty_instance() -> anyhow::Result<()> {
    let mut catalog = TypeCatalog::new();
    catalog
        .register::<HttpServer>()
        .register::<MailRelay>()
        .register::<JobQueue>();
    let catalog = Arc::new(catalog);

    let mut registry = SingletonRegistry::new(catalog.clone());
    registry.register_singleton(ComponentDefinition::of::<HttpServer>().provides_self())?;
    registry.register_singleton(ComponentDefinition::of::<MailRelay>().provides_self())?;
    registry.register_singleton(ComponentDefinition::of::<JobQueue>().provides_self())?;
    registry.instantiate_singletons(catalog.as_ref())?;

    let buffer = LogBuffer::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(buffer.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::INFO)
        .finish();

    let report = tracing::subscriber::with_default(subscriber, || registry.start());

    let logs = buffer.contents();
    let error_lines: Vec<&str> = logs.lines().filter(|l| l.contains("ERROR")).collect();
    assert_eq!(error_lines.len(), 1, "日志: {logs}");
    assert!(error_lines[0].contains("MailRelay"));
    assert!(error_lines[0].contains("smtp 连接被拒绝"));

    assert_eq!(report.completed, 2);
    assert_eq!(report.faults.len(), 1);
    assert!(matches!(
        &report.faults[0].error,
        LifecycleError::StartFailed { type_name, .. } if type_name == "MailRelay"
    ));
    assert_eq!(
        registry.lifecycle_states(),
        [
            LifecycleState::Running,
            LifecycleState::Failed,
            LifecycleState::Running
        ]
    );

    let events = EVENTS.lock().unwrap();
    assert!(events.contains(&"start:HttpServer".to_string()));
    assert!(events.contains(&"start:JobQueue".to_string()));
    Ok(())
}

static EXPENSIVE_CREATED: AtomicUsize = AtomicUsize::new(0);

struct ExpensiveIndex;

impl Injectable for ExpensiveIndex {
    fn construct(_resolver: &dyn DependencyResolver) -> Result<Self, DynError> {
        EXPENSIVE_CREATED.fetch_add(1, Ordering::SeqCst);
        std::thread::sleep(std::time::Duration::from_millis(20));
        Ok(Self)
    }
}

#[test]
fn test_concurrent_lazy_resolution_creates_once() -> anyhow::Result<()> {
    let mut catalog = TypeCatalog::new();
    catalog.register::<ExpensiveIndex>();
    let catalog = Arc::new(catalog);

    let mut registry = SingletonRegistry::new(catalog.clone());
    registry.register_singleton(
        ComponentDefinition::of::<ExpensiveIndex>()
            .provides_self()
            .provides_name("SearchIndex")
            .lazy(),
    )?;
    registry.instantiate_singletons(catalog.as_ref())?;

    let registry = &registry;
    let factory: &dyn ComponentFactory = catalog.as_ref();
    let resolved: Vec<Instance> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let slot = if i % 2 == 0 { "ExpensiveIndex" } else { "SearchIndex" };
                scope.spawn(move || registry.resolve_dependency(slot, factory))
            })
            .collect();

        handles
            .into_iter()
            .map(|h| h.join().unwrap().unwrap().unwrap())
            .collect()
    });

    assert_eq!(EXPENSIVE_CREATED.load(Ordering::SeqCst), 1);
    assert!(resolved.iter().all(|instance| instance.ptr_eq(&resolved[0])));
    assert_eq!(registry.stats().lazy_instances, 1);
    Ok(())
}

trait PaymentGateway: Send + Sync {
    fn provider(&self) -> &'static str;
}

struct StripeGateway;

impl PaymentGateway for StripeGateway {
    fn provider(&self) -> &'static str {
        "stripe"
    }
}

impl Injectable for StripeGateway {
    fn construct(_resolver: &dyn DependencyResolver) -> Result<Self, DynError> {
        Ok(Self)
    }
}

struct CheckoutService {
    gateway: Arc<dyn PaymentGateway>,
}

impl Injectable for CheckoutService {
    fn constructor_parameters() -> Vec<TypeInfo> {
        vec![TypeInfo::of::<dyn PaymentGateway>()]
    }

    fn construct(resolver: &dyn DependencyResolver) -> Result<Self, DynError> {
        Ok(Self {
            gateway: resolver.require::<dyn PaymentGateway>()?,
        })
    }
}

#[test]
fn test_abstraction_binding_orders_and_injects() -> anyhow::Result<()> {
    let mut catalog = TypeCatalog::new();
    catalog
        .register::<CheckoutService>()
        .bind::<dyn PaymentGateway, StripeGateway>(|g| g as Arc<dyn PaymentGateway>);
    let catalog = Arc::new(catalog);

    let mut registry = SingletonRegistry::new(catalog.clone());
    registry.register_singleton(ComponentDefinition::of::<CheckoutService>().provides_self())?;
    registry.register_singleton(ComponentDefinition::of::<StripeGateway>().provides_self())?;

    let instances = registry.instantiate_singletons(catalog.as_ref())?.to_vec();

    assert_eq!(instances[0].type_name(), "StripeGateway");
    let checkout = instances[1]
        .get::<CheckoutService>()
        .ok_or_else(|| anyhow::anyhow!("CheckoutService 未创建"))?;
    assert_eq!(checkout.gateway.provider(), "stripe");

    let gateway = registry
        .resolve_dependency("StripeGateway", catalog.as_ref())?
        .ok_or_else(|| anyhow::anyhow!("StripeGateway 未解析"))?;
    assert!(gateway.ptr_eq(&instances[0]));
    // 抽象槽位没有被任何定义声明，直接解析时为空
    assert!(registry
        .resolve_dependency("PaymentGateway", catalog.as_ref())?
        .is_none());

    let graph = registry.dependency_graph(catalog.as_ref())?;
    assert_eq!(graph.edges().len(), 1);
    Ok(())
}

struct AuditLog;

impl Injectable for AuditLog {
    fn construct(_resolver: &dyn DependencyResolver) -> Result<Self, DynError> {
        Ok(Self)
    }

    fn into_instance(self) -> Instance {
        Instance::with_lifecycle(self)
    }
}

impl Lifecycle for AuditLog {
    fn on_stop(&self) -> Result<(), DynError> {
        record("stop:AuditLog".into());
        Ok(())
    }
}

#[test]
fn test_reverse_shutdown_from_config_file() -> anyhow::Result<()> {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile()?;
    writeln!(file, "[registry]\nshutdown_order = \"reverse\"")?;
    let options = RegistryOptions::load_from(file.path())?;
    assert_eq!(options.shutdown_order, ShutdownOrder::Reverse);

    let mut catalog = TypeCatalog::new();
    catalog.register::<AuditLog>().register::<JobQueue>();
    let catalog = Arc::new(catalog);

    let mut registry = SingletonRegistry::with_options(catalog.clone(), options);
    registry.register_singleton(ComponentDefinition::of::<AuditLog>().provides_self())?;
    registry.register_singleton(ComponentDefinition::of::<JobQueue>().provides_self())?;
    registry.instantiate_singletons(catalog.as_ref())?;

    let report = registry.shutdown();

    assert!(report.is_clean());
    assert_eq!(report.completed, 2);
    let events = EVENTS.lock().unwrap();
    let job_queue = events.iter().position(|e| e == "stop:JobQueue");
    let audit_log = events.iter().position(|e| e == "stop:AuditLog");
    assert!(job_queue.is_some() && audit_log.is_some());
    assert!(job_queue < audit_log);
    Ok(())
}
