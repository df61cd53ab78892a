//! # 示例应用程序
//!
//! 演示依赖顺序的单例注册、实例化、延迟解析和生命周期管理

use anyhow::Context;
use clap::Parser;
use component_macros::{component, Injectable};
use di_abstractions::ComponentDefinition;
use di_impl::{SingletonRegistry, TypeCatalog};
use infrastructure_common::{DynError, Lifecycle, RegistryOptions};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::{info, warn};

/// 命令行参数
#[derive(Parser, Debug)]
#[command(name = "example-app")]
#[command(about = "Lorn 组件生命周期示例应用")]
struct Args {
    /// 配置文件路径（默认读取 config/app 与 config/local）
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// 日志级别（RUST_LOG 优先）
    #[arg(long, default_value = "info")]
    log_level: String,

    /// 输出依赖关系图（JSON）后退出
    #[arg(long)]
    dump_graph: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // 初始化日志
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&args.log_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("启动 Lorn 组件生命周期示例应用");

    let options = match &args.config {
        Some(path) => RegistryOptions::load_from(path)
            .with_context(|| format!("读取配置失败: {}", path.display()))?,
        None => RegistryOptions::load().context("读取默认配置失败")?,
    };
    info!("注册表配置: {:?}", options);

    let catalog = Arc::new(build_catalog());
    let mut registry = SingletonRegistry::with_options(catalog.clone(), options);
    register_components(&mut registry)?;

    if args.dump_graph {
        let graph = registry.dependency_graph(catalog.as_ref())?;
        println!("{}", serde_json::to_string_pretty(&graph.snapshot())?);
        return Ok(());
    }

    let instances = registry.instantiate_singletons(catalog.as_ref())?;
    info!(
        "实例化顺序: {}",
        instances
            .iter()
            .map(|i| i.type_name())
            .collect::<Vec<_>>()
            .join(" -> ")
    );

    let report = registry.start();
    if !report.is_clean() {
        warn!("{} 个组件启动失败", report.faults.len());
    }

    demonstrate_lazy_resolution(&registry, &catalog)?;

    info!("注册表统计: {}", serde_json::to_string(&registry.stats())?);

    let report = registry.shutdown();
    info!(
        "应用已关闭: 停止 {} 个组件, 失败 {} 个",
        report.completed,
        report.faults.len()
    );
    Ok(())
}

/// 登记示例组件类型
fn build_catalog() -> TypeCatalog {
    let mut catalog = TypeCatalog::new();
    catalog
        .register::<AppSettings>()
        .register::<Database>()
        .register::<UserRepository>()
        .register::<UserService>()
        .register::<ReportGenerator>()
        .bind::<dyn Cache, MemoryCache>(|cache| cache as Arc<dyn Cache>);
    catalog
}

/// 注册示例组件（注册顺序与依赖顺序无关）
fn register_components(registry: &mut SingletonRegistry) -> anyhow::Result<()> {
    let definitions = [
        ComponentDefinition::of::<UserService>().provides_self(),
        ComponentDefinition::of::<UserRepository>().provides_self(),
        ComponentDefinition::of::<Database>().provides_self(),
        ComponentDefinition::of::<AppSettings>().provides_self(),
        ComponentDefinition::of::<MemoryCache>()
            .provides_self()
            .provides::<dyn Cache>()
            .lazy(),
        ComponentDefinition::of::<ReportGenerator>()
            .provides_self()
            .provides_name("Reports")
            .lazy(),
    ];

    for definition in definitions {
        registry.register_singleton(definition)?;
    }
    Ok(())
}

/// 演示延迟组件解析
fn demonstrate_lazy_resolution(
    registry: &SingletonRegistry,
    catalog: &TypeCatalog,
) -> anyhow::Result<()> {
    info!("演示延迟组件解析");

    let reports = registry
        .resolve_dependency("Reports", catalog)?
        .and_then(|instance| instance.get::<ReportGenerator>())
        .context("未找到报表组件")?;
    info!("生成报表: {}", reports.generate());

    let again = registry
        .resolve_dependency("ReportGenerator", catalog)?
        .and_then(|instance| instance.get::<ReportGenerator>())
        .context("未找到报表组件")?;
    info!("再次解析得到同一实例: {}", Arc::ptr_eq(&reports, &again));

    match registry.resolve_dependency("PaymentGateway", catalog)? {
        Some(_) => info!("解析到 PaymentGateway"),
        None => info!("未注册的槽位 PaymentGateway 返回空"),
    }
    Ok(())
}

/// 应用设置
#[derive(Debug, Injectable)]
pub struct AppSettings {
    app_name: String,
}

/// 数据库连接
#[derive(Debug, Injectable)]
#[injectable(lifecycle)]
pub struct Database {
    #[inject]
    settings: Arc<AppSettings>,
    connected: AtomicBool,
}

impl Lifecycle for Database {
    fn on_start(&self) -> Result<(), DynError> {
        self.connected.store(true, Ordering::SeqCst);
        info!("数据库已连接 (应用: {:?})", self.settings.app_name);
        Ok(())
    }

    fn on_stop(&self) -> Result<(), DynError> {
        self.connected.store(false, Ordering::SeqCst);
        Ok(())
    }
}

/// 缓存抽象
pub trait Cache: Send + Sync {
    /// 缓存实现名称
    fn backend(&self) -> &'static str;
}

/// 内存缓存
#[derive(Debug, Injectable)]
pub struct MemoryCache;

impl Cache for MemoryCache {
    fn backend(&self) -> &'static str {
        "memory"
    }
}

/// 用户仓储
pub struct UserRepository {
    database: Arc<Database>,
    cache: Option<Arc<dyn Cache>>,
}

#[component]
impl UserRepository {
    #[constructor]
    fn new(database: Arc<Database>, cache: Option<Arc<dyn Cache>>) -> Self {
        Self { database, cache }
    }

    fn describe(&self) -> String {
        format!(
            "数据库已连接: {}, 缓存: {}",
            self.database.connected.load(Ordering::SeqCst),
            self.cache.as_ref().map_or("无", |c| c.backend())
        )
    }
}

/// 用户服务
#[derive(Injectable)]
#[injectable(lifecycle)]
pub struct UserService {
    #[inject]
    repository: Arc<UserRepository>,
}

impl Lifecycle for UserService {
    fn on_start(&self) -> Result<(), DynError> {
        info!("用户服务已启动 ({})", self.repository.describe());
        Ok(())
    }
}

/// 报表生成器（延迟创建）
#[derive(Injectable)]
pub struct ReportGenerator {
    #[inject]
    repository: Arc<UserRepository>,
    generated: AtomicUsize,
}

impl ReportGenerator {
    fn generate(&self) -> String {
        let count = self.generated.fetch_add(1, Ordering::SeqCst) + 1;
        format!("第 {} 份报表 ({})", count, self.repository.describe())
    }
}
