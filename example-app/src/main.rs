//! # 示例应用程序
//!
//! 演示如何使用 Lorn DI 注册服务、按生命周期解析服务以及一次性激活

use anyhow::Context;
use clap::Parser;
use di_common::{DependencyResult, Lifetime, ScopedContext};
use di_composition::{Container, LoggingConfig};
use di_impl::{ResolveOptions, ServiceModule, ServiceRegistry};
use parking_lot::Mutex;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{error, info};

/// 命令行参数
#[derive(Parser, Debug)]
#[command(name = "example-app")]
#[command(about = "Lorn DI 示例应用")]
struct Args {
    /// 容器配置文件路径
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// 模拟的请求数量
    #[arg(short, long, default_value_t = 3)]
    requests: usize,

    /// 日志级别
    #[arg(long, default_value = "info")]
    log_level: String,

    /// 使用 JSON 格式输出日志
    #[arg(long)]
    json: bool,
}

/// 时钟服务
trait Clock: Send + Sync {
    fn now_millis(&self) -> u64;
}

/// 单调递增的模拟时钟
struct TickingClock {
    ticks: AtomicU64,
}

impl Clock for TickingClock {
    fn now_millis(&self) -> u64 {
        self.ticks.fetch_add(1, Ordering::Relaxed)
    }
}

/// 单次请求内共享的审计日志
#[derive(Debug, Default)]
struct AuditLog {
    entries: Mutex<Vec<String>>,
}

impl AuditLog {
    fn record(&self, entry: impl Into<String>) {
        self.entries.lock().push(entry.into());
    }

    fn len(&self) -> usize {
        self.entries.lock().len()
    }
}

/// 请求处理器
struct RequestHandler {
    clock: Arc<dyn Clock>,
    audit: Arc<AuditLog>,
}

impl RequestHandler {
    fn handle(&self, request: &str) -> String {
        let at = self.clock.now_millis();
        self.audit.record(format!("{request}@{at}"));
        format!("{request} 已处理 (t={at}, 审计条目 {})", self.audit.len())
    }
}

/// 请求摘要，通过一次性激活构建
struct RequestSummary {
    request_id: String,
    audit_entries: usize,
}

/// 示例服务模块
struct RequestModule;

impl ServiceModule for RequestModule {
    fn register(&self, registry: &ServiceRegistry) -> DependencyResult<()> {
        registry.register(
            || -> Arc<dyn Clock> {
                Arc::new(TickingClock {
                    ticks: AtomicU64::new(0),
                })
            },
            Lifetime::Singleton,
        )?;
        registry.register(|| Arc::new(AuditLog::default()), Lifetime::Scoped)?;
        registry.register(
            |clock: Arc<dyn Clock>, audit: Arc<AuditLog>| Arc::new(RequestHandler { clock, audit }),
            Lifetime::Transient,
        )
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let logging = if args.json {
        LoggingConfig::production()
    } else {
        LoggingConfig::default()
    }
    .with_level(parse_log_level(&args.log_level));

    let mut builder = Container::builder()
        .with_logging(logging)
        .add_module(RequestModule);
    if let Some(path) = &args.config {
        builder = builder.with_config_file(path);
    }
    let container = Arc::new(builder.build().context("构建容器失败")?);

    info!("启动 Lorn DI 示例应用, 模拟 {} 个请求", args.requests);

    let mut handles = Vec::with_capacity(args.requests);
    for index in 0..args.requests {
        let container = container.clone();
        handles.push(tokio::task::spawn_blocking(move || {
            serve_request(&container, index)
        }));
    }

    for handle in handles {
        match handle.await? {
            Ok(summary) => info!(
                "请求 {} 完成, 审计条目 {}",
                summary.request_id, summary.audit_entries
            ),
            Err(e) => error!("请求失败: {}", e),
        }
    }

    let stats = container.stats();
    info!(
        "解析统计: 调用 {}, 失败 {}, 激活 {}, 单例 {}",
        stats.resolve_calls, stats.failed_resolves, stats.activations, stats.singletons
    );
    Ok(())
}

/// 在独立作用域中处理一次请求
fn serve_request(container: &Container, index: usize) -> DependencyResult<RequestSummary> {
    let scope: ScopedContext = container.create_scope(format!("request-{index}"));

    // 同一作用域内两次解析得到同一个审计日志
    for step in ["authorize", "bid"] {
        let handler: Arc<RequestHandler> = container.resolve(&scope)?;
        info!("{}", handler.handle(&format!("{}/{step}", scope.name())));
    }

    let summary: Arc<RequestSummary> = container.activate(
        &scope,
        |request_id: String, audit: Arc<AuditLog>| {
            Arc::new(RequestSummary {
                request_id,
                audit_entries: audit.len(),
            })
        },
        ResolveOptions::new().with_instance(scope.name().to_string()),
    )?;

    Ok(RequestSummary {
        request_id: summary.request_id.clone(),
        audit_entries: summary.audit_entries,
    })
}

/// 解析日志级别
fn parse_log_level(level: &str) -> tracing::Level {
    match level.to_lowercase().as_str() {
        "trace" => tracing::Level::TRACE,
        "debug" => tracing::Level::DEBUG,
        "warn" => tracing::Level::WARN,
        "error" => tracing::Level::ERROR,
        _ => tracing::Level::INFO,
    }
}
