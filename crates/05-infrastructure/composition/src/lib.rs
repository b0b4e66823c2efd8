//! # 容器组合层
//!
//! 把注册表、解析器、配置加载和日志初始化组合成一个可直接使用的容器。
//!
//! ## 基本使用
//!
//! ```rust,no_run
//! use di_common::{DependencyResult, Lifetime};
//! use di_composition::{Container, LoggingConfig};
//! use di_impl::ServiceRegistry;
//! use std::sync::Arc;
//!
//! #[derive(Debug)]
//! struct Clock;
//!
//! fn clock_module(registry: &ServiceRegistry) -> DependencyResult<()> {
//!     registry.register(|| Arc::new(Clock), Lifetime::Singleton)
//! }
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let container = Container::builder()
//!         .with_config_file("config/di.toml")
//!         .with_logging(LoggingConfig::development())
//!         .add_module(clock_module)
//!         .build()?;
//!
//!     let scope = container.create_scope("request");
//!     let clock: Arc<Clock> = container.resolve(&scope)?;
//!     println!("{:?}", clock);
//!     Ok(())
//! }
//! ```

pub mod builder;
pub mod config;
pub mod container;

pub use builder::{ContainerBuilder, LoggingConfig};
pub use config::{load_container_config, ContainerConfigLoader, DEFAULT_ENV_PREFIX};
pub use container::Container;
