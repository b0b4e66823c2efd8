//! 容器构建器

use crate::config::ContainerConfigLoader;
use crate::container::Container;
use di_abstractions::ContainerConfig;
use di_common::{InfrastructureError, InfrastructureResult};
use di_impl::{DependencyValidator, Resolver, ServiceModule, ServiceRegistry};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

/// 容器构建器
///
/// 依次完成：日志初始化、配置加载、模块注册、可选的依赖验证。
pub struct ContainerBuilder {
    /// 显式提供的配置，优先于配置文件
    config: Option<ContainerConfig>,
    /// 配置文件路径
    config_file: Option<PathBuf>,
    /// 环境变量前缀
    env_prefix: Option<String>,
    /// 服务模块
    modules: Vec<Box<dyn ServiceModule>>,
    /// 已有的注册表
    registry: Option<ServiceRegistry>,
    /// 是否初始化日志
    logging_enabled: bool,
    /// 日志配置
    logging_config: LoggingConfig,
}

impl ContainerBuilder {
    /// 创建新的容器构建器
    pub fn new() -> Self {
        Self {
            config: None,
            config_file: None,
            env_prefix: None,
            modules: Vec::new(),
            registry: None,
            logging_enabled: false, // 默认不启用日志初始化
            logging_config: LoggingConfig::default(),
        }
    }

    /// 直接使用给定配置，跳过配置文件和环境变量
    pub fn with_config(mut self, config: ContainerConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// 从配置文件加载配置
    pub fn with_config_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_file = Some(path.as_ref().to_path_buf());
        self
    }

    /// 设置配置环境变量前缀
    pub fn with_env_prefix<S: Into<String>>(mut self, prefix: S) -> Self {
        self.env_prefix = Some(prefix.into());
        self
    }

    /// 在已有注册表上继续注册
    pub fn with_registry(mut self, registry: ServiceRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    /// 添加服务模块
    pub fn add_module<M>(mut self, module: M) -> Self
    where
        M: ServiceModule + 'static,
    {
        self.modules.push(Box::new(module));
        self
    }

    /// 启用日志初始化
    pub fn with_logging(mut self, config: LoggingConfig) -> Self {
        self.logging_config = config;
        self.logging_enabled = true;
        self
    }

    /// 构建容器
    pub fn build(self) -> InfrastructureResult<Container> {
        // 只有在明确配置了日志时才初始化日志
        if self.logging_enabled {
            self.initialize_logging()?;
        }

        info!("开始构建容器");
        let config = self.load_config()?;

        let registry = self.registry.unwrap_or_default();
        registry.register_modules(&self.modules)?;
        info!(
            "注册了 {} 个模块, {} 个服务类型",
            self.modules.len(),
            registry.len()
        );

        if config.validate_on_build {
            DependencyValidator::new().validate(&registry)?;
        } else {
            warn!("已跳过依赖验证");
        }

        let resolver = Resolver::with_config(Arc::new(registry), config);
        info!("容器构建完成");
        Ok(Container::new(resolver))
    }

    fn load_config(&self) -> InfrastructureResult<ContainerConfig> {
        if let Some(config) = &self.config {
            config.validate()?;
            return Ok(config.clone());
        }

        let mut loader = ContainerConfigLoader::new();
        if let Some(path) = &self.config_file {
            loader = loader.with_file(path);
        }
        if let Some(prefix) = &self.env_prefix {
            loader = loader.with_env_prefix(prefix.as_str());
        }
        Ok(loader.load()?)
    }

    /// 初始化日志系统
    fn initialize_logging(&self) -> InfrastructureResult<()> {
        self.logging_config.try_init()
    }
}

impl Default for ContainerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// 日志配置
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// 日志级别
    pub level: tracing::Level,
    /// 是否显示目标
    pub show_target: bool,
    /// 是否显示线程ID
    pub show_thread_ids: bool,
    /// 是否显示文件名
    pub show_file: bool,
    /// 是否显示行号
    pub show_line_number: bool,
    /// 是否使用 JSON 格式
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: tracing::Level::INFO,
            show_target: true,
            show_thread_ids: false,
            show_file: false,
            show_line_number: false,
            json_format: false,
        }
    }
}

impl LoggingConfig {
    /// 创建开发环境日志配置
    pub fn development() -> Self {
        Self {
            level: tracing::Level::DEBUG,
            show_target: true,
            show_thread_ids: true,
            show_file: true,
            show_line_number: true,
            json_format: false,
        }
    }

    /// 创建生产环境日志配置
    pub fn production() -> Self {
        Self {
            level: tracing::Level::INFO,
            show_target: false,
            show_thread_ids: false,
            show_file: false,
            show_line_number: false,
            json_format: true,
        }
    }

    /// 设置日志级别
    pub fn with_level(mut self, level: tracing::Level) -> Self {
        self.level = level;
        self
    }

    /// 安装全局订阅者
    ///
    /// 已经安装过订阅者时返回错误，不会 panic。
    pub fn try_init(&self) -> InfrastructureResult<()> {
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(self.level)
            .with_target(self.show_target)
            .with_thread_ids(self.show_thread_ids)
            .with_file(self.show_file)
            .with_line_number(self.show_line_number);

        if self.json_format {
            subscriber.json().try_init()
        } else {
            subscriber.try_init()
        }
        .map_err(|e| InfrastructureError::BootstrapFailed {
            message: format!("日志初始化失败: {}", e),
        })?;

        info!("日志系统初始化完成");
        Ok(())
    }
}
