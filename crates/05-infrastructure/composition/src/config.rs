//! 容器配置加载
//!
//! 配置来源按优先级从低到高：默认值、配置文件、环境变量。
//! 环境变量使用前缀和双下划线分隔，例如 `DI__MAX_RESOLUTION_DEPTH=8`。

use di_abstractions::ContainerConfig;
use di_common::{ConfigError, ConfigResult};
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};

/// 默认环境变量前缀
pub const DEFAULT_ENV_PREFIX: &str = "DI";

/// 环境变量分隔符
const ENV_SEPARATOR: &str = "__";

/// 容器配置加载器
#[derive(Debug, Clone)]
pub struct ContainerConfigLoader {
    file: Option<PathBuf>,
    env_prefix: String,
}

impl ContainerConfigLoader {
    pub fn new() -> Self {
        Self {
            file: None,
            env_prefix: DEFAULT_ENV_PREFIX.to_string(),
        }
    }

    /// 设置配置文件，格式由扩展名决定（toml / json / yaml）
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.file = Some(path.as_ref().to_path_buf());
        self
    }

    /// 设置环境变量前缀
    pub fn with_env_prefix<S: Into<String>>(mut self, prefix: S) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    /// 加载并验证配置
    pub fn load(&self) -> ConfigResult<ContainerConfig> {
        let mut builder = config::Config::builder();

        if let Some(path) = &self.file {
            if !path.exists() {
                return Err(ConfigError::FileNotFound {
                    path: path.display().to_string(),
                });
            }
            info!("加载容器配置文件: {}", path.display());
            builder = builder.add_source(config::File::from(path.as_path()));
        }

        let settings = builder
            .add_source(
                config::Environment::with_prefix(&self.env_prefix)
                    .separator(ENV_SEPARATOR)
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| {
                error!("容器配置构建失败: {}", e);
                ConfigError::ParseError {
                    source: Box::new(e),
                }
            })?;

        let config: ContainerConfig =
            settings
                .try_deserialize()
                .map_err(|e| ConfigError::ParseError {
                    source: Box::new(e),
                })?;
        config.validate()?;

        debug!("容器配置: {:?}", config);
        Ok(config)
    }
}

impl Default for ContainerConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

/// 从可选的配置文件和 `DI` 前缀环境变量加载容器配置
pub fn load_container_config(path: Option<&Path>) -> ConfigResult<ContainerConfig> {
    let loader = ContainerConfigLoader::new();
    match path {
        Some(path) => loader.with_file(path).load(),
        None => loader.load(),
    }
}
