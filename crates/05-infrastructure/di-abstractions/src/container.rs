//! 依赖注入容器配置

use di_common::{ConfigError, ConfigResult};
use serde::Deserialize;

/// 容器配置
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ContainerConfig {
    /// 依赖图最大深度，根节点深度为 0；`None` 表示不限制
    pub max_resolution_depth: Option<usize>,
    /// 构建容器时是否验证全部依赖都可满足
    pub validate_on_build: bool,
    /// 是否以 info 级别记录每次成功解析
    pub log_resolutions: bool,
}

impl ContainerConfig {
    /// 限制依赖图的最大深度
    pub fn with_max_resolution_depth(mut self, depth: usize) -> Self {
        self.max_resolution_depth = Some(depth);
        self
    }

    /// 设置构建时验证
    pub fn with_validate_on_build(mut self, enabled: bool) -> Self {
        self.validate_on_build = enabled;
        self
    }

    /// 设置解析日志
    pub fn with_log_resolutions(mut self, enabled: bool) -> Self {
        self.log_resolutions = enabled;
        self
    }

    /// 验证配置取值
    pub fn validate(&self) -> ConfigResult<()> {
        if self.max_resolution_depth == Some(0) {
            return Err(ConfigError::ValidationError {
                message: "max_resolution_depth 必须大于 0".to_string(),
            });
        }
        Ok(())
    }
}

impl Default for ContainerConfig {
    fn default() -> Self {
        Self {
            max_resolution_depth: None,
            validate_on_build: true,
            log_resolutions: false,
        }
    }
}
