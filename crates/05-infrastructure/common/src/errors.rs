//! 错误类型定义

use std::error::Error as StdError;
use std::fmt;
use thiserror::Error;

/// 激活器自身返回的错误
pub type ActivationError = Box<dyn StdError + Send + Sync>;

/// 配置错误类型
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("配置文件不存在: {path}")]
    FileNotFound { path: String },

    #[error("配置解析失败: {source}")]
    ParseError {
        source: Box<dyn StdError + Send + Sync>,
    },

    #[error("配置验证失败: {message}")]
    ValidationError { message: String },
}

/// 缺失依赖记录
///
/// `consumer` 声明了参数 `missing`，但注册表中找不到它的注册。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingDependency {
    /// 声明依赖的服务类型名称
    pub consumer: String,
    /// 未注册的参数类型名称
    pub missing: String,
}

impl fmt::Display for MissingDependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.consumer, self.missing)
    }
}

fn join_missing(missing: &[MissingDependency]) -> String {
    missing
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// 依赖注入错误类型
#[derive(Error, Debug)]
pub enum DependencyError {
    #[error("激活器返回类型无效: {type_name}, 激活器必须返回一个非单元类型的值")]
    ActivatorFunctionInvalidReturnType { type_name: String },

    #[error("服务类型已注册相同的激活器: {type_name}")]
    TypeAlreadyRegistered { type_name: String },

    #[error("注册标识已分配: 当前 {current}, 尝试分配 {attempted}")]
    RegistrationIdAlreadyAssigned { current: u64, attempted: u64 },

    #[error("模块注册失败: {source}")]
    CannotRegisterModule {
        #[source]
        source: Box<DependencyError>,
    },

    #[error("服务类型未注册: {type_name}")]
    ServiceTypeNotRegistered { type_name: String },

    #[error("检测到循环依赖: {dependency_chain}")]
    CircularDependencyDetected {
        type_name: String,
        dependency_chain: String,
    },

    #[error("依赖图深度超过上限 {max_depth}: {type_name}")]
    DependencyGraphTooDeep { type_name: String, max_depth: usize },

    #[error("无法构建依赖图: {type_name}, 原因: {source}")]
    CannotBuildDependencyGraph {
        type_name: String,
        #[source]
        source: Box<DependencyError>,
    },

    #[error("无法解析服务: {type_name}, 原因: {source}")]
    CannotResolveService {
        type_name: String,
        #[source]
        source: ActivationError,
    },

    #[error("解析出多个服务实例: {type_name}, 数量: {count}")]
    AmbiguousServiceInstancesResolved { type_name: String, count: usize },

    #[error("依赖节点实例已设置: {type_name}")]
    InstanceAlreadySet { type_name: String },

    #[error("实例类型不匹配: 期望 {expected}, 实际 {actual}")]
    InstanceTypeMismatch { expected: String, actual: String },

    #[error("依赖验证失败: {}", join_missing(.missing))]
    ValidationFailed { missing: Vec<MissingDependency> },
}

impl DependencyError {
    /// 创建服务未注册错误
    pub fn not_registered(type_name: impl Into<String>) -> Self {
        Self::ServiceTypeNotRegistered {
            type_name: type_name.into(),
        }
    }

    /// 创建服务解析失败错误
    pub fn cannot_resolve(type_name: impl Into<String>, source: impl Into<ActivationError>) -> Self {
        Self::CannotResolveService {
            type_name: type_name.into(),
            source: source.into(),
        }
    }

    /// 沿包装链找到最内层的依赖注入错误
    pub fn root_cause(&self) -> &Self {
        let mut current = self;
        loop {
            match current {
                Self::CannotRegisterModule { source }
                | Self::CannotBuildDependencyGraph { source, .. } => current = &**source,
                Self::CannotResolveService { source, .. } => {
                    match source.downcast_ref::<Self>() {
                        Some(inner) => current = inner,
                        None => return current,
                    }
                }
                _ => return current,
            }
        }
    }

    /// 是否由循环依赖引起
    pub fn is_circular_dependency(&self) -> bool {
        matches!(self.root_cause(), Self::CircularDependencyDetected { .. })
    }

    /// 是否由服务未注册引起
    pub fn is_not_registered(&self) -> bool {
        matches!(self.root_cause(), Self::ServiceTypeNotRegistered { .. })
    }
}

/// 基础设施错误类型
#[derive(Error, Debug)]
pub enum InfrastructureError {
    #[error("配置错误: {source}")]
    ConfigError {
        #[from]
        source: ConfigError,
    },

    #[error("依赖注入错误: {source}")]
    DependencyError {
        #[from]
        source: DependencyError,
    },

    #[error("基础设施启动失败: {message}")]
    BootstrapFailed { message: String },
}

/// 结果类型别名
pub type ConfigResult<T> = Result<T, ConfigError>;
pub type DependencyResult<T> = Result<T, DependencyError>;
pub type InfrastructureResult<T> = Result<T, InfrastructureError>;
