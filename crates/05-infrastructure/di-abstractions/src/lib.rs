//! # Dependency Injection Abstractions
//!
//! 依赖注入抽象层，定义服务注册和依赖解析的核心接口。
//!
//! ## 核心接口
//!
//! - [`Activator`] - 类型擦除的服务激活器
//! - [`ServiceRegistration`] - 服务注册信息
//! - [`RegistrationLookup`] - 只读注册查询接口
//! - [`ServiceResolver`] - 服务解析器接口
//! - [`ContainerConfig`] - 容器配置

pub mod container;
pub mod factory;
pub mod registry;
pub mod resolver;

pub use container::*;
pub use factory::*;
pub use registry::*;
pub use resolver::*;
