//! # DI Common
//!
//! 依赖注入引擎各层共享的基础类型。
//!
//! ## 核心类型
//!
//! - [`ServiceType`] - 服务类型标识
//! - [`Instance`] - 类型擦除后的服务实例
//! - [`Lifetime`] - 服务生命周期
//! - [`ScopedContext`] - 作用域上下文
//! - [`DependencyError`] - 依赖注入错误分类

pub mod errors;
pub mod lifecycle;
pub mod metadata;

pub use errors::*;
pub use lifecycle::*;
pub use metadata::*;
