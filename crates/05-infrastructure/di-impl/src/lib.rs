//! # 依赖注入具体实现
//!
//! 提供服务注册表、两遍依赖解析器和依赖验证器的实现。
//!
//! ## 使用示例
//!
//! ```ignore
//! use di_impl::{Resolver, ServiceRegistry, ServiceResolver};
//! use di_common::{Lifetime, ScopedContext};
//! use std::sync::Arc;
//!
//! let registry = ServiceRegistry::new();
//! registry.register(new_bar, Lifetime::Singleton)?;
//! registry.register(new_foo, Lifetime::Transient)?;
//!
//! let resolver = Resolver::new(Arc::new(registry));
//! let scope = ScopedContext::new("request");
//! let foo: Arc<Foo> = resolver.resolve(&scope)?;
//! ```

pub mod accessor;
pub mod activate;
pub mod graph;
pub mod instance_bag;
pub mod registration_list;
pub mod registry;
pub mod resolver;
pub mod sequence;
pub mod validator;

pub use accessor::MultiRegistryAccessor;
pub use activate::{activate, activate_fallible};
pub use graph::{DependencyGraph, DependencyInfo, NodeId};
pub use instance_bag::InstanceBag;
pub use registration_list::RegistrationList;
pub use registry::{ServiceModule, ServiceRegistry};
pub use resolver::{ResolveOptions, Resolver, ResolverStats};
pub use sequence::IdentifierSequence;
pub use validator::DependencyValidator;

pub use di_abstractions::{RegistrationLookup, ServiceResolver};
