//! 容器主入口

use crate::builder::ContainerBuilder;
use chrono::{DateTime, Utc};
use di_abstractions::{ContainerConfig, IntoActivator};
use di_common::{DependencyResult, Instance, ScopedContext, ServiceType};
use di_impl::{
    activate, DependencyValidator, ResolveOptions, Resolver, ResolverStats, ServiceRegistry,
    ServiceResolver,
};
use std::sync::Arc;
use tracing::debug;

/// 依赖注入容器
///
/// 持有构建完成的注册表和解析器。作用域由调用方通过 [`Container::create_scope`]
/// 创建并在每次解析时显式传入。
pub struct Container {
    resolver: Resolver,
    built_at: DateTime<Utc>,
}

impl Container {
    /// 创建容器构建器
    pub fn builder() -> ContainerBuilder {
        ContainerBuilder::new()
    }

    pub(crate) fn new(resolver: Resolver) -> Self {
        Self {
            resolver,
            built_at: Utc::now(),
        }
    }

    /// 创建新的作用域上下文
    pub fn create_scope(&self, name: impl Into<String>) -> ScopedContext {
        let scope = ScopedContext::new(name);
        debug!("创建作用域: {} ({})", scope.name(), scope.id());
        scope
    }

    /// 解析指定类型的服务
    pub fn resolve<T>(&self, scope: &ScopedContext) -> DependencyResult<T>
    where
        T: Clone + Send + Sync + 'static,
    {
        self.resolver.resolve(scope)
    }

    /// 带附加注册解析服务
    pub fn resolve_with_options<T>(
        &self,
        scope: &ScopedContext,
        options: ResolveOptions,
    ) -> DependencyResult<T>
    where
        T: Clone + Send + Sync + 'static,
    {
        self.resolver.resolve_with_options(scope, options)
    }

    /// 解析服务（类型擦除）
    pub fn resolve_any(
        &self,
        scope: &ScopedContext,
        service_type: ServiceType,
    ) -> DependencyResult<Instance> {
        self.resolver.resolve_any(scope, service_type)
    }

    /// 激活一个未注册的函数
    pub fn activate<T, F, Args>(
        &self,
        scope: &ScopedContext,
        activator: F,
        options: ResolveOptions,
    ) -> DependencyResult<T>
    where
        F: IntoActivator<Args, Service = T>,
        T: Clone + Send + Sync + 'static,
    {
        activate(&self.resolver, scope, activator, options)
    }

    /// 重新验证注册表
    pub fn validate(&self) -> DependencyResult<()> {
        DependencyValidator::new().validate(self.registry().as_ref())
    }

    pub fn registry(&self) -> &Arc<ServiceRegistry> {
        self.resolver.registry()
    }

    pub fn resolver(&self) -> &Resolver {
        &self.resolver
    }

    pub fn config(&self) -> &ContainerConfig {
        self.resolver.config()
    }

    pub fn stats(&self) -> ResolverStats {
        self.resolver.stats()
    }

    pub fn built_at(&self) -> DateTime<Utc> {
        self.built_at
    }
}
