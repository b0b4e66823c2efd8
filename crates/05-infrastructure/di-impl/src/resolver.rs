//! 服务解析器
//!
//! 两遍解析，全程使用显式栈，不做递归：
//!
//! 1. 构图：从根注册出发逐层查找参数的注册，挂到依赖图上，沿消费者链比较
//!    注册标识检测循环依赖，同时记录后序栈。
//! 2. 实例化：弹出后序栈，子节点总是先于父节点实例化。每个节点先询问调用级
//!    实例袋是否已有实例，没有才调用激活器，并按生命周期保存新实例。

use crate::accessor::MultiRegistryAccessor;
use crate::graph::{DependencyGraph, NodeId};
use crate::instance_bag::InstanceBag;
use crate::registry::ServiceRegistry;
use di_abstractions::{
    downcast_instance, ContainerConfig, InstanceActivator, IntoActivator, IntoFallibleActivator,
    RegistrationLookup, ServiceRegistration, ServiceResolver,
};
use di_common::{DependencyError, DependencyResult, Instance, Lifetime, ScopedContext, ServiceType};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, info, trace, warn};

type OverlayEntry = Box<dyn FnOnce(&ServiceRegistry) -> DependencyResult<()> + Send>;

/// 单次解析的附加注册
///
/// 每一项在解析时注册到一个临时的链接注册表，该注册表在这次调用中优先于
/// 常驻注册表被查询，调用结束后即被丢弃。
#[derive(Default)]
pub struct ResolveOptions {
    entries: Vec<OverlayEntry>,
}

impl ResolveOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// 为这次调用提供一个现成的值
    pub fn with_instance<T>(mut self, value: T) -> Self
    where
        T: Send + Sync + 'static,
    {
        self.entries.push(Box::new(move |registry: &ServiceRegistry| {
            registry.register_activator(Arc::new(InstanceActivator::new(value)), Lifetime::Transient)
        }));
        self
    }

    /// 为这次调用追加一个函数激活器
    ///
    /// 单例和作用域生命周期只在这次调用内生效，不会缓存到调用之外。
    pub fn with_activator<F, Args>(mut self, activator: F, lifetime: Lifetime) -> Self
    where
        F: IntoActivator<Args>,
        Args: 'static,
    {
        self.entries.push(Box::new(move |registry: &ServiceRegistry| {
            registry.register(activator, lifetime)
        }));
        self
    }

    /// 为这次调用追加一个可失败的函数激活器
    pub fn with_fallible_activator<F, Args>(mut self, activator: F, lifetime: Lifetime) -> Self
    where
        F: IntoFallibleActivator<Args>,
        Args: 'static,
    {
        self.entries.push(Box::new(move |registry: &ServiceRegistry| {
            registry.register_fallible(activator, lifetime)
        }));
        self
    }

    /// 追加任意的临时注册逻辑
    pub fn with<F>(mut self, register: F) -> Self
    where
        F: FnOnce(&ServiceRegistry) -> DependencyResult<()> + Send + 'static,
    {
        self.entries.push(Box::new(register));
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn apply(self, overlay: &ServiceRegistry) -> DependencyResult<()> {
        self.entries
            .into_iter()
            .try_for_each(|register| register(overlay))
    }
}

impl fmt::Debug for ResolveOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolveOptions")
            .field("entries", &self.entries.len())
            .finish()
    }
}

/// 解析器运行统计快照
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolverStats {
    /// 解析调用次数，包括 `activate`
    pub resolve_calls: u64,
    /// 失败的解析调用次数
    pub failed_resolves: u64,
    /// 激活器调用次数
    pub activations: u64,
    /// 根实例袋中缓存的单例数量
    pub singletons: usize,
}

#[derive(Debug, Default)]
struct StatsCounters {
    resolve_calls: AtomicU64,
    failed_resolves: AtomicU64,
    activations: AtomicU64,
}

/// 服务解析器
///
/// 持有常驻注册表。一个注册表树的全部解析器共享同一个根单例实例袋。
#[derive(Debug)]
pub struct Resolver {
    registry: Arc<ServiceRegistry>,
    config: ContainerConfig,
    stats: StatsCounters,
}

impl Resolver {
    /// 使用默认配置创建解析器
    pub fn new(registry: Arc<ServiceRegistry>) -> Self {
        Self::with_config(registry, ContainerConfig::default())
    }

    pub fn with_config(registry: Arc<ServiceRegistry>, config: ContainerConfig) -> Self {
        Self {
            registry,
            config,
            stats: StatsCounters::default(),
        }
    }

    pub fn registry(&self) -> &Arc<ServiceRegistry> {
        &self.registry
    }

    pub fn config(&self) -> &ContainerConfig {
        &self.config
    }

    /// 带附加注册解析服务（类型擦除）
    pub fn resolve_with_options_any(
        &self,
        scope: &ScopedContext,
        service_type: ServiceType,
        options: ResolveOptions,
    ) -> DependencyResult<Instance> {
        self.track(service_type, scope, || {
            if options.is_empty() {
                return self.resolve_in(scope, service_type, self.registry.as_ref());
            }
            let overlay = self.overlay(options)?;
            self.resolve_overlaid(scope, service_type, &overlay)
        })
    }

    /// 带附加注册解析指定类型的服务
    pub fn resolve_with_options<T>(
        &self,
        scope: &ScopedContext,
        options: ResolveOptions,
    ) -> DependencyResult<T>
    where
        T: Clone + Send + Sync + 'static,
    {
        let instance = self.resolve_with_options_any(scope, ServiceType::of::<T>(), options)?;
        downcast_instance(&instance)
    }

    /// 统计快照
    pub fn stats(&self) -> ResolverStats {
        ResolverStats {
            resolve_calls: self.stats.resolve_calls.load(Ordering::Relaxed),
            failed_resolves: self.stats.failed_resolves.load(Ordering::Relaxed),
            activations: self.stats.activations.load(Ordering::Relaxed),
            singletons: self.registry.singletons().len(),
        }
    }

    /// 统计并记录一次解析调用
    pub(crate) fn track<R>(
        &self,
        service_type: ServiceType,
        scope: &ScopedContext,
        resolve: impl FnOnce() -> DependencyResult<R>,
    ) -> DependencyResult<R> {
        self.stats.resolve_calls.fetch_add(1, Ordering::Relaxed);
        debug!("解析服务: {} (作用域 {})", service_type, scope.name());

        let result = resolve();
        match &result {
            Ok(_) if self.config.log_resolutions => info!("解析完成: {}", service_type),
            Ok(_) => debug!("解析完成: {}", service_type),
            Err(error) => {
                self.stats.failed_resolves.fetch_add(1, Ordering::Relaxed);
                warn!("解析失败: {}: {}", service_type, error);
            }
        }
        result
    }

    /// 把附加注册应用到一个新的链接注册表
    pub(crate) fn overlay(&self, options: ResolveOptions) -> DependencyResult<ServiceRegistry> {
        let overlay = self.registry.create_linked_registry();
        options.apply(&overlay)?;
        Ok(overlay)
    }

    /// 先查链接注册表，再查常驻注册表
    pub(crate) fn resolve_overlaid(
        &self,
        scope: &ScopedContext,
        service_type: ServiceType,
        overlay: &ServiceRegistry,
    ) -> DependencyResult<Instance> {
        let accessor = MultiRegistryAccessor::new(vec![
            overlay as &dyn RegistrationLookup,
            self.registry.as_ref(),
        ]);
        self.resolve_in(scope, service_type, &accessor)
    }

    fn resolve_in(
        &self,
        scope: &ScopedContext,
        service_type: ServiceType,
        lookup: &dyn RegistrationLookup,
    ) -> DependencyResult<Instance> {
        let root = lookup
            .try_get_single_service_registration(service_type)
            .ok_or_else(|| DependencyError::not_registered(service_type.name()))?;

        let bag = InstanceBag::child(self.registry.singletons());
        if let Some(instance) = bag.try_resolve_instance(&root, scope) {
            return Ok(instance);
        }

        let (graph, post_order) = self.build_graph(root, lookup, &bag, scope)?;
        self.instantiate(graph, post_order, &bag, scope)
    }

    fn build_graph(
        &self,
        root: Arc<ServiceRegistration>,
        lookup: &dyn RegistrationLookup,
        bag: &InstanceBag,
        scope: &ScopedContext,
    ) -> DependencyResult<(DependencyGraph, Vec<NodeId>)> {
        let max_depth = self.config.max_resolution_depth;
        let mut graph = DependencyGraph::new(root);
        let mut work = vec![graph.root()];
        let mut post_order = Vec::new();

        while let Some(current) = work.pop() {
            post_order.push(current);
            let consumer = graph.node(current).registration().clone();
            let depth = graph.node(current).depth();

            for &parameter in consumer.parameter_types() {
                let dependency = lookup
                    .try_get_single_service_registration(parameter)
                    .ok_or_else(|| DependencyError::not_registered(parameter.name()))?;

                if let Some(dependency_chain) = graph.find_cycle(current, &dependency) {
                    return Err(graph_error(
                        &consumer,
                        DependencyError::CircularDependencyDetected {
                            type_name: parameter.name().to_string(),
                            dependency_chain,
                        },
                    ));
                }

                if let Some(max_depth) = max_depth {
                    if depth + 1 > max_depth {
                        return Err(graph_error(
                            &consumer,
                            DependencyError::DependencyGraphTooDeep {
                                type_name: parameter.name().to_string(),
                                max_depth,
                            },
                        ));
                    }
                }

                let cached = bag.try_resolve_instance(&dependency, scope);
                let child = graph.attach(current, dependency, cached)?;
                trace!(
                    "依赖节点: {} -> {} (深度 {})",
                    consumer.service_type(),
                    parameter,
                    depth + 1
                );

                if !graph.node(child).has_instance() {
                    work.push(child);
                }
            }
        }

        Ok((graph, post_order))
    }

    fn instantiate(
        &self,
        mut graph: DependencyGraph,
        mut post_order: Vec<NodeId>,
        bag: &InstanceBag,
        scope: &ScopedContext,
    ) -> DependencyResult<Instance> {
        while let Some(node) = post_order.pop() {
            let registration = graph.node(node).registration().clone();

            if let Some(instance) = bag.try_resolve_instance(&registration, scope) {
                graph.set_instance(node, instance)?;
                continue;
            }

            let arguments = graph.child_instances(node)?;
            let instance = registration.invoke(&arguments).map_err(|source| {
                DependencyError::cannot_resolve(registration.service_type().name(), source)
            })?;
            self.stats.activations.fetch_add(1, Ordering::Relaxed);
            trace!(
                "激活服务: {} ({}, id={})",
                registration.service_type(),
                registration.lifetime(),
                registration.id()
            );

            let instance = bag.keep_instance(&registration, instance, scope);
            graph.set_instance(node, instance)?;
        }

        graph.root_instance()
    }
}

fn graph_error(consumer: &ServiceRegistration, source: DependencyError) -> DependencyError {
    DependencyError::CannotBuildDependencyGraph {
        type_name: consumer.service_type().name().to_string(),
        source: Box::new(source),
    }
}

impl ServiceResolver for Resolver {
    fn resolve_any(
        &self,
        scope: &ScopedContext,
        service_type: ServiceType,
    ) -> DependencyResult<Instance> {
        self.resolve_with_options_any(scope, service_type, ResolveOptions::default())
    }

    fn can_resolve(&self, service_type: ServiceType) -> bool {
        self.registry
            .try_get_single_service_registration(service_type)
            .is_some()
    }
}
