//! 一次性激活
//!
//! 解析一个没有注册过的激活器：把它作为瞬时注册放进单次调用的链接注册表，
//! 其余依赖照常从常驻注册表和附加注册中解析。

use crate::registry::ServiceRegistry;
use crate::resolver::{ResolveOptions, Resolver};
use di_abstractions::{downcast_instance, Activator, IntoActivator, IntoFallibleActivator, RegistrationLookup};
use di_common::{DependencyError, DependencyResult, Lifetime, ScopedContext, ServiceType};
use std::sync::Arc;

/// 使用解析器激活一个函数
///
/// ```ignore
/// let report: Arc<Report> = activate(&resolver, &scope, build_report, ResolveOptions::new())?;
/// ```
pub fn activate<T, F, Args>(
    resolver: &Resolver,
    scope: &ScopedContext,
    activator: F,
    options: ResolveOptions,
) -> DependencyResult<T>
where
    F: IntoActivator<Args, Service = T>,
    T: Clone + Send + Sync + 'static,
{
    activate_erased(resolver, scope, activator.into_activator(), options)
}

/// 使用解析器激活一个返回 `Result` 的函数
pub fn activate_fallible<T, F, Args>(
    resolver: &Resolver,
    scope: &ScopedContext,
    activator: F,
    options: ResolveOptions,
) -> DependencyResult<T>
where
    F: IntoFallibleActivator<Args, Service = T>,
    T: Clone + Send + Sync + 'static,
{
    activate_erased(resolver, scope, activator.into_activator(), options)
}

fn activate_erased<T>(
    resolver: &Resolver,
    scope: &ScopedContext,
    activator: Arc<dyn Activator>,
    options: ResolveOptions,
) -> DependencyResult<T>
where
    T: Clone + Send + Sync + 'static,
{
    let service_type = ServiceType::of::<T>();

    resolver.track(service_type, scope, || {
        let options = options.with(move |registry: &ServiceRegistry| {
            registry.register_activator(activator, Lifetime::Transient)
        });
        let overlay = resolver.overlay(options)?;

        let candidates = overlay
            .try_get_service_registrations(service_type)
            .map_or(0, |registrations| registrations.len());
        if candidates > 1 {
            return Err(DependencyError::AmbiguousServiceInstancesResolved {
                type_name: service_type.name().to_string(),
                count: candidates,
            });
        }

        let instance = resolver.resolve_overlaid(scope, service_type, &overlay)?;
        downcast_instance::<T>(&instance)
            .map_err(|error| DependencyError::cannot_resolve(service_type.name(), error))
    })
}
