//! 依赖解析集成测试

use di_abstractions::ContainerConfig;
use di_common::{DependencyError, Lifetime, ScopedContext, ServiceType};
use di_impl::{RegistrationLookup, ResolveOptions, Resolver, ServiceRegistry, ServiceResolver};
use std::sync::Arc;

trait Greeter: Send + Sync {
    fn greet(&self) -> String;
}

#[derive(Debug)]
struct Bar {
    name: String,
}

impl Greeter for Bar {
    fn greet(&self) -> String {
        format!("hello from {}", self.name)
    }
}

struct Foo {
    bar: Arc<Bar>,
}

fn new_bar() -> Arc<Bar> {
    Arc::new(Bar {
        name: "bar".to_string(),
    })
}

fn new_foo_with_bar(bar: Arc<Bar>) -> Arc<Foo> {
    Arc::new(Foo { bar })
}

fn resolver_with(register: impl FnOnce(&ServiceRegistry) -> anyhow::Result<()>) -> Resolver {
    let registry = ServiceRegistry::new();
    register(&registry).unwrap();
    Resolver::new(Arc::new(registry))
}

#[test]
fn test_resolve_foo_wrapping_bar() {
    let resolver = resolver_with(|registry| {
        registry.register(new_bar, Lifetime::Transient)?;
        registry.register(new_foo_with_bar, Lifetime::Transient)?;
        Ok(())
    });

    let foo: Arc<Foo> = resolver.resolve(&ScopedContext::new("test")).unwrap();
    assert_eq!(foo.bar.name, "bar");
}

#[test]
fn test_resolve_trait_object_service() {
    let resolver = resolver_with(|registry| {
        registry.register(
            || -> Arc<dyn Greeter> {
                Arc::new(Bar {
                    name: "greeter".to_string(),
                })
            },
            Lifetime::Singleton,
        )?;
        Ok(())
    });

    let greeter: Arc<dyn Greeter> = resolver.resolve(&ScopedContext::default()).unwrap();
    assert_eq!(greeter.greet(), "hello from greeter");
}

#[test]
fn test_unregistered_transitive_dependency_fails() {
    let resolver = resolver_with(|registry| {
        registry.register(new_foo_with_bar, Lifetime::Transient)?;
        Ok(())
    });

    let error = resolver
        .resolve::<Arc<Foo>>(&ScopedContext::default())
        .err()
        .unwrap();
    assert!(matches!(error, DependencyError::ServiceTypeNotRegistered { .. }));
}

#[test]
fn test_duplicate_registration_leaves_count_unchanged() {
    let registry = ServiceRegistry::new();
    registry.register(new_bar, Lifetime::Transient).unwrap();

    let error = registry.register(new_bar, Lifetime::Transient).unwrap_err();
    assert!(matches!(error, DependencyError::TypeAlreadyRegistered { .. }));

    let registrations = registry
        .get_service_registrations(ServiceType::of::<Arc<Bar>>())
        .unwrap();
    assert_eq!(registrations.len(), 1);
}

#[test]
fn test_cycle_fails_from_either_side() {
    #[derive(Clone)]
    struct A;
    #[derive(Clone)]
    struct B;

    fn new_a(_b: B) -> A {
        A
    }

    fn new_b(_a: A) -> B {
        B
    }

    let resolver = resolver_with(|registry| {
        registry.register(new_a, Lifetime::Transient)?;
        registry.register(new_b, Lifetime::Transient)?;
        Ok(())
    });
    let scope = ScopedContext::default();

    for error in [
        resolver.resolve::<A>(&scope).err().unwrap(),
        resolver.resolve::<B>(&scope).err().unwrap(),
    ] {
        assert!(error.is_circular_dependency());
        match error {
            DependencyError::CannotBuildDependencyGraph { source, .. } => {
                assert!(matches!(
                    *source,
                    DependencyError::CircularDependencyDetected { .. }
                ));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}

#[test]
fn test_foo_bar_cycle_is_reported_with_chain() {
    #[derive(Clone)]
    struct CyclicFoo;
    #[derive(Clone)]
    struct CyclicBar;

    let resolver = resolver_with(|registry| {
        registry.register(|_bar: CyclicBar| CyclicFoo, Lifetime::Transient)?;
        registry.register(|_foo: CyclicFoo| CyclicBar, Lifetime::Transient)?;
        Ok(())
    });

    let error = resolver
        .resolve::<CyclicFoo>(&ScopedContext::default())
        .err()
        .unwrap();
    match error.root_cause() {
        DependencyError::CircularDependencyDetected {
            dependency_chain, ..
        } => {
            assert!(dependency_chain.contains("CyclicFoo"));
            assert!(dependency_chain.contains("CyclicBar"));
            assert!(dependency_chain.contains(" -> "));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_chain_activates_each_level_once() {
    #[derive(Clone)]
    struct Level0;
    #[derive(Clone)]
    struct Level1;
    #[derive(Clone)]
    struct Level2;
    #[derive(Clone)]
    struct Level3;
    #[derive(Clone)]
    struct Level4;

    let resolver = resolver_with(|registry| {
        registry.register(|| Level0, Lifetime::Transient)?;
        registry.register(|_: Level0| Level1, Lifetime::Transient)?;
        registry.register(|_: Level1| Level2, Lifetime::Transient)?;
        registry.register(|_: Level2| Level3, Lifetime::Transient)?;
        registry.register(|_: Level3, _: Level0| Level4, Lifetime::Transient)?;
        Ok(())
    });

    assert!(resolver.resolve::<Level4>(&ScopedContext::default()).is_ok());
    assert_eq!(resolver.stats().activations, 5);
}

#[derive(Clone, Debug)]
struct Origin;

#[derive(Clone, Debug)]
struct Link<T>(T);

/// 由类型嵌套层数决定长度的依赖链
trait Chain: Clone + Send + Sync + 'static {
    const DEPTH: usize;

    fn register_chain(registry: &ServiceRegistry) -> anyhow::Result<()>;
}

impl Chain for Origin {
    const DEPTH: usize = 0;

    fn register_chain(registry: &ServiceRegistry) -> anyhow::Result<()> {
        registry.register(|| Origin, Lifetime::Transient)?;
        Ok(())
    }
}

impl<T: Chain> Chain for Link<T> {
    const DEPTH: usize = T::DEPTH + 1;

    fn register_chain(registry: &ServiceRegistry) -> anyhow::Result<()> {
        T::register_chain(registry)?;
        registry.register(Link::<T>, Lifetime::Transient)?;
        Ok(())
    }
}

type Links10<T> = Link<Link<Link<Link<Link<Link<Link<Link<Link<Link<T>>>>>>>>>>;
type Chain70 = Links10<Links10<Links10<Links10<Links10<Links10<Links10<Origin>>>>>>>;

#[test]
fn test_deep_chain_resolves_without_depth_limit() {
    assert_eq!(Chain70::DEPTH, 70);
    let resolver = resolver_with(Chain70::register_chain);

    assert!(resolver.resolve::<Chain70>(&ScopedContext::default()).is_ok());
    assert_eq!(resolver.stats().activations, 71);
}

#[test]
fn test_deep_chain_respects_configured_depth_limit() {
    let registry = ServiceRegistry::new();
    Chain70::register_chain(&registry).unwrap();
    let resolver = Resolver::with_config(
        Arc::new(registry),
        ContainerConfig::default().with_max_resolution_depth(64),
    );

    let error = resolver
        .resolve::<Chain70>(&ScopedContext::default())
        .unwrap_err();
    assert!(matches!(
        error.root_cause(),
        DependencyError::DependencyGraphTooDeep { max_depth: 64, .. }
    ));
}

#[test]
fn test_options_supply_missing_dependency() {
    let resolver = resolver_with(|registry| {
        registry.register(new_foo_with_bar, Lifetime::Transient)?;
        Ok(())
    });
    let scope = ScopedContext::default();
    let bar = new_bar();

    let foo: Arc<Foo> = resolver
        .resolve_with_options(&scope, ResolveOptions::new().with_instance(bar.clone()))
        .unwrap();
    assert!(Arc::ptr_eq(&foo.bar, &bar));

    // 附加注册只对那一次调用有效
    assert!(resolver.resolve::<Arc<Foo>>(&scope).is_err());
    assert!(!resolver.can_resolve(ServiceType::of::<Arc<Bar>>()));
}

#[test]
fn test_options_with_custom_registration() {
    let resolver = resolver_with(|registry| {
        registry.register(new_foo_with_bar, Lifetime::Transient)?;
        Ok(())
    });

    let options = ResolveOptions::new().with(|overlay: &ServiceRegistry| {
        overlay.register(new_bar, Lifetime::Transient)
    });
    let foo: Arc<Foo> = resolver
        .resolve_with_options(&ScopedContext::default(), options)
        .unwrap();
    assert_eq!(foo.bar.name, "bar");
}

#[test]
fn test_multiple_registrations_are_not_resolved_implicitly() {
    let resolver = resolver_with(|registry| {
        registry.register(new_bar, Lifetime::Transient)?;
        registry.register(
            || {
                Arc::new(Bar {
                    name: "other".to_string(),
                })
            },
            Lifetime::Transient,
        )?;
        Ok(())
    });

    let error = resolver
        .resolve::<Arc<Bar>>(&ScopedContext::default())
        .err()
        .unwrap();
    assert!(error.is_not_registered());
    assert_eq!(
        resolver
            .registry()
            .try_get_service_registrations(ServiceType::of::<Arc<Bar>>())
            .map(|registrations| registrations.len()),
        Some(2)
    );
}
