//! 生命周期集成测试

use di_common::{Lifetime, ScopedContext};
use di_impl::{activate, ResolveOptions, Resolver, ServiceRegistry, ServiceResolver};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

#[derive(Debug)]
struct Connection {
    id: usize,
}

#[derive(Debug)]
struct Repository {
    connection: Arc<Connection>,
}

#[derive(Debug)]
struct UnitOfWork {
    orders: Arc<Repository>,
    customers: Arc<Repository>,
}

fn resolver_for(lifetime: Lifetime) -> (Resolver, Arc<AtomicUsize>) {
    let created = Arc::new(AtomicUsize::new(0));
    let counter = created.clone();

    let registry = ServiceRegistry::new();
    registry
        .register(
            move || {
                Arc::new(Connection {
                    id: counter.fetch_add(1, Ordering::SeqCst),
                })
            },
            lifetime,
        )
        .unwrap();
    registry
        .register(
            |connection: Arc<Connection>| Arc::new(Repository { connection }),
            Lifetime::Transient,
        )
        .unwrap();
    registry
        .register(
            |orders: Arc<Repository>, customers: Arc<Repository>| {
                Arc::new(UnitOfWork { orders, customers })
            },
            Lifetime::Transient,
        )
        .unwrap();

    (Resolver::new(Arc::new(registry)), created)
}

#[test]
fn test_singleton_identical_across_scopes() {
    let (resolver, created) = resolver_for(Lifetime::Singleton);

    let first: Arc<Connection> = resolver.resolve(&ScopedContext::new("a")).unwrap();
    let second: Arc<Connection> = resolver.resolve(&ScopedContext::new("b")).unwrap();

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(created.load(Ordering::SeqCst), 1);
}

#[test]
fn test_singleton_shared_with_scoped_registry() {
    let registry = ServiceRegistry::new();
    registry
        .register(|| Arc::new(Connection { id: 0 }), Lifetime::Singleton)
        .unwrap();
    let scoped_registry = registry.create_scope();

    let parent = Resolver::new(Arc::new(registry));
    let child = Resolver::new(Arc::new(scoped_registry));
    let scope = ScopedContext::default();

    let from_parent: Arc<Connection> = parent.resolve(&scope).unwrap();
    let from_child: Arc<Connection> = child.resolve(&scope).unwrap();
    assert!(Arc::ptr_eq(&from_parent, &from_child));
}

#[test]
fn test_scoped_identical_within_scope_only() {
    let (resolver, created) = resolver_for(Lifetime::Scoped);
    let request = ScopedContext::new("request");
    let other = ScopedContext::new("other");

    let first: Arc<Connection> = resolver.resolve(&request).unwrap();
    let second: Arc<Connection> = resolver.resolve(&request).unwrap();
    let third: Arc<Connection> = resolver.resolve(&other).unwrap();

    assert!(Arc::ptr_eq(&first, &second));
    assert!(!Arc::ptr_eq(&first, &third));
    assert_eq!(created.load(Ordering::SeqCst), 2);
}

#[test]
fn test_scoped_context_shared_by_two_containers() {
    let (connections, _) = resolver_for(Lifetime::Scoped);
    let (other_connections, _) = resolver_for(Lifetime::Scoped);
    let request = ScopedContext::new("request");

    let first: Arc<Connection> = connections.resolve(&request).unwrap();
    let second: Arc<Connection> = other_connections.resolve(&request).unwrap();
    assert!(!Arc::ptr_eq(&first, &second));
    assert_eq!(request.len(), 2);

    let again: Arc<Connection> = connections.resolve(&request).unwrap();
    assert!(Arc::ptr_eq(&first, &again));
}

#[test]
fn test_scoped_dependency_shared_by_transient_consumers() {
    let (resolver, _) = resolver_for(Lifetime::Scoped);
    let request = ScopedContext::new("request");

    let first: Arc<Repository> = resolver.resolve(&request).unwrap();
    let second: Arc<Repository> = resolver.resolve(&request).unwrap();

    assert!(!Arc::ptr_eq(&first, &second));
    assert!(Arc::ptr_eq(&first.connection, &second.connection));
}

#[test]
fn test_transient_distinct_across_calls() {
    let (resolver, created) = resolver_for(Lifetime::Transient);
    let scope = ScopedContext::default();

    let first: Arc<Connection> = resolver.resolve(&scope).unwrap();
    let second: Arc<Connection> = resolver.resolve(&scope).unwrap();

    assert!(!Arc::ptr_eq(&first, &second));
    assert_ne!(first.id, second.id);
    assert_eq!(created.load(Ordering::SeqCst), 2);
}

#[test]
fn test_transient_constructed_once_per_call() {
    let (resolver, created) = resolver_for(Lifetime::Transient);
    let scope = ScopedContext::default();

    let work: Arc<UnitOfWork> = resolver.resolve(&scope).unwrap();

    assert!(Arc::ptr_eq(&work.orders, &work.customers));
    assert_eq!(created.load(Ordering::SeqCst), 1);

    let next: Arc<UnitOfWork> = resolver.resolve(&scope).unwrap();
    assert!(!Arc::ptr_eq(&work.orders.connection, &next.orders.connection));
}

#[test]
fn test_activate_with_and_without_instance() {
    let registry = ServiceRegistry::new();
    let resolver = Resolver::new(Arc::new(registry));
    let scope = ScopedContext::default();
    let build = |connection: Arc<Connection>| Arc::new(Repository { connection });

    let error = activate(&resolver, &scope, build, ResolveOptions::new())
        .err()
        .unwrap();
    assert!(error.is_not_registered());

    let connection = Arc::new(Connection { id: 42 });
    let repository: Arc<Repository> = activate(
        &resolver,
        &scope,
        build,
        ResolveOptions::new().with_instance(connection.clone()),
    )
    .unwrap();
    assert!(Arc::ptr_eq(&repository.connection, &connection));
}
