//! 并发集成测试

use di_common::{Lifetime, ScopedContext, ServiceType};
use di_impl::{RegistrationLookup, Resolver, ServiceRegistry, ServiceResolver};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug)]
struct Cache;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_singleton_resolution_yields_one_instance() {
    let activations = Arc::new(AtomicUsize::new(0));
    let counter = activations.clone();

    let registry = ServiceRegistry::new();
    registry
        .register(
            move || {
                counter.fetch_add(1, Ordering::SeqCst);
                std::thread::sleep(Duration::from_millis(5));
                Arc::new(Cache)
            },
            Lifetime::Singleton,
        )
        .unwrap();
    let resolver = Arc::new(Resolver::new(Arc::new(registry)));

    let mut handles = Vec::new();
    for index in 0..16 {
        let resolver = resolver.clone();
        handles.push(tokio::task::spawn_blocking(move || {
            let scope = ScopedContext::new(format!("worker-{index}"));
            resolver.resolve::<Arc<Cache>>(&scope)
        }));
    }

    let mut instances = Vec::new();
    for handle in handles {
        instances.push(handle.await.unwrap().unwrap());
    }

    let first = &instances[0];
    assert!(instances.iter().all(|instance| Arc::ptr_eq(instance, first)));
    assert!(activations.load(Ordering::SeqCst) >= 1);
    assert_eq!(resolver.stats().singletons, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_duplicate_registration_admits_one() {
    fn new_cache() -> Arc<Cache> {
        Arc::new(Cache)
    }

    let registry = Arc::new(ServiceRegistry::new());
    let mut handles = Vec::new();
    for _ in 0..8 {
        let registry = registry.clone();
        handles.push(tokio::task::spawn_blocking(move || {
            registry.register(new_cache, Lifetime::Transient)
        }));
    }

    let mut succeeded = 0;
    for handle in handles {
        if handle.await.unwrap().is_ok() {
            succeeded += 1;
        }
    }

    assert_eq!(succeeded, 1);
    assert_eq!(
        registry
            .get_service_registrations(ServiceType::of::<Arc<Cache>>())
            .unwrap()
            .len(),
        1
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_registrations_get_unique_ids() {
    let registry = Arc::new(ServiceRegistry::new());
    let mut handles = Vec::new();
    for index in 0..8_u32 {
        let registry = registry.clone();
        handles.push(tokio::task::spawn_blocking(move || {
            let scope = registry.create_scope();
            scope.register(move || index, Lifetime::Transient)
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    // 作用域注册表彼此隔离，父注册表不受影响
    assert!(!registry.is_registered(ServiceType::of::<u32>()));
    assert!(registry.sequence().current() >= 16);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_scopes_resolved_in_parallel_stay_isolated() {
    let registry = ServiceRegistry::new();
    registry
        .register(|| Arc::new(Cache), Lifetime::Scoped)
        .unwrap();
    let resolver = Arc::new(Resolver::new(Arc::new(registry)));

    let mut handles = Vec::new();
    for index in 0..8 {
        let resolver = resolver.clone();
        handles.push(tokio::task::spawn_blocking(move || {
            let scope = ScopedContext::new(format!("request-{index}"));
            let first = resolver.resolve::<Arc<Cache>>(&scope).unwrap();
            let second = resolver.resolve::<Arc<Cache>>(&scope).unwrap();
            assert!(Arc::ptr_eq(&first, &second));
            first
        }));
    }

    let mut instances = Vec::new();
    for handle in handles {
        instances.push(handle.await.unwrap());
    }
    for (index, instance) in instances.iter().enumerate() {
        for other in &instances[index + 1..] {
            assert!(!Arc::ptr_eq(instance, other));
        }
    }
}
