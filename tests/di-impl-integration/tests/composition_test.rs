//! 容器组合集成测试

use di_common::{DependencyError, DependencyResult, InfrastructureError, Lifetime};
use di_composition::Container;
use di_impl::{DependencyValidator, ServiceRegistry};
use std::io::Write;
use std::sync::Arc;

#[derive(Debug)]
struct Settings;

#[derive(Debug)]
struct Mailer {
    #[allow(dead_code)]
    settings: Arc<Settings>,
}

#[derive(Debug)]
struct Templates;

fn mailer_module(registry: &ServiceRegistry) -> DependencyResult<()> {
    registry.register(
        |settings: Arc<Settings>, _templates: Arc<Templates>| Arc::new(Mailer { settings }),
        Lifetime::Transient,
    )
}

#[test]
fn test_validator_lists_every_missing_type() {
    let registry = ServiceRegistry::new();
    mailer_module(&registry).unwrap();

    let missing = DependencyValidator::new().find_missing(&registry);
    assert_eq!(missing.len(), 2);
    assert!(missing[0].missing.contains("Settings"));
    assert!(missing[1].missing.contains("Templates"));
}

#[test]
fn test_build_from_config_file() {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    writeln!(file, "max_resolution_depth = 4").unwrap();
    writeln!(file, "validate_on_build = true").unwrap();

    let container = Container::builder()
        .with_config_file(file.path())
        .with_env_prefix("DI_COMPOSITION_TEST")
        .add_module(|registry: &ServiceRegistry| -> DependencyResult<()> {
            registry.register(|| Arc::new(Settings), Lifetime::Singleton)?;
            registry.register(|| Arc::new(Templates), Lifetime::Singleton)
        })
        .add_module(mailer_module)
        .build()
        .unwrap();

    assert_eq!(container.config().max_resolution_depth, Some(4));
    let scope = container.create_scope("mail");
    assert!(container.resolve::<Arc<Mailer>>(&scope).is_ok());
}

#[test]
fn test_build_fails_validation_with_aggregated_error() {
    let error = Container::builder()
        .with_env_prefix("DI_COMPOSITION_TEST_INVALID")
        .add_module(mailer_module)
        .build()
        .err()
        .unwrap();

    match error {
        InfrastructureError::DependencyError {
            source: DependencyError::ValidationFailed { missing },
        } => assert_eq!(missing.len(), 2),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_module_failure_stops_build() {
    let error = Container::builder()
        .with_env_prefix("DI_COMPOSITION_TEST_MODULE")
        .add_module(|registry: &ServiceRegistry| {
            registry.register(|| (), Lifetime::Transient)
        })
        .build()
        .err()
        .unwrap();

    match error {
        InfrastructureError::DependencyError { source } => {
            assert!(matches!(source, DependencyError::CannotRegisterModule { .. }));
            assert!(matches!(
                source.root_cause(),
                DependencyError::ActivatorFunctionInvalidReturnType { .. }
            ));
        }
        other => panic!("unexpected error: {other}"),
    }
}
