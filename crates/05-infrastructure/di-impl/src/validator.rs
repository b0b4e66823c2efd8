//! 依赖验证器

use di_abstractions::RegistrationLookup;
use di_common::{DependencyError, DependencyResult, MissingDependency};
use tracing::{error, info};

/// 依赖验证器
///
/// 检查每个注册声明的参数类型都已注册。不会在第一个缺失处停止，
/// 而是收集全部缺失后一次性报告。
#[derive(Debug, Default, Clone, Copy)]
pub struct DependencyValidator;

impl DependencyValidator {
    pub fn new() -> Self {
        Self
    }

    /// 收集全部缺失依赖，按消费者和缺失类型名称排序
    pub fn find_missing(&self, lookup: &dyn RegistrationLookup) -> Vec<MissingDependency> {
        let mut missing: Vec<MissingDependency> = lookup
            .service_types()
            .into_iter()
            .filter_map(|service_type| lookup.try_get_service_registrations(service_type))
            .flatten()
            .flat_map(|registration| {
                registration
                    .parameter_types()
                    .iter()
                    .filter(|parameter| !lookup.is_registered(**parameter))
                    .map(|parameter| MissingDependency {
                        consumer: registration.service_type().name().to_string(),
                        missing: parameter.name().to_string(),
                    })
                    .collect::<Vec<_>>()
            })
            .collect();

        missing.sort_by(|a, b| (&a.consumer, &a.missing).cmp(&(&b.consumer, &b.missing)));
        missing.dedup();
        missing
    }

    /// 验证全部依赖可满足
    pub fn validate(&self, lookup: &dyn RegistrationLookup) -> DependencyResult<()> {
        let missing = self.find_missing(lookup);
        if missing.is_empty() {
            info!("依赖验证通过: {} 个服务类型", lookup.service_types().len());
            return Ok(());
        }

        for miss in &missing {
            error!("缺失依赖: {}", miss);
        }
        Err(DependencyError::ValidationFailed { missing })
    }
}
