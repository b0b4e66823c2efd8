//! 多注册表访问器

use di_abstractions::{RegistrationLookup, ServiceRegistration};
use di_common::ServiceType;
use std::collections::HashSet;
use std::sync::Arc;

/// 按顺序串联多个注册表的只读视图
///
/// 查询时按顺序询问每个注册表，第一个认识该服务类型的注册表提供全部注册，
/// 后面的注册表中同类型的注册被遮蔽而不是合并。
pub struct MultiRegistryAccessor<'a> {
    registries: Vec<&'a dyn RegistrationLookup>,
}

impl<'a> MultiRegistryAccessor<'a> {
    pub fn new(registries: Vec<&'a dyn RegistrationLookup>) -> Self {
        Self { registries }
    }

    pub fn len(&self) -> usize {
        self.registries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registries.is_empty()
    }
}

impl RegistrationLookup for MultiRegistryAccessor<'_> {
    fn try_get_service_registrations(
        &self,
        service_type: ServiceType,
    ) -> Option<Vec<Arc<ServiceRegistration>>> {
        self.registries
            .iter()
            .find_map(|registry| registry.try_get_service_registrations(service_type))
    }

    fn service_types(&self) -> Vec<ServiceType> {
        let mut seen = HashSet::new();
        self.registries
            .iter()
            .flat_map(|registry| registry.service_types())
            .filter(|service_type| seen.insert(*service_type))
            .collect()
    }
}
