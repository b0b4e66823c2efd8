//! 服务注册抽象接口

use crate::factory::Activator;
use di_common::{ActivationError, DependencyError, DependencyResult, Instance, Lifetime, ServiceType};
use once_cell::sync::OnceCell;
use std::any::TypeId;
use std::fmt;
use std::sync::Arc;

/// 服务注册信息
///
/// 把服务类型绑定到一个激活器和一个生命周期。创建后只有注册标识会被
/// 赋值一次，其余字段不可变。
pub struct ServiceRegistration {
    id: OnceCell<u64>,
    service_type: ServiceType,
    lifetime: Lifetime,
    activator: Arc<dyn Activator>,
}

impl ServiceRegistration {
    /// 创建新的注册信息，注册标识为 0 直到被注册列表分配
    pub fn new(activator: Arc<dyn Activator>, lifetime: Lifetime) -> Self {
        Self {
            id: OnceCell::new(),
            service_type: activator.service_type(),
            lifetime,
            activator,
        }
    }

    /// 注册标识，未分配时为 0
    pub fn id(&self) -> u64 {
        self.id.get().copied().unwrap_or(0)
    }

    /// 分配注册标识，只能成功一次
    pub fn set_id(&self, id: u64) -> DependencyResult<()> {
        self.id
            .set(id)
            .map_err(|attempted| DependencyError::RegistrationIdAlreadyAssigned {
                current: self.id(),
                attempted,
            })
    }

    pub fn service_type(&self) -> ServiceType {
        self.service_type
    }

    pub fn parameter_types(&self) -> &[ServiceType] {
        self.activator.parameter_types()
    }

    pub fn lifetime(&self) -> Lifetime {
        self.lifetime
    }

    /// 激活器身份
    pub fn activator_identity(&self) -> Option<TypeId> {
        self.activator.identity()
    }

    /// 使用已解析的参数调用激活器
    pub fn invoke(&self, arguments: &[Instance]) -> Result<Instance, ActivationError> {
        let expected = self.parameter_types().len();
        if arguments.len() != expected {
            return Err(format!(
                "{} 需要 {} 个参数, 实际收到 {} 个",
                self.service_type,
                expected,
                arguments.len()
            )
            .into());
        }
        self.activator.invoke(arguments)
    }
}

impl fmt::Debug for ServiceRegistration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceRegistration")
            .field("id", &self.id())
            .field("service_type", &self.service_type)
            .field("parameter_types", &self.parameter_types())
            .field("lifetime", &self.lifetime)
            .field("activator", &"<function>")
            .finish()
    }
}

/// 只读注册查询 trait
///
/// 解析器和验证器只通过这个接口读取注册信息。
pub trait RegistrationLookup: Send + Sync {
    /// 获取服务类型的全部注册，不存在或为空时返回 `None`
    fn try_get_service_registrations(
        &self,
        service_type: ServiceType,
    ) -> Option<Vec<Arc<ServiceRegistration>>>;

    /// 已注册的全部服务类型
    fn service_types(&self) -> Vec<ServiceType>;

    /// 检查服务类型是否已注册
    fn is_registered(&self, service_type: ServiceType) -> bool {
        self.try_get_service_registrations(service_type).is_some()
    }

    /// 获取服务类型的全部注册，不存在时返回错误
    fn get_service_registrations(
        &self,
        service_type: ServiceType,
    ) -> DependencyResult<Vec<Arc<ServiceRegistration>>> {
        self.try_get_service_registrations(service_type)
            .ok_or_else(|| DependencyError::not_registered(service_type.name()))
    }

    /// 获取唯一的注册
    ///
    /// 存在多个注册时同样返回 `None`，调用方需要显式区分实现。
    fn try_get_single_service_registration(
        &self,
        service_type: ServiceType,
    ) -> Option<Arc<ServiceRegistration>> {
        let mut registrations = self.try_get_service_registrations(service_type)?;
        if registrations.len() == 1 {
            registrations.pop()
        } else {
            None
        }
    }
}
