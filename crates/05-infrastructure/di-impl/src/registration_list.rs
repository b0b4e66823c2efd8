//! 注册列表

use crate::sequence::IdentifierSequence;
use di_abstractions::ServiceRegistration;
use di_common::{DependencyError, DependencyResult, ServiceType};
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::warn;

/// 一个服务类型的全部注册
///
/// 同一服务类型可以有多个实现。列表内不会出现两个身份相同的激活器，
/// 成员的注册标识在加入列表时分配。
#[derive(Debug)]
pub struct RegistrationList {
    id: u64,
    service_type: ServiceType,
    registrations: RwLock<Vec<Arc<ServiceRegistration>>>,
}

impl RegistrationList {
    /// 创建空列表，从序列中领取列表自己的标识
    pub fn new(service_type: ServiceType, sequence: &IdentifierSequence) -> Self {
        Self {
            id: sequence.next_id(),
            service_type,
            registrations: RwLock::new(Vec::new()),
        }
    }

    /// 复制出一个新列表
    ///
    /// 成员按引用共享，新列表领取新的标识，之后两边的追加互不可见。
    pub fn fork(&self, sequence: &IdentifierSequence) -> Self {
        Self {
            id: sequence.next_id(),
            service_type: self.service_type,
            registrations: RwLock::new(self.registrations.read().clone()),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn service_type(&self) -> ServiceType {
        self.service_type
    }

    /// 追加注册并分配注册标识
    ///
    /// 重复检测和追加在同一把写锁内完成。
    pub fn add_registration(
        &self,
        registration: Arc<ServiceRegistration>,
        sequence: &IdentifierSequence,
    ) -> DependencyResult<()> {
        if registration.service_type() != self.service_type {
            return Err(DependencyError::InstanceTypeMismatch {
                expected: self.service_type.name().to_string(),
                actual: registration.service_type().name().to_string(),
            });
        }

        let mut registrations = self.registrations.write();

        if let Some(identity) = registration.activator_identity() {
            let duplicate = registrations
                .iter()
                .any(|existing| existing.activator_identity() == Some(identity));
            if duplicate {
                warn!("重复注册激活器: {}", self.service_type);
                return Err(DependencyError::TypeAlreadyRegistered {
                    type_name: self.service_type.name().to_string(),
                });
            }
        }

        registration.set_id(sequence.next_id())?;
        registrations.push(registration);
        Ok(())
    }

    /// 当前全部注册的快照
    pub fn registrations(&self) -> Vec<Arc<ServiceRegistration>> {
        self.registrations.read().clone()
    }

    pub fn len(&self) -> usize {
        self.registrations.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
