//! 服务解析器抽象接口
//!
//! 提供依赖解析和服务实例化的能力

use di_common::{DependencyError, DependencyResult, Instance, ScopedContext, ServiceType};

/// 服务解析器 trait
///
/// 负责在给定作用域内构建服务的完整依赖图并返回根实例
pub trait ServiceResolver: Send + Sync {
    /// 解析指定服务类型（类型擦除）
    fn resolve_any(&self, scope: &ScopedContext, service_type: ServiceType)
        -> DependencyResult<Instance>;

    /// 解析指定类型的服务
    fn resolve<T>(&self, scope: &ScopedContext) -> DependencyResult<T>
    where
        T: Clone + Send + Sync + 'static,
        Self: Sized,
    {
        let instance = self.resolve_any(scope, ServiceType::of::<T>())?;
        downcast_instance(&instance)
    }

    /// 检查是否可以解析指定类型
    fn can_resolve(&self, service_type: ServiceType) -> bool;
}

/// 把类型擦除的实例还原为服务类型的值
pub fn downcast_instance<T>(instance: &Instance) -> DependencyResult<T>
where
    T: Clone + 'static,
{
    (**instance)
        .downcast_ref::<T>()
        .cloned()
        .ok_or_else(|| DependencyError::InstanceTypeMismatch {
            expected: std::any::type_name::<T>().to_string(),
            actual: "<other>".to_string(),
        })
}
