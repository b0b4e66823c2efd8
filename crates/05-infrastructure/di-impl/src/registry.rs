//! 服务注册表
//!
//! 服务类型到注册列表的映射。所有注册表从进程级标识序列取标识，作用域
//! 注册表和链接注册表还与来源共享根单例实例袋，因此注册标识在进程内唯一，
//! 一棵注册表树内单例只有一个。

use crate::instance_bag::InstanceBag;
use crate::registration_list::RegistrationList;
use crate::sequence::IdentifierSequence;
use dashmap::DashMap;
use di_abstractions::{
    Activator, InstanceActivator, IntoActivator, IntoFallibleActivator, RegistrationLookup,
    ServiceRegistration,
};
use di_common::{DependencyError, DependencyResult, Lifetime, ServiceType};
use std::sync::Arc;
use tracing::{debug, info};

/// 服务模块
///
/// 一组相关注册的批量入口，任何闭包 `Fn(&ServiceRegistry) -> DependencyResult<()>`
/// 都是一个模块。
pub trait ServiceModule: Send + Sync {
    /// 把模块内的服务注册到注册表
    fn register(&self, registry: &ServiceRegistry) -> DependencyResult<()>;

    /// 模块名称，用于日志
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

impl<F> ServiceModule for F
where
    F: Fn(&ServiceRegistry) -> DependencyResult<()> + Send + Sync,
{
    fn register(&self, registry: &ServiceRegistry) -> DependencyResult<()> {
        self(registry)
    }
}

#[derive(Debug)]
struct RegistryEntry {
    list: Arc<RegistrationList>,
    /// 列表与另一个注册表共享，写入前需要先复制
    shared: bool,
}

/// 服务注册表
#[derive(Debug)]
pub struct ServiceRegistry {
    sequence: Arc<IdentifierSequence>,
    entries: DashMap<ServiceType, RegistryEntry>,
    singletons: Arc<InstanceBag>,
    /// 链接注册表只活过一次解析调用，缓存生命周期在其中降级为瞬时
    linked: bool,
}

impl ServiceRegistry {
    /// 创建新的根注册表
    pub fn new() -> Self {
        Self {
            sequence: IdentifierSequence::global(),
            entries: DashMap::new(),
            singletons: Arc::new(InstanceBag::singleton()),
            linked: false,
        }
    }

    /// 注册函数激活器
    ///
    /// 参数类型和服务类型取自函数签名。
    pub fn register<F, Args>(&self, activator: F, lifetime: Lifetime) -> DependencyResult<()>
    where
        F: IntoActivator<Args>,
    {
        self.register_activator(activator.into_activator(), lifetime)
    }

    /// 注册返回 `Result` 的函数激活器
    ///
    /// 服务类型是 `Ok` 分支的类型，`Err` 在解析时包装为
    /// [`DependencyError::CannotResolveService`]。
    pub fn register_fallible<F, Args>(&self, activator: F, lifetime: Lifetime) -> DependencyResult<()>
    where
        F: IntoFallibleActivator<Args>,
    {
        self.register_activator(activator.into_activator(), lifetime)
    }

    /// 注册已构建的实例，生命周期为单例
    pub fn register_instance<T>(&self, value: T) -> DependencyResult<()>
    where
        T: Send + Sync + 'static,
    {
        self.register_activator(Arc::new(InstanceActivator::new(value)), Lifetime::Singleton)
    }

    /// 注册类型擦除的激活器
    pub fn register_activator(
        &self,
        activator: Arc<dyn Activator>,
        lifetime: Lifetime,
    ) -> DependencyResult<()> {
        let service_type = activator.service_type();
        if service_type.is_unit() {
            return Err(DependencyError::ActivatorFunctionInvalidReturnType {
                type_name: service_type.name().to_string(),
            });
        }

        let lifetime = if self.linked && lifetime.is_cached() {
            debug!("链接注册表中的 {} 按瞬时处理: {}", lifetime, service_type);
            Lifetime::Transient
        } else {
            lifetime
        };

        let registration = Arc::new(ServiceRegistration::new(activator, lifetime));
        let list = self.writable_list(service_type);
        list.add_registration(registration.clone(), &self.sequence)?;

        debug!(
            "注册服务: {} ({}, id={}, 参数 {})",
            service_type,
            lifetime,
            registration.id(),
            registration.parameter_types().len()
        );
        Ok(())
    }

    /// 应用一个服务模块
    pub fn register_module<M>(&self, module: &M) -> DependencyResult<()>
    where
        M: ServiceModule + ?Sized,
    {
        module
            .register(self)
            .map_err(|source| DependencyError::CannotRegisterModule {
                source: Box::new(source),
            })?;
        info!("注册模块: {}", module.name());
        Ok(())
    }

    /// 依次应用多个服务模块，遇到第一个失败即停止
    pub fn register_modules(&self, modules: &[Box<dyn ServiceModule>]) -> DependencyResult<()> {
        modules
            .iter()
            .try_for_each(|module| self.register_module(module.as_ref()))
    }

    /// 创建作用域注册表
    ///
    /// 新注册表持有当前全部注册列表的引用。任何一方向共享的列表追加注册前
    /// 都会先复制该列表，因此之后双方的新增互不可见。
    pub fn create_scope(&self) -> Self {
        let entries = DashMap::new();
        for mut entry in self.entries.iter_mut() {
            entry.shared = true;
            entries.insert(
                *entry.key(),
                RegistryEntry {
                    list: entry.list.clone(),
                    shared: true,
                },
            );
        }

        debug!("创建作用域注册表: 继承 {} 个服务类型", entries.len());
        Self {
            sequence: self.sequence.clone(),
            entries,
            singletons: self.singletons.clone(),
            linked: self.linked,
        }
    }

    /// 创建空的链接注册表，与当前注册表共享标识序列和单例
    ///
    /// 链接注册表用作单次解析的临时覆盖层，注册到其中的单例和作用域服务
    /// 都按瞬时处理，实例不会留在根实例袋或作用域上下文里。
    pub fn create_linked_registry(&self) -> Self {
        Self {
            sequence: self.sequence.clone(),
            entries: DashMap::new(),
            singletons: self.singletons.clone(),
            linked: true,
        }
    }

    /// 已知服务类型的数量
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 注册表树共享的根单例实例袋
    pub(crate) fn singletons(&self) -> &Arc<InstanceBag> {
        &self.singletons
    }

    /// 注册表树共享的标识序列
    pub fn sequence(&self) -> &Arc<IdentifierSequence> {
        &self.sequence
    }

    fn writable_list(&self, service_type: ServiceType) -> Arc<RegistrationList> {
        let mut entry = self
            .entries
            .entry(service_type)
            .or_insert_with(|| RegistryEntry {
                list: Arc::new(RegistrationList::new(service_type, &self.sequence)),
                shared: false,
            });

        if entry.shared {
            entry.list = Arc::new(entry.list.fork(&self.sequence));
            entry.shared = false;
        }
        entry.list.clone()
    }
}

impl Default for ServiceRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl RegistrationLookup for ServiceRegistry {
    fn try_get_service_registrations(
        &self,
        service_type: ServiceType,
    ) -> Option<Vec<Arc<ServiceRegistration>>> {
        let registrations = self.entries.get(&service_type)?.list.registrations();
        if registrations.is_empty() {
            None
        } else {
            Some(registrations)
        }
    }

    fn service_types(&self) -> Vec<ServiceType> {
        self.entries
            .iter()
            .filter(|entry| !entry.list.is_empty())
            .map(|entry| *entry.key())
            .collect()
    }
}
