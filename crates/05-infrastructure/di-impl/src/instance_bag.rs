//! 实例袋
//!
//! 按生命周期保存已构建的实例，键为注册标识：
//!
//! | 生命周期 | 读取 | 写入 |
//! |---|---|---|
//! | Singleton | 本地映射，未命中时委托父级 | 单例层本地保存，否则委托父级直到根 |
//! | Scoped | 作用域上下文 | 作用域上下文 |
//! | Transient | 仅非单例层的本地映射 | 仅非单例层的本地映射 |
//!
//! 单次解析调用使用一个从根派生的调用级实例袋，瞬时实例只在这一次调用内
//! 共享，调用结束随实例袋一起丢弃。

use di_abstractions::ServiceRegistration;
use di_common::{Instance, Lifetime, ScopedContext};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::trace;

/// 两级实例存储
#[derive(Debug)]
pub struct InstanceBag {
    tier: Lifetime,
    local: RwLock<HashMap<u64, Instance>>,
    parent: Option<Arc<InstanceBag>>,
}

impl InstanceBag {
    /// 创建根单例层
    pub fn singleton() -> Self {
        Self {
            tier: Lifetime::Singleton,
            local: RwLock::new(HashMap::new()),
            parent: None,
        }
    }

    /// 从父级派生调用级实例袋
    ///
    /// 创建时复制父级当前条目的快照，之后父级的变化不会反映到快照中，
    /// 单例读取未命中时仍会委托父级。
    pub fn child(parent: &Arc<Self>) -> Self {
        Self {
            tier: Lifetime::Transient,
            local: RwLock::new(parent.local.read().clone()),
            parent: Some(parent.clone()),
        }
    }

    /// 查找注册已有的实例
    pub fn try_resolve_instance(
        &self,
        registration: &ServiceRegistration,
        scope: &ScopedContext,
    ) -> Option<Instance> {
        let id = registration.id();
        let found = match registration.lifetime() {
            Lifetime::Singleton => self.find_singleton(id),
            Lifetime::Scoped => scope.get(id),
            Lifetime::Transient if self.tier != Lifetime::Singleton => {
                self.local.read().get(&id).cloned()
            }
            Lifetime::Transient => None,
        };

        if found.is_some() {
            trace!(
                "实例命中: {} ({}, id={})",
                registration.service_type(),
                registration.lifetime(),
                id
            );
        }
        found
    }

    /// 按注册的生命周期保存实例
    ///
    /// 返回最终保存的实例：如果并发的另一次激活已经先保存了同一注册的
    /// 单例或作用域实例，返回先保存的那一个。
    pub fn keep_instance(
        &self,
        registration: &ServiceRegistration,
        instance: Instance,
        scope: &ScopedContext,
    ) -> Instance {
        let id = registration.id();
        match registration.lifetime() {
            Lifetime::Singleton => self.keep_singleton(id, instance),
            Lifetime::Scoped => scope.keep(id, instance),
            Lifetime::Transient if self.tier != Lifetime::Singleton => {
                self.keep_local(id, instance)
            }
            Lifetime::Transient => instance,
        }
    }

    /// 本地保存的实例数量
    pub fn len(&self) -> usize {
        self.local.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn find_singleton(&self, id: u64) -> Option<Instance> {
        if let Some(instance) = self.local.read().get(&id) {
            return Some(instance.clone());
        }
        self.parent
            .as_ref()
            .and_then(|parent| parent.find_singleton(id))
    }

    fn keep_singleton(&self, id: u64, instance: Instance) -> Instance {
        match (&self.parent, self.tier) {
            (Some(parent), tier) if tier != Lifetime::Singleton => {
                let kept = parent.keep_singleton(id, instance);
                self.local.write().insert(id, kept.clone());
                kept
            }
            _ => self.keep_local(id, instance),
        }
    }

    fn keep_local(&self, id: u64, instance: Instance) -> Instance {
        self.local
            .write()
            .entry(id)
            .or_insert(instance)
            .clone()
    }
}
