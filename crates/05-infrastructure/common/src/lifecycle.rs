//! 服务生命周期定义

use crate::metadata::Instance;
use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;

/// 服务生命周期类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Lifetime {
    /// 单例模式 - 注册表树的整个生命周期内只创建一个实例
    Singleton,
    /// 作用域模式 - 在同一作用域上下文内共享实例
    Scoped,
    /// 瞬时模式 - 每次解析调用都创建新实例
    #[default]
    Transient,
}

impl Lifetime {
    /// 是否会跨解析调用缓存实例
    pub fn is_cached(self) -> bool {
        !matches!(self, Self::Transient)
    }
}

impl fmt::Display for Lifetime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Singleton => "Singleton",
            Self::Scoped => "Scoped",
            Self::Transient => "Transient",
        };
        f.write_str(name)
    }
}

/// 作用域上下文
///
/// 一个工作单元（例如一次请求）持有的作用域实例缓存，键为注册标识。
/// 由调用方创建并显式传给解析器，调用方丢弃时其中的实例随之释放。
///
/// 内部映射有锁保护，但同一上下文仍应只服务于一个逻辑工作单元。
#[derive(Debug)]
pub struct ScopedContext {
    id: uuid::Uuid,
    name: String,
    created_at: chrono::DateTime<chrono::Utc>,
    instances: parking_lot::Mutex<HashMap<u64, Instance>>,
}

impl ScopedContext {
    /// 创建新作用域
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4(),
            name: name.into(),
            created_at: chrono::Utc::now(),
            instances: parking_lot::Mutex::new(HashMap::new()),
        }
    }

    /// 创建子作用域
    ///
    /// 子作用域拥有独立的实例缓存，只继承名称前缀。
    pub fn child(&self, name: impl Into<String>) -> Self {
        Self::new(format!("{}.{}", self.name, name.into()))
    }

    pub fn id(&self) -> uuid::Uuid {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn created_at(&self) -> chrono::DateTime<chrono::Utc> {
        self.created_at
    }

    /// 获取作用域实例
    pub fn get(&self, registration_id: u64) -> Option<Instance> {
        self.instances.lock().get(&registration_id).cloned()
    }

    /// 保存作用域实例
    ///
    /// 已存在实例时保留旧值并返回旧值，保证同一作用域内只有一个实例。
    pub fn keep(&self, registration_id: u64, instance: Instance) -> Instance {
        self.instances
            .lock()
            .entry(registration_id)
            .or_insert(instance)
            .clone()
    }

    /// 当前缓存的实例数量
    pub fn len(&self) -> usize {
        self.instances.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for ScopedContext {
    fn default() -> Self {
        Self::new("root")
    }
}
