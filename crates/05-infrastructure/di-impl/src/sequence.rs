//! 标识序列

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// 进程级标识序列，所有根注册表都从这里取标识
static GLOBAL_IDENTIFIER_SEQUENCE: once_cell::sync::Lazy<Arc<IdentifierSequence>> =
    once_cell::sync::Lazy::new(|| Arc::new(IdentifierSequence::new()));

/// 线程安全的单调递增标识生成器
///
/// 注册信息和注册列表共用同一个序列。根注册表使用 [`IdentifierSequence::global`]，
/// 所以标识在整个进程内唯一，互相独立的注册表可以共用同一个作用域上下文。
/// 标识从 1 开始，0 表示"未分配"。
#[derive(Debug, Default)]
pub struct IdentifierSequence {
    last: AtomicU64,
}

impl IdentifierSequence {
    pub fn new() -> Self {
        Self::default()
    }

    /// 进程级共享序列
    pub fn global() -> Arc<Self> {
        GLOBAL_IDENTIFIER_SEQUENCE.clone()
    }

    /// 生成下一个标识
    pub fn next_id(&self) -> u64 {
        self.last.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// 最近一次生成的标识
    pub fn current(&self) -> u64 {
        self.last.load(Ordering::Relaxed)
    }
}
