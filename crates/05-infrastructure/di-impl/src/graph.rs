//! 依赖图
//!
//! 单次解析调用内构建的依赖节点树。节点保存在数组中，父子关系用下标表示，
//! 调用结束后整个图被丢弃。

use di_abstractions::ServiceRegistration;
use di_common::{DependencyError, DependencyResult, Instance};
use std::sync::Arc;

/// 节点下标
pub type NodeId = usize;

/// 依赖节点
#[derive(Debug)]
pub struct DependencyInfo {
    registration: Arc<ServiceRegistration>,
    instance: Option<Instance>,
    consumer: Option<NodeId>,
    children: Vec<NodeId>,
    depth: usize,
}

impl DependencyInfo {
    fn new(
        registration: Arc<ServiceRegistration>,
        consumer: Option<NodeId>,
        depth: usize,
    ) -> Self {
        Self {
            registration,
            instance: None,
            consumer,
            children: Vec::new(),
            depth,
        }
    }

    pub fn registration(&self) -> &Arc<ServiceRegistration> {
        &self.registration
    }

    /// 节点已持有实例
    pub fn has_instance(&self) -> bool {
        self.instance.is_some()
    }

    /// 消费者（父节点），根节点为 `None`
    pub fn consumer(&self) -> Option<NodeId> {
        self.consumer
    }

    /// 已挂载的依赖节点，按参数顺序排列
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    /// 全部声明的参数都已挂载为子节点
    pub fn is_leaf(&self) -> bool {
        self.children.len() == self.registration.parameter_types().len()
    }

    /// 设置实例，只能成功一次
    pub fn set_instance(&mut self, instance: Instance) -> DependencyResult<()> {
        if self.instance.is_some() {
            return Err(DependencyError::InstanceAlreadySet {
                type_name: self.registration.service_type().name().to_string(),
            });
        }
        self.instance = Some(instance);
        Ok(())
    }
}

/// 一次解析调用的依赖图
#[derive(Debug)]
pub struct DependencyGraph {
    nodes: Vec<DependencyInfo>,
}

impl DependencyGraph {
    const ROOT: NodeId = 0;

    /// 以根注册创建依赖图
    pub fn new(root: Arc<ServiceRegistration>) -> Self {
        Self {
            nodes: vec![DependencyInfo::new(root, None, 0)],
        }
    }

    pub fn root(&self) -> NodeId {
        Self::ROOT
    }

    pub fn node(&self, id: NodeId) -> &DependencyInfo {
        &self.nodes[id]
    }

    /// 为消费者挂载一个依赖节点
    ///
    /// `instance` 非空时节点在构建时就已经有实例（例如已构建的单例），
    /// 调用方不需要继续展开它。
    pub fn attach(
        &mut self,
        consumer: NodeId,
        registration: Arc<ServiceRegistration>,
        instance: Option<Instance>,
    ) -> DependencyResult<NodeId> {
        let id = self.nodes.len();
        let depth = self.nodes[consumer].depth + 1;
        let mut node = DependencyInfo::new(registration, Some(consumer), depth);
        if let Some(instance) = instance {
            node.set_instance(instance)?;
        }
        self.nodes.push(node);
        self.nodes[consumer].children.push(id);
        Ok(id)
    }

    /// 从指定节点开始（包含该节点）沿消费者链向上遍历
    pub fn consumer_chain(&self, from: NodeId) -> impl Iterator<Item = &DependencyInfo> + '_ {
        std::iter::successors(Some(&self.nodes[from]), move |node| {
            node.consumer.map(|consumer| &self.nodes[consumer])
        })
    }

    /// 检查把 `registration_id` 挂到 `from` 下是否会形成环
    ///
    /// 形成环时返回从根到该依赖的链路描述。
    pub fn find_cycle(&self, from: NodeId, registration: &ServiceRegistration) -> Option<String> {
        let id = registration.id();
        let closes_cycle = self
            .consumer_chain(from)
            .any(|node| node.registration.id() == id);
        if !closes_cycle {
            return None;
        }

        let mut chain: Vec<&str> = self
            .consumer_chain(from)
            .map(|node| node.registration.service_type().name())
            .collect();
        chain.reverse();
        chain.push(registration.service_type().name());
        Some(chain.join(" -> "))
    }

    pub fn set_instance(&mut self, id: NodeId, instance: Instance) -> DependencyResult<()> {
        self.nodes[id].set_instance(instance)
    }

    /// 按参数顺序收集子节点实例
    pub fn child_instances(&self, id: NodeId) -> DependencyResult<Vec<Instance>> {
        let node = &self.nodes[id];
        node.children
            .iter()
            .map(|&child| {
                self.nodes[child].instance.clone().ok_or_else(|| {
                    DependencyError::cannot_resolve(
                        node.registration.service_type().name(),
                        format!(
                            "依赖 {} 尚未实例化",
                            self.nodes[child].registration.service_type()
                        ),
                    )
                })
            })
            .collect()
    }

    /// 根节点实例
    pub fn root_instance(&self) -> DependencyResult<Instance> {
        let root = &self.nodes[Self::ROOT];
        root.instance.clone().ok_or_else(|| {
            DependencyError::cannot_resolve(
                root.registration.service_type().name(),
                "根节点未实例化",
            )
        })
    }
}
