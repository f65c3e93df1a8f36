//! 节点树
//!
//! 带身份标识、可观察的树节点。每个节点有稳定的唯一ID、名称、
//! 一个父节点弱引用、有序的子节点列表以及监听器集合。
//!
//! 子节点按父节点声明的允许类型顺序分组存储，插入位置是子节点在
//! 同类型分组内的下标。节点可以选择性地暴露一个变量解析器
//! （见 [`Node::as_resolver_provider`]）。
//!
//! 所有监听器都在节点锁释放之后才被调用，监听器可以安全地读取节点。

mod event;
mod id;
#[cfg(test)]
mod recorder;

#[cfg(test)]
pub(crate) use recorder::EventRecorder;
pub use event::{NodeEvent, NodeListener, NodeProperty};
pub use id::{NodeId, NodeKind};

use parking_lot::RwLock;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, Weak};

use crate::core::error::{NodeError, NodeResult};
use crate::resolver::Resolver;

/// 节点构建器
pub struct NodeBuilder {
    kind: NodeKind,
    name: String,
    id: Option<NodeId>,
    allowed_child_kinds: Vec<NodeKind>,
    resolver: Option<Arc<dyn Resolver>>,
}

impl NodeBuilder {
    /// 使用调用方指定的ID（例如反序列化时），否则生成新的ID
    pub fn with_id(mut self, id: impl Into<NodeId>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// 声明允许的子节点类型，声明顺序即子节点分组顺序
    pub fn with_child_kinds(mut self, kinds: &[NodeKind]) -> Self {
        self.allowed_child_kinds = kinds.to_vec();
        self
    }

    pub fn with_resolver(mut self, resolver: Arc<dyn Resolver>) -> Self {
        self.resolver = Some(resolver);
        self
    }

    pub fn build(self) -> Arc<Node> {
        let NodeBuilder {
            kind,
            name,
            id,
            allowed_child_kinds,
            resolver,
        } = self;
        Arc::new_cyclic(|this| Node {
            this: this.clone(),
            kind,
            allowed_child_kinds,
            resolver,
            id: RwLock::new(id.unwrap_or_else(NodeId::generate)),
            name: RwLock::new(name),
            parent: RwLock::new(Weak::new()),
            children: RwLock::new(Vec::new()),
            listeners: RwLock::new(Vec::new()),
        })
    }
}

pub struct Node {
    this: Weak<Node>,
    kind: NodeKind,
    allowed_child_kinds: Vec<NodeKind>,
    resolver: Option<Arc<dyn Resolver>>,
    id: RwLock<NodeId>,
    name: RwLock<String>,
    parent: RwLock<Weak<Node>>,
    children: RwLock<Vec<Arc<Node>>>,
    listeners: RwLock<Vec<Arc<dyn NodeListener>>>,
}

impl Node {
    pub fn builder(kind: NodeKind, name: impl Into<String>) -> NodeBuilder {
        NodeBuilder {
            kind,
            name: name.into(),
            id: None,
            allowed_child_kinds: Vec::new(),
            resolver: None,
        }
    }

    /// 创建一个不允许任何子节点、没有解析器的节点
    pub fn new(kind: NodeKind, name: impl Into<String>) -> Arc<Node> {
        Self::builder(kind, name).build()
    }

    pub fn id(&self) -> NodeId {
        self.id.read().clone()
    }

    pub fn name(&self) -> String {
        self.name.read().clone()
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn allowed_child_kinds(&self) -> &[NodeKind] {
        &self.allowed_child_kinds
    }

    pub fn allows_child_kind(&self, kind: NodeKind) -> bool {
        self.allowed_child_kinds.contains(&kind)
    }

    /// 节点暴露的变量解析器（可选能力）
    pub fn as_resolver_provider(&self) -> Option<Arc<dyn Resolver>> {
        self.resolver.clone()
    }

    pub fn parent(&self) -> Option<Arc<Node>> {
        self.parent.read().upgrade()
    }

    pub fn is_root(&self) -> bool {
        self.parent().is_none()
    }

    /// 沿父节点链向上找到根节点
    pub fn root(self: &Arc<Self>) -> Arc<Node> {
        let mut current = self.clone();
        while let Some(parent) = current.parent() {
            current = parent;
        }
        current
    }

    /// 最近的严格祖先中类型与 `kind` 完全相同的节点
    pub fn ancestor_of_kind(&self, kind: NodeKind) -> Option<Arc<Node>> {
        let mut current = self.parent();
        while let Some(node) = current {
            if node.kind == kind {
                return Some(node);
            }
            current = node.parent();
        }
        None
    }

    /// 子节点快照，按存储顺序
    pub fn children(&self) -> Vec<Arc<Node>> {
        self.children.read().clone()
    }

    pub fn children_of_kind(&self, kind: NodeKind) -> Vec<Arc<Node>> {
        self.children
            .read()
            .iter()
            .filter(|child| child.kind == kind)
            .cloned()
            .collect()
    }

    pub fn child_count(&self) -> usize {
        self.children.read().len()
    }

    /// 在 `child` 所属类型分组的 `index` 位置插入子节点
    pub fn add_child(&self, child: Arc<Node>, index: usize) -> NodeResult<()> {
        let kind = child.kind;
        let rank = self.kind_rank(kind).ok_or(NodeError::InvalidChildType {
            parent: self.kind,
            child: kind,
        })?;
        self.ensure_acyclic(&child)?;

        {
            let mut children = self.children.write();
            let (start, len) = self.group_bounds(&children, rank);
            if index > len {
                return Err(NodeError::IndexOutOfBounds { kind, index, len });
            }

            let mut child_parent = child.parent.write();
            if let Some(existing) = child_parent.upgrade() {
                return Err(NodeError::AlreadyAttached {
                    child: child.id(),
                    parent: existing.id(),
                });
            }
            *child_parent = self.this.clone();
            children.insert(start + index, child.clone());
        }

        self.fire(|source| NodeEvent::ChildAdded {
            source,
            child,
            kind,
            index,
        });
        Ok(())
    }

    /// 追加到 `child` 所属类型分组的末尾
    pub fn add_child_last(&self, child: Arc<Node>) -> NodeResult<()> {
        let index = self
            .kind_rank(child.kind)
            .map(|rank| self.group_bounds(&self.children.read(), rank).1)
            .unwrap_or(0);
        self.add_child(child, index)
    }

    /// 移除子节点，`child` 必须是当前节点的子节点
    ///
    /// 返回 `Ok(true)` 表示子节点已被解除链接
    pub fn remove_child(&self, child: &Arc<Node>) -> NodeResult<bool> {
        let (kind, index) = {
            let mut children = self.children.write();
            let position = children
                .iter()
                .position(|c| Arc::ptr_eq(c, child))
                .ok_or_else(|| NodeError::NotAChild {
                    parent: self.id(),
                    child: child.id(),
                })?;
            let start = children
                .iter()
                .position(|c| c.kind == child.kind)
                .unwrap_or(position);
            children.remove(position);
            *child.parent.write() = Weak::new();
            (child.kind, position - start)
        };

        let child = child.clone();
        self.fire(|source| NodeEvent::ChildRemoved {
            source,
            child,
            kind,
            index,
        });
        Ok(true)
    }

    pub fn set_name(&self, name: impl Into<String>) {
        let name = name.into();
        let old = {
            let mut current = self.name.write();
            if *current == name {
                return;
            }
            std::mem::replace(&mut *current, name.clone())
        };
        self.fire(|source| NodeEvent::PropertyChanged {
            source,
            property: NodeProperty::Name,
            old_value: old,
            new_value: name,
        });
    }

    /// 重新指定节点ID
    ///
    /// 如果该节点是某棵已注册树的根，注册表通过监听此事件迁移条目
    pub fn set_id(&self, id: impl Into<NodeId>) {
        let id = id.into();
        let old = {
            let mut current = self.id.write();
            if *current == id {
                return;
            }
            std::mem::replace(&mut *current, id.clone())
        };
        self.fire(|source| NodeEvent::PropertyChanged {
            source,
            property: NodeProperty::Id,
            old_value: old.to_string(),
            new_value: id.to_string(),
        });
    }

    /// 开始一组逻辑上属于同一单元的变更，仅用于通知监听器
    pub fn begin(&self, message: impl Into<String>) {
        let message = message.into();
        self.fire(|source| NodeEvent::TransactionStarted { source, message });
    }

    pub fn commit(&self) {
        self.fire(|source| NodeEvent::TransactionEnded { source });
    }

    /// 通知监听器事务已回滚，节点状态不会自动恢复
    pub fn rollback(&self, message: impl Into<String>) {
        let message = message.into();
        self.fire(|source| NodeEvent::TransactionRolledBack { source, message });
    }

    pub fn add_listener(&self, listener: Arc<dyn NodeListener>) {
        self.listeners.write().push(listener);
    }

    pub fn remove_listener(&self, listener: &Arc<dyn NodeListener>) -> NodeResult<()> {
        let mut listeners = self.listeners.write();
        let position = listeners
            .iter()
            .position(|l| Arc::ptr_eq(l, listener))
            .ok_or_else(|| NodeError::ListenerNotRegistered(self.id()))?;
        listeners.remove(position);
        Ok(())
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.read().len()
    }

    /// 丢弃节点前的清理钩子：移除整棵子树上的所有监听器
    pub fn cleanup(&self) {
        self.listeners.write().clear();
        for child in self.children() {
            child.cleanup();
        }
    }

    fn kind_rank(&self, kind: NodeKind) -> Option<usize> {
        self.allowed_child_kinds.iter().position(|k| *k == kind)
    }

    /// 类型分组在扁平子节点列表中的起始位置和长度
    fn group_bounds(&self, children: &[Arc<Node>], rank: usize) -> (usize, usize) {
        let start = children
            .iter()
            .take_while(|c| self.kind_rank(c.kind).is_some_and(|r| r < rank))
            .count();
        let kind = self.allowed_child_kinds[rank];
        let len = children[start..]
            .iter()
            .take_while(|c| c.kind == kind)
            .count();
        (start, len)
    }

    fn ensure_acyclic(&self, child: &Arc<Node>) -> NodeResult<()> {
        let mut current = self.this.upgrade();
        while let Some(node) = current {
            if Arc::ptr_eq(&node, child) {
                return Err(NodeError::CyclicAttachment {
                    parent: self.id(),
                    child: child.id(),
                });
            }
            current = node.parent();
        }
        Ok(())
    }

    /// 按注册顺序的逆序通知监听器；没有监听器时不构造事件
    fn fire(&self, make_event: impl FnOnce(Arc<Node>) -> NodeEvent) {
        let listeners = self.listeners.read().clone();
        if listeners.is_empty() {
            return;
        }
        let Some(source) = self.this.upgrade() else {
            return;
        };
        let event = make_event(source);
        for listener in listeners.iter().rev() {
            listener.on_event(&event);
        }
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}

impl Eq for Node {}

impl Hash for Node {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.read().hash(state);
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("id", &*self.id.read())
            .field("name", &*self.name.read())
            .field("kind", &self.kind)
            .field("child_count", &self.child_count())
            .field("has_resolver", &self.resolver.is_some())
            .finish()
    }
}
