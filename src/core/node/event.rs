//! 节点事件与监听器
//!
//! 节点在子节点增删、属性变更以及事务开始/提交/回滚时同步通知监听器。
//! 通知按注册顺序的逆序进行，监听器 panic 会直接传播并中止后续通知。

use std::fmt;
use std::sync::Arc;

use super::{Node, NodeKind};

/// 可观察的节点属性
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeProperty {
    Id,
    Name,
}

impl fmt::Display for NodeProperty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeProperty::Id => write!(f, "id"),
            NodeProperty::Name => write!(f, "name"),
        }
    }
}

/// 节点事件
#[derive(Debug, Clone)]
pub enum NodeEvent {
    /// 子节点已添加，`index` 为子节点在同类型子节点中的位置
    ChildAdded {
        source: Arc<Node>,
        child: Arc<Node>,
        kind: NodeKind,
        index: usize,
    },
    /// 子节点已移除，`index` 为移除前在同类型子节点中的位置
    ChildRemoved {
        source: Arc<Node>,
        child: Arc<Node>,
        kind: NodeKind,
        index: usize,
    },
    /// 属性变更
    PropertyChanged {
        source: Arc<Node>,
        property: NodeProperty,
        old_value: String,
        new_value: String,
    },
    /// 事务开始
    TransactionStarted { source: Arc<Node>, message: String },
    /// 事务提交
    TransactionEnded { source: Arc<Node> },
    /// 事务回滚
    TransactionRolledBack { source: Arc<Node>, message: String },
}

impl NodeEvent {
    /// 触发事件的节点
    pub fn source(&self) -> &Arc<Node> {
        match self {
            NodeEvent::ChildAdded { source, .. }
            | NodeEvent::ChildRemoved { source, .. }
            | NodeEvent::PropertyChanged { source, .. }
            | NodeEvent::TransactionStarted { source, .. }
            | NodeEvent::TransactionEnded { source }
            | NodeEvent::TransactionRolledBack { source, .. } => source,
        }
    }
}

/// 节点事件监听器特征
pub trait NodeListener: Send + Sync {
    /// 处理节点事件
    fn on_event(&self, event: &NodeEvent);
}
