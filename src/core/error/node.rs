//! 节点树错误类型
//!
//! 涵盖节点树结构变更中的使用错误（非法子节点类型、移除非子节点等）

use thiserror::Error;

use crate::core::node::{NodeId, NodeKind};

/// 节点操作结果类型别名
pub type NodeResult<T> = Result<T, NodeError>;

/// 节点树使用错误
///
/// 这些错误都表示调用方的使用错误，不用于正常的控制流
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NodeError {
    #[error("节点类型 '{child}' 不允许作为 '{parent}' 的子节点")]
    InvalidChildType { parent: NodeKind, child: NodeKind },

    #[error("节点 {child} 不是 {parent} 的子节点")]
    NotAChild { parent: NodeId, child: NodeId },

    #[error("子节点索引越界: 类型 '{kind}' 的索引 {index}，当前数量 {len}")]
    IndexOutOfBounds {
        kind: NodeKind,
        index: usize,
        len: usize,
    },

    #[error("节点 {child} 已经挂载在 {parent} 下")]
    AlreadyAttached { child: NodeId, parent: NodeId },

    #[error("将 {child} 挂载到 {parent} 下会形成环")]
    CyclicAttachment { parent: NodeId, child: NodeId },

    #[error("监听器未注册在节点 {0} 上")]
    ListenerNotRegistered(NodeId),
}
