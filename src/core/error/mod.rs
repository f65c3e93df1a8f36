//! 统一错误处理
//!
//! 1. 节点树的使用错误使用 `NodeError` 枚举，在调用点显式返回
//! 2. 解析过程中的“未找到”不是错误，所有解析接口都有默认值约定
//! 3. `TreeVarsResult<T>` 提供统一的返回类型，通过 `#[from]` 自动转换

use thiserror::Error;

pub mod config;
pub mod node;

pub use config::{ConfigError, ConfigResult};
pub use node::{NodeError, NodeResult};

/// 统一的错误类型
#[derive(Error, Debug)]
pub enum TreeVarsError {
    #[error("节点错误: {0}")]
    Node(#[from] NodeError),

    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),

    #[error("日志错误: {0}")]
    Logging(#[from] flexi_logger::FlexiLoggerError),
}

/// 统一的结果类型
pub type TreeVarsResult<T> = Result<T, TreeVarsError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::node::{NodeId, NodeKind};

    #[test]
    fn test_node_error_conversion() {
        let err = NodeError::InvalidChildType {
            parent: NodeKind::new("folder"),
            child: NodeKind::new("column"),
        };
        let wrapped: TreeVarsError = err.clone().into();
        assert!(matches!(wrapped, TreeVarsError::Node(ref e) if *e == err));
        assert_eq!(
            err.to_string(),
            "节点类型 'column' 不允许作为 'folder' 的子节点"
        );
    }

    #[test]
    fn test_config_error_conversion() {
        let err = ConfigError::Invalid {
            field: "log.level",
            reason: "empty".to_string(),
        };
        let wrapped: TreeVarsError = err.into();
        assert!(matches!(wrapped, TreeVarsError::Config(_)));
    }

    #[test]
    fn test_not_a_child_message_names_both_ids() {
        let err = NodeError::NotAChild {
            parent: NodeId::from("p"),
            child: NodeId::from("c"),
        };
        assert_eq!(err.to_string(), "节点 c 不是 p 的子节点");
    }
}
