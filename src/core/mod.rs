pub mod error;
pub mod node;
pub mod value;

// 错误和结果类型
pub use error::{ConfigError, NodeError, NodeResult, TreeVarsError, TreeVarsResult};

// 核心数据类型
pub use node::{Node, NodeBuilder, NodeEvent, NodeId, NodeKind, NodeListener, NodeProperty};
pub use value::Value;
