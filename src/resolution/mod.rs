//! 变量解析引擎
//!
//! 从任意节点出发，先沿祖先链向上、再（可选）从根节点下行遍历整棵树，
//! 查找能够解析给定命名空间和键的解析器。

mod helper;
pub mod substitute;
mod walk;

pub use helper::VariableHelper;
pub use substitute::{substitute, MISSING_VAR_PREFIX};
pub use walk::{ResolverWalk, WalkPhase};
