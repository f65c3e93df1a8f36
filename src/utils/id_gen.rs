//! ID生成器模块
//!
//! 节点ID使用随机 UUID（v4），保证在不同的树之间也不会冲突

use uuid::Uuid;

/// 生成新的节点ID
pub fn generate_node_id() -> String {
    Uuid::new_v4().to_string()
}
