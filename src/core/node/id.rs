//! 节点标识与节点类型

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

use crate::utils::id_gen;

/// 节点唯一标识
///
/// 新建节点使用随机生成的 UUID；反序列化等场景可由调用方指定
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(String);

impl NodeId {
    /// 生成新的唯一ID
    pub fn generate() -> Self {
        Self(id_gen::generate_node_id())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for NodeId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl Borrow<str> for NodeId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// 节点的运行时类型标签
///
/// 子节点类型校验与 `Node::ancestor_of_kind` 都按标签精确匹配
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeKind(&'static str);

impl NodeKind {
    pub const fn new(name: &'static str) -> Self {
        Self(name)
    }

    pub fn name(&self) -> &'static str {
        self.0
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}
