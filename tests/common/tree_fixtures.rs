//! 测试用节点树生成模块

use std::sync::Arc;

use treevars::core::{Node, NodeKind, Value};
use treevars::resolver::SimpleResolver;

pub const WORKSPACE: NodeKind = NodeKind::new("workspace");
pub const FOLDER: NodeKind = NodeKind::new("folder");
pub const REPORT: NodeKind = NodeKind::new("report");

/// 创建可以容纳文件夹和报表的容器节点
pub fn container(kind: NodeKind, name: &str) -> Arc<Node> {
    Node::builder(kind, name)
        .with_child_kinds(&[FOLDER, REPORT])
        .build()
}

/// 创建带解析器的容器节点
pub fn container_with(
    kind: NodeKind,
    name: &str,
    namespace: Option<&str>,
    vars: &[(&str, Value)],
) -> (Arc<Node>, Arc<SimpleResolver>) {
    let resolver = Arc::new(SimpleResolver::new(namespace, name));
    for (key, value) in vars {
        resolver.store(key, value.clone());
    }
    let node = Node::builder(kind, name)
        .with_child_kinds(&[FOLDER, REPORT])
        .with_resolver(resolver.clone())
        .build();
    (node, resolver)
}

/// 创建带解析器的报表节点（叶子）
pub fn report_with(name: &str, namespace: Option<&str>, vars: &[(&str, Value)]) -> Arc<Node> {
    let resolver = Arc::new(SimpleResolver::new(namespace, name));
    for (key, value) in vars {
        resolver.store(key, value.clone());
    }
    Node::builder(REPORT, name).with_resolver(resolver).build()
}

pub fn text(s: &str) -> Value {
    Value::from(s)
}
