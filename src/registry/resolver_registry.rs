//! 按树根ID索引的解析器注册表
//!
//! 所有操作（包括查找根节点的遍历）都在同一把锁内完成，
//! 并发的根节点重命名不会被观察到“迁移了一半”的状态。
//! 条目只持有根节点的弱引用，不会阻止整棵树被释放。

use parking_lot::Mutex;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Weak};

use super::rename::RenameListener;
use crate::core::node::{Node, NodeId, NodeListener};
use crate::resolver::Resolver;

/// 单棵树的注册信息
struct TreeEntry {
    root: Weak<Node>,
    resolvers: Vec<Arc<dyn Resolver>>,
    listener: Arc<dyn NodeListener>,
}

impl TreeEntry {
    fn is_root(&self, node: &Arc<Node>) -> bool {
        self.root
            .upgrade()
            .is_some_and(|root| Arc::ptr_eq(&root, node))
    }

    fn add(&mut self, resolver: Arc<dyn Resolver>) -> bool {
        if self.resolvers.iter().any(|r| Arc::ptr_eq(r, &resolver)) {
            return false;
        }
        self.resolvers.push(resolver);
        true
    }

    /// 从根节点上摘除监听器，根节点已释放时忽略
    fn detach(&self) {
        if let Some(root) = self.root.upgrade() {
            // 监听器可能已被 cleanup 移除
            let _ = root.remove_listener(&self.listener);
        }
    }
}

#[derive(Default)]
pub(crate) struct RegistryState {
    trees: HashMap<NodeId, TreeEntry>,
}

impl RegistryState {
    /// 删除根节点已被释放的条目
    fn prune(&mut self) -> usize {
        let before = self.trees.len();
        self.trees.retain(|id, entry| {
            let alive = entry.root.strong_count() > 0;
            if !alive {
                log::debug!("清理已释放的树: {}", id);
            }
            alive
        });
        before - self.trees.len()
    }

    /// 根节点ID从 `old_id` 变为 `new_id` 时迁移条目
    pub(crate) fn migrate(&mut self, source: &Arc<Node>, old_id: &NodeId, new_id: NodeId) -> bool {
        match self.trees.get(old_id) {
            Some(entry) if entry.is_root(source) => {}
            _ => return false,
        }
        let Some(mut entry) = self.trees.remove(old_id) else {
            return false;
        };

        if let Some(existing) = self.trees.remove(&new_id) {
            log::warn!("迁移目标已存在注册条目，合并解析器列表: {}", new_id);
            if existing.is_root(source) {
                existing.detach();
            }
            for resolver in existing.resolvers {
                entry.add(resolver);
            }
        }
        self.trees.insert(new_id, entry);
        true
    }
}

/// 解析器注册表
///
/// 可克隆的句柄，克隆出的实例共享同一份状态。
/// 注册关系是树级别的：同一棵树中的任意节点共享同一个解析器列表。
#[derive(Clone, Default)]
pub struct ResolverRegistry {
    state: Arc<Mutex<RegistryState>>,
}

impl ResolverRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 确保 `node` 所在的树拥有注册条目和重命名监听器，可重复调用
    pub fn ensure_initialized(&self, node: &Arc<Node>) {
        let mut state = self.state.lock();
        state.prune();
        self.entry(&mut state, node);
    }

    /// 把解析器注册到 `node` 所在的整棵树，已存在相同解析器时不重复添加
    pub fn register(&self, node: &Arc<Node>, resolver: Arc<dyn Resolver>) -> bool {
        let mut state = self.state.lock();
        state.prune();
        let namespace = resolver.namespace().map(str::to_string);
        let added = self.entry(&mut state, node).add(resolver);
        if added {
            log::debug!("注册解析器: namespace={:?}, 节点 {}", namespace, node.id());
        }
        added
    }

    /// 从 `node` 所在的树中注销解析器，返回是否确实移除
    pub fn deregister(&self, node: &Arc<Node>, resolver: &Arc<dyn Resolver>) -> bool {
        let mut state = self.state.lock();
        state.prune();
        let entry = self.entry(&mut state, node);
        let before = entry.resolvers.len();
        entry.resolvers.retain(|r| !Arc::ptr_eq(r, resolver));
        let removed = entry.resolvers.len() != before;
        if removed {
            log::debug!(
                "注销解析器: namespace={:?}, 节点 {}",
                resolver.namespace(),
                node.id()
            );
        }
        removed
    }

    /// 按注册顺序返回所有能解析 `namespace` 的解析器
    pub fn resolvers(&self, node: &Arc<Node>, namespace: Option<&str>) -> Vec<Arc<dyn Resolver>> {
        let mut state = self.state.lock();
        self.entry(&mut state, node)
            .resolvers
            .iter()
            .filter(|r| r.resolves_namespace(namespace))
            .cloned()
            .collect()
    }

    pub fn resolver(&self, node: &Arc<Node>, namespace: Option<&str>) -> Option<Arc<dyn Resolver>> {
        let mut state = self.state.lock();
        self.entry(&mut state, node)
            .resolvers
            .iter()
            .find(|r| r.resolves_namespace(namespace))
            .cloned()
    }

    /// 显示名称 -> 命名空间 的多值映射
    pub fn namespaces(&self, node: &Arc<Node>) -> HashMap<String, Vec<Option<String>>> {
        let mut state = self.state.lock();
        let mut namespaces: HashMap<String, Vec<Option<String>>> = HashMap::new();
        for resolver in &self.entry(&mut state, node).resolvers {
            namespaces
                .entry(resolver.user_friendly_name().to_string())
                .or_default()
                .push(resolver.namespace().map(str::to_string));
        }
        namespaces
    }

    /// 当前登记的树数量（不含已释放但尚未清理的树）
    pub fn tree_count(&self) -> usize {
        let mut state = self.state.lock();
        state.prune();
        state.trees.len()
    }

    pub fn is_registered_root(&self, id: &NodeId) -> bool {
        self.state.lock().trees.contains_key(id)
    }

    /// 清理根节点已被释放的条目，返回清理数量
    pub fn prune(&self) -> usize {
        self.state.lock().prune()
    }

    fn entry<'a>(&self, state: &'a mut RegistryState, node: &Arc<Node>) -> &'a mut TreeEntry {
        let root = node.root();
        let id = root.id();

        let stale = state
            .trees
            .get(&id)
            .is_some_and(|entry| entry.root.strong_count() == 0);
        if stale {
            state.trees.remove(&id);
        }

        // 根节点ID已变更但重命名监听器尚未执行，按根节点身份找回旧条目
        if !state.trees.contains_key(&id) {
            let previous = state
                .trees
                .iter()
                .find(|(_, entry)| entry.is_root(&root))
                .map(|(old_id, _)| old_id.clone());
            if let Some(entry) = previous.and_then(|old_id| state.trees.remove(&old_id)) {
                log::debug!("提前迁移注册条目: 根节点 {}", id);
                state.trees.insert(id.clone(), entry);
            }
        }

        state.trees.entry(id).or_insert_with(|| {
            let listener: Arc<dyn NodeListener> =
                Arc::new(RenameListener::new(Arc::downgrade(&self.state)));
            root.add_listener(listener.clone());
            log::debug!("初始化树注册条目: 根节点 {}", root.id());
            TreeEntry {
                root: Arc::downgrade(&root),
                resolvers: Vec::new(),
                listener,
            }
        })
    }
}

impl fmt::Debug for ResolverRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        f.debug_struct("ResolverRegistry")
            .field("tree_count", &state.trees.len())
            .finish()
    }
}
