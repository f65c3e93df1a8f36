//! 根节点重命名监听器
//!
//! 每棵已注册的树在根节点上挂载一个监听器，根节点ID变化时把注册表条目
//! 从旧ID迁移到新ID。监听器只持有注册表状态的弱引用。

use parking_lot::Mutex;
use std::fmt;
use std::sync::Weak;

use super::resolver_registry::RegistryState;
use crate::core::node::{NodeEvent, NodeId, NodeListener, NodeProperty};

pub struct RenameListener {
    state: Weak<Mutex<RegistryState>>,
}

impl RenameListener {
    pub(crate) fn new(state: Weak<Mutex<RegistryState>>) -> Self {
        Self { state }
    }
}

impl NodeListener for RenameListener {
    fn on_event(&self, event: &NodeEvent) {
        let NodeEvent::PropertyChanged {
            source,
            property: NodeProperty::Id,
            old_value,
            new_value,
        } = event
        else {
            return;
        };
        // 注册表已被释放
        let Some(state) = self.state.upgrade() else {
            return;
        };

        let old_id = NodeId::from(old_value.as_str());
        let new_id = NodeId::from(new_value.as_str());
        let mut state = state.lock();
        if state.migrate(source, &old_id, new_id.clone()) {
            log::debug!("注册表条目已迁移: {} -> {}", old_id, new_id);
        }
    }
}

impl fmt::Debug for RenameListener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenameListener")
            .field("registry_alive", &(self.state.strong_count() > 0))
            .finish()
    }
}
