//! 测试用事件记录监听器

use parking_lot::Mutex;
use std::sync::Arc;

use super::{NodeEvent, NodeListener};

/// 记录所有收到事件的监听器
///
/// 事件中持有节点的强引用，记录器释放之前被记录的节点不会被释放
#[derive(Default)]
pub(crate) struct EventRecorder {
    events: Mutex<Vec<NodeEvent>>,
}

impl EventRecorder {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn events(&self) -> Vec<NodeEvent> {
        self.events.lock().clone()
    }

    pub fn event_count(&self) -> usize {
        self.events.lock().len()
    }
}

impl NodeListener for EventRecorder {
    fn on_event(&self, event: &NodeEvent) {
        self.events.lock().push(event.clone());
    }
}
