//! 事件记录监听器
//!
//! 把节点发出的事件按到达顺序保存下来，供断言使用

use parking_lot::Mutex;
use std::sync::Arc;

use treevars::core::{NodeEvent, NodeListener};

#[derive(Default)]
pub struct EventRecorder {
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
