use std::collections::HashMap;
use std::rc::Rc;

use crate::dom::NodeId;
use crate::page::Page;
use crate::Result;

pub(crate) type HandlerFn = Rc<dyn Fn(&mut Page, &mut EventState) -> Result<()>>;

#[derive(Clone)]
pub(crate) struct Listener {
    pub(crate) capture: bool,
    pub(crate) handler: HandlerFn,
}

#[derive(Default, Clone)]
pub(crate) struct ListenerStore {
    map: HashMap<NodeId, HashMap<String, Vec<Listener>>>,
}

impl ListenerStore {
    pub(crate) fn add(&mut self, node_id: NodeId, event: String, listener: Listener) {
        self.map
            .entry(node_id)
            .or_default()
            .entry(event)
            .or_default()
            .push(listener);
    }

    pub(crate) fn get(&self, node_id: NodeId, event: &str, capture: bool) -> Vec<Listener> {
        self.map
            .get(&node_id)
            .and_then(|events| events.get(event))
            .map(|listeners| {
                listeners
                    .iter()
                    .filter(|listener| listener.capture == capture)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[derive(Clone)]
pub(crate) struct EventState {
    pub(crate) event_type: String,
    pub(crate) target: NodeId,
    pub(crate) current_target: NodeId,
    pub(crate) key: Option<String>,
    pub(crate) delta_y: i64,
    pub(crate) default_prevented: bool,
    pub(crate) propagation_stopped: bool,
    pub(crate) immediate_propagation_stopped: bool,
}

impl EventState {
    pub(crate) fn new(event_type: &str, target: NodeId) -> Self {
        Self {
            event_type: event_type.to_string(),
            target,
            current_target: target,
            key: None,
            delta_y: 0,
            default_prevented: false,
            propagation_stopped: false,
            immediate_propagation_stopped: false,
        }
    }

    pub(crate) fn keyboard(target: NodeId, key: &str) -> Self {
        let mut event = Self::new("keydown", target);
        event.key = Some(key.to_string());
        event
    }

    pub(crate) fn wheel(target: NodeId, delta_y: i64) -> Self {
        let mut event = Self::new("wheel", target);
        event.delta_y = delta_y;
        event
    }

    pub(crate) fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    pub(crate) fn stop_propagation(&mut self) {
        self.propagation_stopped = true;
    }

    pub(crate) fn stop_immediate_propagation(&mut self) {
        self.propagation_stopped = true;
        self.immediate_propagation_stopped = true;
    }
}
