//! Viewer notifications
//!
//! The browser raises events when viewpoints change or inlines finish loading.
//! Hosts either register an [`EventHandler`] per [`EventType`] or drain the
//! queue after each frame with [`EventSystem::drain`].

use std::collections::HashMap;

use crate::scene::NodeId;

/// Event type identification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventType {
    /// The list of scene viewpoints was rebuilt
    ViewpointsChanged,
    /// A different viewpoint became active
    ActiveViewpointChanged,
    /// An inline's children were published
    InlineLoaded,
    /// An inline failed to load
    InlineFailed,
}

/// Event payload
#[derive(Debug, Clone, PartialEq)]
pub enum EventArg {
    /// Number of items
    Count(usize),
    /// Position in a list
    Index(usize),
    /// Scene node
    Node(NodeId),
    /// Human-readable detail
    Message(String),
}

/// Event with type ID and key-value arguments
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    /// Type of event
    pub event_type: EventType,
    args: HashMap<&'static str, EventArg>,
}

impl Event {
    /// Create an event without arguments
    pub fn new(event_type: EventType) -> Self {
        Self { event_type, args: HashMap::new() }
    }

    /// Add an argument to the event (builder pattern)
    pub fn with_arg(mut self, key: &'static str, value: EventArg) -> Self {
        self.args.insert(key, value);
        self
    }

    /// Get an argument by key
    pub fn get_arg(&self, key: &str) -> Option<&EventArg> {
        self.args.get(key)
    }

    /// `ViewpointsChanged` with the new viewpoint count
    pub fn viewpoints_changed(count: usize) -> Self {
        Self::new(EventType::ViewpointsChanged).with_arg("count", EventArg::Count(count))
    }

    /// `ActiveViewpointChanged` with the new index
    pub fn active_viewpoint_changed(index: usize) -> Self {
        Self::new(EventType::ActiveViewpointChanged).with_arg("index", EventArg::Index(index))
    }

    /// `InlineLoaded` for `node`
    pub fn inline_loaded(node: NodeId) -> Self {
        Self::new(EventType::InlineLoaded).with_arg("node", EventArg::Node(node))
    }

    /// `InlineFailed` for `node` with the reason
    pub fn inline_failed(node: NodeId, reason: impl Into<String>) -> Self {
        Self::new(EventType::InlineFailed)
            .with_arg("node", EventArg::Node(node))
            .with_arg("reason", EventArg::Message(reason.into()))
    }

    /// Count argument if present
    pub fn get_count(&self) -> Option<usize> {
        match self.get_arg("count") {
            Some(EventArg::Count(count)) => Some(*count),
            _ => None,
        }
    }

    /// Index argument if present
    pub fn get_index(&self) -> Option<usize> {
        match self.get_arg("index") {
            Some(EventArg::Index(index)) => Some(*index),
            _ => None,
        }
    }

    /// Node argument if present
    pub fn get_node(&self) -> Option<NodeId> {
        match self.get_arg("node") {
            Some(EventArg::Node(node)) => Some(*node),
            _ => None,
        }
    }
}

/// Event handler trait
/// Returns true if event was consumed (stops forwarding)
pub trait EventHandler {
    /// Handle an event, return true if consumed
    fn on_event(&mut self, event: &Event) -> bool;
}

/// Queue of viewer events with optional registered handlers
#[derive(Default)]
pub struct EventSystem {
    queue: Vec<Event>,
    handlers: HashMap<EventType, Vec<Box<dyn EventHandler>>>,
}

impl EventSystem {
    /// Create an empty event system
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for a specific event type
    pub fn register_handler(&mut self, event_type: EventType, handler: Box<dyn EventHandler>) {
        self.handlers.entry(event_type).or_default().push(handler);
    }

    /// Queue an event
    pub fn send(&mut self, event: Event) {
        log::debug!("Event {:?}", event.event_type);
        self.queue.push(event);
    }

    /// Deliver queued events to handlers.
    ///
    /// Events no handler consumed stay queued for [`drain`](Self::drain).
    pub fn dispatch(&mut self) {
        let queued = std::mem::take(&mut self.queue);
        for event in queued {
            if !self.dispatch_event(&event) {
                self.queue.push(event);
            }
        }
    }

    /// Take every queued event in the order it was sent
    pub fn drain(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.queue)
    }

    /// Number of queued events
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Drop all queued events
    pub fn clear(&mut self) {
        self.queue.clear();
    }

    fn dispatch_event(&mut self, event: &Event) -> bool {
        self.handlers
            .get_mut(&event.event_type)
            .is_some_and(|handlers| handlers.iter_mut().any(|handler| handler.on_event(event)))
    }
}
