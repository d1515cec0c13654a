use std::sync::Arc;

use dashmap::DashMap;
use tracing::debug;

use crate::multi::GroupResult;
use crate::types::SearchResult;

/// Events a listener can subscribe to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SearchEvent {
    /// A request completed and produced a normalized result
    Results,
    /// A multi-scope quick search completed
    GroupResults,
    /// A non-superseded request failed
    Error,
}

/// Payload delivered to listeners on event emission
#[derive(Debug, Clone)]
pub enum SearchNotification {
    Results(Arc<SearchResult>),
    GroupResults(Arc<Vec<GroupResult>>),
    Error(String),
}

impl SearchNotification {
    pub fn event(&self) -> SearchEvent {
        match self {
            SearchNotification::Results(_) => SearchEvent::Results,
            SearchNotification::GroupResults(_) => SearchEvent::GroupResults,
            SearchNotification::Error(_) => SearchEvent::Error,
        }
    }
}

/// Subscriber for search outcomes: renderers, loggers, URL sync
pub trait SearchListener: Send + Sync {
    fn name(&self) -> &str;
    fn events(&self) -> &[SearchEvent];
    fn on_notify(&self, notification: &SearchNotification);
}

/// Registry of listeners, organized by event
pub struct ListenerRegistry {
    listeners: DashMap<SearchEvent, Vec<Arc<dyn SearchListener>>>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self {
            listeners: DashMap::new(),
        }
    }

    /// Register a listener for its declared events
    pub fn register(&self, listener: Arc<dyn SearchListener>) {
        for event in listener.events() {
            self.listeners
                .entry(*event)
                .or_default()
                .push(listener.clone());
        }
    }

    /// Deliver a notification to every listener for its event, in
    /// registration order
    pub fn emit(&self, notification: &SearchNotification) {
        let listeners = self
            .listeners
            .get(&notification.event())
            .map(|l| l.clone())
            .unwrap_or_default();

        for listener in &listeners {
            debug!(listener = listener.name(), event = ?notification.event(), "notifying");
            listener.on_notify(notification);
        }
    }

    /// Check if any listeners are registered for an event
    pub fn has_listeners(&self, event: &SearchEvent) -> bool {
        self.listeners
            .get(event)
            .map(|l| !l.is_empty())
            .unwrap_or(false)
    }
}

impl Default for ListenerRegistry {
    fn default() -> Self {
        Self::new()
    }
}
