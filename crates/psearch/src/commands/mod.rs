pub mod init;
pub mod quick;
pub mod search;

use std::sync::Mutex;

use pillar_search::{SearchEvent, SearchListener, SearchNotification};

/// Listener that captures the single outcome of a one-shot dispatch so the
/// command can print it and pick an exit code.
pub struct Capture {
    events: Vec<SearchEvent>,
    outcome: Mutex<Option<SearchNotification>>,
}

impl Capture {
    pub fn new(events: Vec<SearchEvent>) -> Self {
        Self {
            events,
            outcome: Mutex::new(None),
        }
    }

    pub fn take(&self) -> Option<SearchNotification> {
        self.outcome.lock().unwrap().take()
    }
}

impl SearchListener for Capture {
    fn name(&self) -> &str {
        "cli-capture"
    }

    fn events(&self) -> &[SearchEvent] {
        &self.events
    }

    fn on_notify(&self, notification: &SearchNotification) {
        *self.outcome.lock().unwrap() = Some(notification.clone());
    }
}
