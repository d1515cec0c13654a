use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use serde_json::Value;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::events::{ListenerRegistry, SearchListener, SearchNotification};
use crate::response::normalize;
use crate::state::SearchState;
use crate::transport::SearchTransport;
use crate::urlsync;

/// Single source of truth for pending search parameters and the dispatch and
/// cancellation of the underlying request. At most one request is in flight
/// per controller; a newer `execute` supersedes it, and a superseded
/// request's outcome is never reported.
pub struct SearchController {
    state: SearchState,
    endpoint: String,
    transport: Arc<dyn SearchTransport>,
    listeners: Arc<ListenerRegistry>,
    /// Identity token of the latest dispatched request
    generation: Arc<AtomicU64>,
    in_flight: Option<JoinHandle<()>>,
    /// Dedup guard: params of the last dispatched request that has not
    /// failed. Shared with the request task so a failure can re-arm the
    /// dispatch of identical parameters.
    last_dispatched: Arc<Mutex<Option<Vec<(String, String)>>>>,
}

impl SearchController {
    pub fn new(transport: Arc<dyn SearchTransport>, endpoint: &str) -> Self {
        Self {
            state: SearchState::new(),
            endpoint: endpoint.to_string(),
            transport,
            listeners: Arc::new(ListenerRegistry::new()),
            generation: Arc::new(AtomicU64::new(0)),
            in_flight: None,
            last_dispatched: Arc::new(Mutex::new(None)),
        }
    }

    /// Construct with state hydrated from a bookmarked URL query string.
    pub fn from_query_string(
        transport: Arc<dyn SearchTransport>,
        endpoint: &str,
        query: &str,
    ) -> Self {
        let mut controller = Self::new(transport, endpoint);
        controller.state = urlsync::state_from_query(query);
        controller
    }

    pub fn state(&self) -> &SearchState {
        &self.state
    }

    /// Subscribe a listener for its declared events.
    pub fn attach(&self, listener: Arc<dyn SearchListener>) {
        self.listeners.register(listener);
    }

    /// Shared registry, for wiring the same renderers into other searchers.
    pub fn listeners(&self) -> Arc<ListenerRegistry> {
        self.listeners.clone()
    }

    /// Set free-text query and entity scope. Does not itself dispatch.
    pub fn set_query(&mut self, text: &str, scope: Option<&str>) {
        self.state.set_query(text, scope);
    }

    pub fn set_project_id(&mut self, id: &str) {
        self.state.set_project_id(id);
    }

    pub fn clear_project(&mut self) {
        self.state.clear_project();
    }

    pub fn set_current_page(&mut self, page: u32) {
        self.state.set_current_page(page);
    }

    pub fn toggle_term(&mut self, facet: &str, value: Value) {
        self.state.toggle_term(facet, value);
    }

    pub fn add_term(&mut self, facet: &str, value: Value) {
        self.state.add_term(facet, value);
    }

    pub fn is_refined(&self, facet: &str, value: &Value) -> bool {
        self.state.is_refined(facet, value)
    }

    /// Flat parameter mapping for the next request.
    pub fn params(&self) -> Vec<(String, String)> {
        self.state.params()
    }

    /// Address-bar form of the current state, for bookmarking.
    pub fn query_string(&self) -> String {
        urlsync::to_query_string(&self.state)
    }

    /// Dispatch the current parameters. Dispatching parameters identical to
    /// the previous request is a no-op; otherwise any in-flight request is
    /// cancelled and a new one is issued. Outcomes arrive through the
    /// listener registry, never as a return value.
    pub fn execute(&mut self) {
        let params = self.state.params();

        {
            let last = self.last_dispatched.lock().unwrap();
            if last.as_ref() == Some(&params) {
                debug!("search parameters unchanged, skipping dispatch");
                return;
            }
        }

        if let Some(handle) = self.in_flight.take() {
            handle.abort();
        }

        let token = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        *self.last_dispatched.lock().unwrap() = Some(params.clone());

        let path = match self.state.scope() {
            Some(what) => format!("{}{}", self.endpoint, what),
            None => self.endpoint.clone(),
        };
        let page = self.state.page();
        let transport = self.transport.clone();
        let listeners = self.listeners.clone();
        let generation = self.generation.clone();
        let last_dispatched = self.last_dispatched.clone();

        debug!(%path, token, "dispatching search");
        self.in_flight = Some(tokio::spawn(async move {
            let outcome = transport.get(&path, &params).await;

            // A newer dispatch owns the controller now; this outcome is
            // stale and must not reach listeners or state.
            if generation.load(Ordering::SeqCst) != token {
                debug!(token, "dropping superseded response");
                return;
            }

            match outcome.and_then(|raw| normalize(raw, page)) {
                Ok(result) => {
                    listeners.emit(&SearchNotification::Results(Arc::new(result)));
                }
                Err(err) => {
                    warn!(error = %err, "search request failed");
                    // a failed dispatch no longer guards against re-issuing
                    // the same parameters
                    *last_dispatched.lock().unwrap() = None;
                    listeners.emit(&SearchNotification::Error(err.user_message()));
                }
            }
        }));
    }

    /// Await the in-flight request, if any. Cancelled tasks resolve silently.
    pub async fn wait_idle(&mut self) {
        if let Some(handle) = self.in_flight.take() {
            let _ = handle.await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::SearchEvent;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::AtomicUsize;

    struct CountingTransport {
        calls: AtomicUsize,
        response: Value,
    }

    impl CountingTransport {
        fn new(response: Value) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                response,
            })
        }
    }

    #[async_trait]
    impl SearchTransport for CountingTransport {
        async fn get(
            &self,
            _path: &str,
            _params: &[(String, String)],
        ) -> Result<Value, crate::SearchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.response.clone())
        }

        async fn post_json(
            &self,
            _path: &str,
            _body: &Value,
        ) -> Result<Value, crate::SearchError> {
            unimplemented!("controller only issues GETs")
        }
    }

    struct Sink;

    impl SearchListener for Sink {
        fn name(&self) -> &str {
            "sink"
        }
        fn events(&self) -> &[SearchEvent] {
            &[SearchEvent::Results, SearchEvent::Error]
        }
        fn on_notify(&self, _notification: &SearchNotification) {}
    }

    fn empty_response() -> Value {
        json!({"hits": {"total": 0, "hits": []}, "took": 1})
    }

    #[tokio::test]
    async fn test_identical_params_dispatch_once() {
        let transport = CountingTransport::new(empty_response());
        let mut controller = SearchController::new(transport.clone(), "/api/newsearch");
        controller.attach(Arc::new(Sink));

        controller.set_query("dragon", None);
        controller.execute();
        controller.wait_idle().await;
        controller.execute();
        controller.wait_idle().await;

        assert_eq!(transport.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_changed_params_dispatch_again() {
        let transport = CountingTransport::new(empty_response());
        let mut controller = SearchController::new(transport.clone(), "/api/newsearch");
        controller.attach(Arc::new(Sink));

        controller.set_query("dragon", None);
        controller.execute();
        controller.wait_idle().await;
        controller.set_current_page(1);
        controller.execute();
        controller.wait_idle().await;

        assert_eq!(transport.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_scope_appended_to_endpoint() {
        struct PathCheck(AtomicUsize);

        #[async_trait]
        impl SearchTransport for PathCheck {
            async fn get(
                &self,
                path: &str,
                _params: &[(String, String)],
            ) -> Result<Value, crate::SearchError> {
                assert_eq!(path, "/api/newsearch/user");
                self.0.fetch_add(1, Ordering::SeqCst);
                Ok(json!({"hits": {"total": 0, "hits": []}, "took": 1}))
            }
            async fn post_json(
                &self,
                _path: &str,
                _body: &Value,
            ) -> Result<Value, crate::SearchError> {
                unimplemented!()
            }
        }

        let transport = Arc::new(PathCheck(AtomicUsize::new(0)));
        let mut controller = SearchController::new(transport.clone(), "/api/newsearch");
        controller.set_query("jane", Some("/user"));
        controller.execute();
        controller.wait_idle().await;

        assert_eq!(transport.0.load(Ordering::SeqCst), 1);
    }
}
