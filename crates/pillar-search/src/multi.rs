//! Multi-scope quick search: fan one query word out to several named
//! sub-searches in a single POST, and delegate execution to whichever scope
//! (site-wide, per-project) is active.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tokio::task::JoinHandle;
use tracing::{debug, warn};
use urlencoding::encode;

use crate::error::SearchError;
use crate::events::{ListenerRegistry, SearchListener, SearchNotification};
use crate::response::source_hits;
use crate::state::param_value;
use crate::transport::SearchTransport;
use crate::types::HitDoc;

/// One named sub-search inside a multi-search scope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParamsGroup {
    pub name: String,
    #[serde(default)]
    pub params: Map<String, Value>,
}

impl ParamsGroup {
    pub fn new(name: &str, params: Map<String, Value>) -> Self {
        Self {
            name: name.to_string(),
            params,
        }
    }

    /// Write the query word into this group's params
    pub fn set_search_word(&mut self, q: &str) {
        self.params.insert("q".to_string(), Value::String(q.to_string()));
    }

    /// Query-string form of the params, for the advanced-search link
    pub fn param_str(&self) -> String {
        self.params
            .iter()
            .map(|(k, v)| format!("{}={}", encode(k), encode(&param_value(v))))
            .collect::<Vec<_>>()
            .join("&")
    }
}

/// Hits for one group of a multi-search response
#[derive(Debug, Clone)]
pub struct GroupResult {
    pub name: String,
    /// Advanced-search UI link narrowed to this group's params
    pub url: String,
    pub hits: Vec<HitDoc>,
    pub has_results: bool,
}

/// Several named sub-searches answered by one API call
#[derive(Debug, Clone)]
pub struct MultiSearch {
    /// UI URL for the advanced-search page of this scope
    ui_url: String,
    /// API path the sub-searches are POSTed to
    api_path: String,
    groups: Vec<ParamsGroup>,
    query: String,
}

impl MultiSearch {
    pub fn new(ui_url: &str, api_path: &str, groups: Vec<ParamsGroup>) -> Self {
        Self {
            ui_url: ui_url.to_string(),
            api_path: api_path.to_string(),
            groups,
            query: String::new(),
        }
    }

    pub fn set_search_word(&mut self, q: &str) {
        self.query = q.to_string();
        for group in &mut self.groups {
            group.set_search_word(q);
        }
    }

    pub fn groups(&self) -> &[ParamsGroup] {
        &self.groups
    }

    /// Advanced-search link for the whole scope
    pub fn search_url(&self) -> String {
        format!("{}?q={}", self.ui_url, encode(&self.query))
    }

    fn body(&self) -> Value {
        json!(self
            .groups
            .iter()
            .map(|g| Value::Object(g.params.clone()))
            .collect::<Vec<_>>())
    }

    /// POST all sub-searches and pair the sub-results with the groups by
    /// position.
    pub async fn execute(
        &self,
        transport: &dyn SearchTransport,
    ) -> Result<Vec<GroupResult>, SearchError> {
        let raw = transport.post_json(&self.api_path, &self.body()).await?;
        self.parse_result(raw)
    }

    fn parse_result(&self, raw: Value) -> Result<Vec<GroupResult>, SearchError> {
        let subs = match raw {
            Value::Array(subs) => subs,
            other => {
                return Err(SearchError::Shape(format!(
                    "expected an array of sub-results, got {other}"
                )))
            }
        };
        if subs.len() != self.groups.len() {
            return Err(SearchError::Shape(format!(
                "{} sub-results for {} groups",
                subs.len(),
                self.groups.len()
            )));
        }

        subs.into_iter()
            .zip(&self.groups)
            .map(|(sub, group)| {
                let hits = source_hits(sub)?;
                Ok(GroupResult {
                    name: group.name.clone(),
                    url: format!("{}?{}", self.ui_url, group.param_str()),
                    has_results: !hits.is_empty(),
                    hits,
                })
            })
            .collect()
    }
}

/// Owns the multi-search scopes and delegates execution to the active one,
/// with the same supersede-and-ignore discipline as the search controller.
pub struct SearchFacade {
    scopes: BTreeMap<String, MultiSearch>,
    current_scope: String,
    transport: Arc<dyn SearchTransport>,
    listeners: Arc<ListenerRegistry>,
    generation: Arc<AtomicU64>,
    in_flight: Option<JoinHandle<()>>,
    query: String,
}

impl SearchFacade {
    /// The first scope (in name order) starts active.
    pub fn new(transport: Arc<dyn SearchTransport>, scopes: BTreeMap<String, MultiSearch>) -> Self {
        let current_scope = scopes.keys().next().cloned().unwrap_or_default();
        Self {
            scopes,
            current_scope,
            transport,
            listeners: Arc::new(ListenerRegistry::new()),
            generation: Arc::new(AtomicU64::new(0)),
            in_flight: None,
            query: String::new(),
        }
    }

    pub fn attach(&self, listener: Arc<dyn SearchListener>) {
        self.listeners.register(listener);
    }

    pub fn search_word(&self) -> &str {
        &self.query
    }

    /// Propagate the query word to every scope.
    pub fn set_search_word(&mut self, q: &str) {
        self.query = q.to_string();
        for scope in self.scopes.values_mut() {
            scope.set_search_word(q);
        }
    }

    pub fn current_scope(&self) -> &str {
        &self.current_scope
    }

    /// Switch the active scope. Unknown names are logged and ignored.
    pub fn set_current_scope(&mut self, scope: &str) {
        if self.scopes.contains_key(scope) {
            self.current_scope = scope.to_string();
        } else {
            warn!(scope, "ignoring unknown quick-search scope");
        }
    }

    /// Advanced-search link for the active scope and current query.
    pub fn search_url(&self) -> Option<String> {
        self.scopes
            .get(&self.current_scope)
            .map(MultiSearch::search_url)
    }

    /// Run the active scope. A newer call supersedes any search still in
    /// flight; superseded outcomes are dropped silently.
    pub fn execute(&mut self) {
        let Some(scope) = self.scopes.get(&self.current_scope).cloned() else {
            warn!(scope = %self.current_scope, "no quick-search scope to execute");
            return;
        };

        if let Some(handle) = self.in_flight.take() {
            handle.abort();
        }
        let token = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        let transport = self.transport.clone();
        let listeners = self.listeners.clone();
        let generation = self.generation.clone();

        debug!(scope = %self.current_scope, token, "dispatching quick search");
        self.in_flight = Some(tokio::spawn(async move {
            let outcome = scope.execute(transport.as_ref()).await;

            if generation.load(Ordering::SeqCst) != token {
                debug!(token, "dropping superseded quick-search response");
                return;
            }

            match outcome {
                Ok(groups) => {
                    listeners.emit(&SearchNotification::GroupResults(Arc::new(groups)));
                }
                Err(err) => {
                    warn!(error = %err, "quick search failed");
                    listeners.emit(&SearchNotification::Error(err.user_message()));
                }
            }
        }));
    }

    /// Await the in-flight search, if any.
    pub async fn wait_idle(&mut self) {
        if let Some(handle) = self.in_flight.take() {
            let _ = handle.await;
        }
    }
}
