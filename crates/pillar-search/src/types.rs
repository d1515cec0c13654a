use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{Map, Value};

/// One aggregation bucket: a facet value and the number of matching
/// documents, used to render facet option counts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FacetBucket {
    pub key: Value,
    pub count: u64,
}

/// Normalized outcome of one completed request. Immutable once produced; a
/// fresh instance per response, discarded when superseded.
#[derive(Debug, Clone, Serialize)]
pub struct SearchResult {
    pub total_count: u64,
    pub took_ms: u64,
    /// Zero-based page the request asked for
    pub page: u32,
    pub hits: Vec<HitDoc>,
    /// Facet name to buckets, backend bucket order preserved
    pub aggregations: BTreeMap<String, Vec<FacetBucket>>,
}

impl SearchResult {
    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }
}

/// One matching document (node or user record). The backend `_source` object
/// is carried untouched apart from date formatting done at normalization.
#[derive(Debug, Clone, Serialize)]
pub struct HitDoc {
    fields: Map<String, Value>,
}

impl HitDoc {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self { fields }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn id(&self) -> Option<&str> {
        ["_id", "id", "objectID"]
            .iter()
            .find_map(|k| self.fields.get(*k).and_then(Value::as_str))
    }

    /// Display name: node name, falling back to the user fields.
    pub fn label(&self) -> Option<&str> {
        ["name", "full_name", "username"]
            .iter()
            .find_map(|k| self.fields.get(*k).and_then(Value::as_str))
    }
}
