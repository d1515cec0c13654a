//! Backend response normalization. Two generations of backend emit
//! different aggregation layouts; both are parsed here and nowhere else, so
//! the `SearchResult` contract stays stable when the wire format moves.

use std::collections::BTreeMap;

use chrono::DateTime;
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::SearchError;
use crate::types::{FacetBucket, HitDoc, SearchResult};

#[derive(Debug, Deserialize)]
struct RawResponse {
    hits: RawHits,
    #[serde(default)]
    took: u64,
    #[serde(default)]
    aggregations: Option<RawAggregations>,
}

#[derive(Debug, Deserialize)]
struct RawHits {
    total: RawTotal,
    #[serde(default)]
    hits: Vec<RawHit>,
}

/// `hits.total` is a bare integer on older backends and `{value, relation}`
/// on newer ones
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawTotal {
    Flat(u64),
    Object { value: u64 },
}

impl RawTotal {
    fn value(&self) -> u64 {
        match self {
            RawTotal::Flat(n) => *n,
            RawTotal::Object { value } => *value,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawHit {
    #[serde(rename = "_source", default)]
    source: Map<String, Value>,
}

/// Current backends send an object of named bucket arrays; the legacy one
/// sent an array of facet results carrying a `data` map
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawAggregations {
    Named(BTreeMap<String, RawBucketAgg>),
    Legacy(Vec<RawLegacyFacet>),
}

#[derive(Debug, Deserialize)]
struct RawBucketAgg {
    #[serde(default)]
    buckets: Vec<RawBucket>,
}

#[derive(Debug, Deserialize)]
struct RawBucket {
    key: Value,
    doc_count: u64,
}

#[derive(Debug, Deserialize)]
struct RawLegacyFacet {
    name: String,
    #[serde(default)]
    data: BTreeMap<String, u64>,
}

/// Reshape a raw backend payload into the stable [`SearchResult`] contract.
/// `page` is the zero-based page the request asked for; the backend does not
/// echo it back.
pub fn normalize(raw: Value, page: u32) -> Result<SearchResult, SearchError> {
    let parsed: RawResponse =
        serde_json::from_value(raw).map_err(|e| SearchError::Shape(e.to_string()))?;

    let aggregations = match parsed.aggregations {
        Some(RawAggregations::Named(named)) => named
            .into_iter()
            .map(|(name, agg)| {
                let buckets = agg
                    .buckets
                    .into_iter()
                    .map(|b| FacetBucket {
                        key: b.key,
                        count: b.doc_count,
                    })
                    .collect();
                (name, buckets)
            })
            .collect(),
        Some(RawAggregations::Legacy(facets)) => facets
            .into_iter()
            .map(|facet| {
                let buckets = facet
                    .data
                    .into_iter()
                    .map(|(key, count)| FacetBucket {
                        key: Value::String(key),
                        count,
                    })
                    .collect();
                (facet.name, buckets)
            })
            .collect(),
        None => BTreeMap::new(),
    };

    Ok(SearchResult {
        total_count: parsed.hits.total.value(),
        took_ms: parsed.took,
        page,
        hits: parsed
            .hits
            .hits
            .into_iter()
            .map(|hit| HitDoc::new(format_hit_dates(hit.source)))
            .collect(),
        aggregations,
    })
}

/// Parse the `hits.hits[]._source` documents out of one sub-search payload
/// (multi-search responses are arrays of these).
pub(crate) fn source_hits(raw: Value) -> Result<Vec<HitDoc>, SearchError> {
    #[derive(Deserialize)]
    struct Sub {
        hits: RawHits,
    }

    let sub: Sub = serde_json::from_value(raw).map_err(|e| SearchError::Shape(e.to_string()))?;
    Ok(sub
        .hits
        .hits
        .into_iter()
        .map(|hit| HitDoc::new(format_hit_dates(hit.source)))
        .collect())
}

/// Reformat ISO-8601 timestamps as dates. Everything else in `_source`
/// passes through untouched.
fn format_hit_dates(mut fields: Map<String, Value>) -> Map<String, Value> {
    for key in ["created_at", "updated_at"] {
        let formatted = fields
            .get(key)
            .and_then(Value::as_str)
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|ts| ts.format("%Y-%m-%d").to_string());
        if let Some(date) = formatted {
            fields.insert(key.to_string(), Value::String(date));
        }
    }
    fields
}
