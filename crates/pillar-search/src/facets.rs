//! Facet presentation helpers. Bucket order from the backend is kept as-is
//! in `SearchResult`; renderers that want a sort apply one of these
//! comparators, with refined-first as the standard wrapper.

use std::cmp::Ordering;

use serde_json::Value;

use crate::state::{param_value, SearchState};
use crate::types::SearchResult;

/// One renderable facet option with its refinement status
#[derive(Debug, Clone, PartialEq)]
pub struct FacetEntry {
    pub facet: String,
    pub value: Value,
    pub count: u64,
    pub refined: bool,
}

/// Build the entry list for one facet from a result and the current state.
pub fn entries_for(result: &SearchResult, state: &SearchState, facet: &str) -> Vec<FacetEntry> {
    result
        .aggregations
        .get(facet)
        .map(|buckets| {
            buckets
                .iter()
                .map(|bucket| FacetEntry {
                    facet: facet.to_string(),
                    value: bucket.key.clone(),
                    count: bucket.count,
                    refined: state.is_refined(facet, &bucket.key),
                })
                .collect()
        })
        .unwrap_or_default()
}

/// Default ordering: highest count first
pub fn by_count_desc(a: &FacetEntry, b: &FacetEntry) -> Ordering {
    b.count.cmp(&a.count)
}

/// Alphabetical by the value's parameter form
pub fn by_value(a: &FacetEntry, b: &FacetEntry) -> Ordering {
    param_value(&a.value).cmp(&param_value(&b.value))
}

/// Wrap a comparator so already-refined values sort before unrefined ones
/// regardless of count, with the wrapped comparator as tie-break.
pub fn refined_first(
    cmp: impl Fn(&FacetEntry, &FacetEntry) -> Ordering,
) -> impl Fn(&FacetEntry, &FacetEntry) -> Ordering {
    move |a, b| match (a.refined, b.refined) {
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        _ => cmp(a, b),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn entry(value: &str, count: u64, refined: bool) -> FacetEntry {
        FacetEntry {
            facet: "node_type".to_string(),
            value: json!(value),
            count,
            refined,
        }
    }

    #[test]
    fn test_count_desc_default() {
        let mut entries = vec![entry("post", 2, false), entry("asset", 7, false)];
        entries.sort_by(refined_first(by_count_desc));
        assert_eq!(entries[0].value, json!("asset"));
    }

    #[test]
    fn test_refined_sorts_first_regardless_of_count() {
        let mut entries = vec![
            entry("asset", 100, false),
            entry("post", 1, true),
            entry("group", 50, false),
        ];
        entries.sort_by(refined_first(by_count_desc));

        assert_eq!(entries[0].value, json!("post"));
        assert_eq!(entries[1].value, json!("asset"));
        assert_eq!(entries[2].value, json!("group"));
    }

    #[test]
    fn test_by_value_ordering() {
        let mut entries = vec![entry("video", 1, false), entry("image", 1, false)];
        entries.sort_by(refined_first(by_value));
        assert_eq!(entries[0].value, json!("image"));
    }

    #[test]
    fn test_entries_for_marks_refined() {
        use crate::types::{FacetBucket, SearchResult};

        let mut state = SearchState::new();
        state.add_term("node_type", json!("asset"));

        let result = SearchResult {
            total_count: 9,
            took_ms: 1,
            page: 0,
            hits: Vec::new(),
            aggregations: [(
                "node_type".to_string(),
                vec![
                    FacetBucket {
                        key: json!("asset"),
                        count: 7,
                    },
                    FacetBucket {
                        key: json!("post"),
                        count: 2,
                    },
                ],
            )]
            .into_iter()
            .collect(),
        };

        let entries = entries_for(&result, &state, "node_type");
        assert_eq!(entries.len(), 2);
        assert!(entries[0].refined);
        assert!(!entries[1].refined);

        assert!(entries_for(&result, &state, "missing").is_empty());
    }
}
