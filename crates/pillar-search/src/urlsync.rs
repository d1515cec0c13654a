//! Browser-style URL synchronization: serialize the current state into a
//! query string for bookmarking, and rebuild state from one on page load.
//! The page number is 1-based in the URL and 0-based internally.

use serde_json::Value;
use tracing::warn;
use urlencoding::{decode, encode};

use crate::state::{param_value, SearchState};

/// Address-bar form of the state: `q`, 1-based `page`, then refinements.
/// `project` is derived from path context and deliberately not written.
pub fn to_query_string(state: &SearchState) -> String {
    let mut parts = vec![
        format!("q={}", encode(state.query())),
        format!("page={}", state.page() + 1),
    ];
    for (facet, value) in state.refinements() {
        parts.push(format!("{}={}", encode(facet), encode(&param_value(value))));
    }
    parts.join("&")
}

/// Rebuild state from a bookmarked query string. Recognized keys are `q` and
/// `page`; `project` is ignored; every other key becomes a facet refinement
/// with best-effort coercion. Malformed pairs are logged and skipped.
pub fn state_from_query(query: &str) -> SearchState {
    let mut state = SearchState::new();
    let mut page = None;

    for pair in query
        .trim_start_matches(['?', '#'])
        .split('&')
        .filter(|p| !p.is_empty())
    {
        let Some((raw_key, raw_value)) = pair.split_once('=') else {
            warn!(pair, "skipping malformed query pair");
            continue;
        };
        let (Ok(key), Ok(value)) = (decode(raw_key), decode(raw_value)) else {
            warn!(pair, "skipping undecodable query pair");
            continue;
        };

        match key.as_ref() {
            "q" => state.set_query(&value, None),
            "page" => match value.parse::<u32>() {
                Ok(p) if p >= 1 => page = Some(p - 1),
                _ => warn!(page = %value, "ignoring invalid page parameter"),
            },
            // project scoping comes from path context, not the query string
            "project" => {}
            "" => warn!(pair, "skipping empty query key"),
            facet => state.add_term(facet, coerce(&value)),
        }
    }

    // applied last so a later `q` pair cannot reset it
    if let Some(page) = page {
        state.set_current_page(page);
    }
    state
}

/// Best-effort refinement value coercion: integer, then boolean, else
/// string.
pub fn coerce(value: &str) -> Value {
    if let Ok(n) = value.parse::<i64>() {
        return n.into();
    }
    if let Ok(b) = value.parse::<bool>() {
        return b.into();
    }
    Value::String(value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_round_trip() {
        let mut state = SearchState::new();
        state.set_query("fire dragon", None);
        state.set_current_page(2);
        state.add_term("node_type", json!("asset"));
        state.add_term("is_free", json!(true));

        let restored = state_from_query(&to_query_string(&state));

        assert_eq!(restored.query(), "fire dragon");
        assert_eq!(restored.page(), 2);
        assert_eq!(restored.refinements(), state.refinements());
    }

    #[test]
    fn test_page_is_one_based_in_url() {
        let mut state = SearchState::new();
        state.set_query("x", None);
        assert_eq!(to_query_string(&state), "q=x&page=1");

        let restored = state_from_query("q=x&page=3");
        assert_eq!(restored.page(), 2);
    }

    #[test]
    fn test_page_survives_any_pair_order() {
        let restored = state_from_query("page=5&q=dragon");
        assert_eq!(restored.query(), "dragon");
        assert_eq!(restored.page(), 4);
    }

    #[test]
    fn test_project_key_ignored() {
        let restored = state_from_query("q=x&page=1&project=abc");
        assert_eq!(restored.project_id(), None);
        assert!(restored.refinements().is_empty());
    }

    #[test]
    fn test_unknown_keys_become_refinements_with_coercion() {
        let restored = state_from_query("q=x&page=1&is_free=true&weight=10&media=video");
        assert_eq!(restored.refinements()["is_free"], json!(true));
        assert_eq!(restored.refinements()["weight"], json!(10));
        assert_eq!(restored.refinements()["media"], json!("video"));
    }

    #[test]
    fn test_malformed_input_never_fatal() {
        let restored = state_from_query("#q=dragon&nonsense&page=zero&=&");
        assert_eq!(restored.query(), "dragon");
        assert_eq!(restored.page(), 0);
    }

    #[test]
    fn test_empty_query_string() {
        let restored = state_from_query("");
        assert_eq!(restored, SearchState::new());
    }
}
