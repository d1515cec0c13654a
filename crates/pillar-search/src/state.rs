use std::collections::BTreeMap;

use serde_json::Value;

/// Pending search parameters: free-text query, pagination, entity scope and
/// facet refinements. Renderers read this through the controller; all
/// mutation goes through the methods below.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchState {
    query: String,
    page: u32,
    what: Option<String>,
    project_id: Option<String>,
    refinements: BTreeMap<String, Value>,
}

impl SearchState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    /// Zero-based page index
    pub fn page(&self) -> u32 {
        self.page
    }

    /// Entity scope path, e.g. `/user`. `None` searches nodes.
    pub fn scope(&self) -> Option<&str> {
        self.what.as_deref()
    }

    pub fn project_id(&self) -> Option<&str> {
        self.project_id.as_deref()
    }

    pub fn refinements(&self) -> &BTreeMap<String, Value> {
        &self.refinements
    }

    /// Set the free-text query and entity scope. A changed query invalidates
    /// any earlier pagination, so the page snaps back to 0.
    pub fn set_query(&mut self, text: &str, scope: Option<&str>) {
        if text != self.query {
            self.page = 0;
        }
        self.query = text.to_string();
        self.what = scope.map(str::to_string);
    }

    /// Scope results to a project. Absence means global search.
    pub fn set_project_id(&mut self, id: &str) {
        self.project_id = Some(id.to_string());
    }

    pub fn clear_project(&mut self) {
        self.project_id = None;
    }

    /// Out-of-range pages are left for the backend to clamp.
    pub fn set_current_page(&mut self, page: u32) {
        self.page = page;
    }

    /// On/off switch per facet: toggling the currently refined value clears
    /// it, any other value overwrites it.
    pub fn toggle_term(&mut self, facet: &str, value: Value) {
        match self.refinements.get(facet) {
            Some(current) if *current == value => {
                self.refinements.remove(facet);
            }
            _ => {
                self.refinements.insert(facet.to_string(), value);
            }
        }
    }

    /// Unconditionally refine a facet to a value.
    pub fn add_term(&mut self, facet: &str, value: Value) {
        self.refinements.insert(facet.to_string(), value);
    }

    pub fn remove_term(&mut self, facet: &str) {
        self.refinements.remove(facet);
    }

    pub fn is_refined(&self, facet: &str, value: &Value) -> bool {
        self.refinements.get(facet) == Some(value)
    }

    /// Flat query parameters: `q`, `page`, `project` when set, then one entry
    /// per refinement in key order. Unset optional fields are omitted.
    pub fn params(&self) -> Vec<(String, String)> {
        let mut params = vec![
            ("q".to_string(), self.query.clone()),
            ("page".to_string(), self.page.to_string()),
        ];
        if let Some(project) = &self.project_id {
            params.push(("project".to_string(), project.clone()));
        }
        for (facet, value) in &self.refinements {
            params.push((facet.clone(), param_value(value)));
        }
        params
    }
}

/// Query-string form of a refinement value. Strings go out bare; everything
/// else uses its JSON rendering.
pub fn param_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_params_reflect_latest_values() {
        let mut state = SearchState::new();
        state.set_query("dragon", None);
        state.set_current_page(3);
        state.set_current_page(1);
        state.set_project_id("abc123");
        state.toggle_term("node_type", json!("asset"));

        assert_eq!(
            state.params(),
            vec![
                ("q".to_string(), "dragon".to_string()),
                ("page".to_string(), "1".to_string()),
                ("project".to_string(), "abc123".to_string()),
                ("node_type".to_string(), "asset".to_string()),
            ]
        );
    }

    #[test]
    fn test_unset_optionals_omitted() {
        let state = SearchState::new();
        let params = state.params();
        assert_eq!(params.len(), 2);
        assert!(params.iter().all(|(k, _)| k != "project"));
    }

    #[test]
    fn test_query_change_resets_page() {
        let mut state = SearchState::new();
        state.set_query("dragon", None);
        state.set_current_page(4);
        state.set_query("dragons", None);
        assert_eq!(state.page(), 0);
    }

    #[test]
    fn test_same_query_keeps_page() {
        let mut state = SearchState::new();
        state.set_query("dragon", None);
        state.set_current_page(4);
        state.set_query("dragon", None);
        assert_eq!(state.page(), 4);
    }

    #[test]
    fn test_toggle_is_an_involution() {
        let mut state = SearchState::new();
        let before = state.clone();

        state.toggle_term("media", json!("video"));
        assert!(state.is_refined("media", &json!("video")));

        state.toggle_term("media", json!("video"));
        assert!(!state.is_refined("media", &json!("video")));
        assert_eq!(state, before);
    }

    #[test]
    fn test_toggle_other_value_overwrites() {
        let mut state = SearchState::new();
        state.toggle_term("media", json!("video"));
        state.toggle_term("media", json!("image"));

        assert!(state.is_refined("media", &json!("image")));
        assert!(!state.is_refined("media", &json!("video")));
        assert_eq!(state.refinements().len(), 1);
    }

    #[test]
    fn test_non_string_values_in_params() {
        let mut state = SearchState::new();
        state.add_term("is_free", json!(true));
        state.add_term("tags", json!("rig"));

        let params = state.params();
        assert!(params.contains(&("is_free".to_string(), "true".to_string())));
        assert!(params.contains(&("tags".to_string(), "rig".to_string())));
    }
}
