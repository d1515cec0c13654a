use std::collections::BTreeMap;
use std::sync::Arc;

use anyhow::{bail, Result};
use pillar_search::{
    GroupResult, HttpTransport, MultiSearch, SearchEvent, SearchFacade, SearchNotification,
};

use super::Capture;
use crate::config::Config;

/// Fan the query out to the configured quick-search groups and print the
/// grouped hits.
pub async fn execute(query: String, scope: Option<String>, config: &Config) -> Result<()> {
    if config.quick.scopes.is_empty() {
        bail!("no quick-search scopes configured; add [quick.scopes.<name>] to the config");
    }

    let transport = Arc::new(HttpTransport::new(&config.search.endpoint));
    let scopes: BTreeMap<String, MultiSearch> = config
        .quick
        .scopes
        .iter()
        .map(|(name, scope)| {
            (
                name.clone(),
                MultiSearch::new(&scope.ui_url, &config.quick.api_path, scope.groups.clone()),
            )
        })
        .collect();

    let mut facade = SearchFacade::new(transport, scopes);
    let capture = Arc::new(Capture::new(vec![
        SearchEvent::GroupResults,
        SearchEvent::Error,
    ]));
    facade.attach(capture.clone());

    if let Some(scope) = &scope {
        if !config.quick.scopes.contains_key(scope) {
            bail!("unknown quick-search scope {scope:?}");
        }
        facade.set_current_scope(scope);
    }
    facade.set_search_word(&query);
    facade.execute();
    facade.wait_idle().await;

    match capture.take() {
        Some(SearchNotification::GroupResults(groups)) => {
            print_groups(&groups);
            Ok(())
        }
        Some(SearchNotification::Error(message)) => bail!("quick search failed: {message}"),
        _ => bail!("quick search produced no outcome"),
    }
}

fn print_groups(groups: &[GroupResult]) {
    let with_hits: Vec<_> = groups.iter().filter(|g| g.has_results).collect();
    if with_hits.is_empty() {
        println!("No results.");
        return;
    }

    for group in with_hits {
        println!("{}  ({})", group.name, group.url);
        for hit in &group.hits {
            println!("  {}", hit.label().unwrap_or("(unnamed)"));
        }
        println!();
    }
}
