use std::sync::Arc;

use anyhow::{bail, Result};
use pillar_search::{
    by_count_desc, by_value, entries_for, refined_first, urlsync, FacetEntry, HttpTransport,
    SearchController, SearchEvent, SearchNotification, SearchResult,
};

use super::Capture;
use crate::cli::{FacetOrder, Scope};
use crate::config::Config;

pub struct SearchArgs {
    pub query: String,
    pub page: u32,
    pub project: Option<String>,
    pub refinements: Vec<(String, String)>,
    pub scope: Scope,
    pub sort: FacetOrder,
}

/// Run one search against the configured endpoint and print the outcome.
pub async fn execute(args: SearchArgs, config: &Config) -> Result<()> {
    let transport = Arc::new(HttpTransport::new(&config.search.endpoint));
    let mut controller = SearchController::new(transport, &config.search.path);

    controller.set_query(&args.query, args.scope.path());
    controller.set_current_page(args.page);
    if let Some(project) = &args.project {
        controller.set_project_id(project);
    }
    for (facet, value) in &args.refinements {
        controller.add_term(facet, urlsync::coerce(value));
    }

    let capture = Arc::new(Capture::new(vec![SearchEvent::Results, SearchEvent::Error]));
    controller.attach(capture.clone());

    controller.execute();
    controller.wait_idle().await;

    match capture.take() {
        Some(SearchNotification::Results(result)) => {
            print_result(&result, &controller, args.sort);
            println!();
            println!("bookmark: ?{}", controller.query_string());
            Ok(())
        }
        Some(SearchNotification::Error(message)) => bail!("search failed: {message}"),
        _ => bail!("search produced no outcome"),
    }
}

fn print_result(result: &SearchResult, controller: &SearchController, sort: FacetOrder) {
    println!(
        "{} hits in {} ms (page {})",
        result.total_count,
        result.took_ms,
        result.page + 1
    );

    if result.is_empty() {
        println!("We didn't find any items. Try searching something else.");
        return;
    }

    println!();
    for hit in &result.hits {
        let label = hit.label().unwrap_or("(unnamed)");
        match hit.id() {
            Some(id) => println!("  {label}  [{id}]"),
            None => println!("  {label}"),
        }
    }

    let order: fn(&FacetEntry, &FacetEntry) -> std::cmp::Ordering = match sort {
        FacetOrder::Count => by_count_desc,
        FacetOrder::Value => by_value,
    };
    for facet in result.aggregations.keys() {
        let mut entries = entries_for(result, controller.state(), facet);
        if entries.is_empty() {
            continue;
        }
        entries.sort_by(refined_first(order));

        println!();
        println!("{facet}:");
        for entry in &entries {
            println!("  {} {}", format_entry(entry), entry.count);
        }
    }
}

fn format_entry(entry: &FacetEntry) -> String {
    let marker = if entry.refined { "[x]" } else { "[ ]" };
    format!("{marker} {}", pillar_search::state::param_value(&entry.value))
}
