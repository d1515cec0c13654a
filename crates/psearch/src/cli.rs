use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq)]
pub enum Scope {
    /// Published nodes (assets, posts, groups)
    Nodes,
    /// User accounts
    Users,
    /// User accounts, all fields (admin only)
    AdminUsers,
}

impl Scope {
    /// Path suffix appended to the search endpoint
    pub fn path(&self) -> Option<&'static str> {
        match self {
            Scope::Nodes => None,
            Scope::Users => Some("/user"),
            Scope::AdminUsers => Some("/admin/user"),
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq)]
pub enum FacetOrder {
    /// Highest count first
    Count,
    /// Alphabetical by value
    Value,
}

#[derive(Parser)]
#[command(name = "psearch")]
#[command(about = "Pillar search client", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to config file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Override the configured endpoint base URL
    #[arg(long)]
    pub endpoint: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new config file
    Init {
        /// Path for new config file
        #[arg(default_value = "psearch.toml")]
        path: PathBuf,
    },
    /// Run a single search and print hits and facet counts
    Search {
        /// Free-text query
        query: String,
        /// Zero-based result page
        #[arg(long, default_value_t = 0)]
        page: u32,
        /// Scope results to a project id
        #[arg(long)]
        project: Option<String>,
        /// Facet refinement as facet=value (repeatable)
        #[arg(long = "refine", value_parser = parse_refinement)]
        refinements: Vec<(String, String)>,
        /// Entity scope to search
        #[arg(long, default_value = "nodes", value_enum)]
        scope: Scope,
        /// Facet option ordering (refined values always list first)
        #[arg(long, default_value = "count", value_enum)]
        sort: FacetOrder,
    },
    /// Fan the query out to the configured quick-search groups
    Quick {
        /// Free-text query
        query: String,
        /// Scope name from the config (defaults to the first one)
        #[arg(long)]
        scope: Option<String>,
    },
}

/// Parse a `facet=value` refinement flag
pub fn parse_refinement(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((facet, value)) if !facet.is_empty() => {
            Ok((facet.to_string(), value.to_string()))
        }
        _ => Err(format!("expected facet=value, got {raw:?}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_refinement() {
        assert_eq!(
            parse_refinement("node_type=asset").unwrap(),
            ("node_type".to_string(), "asset".to_string())
        );
        assert!(parse_refinement("no-separator").is_err());
        assert!(parse_refinement("=value").is_err());
    }

    #[test]
    fn test_scope_paths() {
        assert_eq!(Scope::Nodes.path(), None);
        assert_eq!(Scope::Users.path(), Some("/user"));
        assert_eq!(Scope::AdminUsers.path(), Some("/admin/user"));
    }
}
