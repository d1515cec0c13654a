mod cli;
mod commands;
mod config;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    pillar_search::init_logging();

    // Parse CLI args
    let cli = Cli::parse();

    // Handle init command early (doesn't need config)
    if let Commands::Init { path } = &cli.command {
        return commands::init::run_init(path);
    }

    // Load config
    let mut config = config::load_config(cli.config.as_deref())?;
    if let Some(endpoint) = &cli.endpoint {
        config.search.endpoint = endpoint.clone();
    }

    // Dispatch to command
    match cli.command {
        Commands::Init { .. } => {
            // Already handled above
            unreachable!()
        }
        Commands::Search {
            query,
            page,
            project,
            refinements,
            scope,
            sort,
        } => {
            let args = commands::search::SearchArgs {
                query,
                page,
                project,
                refinements,
                scope,
                sort,
            };
            commands::search::execute(args, &config).await?;
        }
        Commands::Quick { query, scope } => {
            commands::quick::execute(query, scope, &config).await?;
        }
    }

    Ok(())
}
