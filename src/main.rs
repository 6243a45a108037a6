//! # Heritage Search CLI (`hsearch`)
//!
//! Command-line client for the cultural-heritage search aggregator.
//!
//! ## Usage
//!
//! ```bash
//! hsearch --config ./config/hsearch.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `hsearch search "<query>"` | Search every source and print the result sections |
//! | `hsearch browse ["<query>"]` | Interactive session reading commands from stdin |
//! | `hsearch details <source> <id>` | Full detail view of one item |
//! | `hsearch collections list` | List collections |
//! | `hsearch collections add <id> --source <src> --content <json>` | Add an item to a collection |
//! | `hsearch sources` | List sources and whether they are shown |
//!
//! ## Examples
//!
//! ```bash
//! # First two pages, museums only
//! hsearch search "cats" --pages 2 --hide wikipedia --hide internet_archive
//!
//! # Standalone HTML page with lazily loaded images
//! hsearch search "ukiyo-e" --format html > ukiyo-e.html
//!
//! # Against a backend on another host
//! hsearch --backend http://search.example.org search "astrolabe"
//! ```
//!
//! Logging goes to stderr and is controlled by `RUST_LOG`
//! (default `heritage_search=info`).

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use heritage_search::config::{self, Config};
use heritage_search::indicator::IndicatorMode;
use heritage_search::models::SourceId;
use heritage_search::search_cmd::OutputFormat;
use heritage_search::{browse, collections_cmd, search_cmd};

/// Heritage Search CLI: query Wikipedia, the Internet Archive, and museum
/// collections through one aggregator backend.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file. See `config/hsearch.example.toml` for a full example. Built-in
/// defaults are used when the file does not exist.
#[derive(Parser)]
#[command(
    name = "hsearch",
    about = "Search cultural-heritage sources through one aggregator",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/hsearch.toml")]
    config: PathBuf,

    /// Aggregator base URL; overrides `backend.base_url`.
    #[arg(long, global = true)]
    backend: Option<String>,

    /// Loading indicator on stderr: `off`, `human`, or `json`.
    /// Defaults to `human` when stderr is a terminal.
    #[arg(long, global = true)]
    indicator: Option<IndicatorMode>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search every source and print the result sections.
    Search {
        /// The search query.
        query: String,

        /// Number of pages to load (stops early when results run out).
        #[arg(long, default_value_t = 1)]
        pages: u32,

        /// Hide a source's section (repeatable), e.g. `--hide wikipedia`.
        #[arg(long = "hide")]
        hide: Vec<SourceId>,

        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Interactive session; type `help` for commands.
    Browse {
        /// Optional first query.
        query: Option<String>,
    },

    /// Fetch and print the full detail view of one item.
    Details {
        /// Source identifier, e.g. `met_museum`.
        source: SourceId,

        /// The item's identifier at that source.
        id: String,

        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Manage collections on the backend.
    Collections {
        #[command(subcommand)]
        action: CollectionsAction,
    },

    /// List sources, their labels, and whether they are shown.
    Sources,
}

#[derive(Subcommand)]
enum CollectionsAction {
    /// List collections.
    List,

    /// Add an item record to a collection.
    Add {
        /// Collection identifier.
        collection_id: String,

        /// Source the item came from.
        #[arg(long)]
        source: SourceId,

        /// The item's record as JSON.
        #[arg(long)]
        content: String,
    },
}

fn load(cli: &Cli) -> Result<Config> {
    let mut cfg = if cli.config.exists() {
        config::load_config(&cli.config)?
    } else {
        debug!(path = %cli.config.display(), "config file not found, using defaults");
        Config::minimal()
    };
    if let Some(ref url) = cli.backend {
        cfg.backend.base_url = url.clone();
        cfg.validate()?;
    }
    Ok(cfg)
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "heritage_search=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let mut cfg = load(&cli)?;
    let indicator = cli
        .indicator
        .unwrap_or_else(IndicatorMode::default_for_tty)
        .indicator();

    match cli.command {
        Commands::Search {
            query,
            pages,
            hide,
            format,
        } => {
            cfg.filter.hidden_sources.extend(hide);
            search_cmd::run_search(&cfg, &query, pages.max(1), format, indicator).await?;
        }
        Commands::Browse { query } => {
            browse::run_browse(&cfg, query.as_deref(), indicator).await?;
        }
        Commands::Details { source, id, format } => {
            search_cmd::run_details(&cfg, source, &id, format).await?;
        }
        Commands::Collections { action } => match action {
            CollectionsAction::List => {
                collections_cmd::list_collections(&cfg).await?;
            }
            CollectionsAction::Add {
                collection_id,
                source,
                content,
            } => {
                collections_cmd::add_to_collection(&cfg, &collection_id, source, &content).await?;
            }
        },
        Commands::Sources => {
            search_cmd::list_sources(&cfg)?;
        }
    }

    Ok(())
}
