//! One-shot `hsearch` commands: `search`, `details`, and `sources`.

use anyhow::{bail, Result};
use serde_json::json;

use crate::backend::{HttpBackend, SearchBackend};
use crate::config::Config;
use crate::controller::{FetchOutcome, ResultAggregationController};
use crate::detail::DetailOverlay;
use crate::filter::SourceFilter;
use crate::indicator::LoadingIndicator;
use crate::models::SourceId;
use crate::render::{html::HtmlRenderer, text};

/// How command results are written to stdout.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    Html,
}

/// Search for `query`, loading up to `pages` pages, and print the
/// rendered result area.
///
/// A failed fetch still prints whatever was loaded (with the error notice)
/// before returning an error.
pub async fn run_search(
    cfg: &Config,
    query: &str,
    pages: u32,
    format: OutputFormat,
    indicator: Box<dyn LoadingIndicator>,
) -> Result<()> {
    if query.trim().is_empty() {
        bail!("query must not be empty");
    }

    let controller = ResultAggregationController::from_config(cfg)?.with_indicator(indicator);

    let mut outcome = controller.start_search(query).await;
    let mut loaded = 1;
    while loaded < pages && matches!(outcome, FetchOutcome::Loaded { has_more: true, .. }) {
        outcome = controller.load_more().await;
        loaded += 1;
    }

    let view = controller.view();
    let session = controller.session();
    match format {
        OutputFormat::Text => {
            print!("{}", text::results(&view, |id| controller.image_src(id)));
            if let Some(ref session) = session {
                if session.current_page > 0 {
                    println!("{}", text::session_line(session));
                }
            }
        }
        OutputFormat::Json => {
            let doc = json!({
                "outcome": outcome,
                "session": session,
                "view": view,
            });
            println!("{}", serde_json::to_string_pretty(&doc)?);
        }
        OutputFormat::Html => {
            let html = HtmlRenderer::new()?.document(query, &view, controller.can_load_more())?;
            println!("{}", html);
        }
    }

    if let FetchOutcome::Failed { notice } = outcome {
        bail!("search failed: {}", notice);
    }
    Ok(())
}

/// Fetch one item's full record through the backend and print its detail
/// view.
pub async fn run_details(cfg: &Config, source: SourceId, id: &str, format: OutputFormat) -> Result<()> {
    let backend = HttpBackend::new(&cfg.backend)?;
    let item = backend.details(source, id).await?;

    let mut overlay = DetailOverlay::new();
    overlay.open(None, item);
    let Some(snapshot) = overlay.snapshot() else {
        bail!("detail view did not open");
    };

    match format {
        OutputFormat::Text => print!("{}", text::detail(&snapshot)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&snapshot)?),
        OutputFormat::Html => println!("{}", HtmlRenderer::new()?.detail(&snapshot)?),
    }
    Ok(())
}

/// List every known source with its label and whether the configured
/// filter shows it.
pub fn list_sources(cfg: &Config) -> Result<()> {
    let filter = SourceFilter::with_hidden(&cfg.filter.hidden_sources);
    println!("{:<20} {:<22} {:<8} VISIBLE", "SOURCE", "LABEL", "IMAGES");
    for source in SourceId::ALL {
        println!(
            "{:<20} {:<22} {:<8} {}",
            source.as_str(),
            source.label(),
            if source.has_images() { "yes" } else { "no" },
            if filter.is_visible(source) { "yes" } else { "no" }
        );
    }
    Ok(())
}
