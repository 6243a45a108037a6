//! `hsearch collections` commands.

use anyhow::{Context, Result};

use crate::backend::{HttpBackend, SearchBackend};
use crate::config::Config;
use crate::models::{AddToCollectionRequest, SourceId};
use crate::render::text;

pub async fn list_collections(cfg: &Config) -> Result<()> {
    let backend = HttpBackend::new(&cfg.backend)?;
    let collections = backend.collections().await?;
    print!("{}", text::collections(&collections));
    Ok(())
}

/// Add a raw item record (JSON) to a collection.
pub async fn add_to_collection(
    cfg: &Config,
    collection_id: &str,
    source: SourceId,
    content: &str,
) -> Result<()> {
    let content: serde_json::Value =
        serde_json::from_str(content).context("--content must be valid JSON")?;
    let backend = HttpBackend::new(&cfg.backend)?;
    let message = backend
        .add_to_collection(collection_id, &AddToCollectionRequest { source, content })
        .await?;
    println!("{}", message);
    Ok(())
}
