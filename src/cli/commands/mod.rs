pub mod purge;
pub mod seed;

use std::sync::Arc;

use anyhow::Context;

use crate::config::AppConfig;
use crate::store::{self, DocumentStore};

/// Configuration and store for a one-shot command, after loading `.env`.
pub(crate) async fn open_store() -> anyhow::Result<(AppConfig, Arc<dyn DocumentStore>)> {
    let _ = dotenvy::dotenv();
    let config = AppConfig::from_env();
    if config.database.url.is_none() {
        anyhow::bail!("DATABASE_URL must be set; the in-memory store does not outlive the command");
    }
    let store = store::open(&config.database).await.context("failed to open the document store")?;
    Ok((config, store))
}
