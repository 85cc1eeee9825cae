use clap::Args;
use serde_json::json;
use std::sync::Arc;

use super::open_store;
use crate::cli::utils::output_success;
use crate::cli::OutputFormat;
use crate::models::{Bootcamp, Course, Review, User};
use crate::store::{DocumentStore, Repository, StoreError};

#[derive(Args)]
pub struct PurgeArgs {
    #[arg(long, help = "Confirm deletion of all data")]
    pub yes: bool,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PurgeReport {
    pub users: u64,
    pub bootcamps: u64,
    pub courses: u64,
    pub reviews: u64,
}

/// Children first, then bootcamps, then users.
pub async fn purge_all(store: Arc<dyn DocumentStore>) -> Result<PurgeReport, StoreError> {
    Ok(PurgeReport {
        reviews: Repository::<Review>::new(store.clone()).delete_all().await?,
        courses: Repository::<Course>::new(store.clone()).delete_all().await?,
        bootcamps: Repository::<Bootcamp>::new(store.clone()).delete_all().await?,
        users: Repository::<User>::new(store).delete_all().await?,
    })
}

pub async fn handle(args: PurgeArgs, output_format: OutputFormat) -> anyhow::Result<()> {
    if !args.yes {
        anyhow::bail!("Refusing to purge without --yes");
    }
    let (_, store) = open_store().await?;
    let report = purge_all(store).await?;
    tracing::info!(?report, "purged all collections");

    output_success(
        output_format,
        "Data destroyed",
        Some(json!({
            "users": report.users,
            "bootcamps": report.bootcamps,
            "courses": report.courses,
            "reviews": report.reviews,
        })),
    )
}
