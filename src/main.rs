mod comparison;
mod config;
mod error;
mod pipeline;
mod plots;
mod rank_data;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::config::Config;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("pages_analysis=info")),
        )
        .init();

    let config = Config::parse();
    let analysis = pipeline::run(&config).with_context(|| {
        format!(
            "PageRank analysis of {} against {} failed",
            config.new_ranks.display(),
            config.old_ranks.display()
        )
    })?;

    println!("Number of ranked pages: {}", analysis.ranked.len());

    Ok(())
}
