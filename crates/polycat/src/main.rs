use anyhow::{bail, Context, Result};
use clap::Parser;
use log::{info, warn};
use std::{path::PathBuf, time::Duration};

use polycat::{config, fetch::HttpFetcher};

/// Expand the zone catalog into poly downloads and render job files.
#[derive(Parser, Debug, Clone)]
#[command(name = "polycat", version, about)]
struct Args {
    /// Catalog file mapping sources to zone/region/subregion trees.
    #[arg(long, env = "POLYCAT_CATALOG", default_value = "zones.json")]
    catalog: PathBuf,

    /// Directory that output patterns and templates are resolved against.
    #[arg(long, env = "POLYCAT_BASE_DIR", default_value = ".")]
    base_dir: PathBuf,

    /// HTTP timeout per download, in seconds (0 = client default).
    #[arg(long, env = "POLYCAT_TIMEOUT", default_value_t = 0)]
    timeout: u64,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let sources = config::load_catalog(&args.catalog)
        .with_context(|| format!("loading catalog {}", args.catalog.display()))?;
    info!("Loaded {} sources from {}", sources.len(), args.catalog.display());

    let timeout = (args.timeout > 0).then(|| Duration::from_secs(args.timeout));
    let fetcher = HttpFetcher::new(timeout)?;

    let summary = polycat::run(&sources, &args.base_dir, &fetcher);

    info!(
        "Leaves: {}. Polys: {} fetched, {} existing. Rendered: {}. Failed: {}.",
        summary.leaves,
        summary.fetched,
        summary.existing,
        summary.rendered,
        summary.failed.len()
    );

    if !summary.is_ok() {
        for (leaf, error) in &summary.failed {
            warn!("  {}: {}", leaf, error);
        }
        bail!("{} task(s) failed", summary.failed.len());
    }

    Ok(())
}
