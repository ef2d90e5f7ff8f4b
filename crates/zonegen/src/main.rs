use anyhow::{bail, Context, Result};
use clap::Parser;
use log::{info, warn};
use std::{
    fs,
    path::{Path, PathBuf},
};

use zonegen::{
    config::{self, Settings},
    fields,
    pipeline::{self, RunSummary, ZoneOutcome},
    source::{RecordSource, ShapefileSource},
};

/// Generate tile render jobs and GeoJSON previews for every zone in the catalog.
///
/// Runs without arguments from the generator directory; every path defaults to
/// the usual `zones/`, `templates/` and `../tilegen/zones` layout.
#[derive(Parser, Debug, Clone)]
#[command(name = "zonegen", version, about)]
struct Args {
    /// Directory holding `zones.json` and one sub-directory per zone.
    #[arg(long, env = "ZONEGEN_ZONES_DIR", default_value = "zones")]
    zones_dir: PathBuf,

    /// Job script template (`{ZONEID}`, `{PARTID}`, `{PARTNAME}`, `{CONTENT}`).
    #[arg(long, env = "ZONEGEN_TEMPLATE", default_value = "templates/tiles.template")]
    template: PathBuf,

    /// Root directory for generated `<zone>/<part>.py` and `.json` files.
    #[arg(long, env = "ZONEGEN_OUTPUT_DIR", default_value = "../tilegen/zones")]
    output_dir: PathBuf,

    /// Process zones on the rayon thread pool.
    #[arg(long, default_value_t = false)]
    parallel: bool,

    /// Print the first record's attributes for each zone and exit.
    #[arg(long, default_value_t = false)]
    list_fields: bool,
}

impl Args {
    fn settings(&self) -> Settings {
        Settings {
            zones_dir: self.zones_dir.clone(),
            template: self.template.clone(),
            output_dir: self.output_dir.clone(),
        }
    }
}

fn open_shapefile(path: &Path) -> Result<Box<dyn RecordSource>> {
    Ok(Box::new(ShapefileSource::open(path)?))
}

fn main() -> Result<()> {
    // Default to "info" so progress lines show without RUST_LOG.
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let settings = args.settings();

    let index = config::load_index(&settings)?;
    info!("Loaded {} zones from {}", index.zones.len(), settings.index_path().display());

    if args.list_fields {
        return fields::list_fields(&settings, &index.zones, &open_shapefile);
    }

    let template = fs::read_to_string(&settings.template)
        .with_context(|| format!("reading template {}", settings.template.display()))?;
    fs::create_dir_all(&settings.output_dir)
        .with_context(|| format!("creating {}", settings.output_dir.display()))?;

    let outcomes = pipeline::run(
        &settings,
        &index.zones,
        &template,
        &open_shapefile,
        args.parallel,
    );

    let mut summary = RunSummary::default();
    for outcome in &outcomes {
        summary.record(outcome);
        if let ZoneOutcome::Failed { zone, error } = outcome {
            warn!("[ZONE] {} failed: {}", zone, error);
        }
    }

    info!(
        "Zones: {} done, {} skipped, {} failed. Parts: {}, job lines: {}, ~{} tiles.",
        summary.done,
        summary.skipped,
        summary.failed,
        summary.parts,
        summary.job_lines,
        summary.tiles
    );

    if summary.failed > 0 {
        bail!("{} zone(s) failed", summary.failed);
    }

    Ok(())
}
