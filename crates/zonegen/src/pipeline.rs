//! Zone → record → part → point processing and file output.

use std::{
    collections::{HashMap, HashSet},
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use log::{debug, info, warn};
use rayon::prelude::*;
use zonekit::{
    build_bounds, part_id, substitute, tile_count, BoundMode, GeoJsonEmitter, JobEmitter,
    RenderParams, Ring,
};

use crate::config::{self, LoadedZone, Settings, ZoneConfig, ZoneRef};
use crate::source::{RecordSource, ShapeRecord};

/// Everything generated for one part. Records sharing a file stem are merged
/// into a single part.
#[derive(Debug, Clone)]
pub struct PartOutput {
    pub part_id: String,
    /// Output file name without extension: the part id with path separators
    /// replaced.
    pub file_stem: String,
    pub id: String,
    pub name: String,
    pub lines: Vec<String>,
    pub geojson: GeoJsonEmitter,
    /// Estimated tiles the job lines will render.
    pub tiles: u64,
}

#[derive(Debug, Clone)]
pub enum RecordOutcome {
    Part(PartOutput),
    Skipped(&'static str),
}

impl PartOutput {
    /// Append `other`'s job lines and features after this part's own.
    pub fn merge(&mut self, other: PartOutput) {
        self.lines.extend(other.lines);
        self.geojson.append(other.geojson);
        self.tiles = self.tiles.saturating_add(other.tiles);
    }
}

/// File-safe form of a part id.
pub fn file_stem(part_id: &str) -> String {
    part_id
        .chars()
        .map(|c| match c {
            '/' | '\\' => '-',
            c if c.is_control() => '-',
            c => c,
        })
        .collect()
}

/// Run one record through the bounding builder and both emitters.
pub fn process_record(zone: &ZoneConfig, jobs: &JobEmitter, record: &ShapeRecord) -> RecordOutcome {
    let Some(mapping) = &zone.mapping else {
        return RecordOutcome::Skipped("zone has no attribute mapping");
    };
    let Some(parts) = &record.parts else {
        return RecordOutcome::Skipped("shape has no parts");
    };

    let id = record.attribute(&mapping.id).to_owned();
    let name = record.attribute(&mapping.name).to_owned();
    let pid = part_id(&id, &name);
    let mode = BoundMode::from_box_flag(zone.box_mode);

    let mut lines = Vec::new();
    let mut geojson = GeoJsonEmitter::new();
    let mut tiles = 0u64;

    for raw in parts {
        let ring = Ring::from_raw(raw.iter().copied());

        for bounds in build_bounds(mode, &ring) {
            let params = RenderParams::new(&bounds, &pid);
            jobs.emit(&params, &mut lines);
            geojson.emit(&params);
            tiles = jobs
                .bands()
                .iter()
                .map(|&band| tile_count(bounds.rect, band))
                .fold(tiles, u64::saturating_add);
        }
    }

    if geojson.is_empty() {
        return RecordOutcome::Skipped("no ring with at least two points");
    }

    RecordOutcome::Part(PartOutput {
        file_stem: file_stem(&pid),
        part_id: pid,
        id,
        name,
        lines,
        geojson,
        tiles,
    })
}

/// Fill the job script template for one part.
pub fn render_script(template: &str, zone: &ZoneConfig, part: &PartOutput) -> String {
    let content = part.lines.join("\n");
    substitute(
        template,
        [
            ("ZONEID", zone.name.as_str()),
            ("PARTID", part.id.as_str()),
            ("PARTNAME", part.name.as_str()),
            ("CONTENT", content.as_str()),
        ],
    )
}

/// Write `<dir>/<part>.py` and `<dir>/<part>.json`.
pub fn write_part(dir: &Path, template: &str, zone: &ZoneConfig, part: &PartOutput) -> Result<()> {
    fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;

    let script = dir.join(format!("{}.py", part.file_stem));
    fs::write(&script, render_script(template, zone, part))
        .with_context(|| format!("writing {}", script.display()))?;
    make_executable(&script)?;

    let preview = dir.join(format!("{}.json", part.file_stem));
    let json = part
        .geojson
        .to_json()
        .with_context(|| format!("serializing {}", preview.display()))?;
    fs::write(&preview, json).with_context(|| format!("writing {}", preview.display()))?;

    Ok(())
}

#[cfg(unix)]
fn make_executable(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    fs::set_permissions(path, fs::Permissions::from_mode(0o777))
        .with_context(|| format!("chmod {}", path.display()))
}

#[cfg(not(unix))]
fn make_executable(_path: &Path) -> Result<()> {
    Ok(())
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ZoneReport {
    pub zone: String,
    pub parts_written: usize,
    pub records_skipped: usize,
    /// Records folded into an earlier part with the same file stem.
    pub records_merged: usize,
    pub job_lines: usize,
    pub tiles: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ZoneOutcome {
    Done(ZoneReport),
    Skipped { zone: String, reason: String },
    Failed { zone: String, error: String },
}

/// Iterate every record of `source`, then write one script + preview per part.
///
/// Records that map to the same file stem are merged in record order, so
/// each output file holds the jobs and features of all of them.
pub fn process_zone(
    zone: &ZoneConfig,
    source: &mut dyn RecordSource,
    template: &str,
    out_dir: &Path,
) -> Result<ZoneReport> {
    let jobs = JobEmitter::new(zone.zoom_bands());
    let mut report = ZoneReport {
        zone: zone.name.clone(),
        ..ZoneReport::default()
    };

    let mut parts: Vec<PartOutput> = Vec::new();
    let mut by_stem: HashMap<String, usize> = HashMap::new();

    while let Some(record) = source.next_record()? {
        let part = match process_record(zone, &jobs, &record) {
            RecordOutcome::Part(part) => part,
            RecordOutcome::Skipped(reason) => {
                debug!("[ZONE] {}: record skipped ({})", zone.name, reason);
                report.records_skipped += 1;
                continue;
            }
        };

        match by_stem.get(&part.file_stem) {
            Some(&i) => {
                debug!(
                    "[ZONE] {}: merging {} ({}) into {}",
                    zone.name, part.id, part.name, parts[i].file_stem
                );
                parts[i].merge(part);
                report.records_merged += 1;
            }
            None => {
                by_stem.insert(part.file_stem.clone(), parts.len());
                parts.push(part);
            }
        }
    }

    for part in &parts {
        write_part(out_dir, template, zone, part)?;

        info!(
            "[ZONE] {}: {} ({}) .. {} jobs, ~{} tiles. Done.",
            zone.name,
            part.id,
            part.name,
            part.lines.len(),
            part.tiles
        );

        report.parts_written += 1;
        report.job_lines += part.lines.len();
        report.tiles = report.tiles.saturating_add(part.tiles);
    }

    Ok(report)
}

/// Totals over a whole run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub done: usize,
    pub skipped: usize,
    pub failed: usize,
    pub parts: usize,
    pub job_lines: usize,
    pub tiles: u64,
}

impl RunSummary {
    pub fn record(&mut self, outcome: &ZoneOutcome) {
        match outcome {
            ZoneOutcome::Done(r) => {
                self.done += 1;
                self.parts += r.parts_written;
                self.job_lines += r.job_lines;
                self.tiles = self.tiles.saturating_add(r.tiles);
            }
            ZoneOutcome::Skipped { .. } => self.skipped += 1,
            ZoneOutcome::Failed { .. } => self.failed += 1,
        }
    }
}

/// Opens the record source behind a zone's `source` path.
pub type SourceOpener = dyn Fn(&Path) -> Result<Box<dyn RecordSource>> + Sync;

enum Planned {
    Ready { zone: LoadedZone, out_dir: PathBuf },
    Done(ZoneOutcome),
}

/// Load and validate every zone up front; disabled, unreadable and
/// colliding zones resolve to `Skipped` here.
fn plan(settings: &Settings, zones: &[ZoneRef]) -> Vec<Planned> {
    let mut taken = HashSet::new();

    zones
        .iter()
        .map(|zone_ref| {
            let zone = match config::load_zone(settings, zone_ref) {
                Ok(zone) => zone,
                Err(err) => {
                    warn!("[ZONE] {}: skipped: {}", zone_ref.path, err);
                    return Planned::Done(ZoneOutcome::Skipped {
                        zone: zone_ref.path.clone(),
                        reason: err.to_string(),
                    });
                }
            };

            if zone.config.disabled {
                info!("[ZONE] {}: disabled", zone.config.name);
                return Planned::Done(ZoneOutcome::Skipped {
                    zone: zone.config.name.clone(),
                    reason: "disabled".into(),
                });
            }

            let out_dir = settings.output_dir.join(zone.config.output_name());
            if !taken.insert(out_dir.clone()) {
                warn!(
                    "[ZONE] {}: output {} already used by another zone",
                    zone.config.name,
                    out_dir.display()
                );
                return Planned::Done(ZoneOutcome::Skipped {
                    zone: zone.config.name.clone(),
                    reason: format!("output {} collides", out_dir.display()),
                });
            }

            Planned::Ready { zone, out_dir }
        })
        .collect()
}

fn run_planned(planned: Planned, template: &str, open: &SourceOpener) -> ZoneOutcome {
    let (zone, out_dir) = match planned {
        Planned::Ready { zone, out_dir } => (zone, out_dir),
        Planned::Done(outcome) => return outcome,
    };
    let name = zone.config.name.clone();

    let source_path = zone.source_path();
    let mut source = match open(&source_path) {
        Ok(source) => source,
        Err(err) => {
            warn!("[ZONE] {}: skipped: {:#}", name, err);
            return ZoneOutcome::Skipped {
                zone: name,
                reason: format!("{:#}", err),
            };
        }
    };

    match process_zone(&zone.config, source.as_mut(), template, &out_dir) {
        Ok(report) => ZoneOutcome::Done(report),
        Err(err) => {
            warn!("[ZONE] {}: failed: {:#}", name, err);
            ZoneOutcome::Failed {
                zone: name,
                error: format!("{:#}", err),
            }
        }
    }
}

/// Process every zone listed in the index, isolating failures per zone.
pub fn run(
    settings: &Settings,
    zones: &[ZoneRef],
    template: &str,
    open: &SourceOpener,
    parallel: bool,
) -> Vec<ZoneOutcome> {
    let planned = plan(settings, zones);

    if parallel {
        planned
            .into_par_iter()
            .map(|p| run_planned(p, template, open))
            .collect()
    } else {
        planned
            .into_iter()
            .map(|p| run_planned(p, template, open))
            .collect()
    }
}
