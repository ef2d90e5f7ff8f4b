//! Per-leaf side effects: poly download and render template instantiation.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use log::debug;
use zonekit::substitute;

use crate::{config::Source, expand::Leaf, fetch::Fetcher};

/// What happened to a leaf's poly file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PolyStatus {
    Fetched { path: PathBuf, bytes: usize },
    /// Already on disk and overwriting is disabled; nothing was requested.
    Existing { path: PathBuf },
}

/// Create the parent directory of `path` if needed.
pub fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating directory {}", parent.display()))?;
        }
    }
    Ok(())
}

fn subst_with(pattern: &str, leaf: &Leaf, extra: &[(&str, &str)]) -> String {
    let mut slots = leaf.tokens();
    slots.extend_from_slice(extra);
    substitute(pattern, slots)
}

/// Download the leaf's poly file into `output.poly`, relative to `base`.
pub fn fetch_poly(
    leaf: &Leaf,
    source: &Source,
    base: &Path,
    fetcher: &dyn Fetcher,
) -> Result<PolyStatus> {
    let cfg = &source.config;

    let filename = subst_with(&cfg.filenames.poly, leaf, &[]);
    let extra = [("filename", filename.as_str())];
    let url = subst_with(&cfg.url, leaf, &extra);
    let path = base
        .join(subst_with(&cfg.output.poly, leaf, &extra))
        .join(&filename);

    if path.exists() && !cfg.settings.overwrite_existing_files {
        debug!("{}: {} exists, skipping", leaf, path.display());
        return Ok(PolyStatus::Existing { path });
    }

    let body = fetcher.fetch(&url)?;
    ensure_parent(&path)?;
    fs::write(&path, &body).with_context(|| format!("writing {}", path.display()))?;

    Ok(PolyStatus::Fetched {
        path,
        bytes: body.len(),
    })
}

/// Instantiate `template` for the leaf and write it into `output.render`.
pub fn render_template(
    leaf: &Leaf,
    source: &Source,
    base: &Path,
    template: &str,
) -> Result<PathBuf> {
    let cfg = &source.config;

    let filename = subst_with(&cfg.filenames.render, leaf, &[]);
    let polyname = subst_with(&cfg.filenames.poly, leaf, &[]);
    let path = base
        .join(subst_with(
            &cfg.output.render,
            leaf,
            &[("filename", filename.as_str())],
        ))
        .join(&filename);

    let text = subst_with(template, leaf, &[("polyname", polyname.as_str())]);

    ensure_parent(&path)?;
    fs::write(&path, text).with_context(|| format!("writing {}", path.display()))?;

    Ok(path)
}
