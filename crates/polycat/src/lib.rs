//! Catalog expander.
//!
//! A catalog maps source names to a `zone -> region -> subregions` tree plus
//! the patterns used to name, fetch and render each leaf:
//!
//! ```text
//! zones.json
//!   <source>
//!     zones     { zone: { region: "Name" | ["A", "B"] | { id: "Name" } } }
//!     filenames { poly, render, transform }
//!     output    { poly, render }
//!     url, process { poly, render }, settings { overwriteExistingFiles }
//! ```
//!
//! Every leaf is handled on its own; one failing leaf never stops the rest.

pub mod config;
pub mod expand;
pub mod fetch;
pub mod tasks;

use std::{fs, path::Path};

use log::{info, warn};

use crate::{
    config::Source,
    expand::expand,
    fetch::Fetcher,
    tasks::{fetch_poly, render_template, PolyStatus},
};

/// Totals over a whole catalog run.
#[derive(Debug, Default)]
pub struct Summary {
    pub leaves: usize,
    pub fetched: usize,
    pub existing: usize,
    pub rendered: usize,
    /// `(leaf, error)` for every failed task.
    pub failed: Vec<(String, String)>,
}

impl Summary {
    #[inline]
    pub fn is_ok(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Expand every source and run its enabled tasks. Paths are relative to `base`.
pub fn run(sources: &[Source], base: &Path, fetcher: &dyn Fetcher) -> Summary {
    let mut summary = Summary::default();

    for source in sources {
        let leaves = expand(source);
        let process = source.config.process;
        info!(
            "[SOURCE] {}: {} leaves (poly: {}, render: {})",
            source.name,
            leaves.len(),
            process.poly,
            process.render
        );

        // Read once per source; a missing template fails each leaf that needs it.
        let template = if process.render {
            let path = source.template_path(base);
            Some(
                fs::read_to_string(&path)
                    .map_err(|e| format!("cannot read template {}: {}", path.display(), e)),
            )
        } else {
            None
        };

        for leaf in &leaves {
            summary.leaves += 1;

            if process.poly {
                match fetch_poly(leaf, source, base, fetcher) {
                    Ok(PolyStatus::Fetched { path, bytes }) => {
                        info!("{}: fetched {} ({} bytes)", leaf, path.display(), bytes);
                        summary.fetched += 1;
                    }
                    Ok(PolyStatus::Existing { path }) => {
                        info!("{}: {} exists, skipped", leaf, path.display());
                        summary.existing += 1;
                    }
                    Err(e) => {
                        warn!("{}: poly failed: {:#}", leaf, e);
                        summary.failed.push((leaf.to_string(), format!("{:#}", e)));
                    }
                }
            }

            match &template {
                Some(Ok(text)) => match render_template(leaf, source, base, text) {
                    Ok(path) => {
                        info!("{}: rendered {}", leaf, path.display());
                        summary.rendered += 1;
                    }
                    Err(e) => {
                        warn!("{}: render failed: {:#}", leaf, e);
                        summary.failed.push((leaf.to_string(), format!("{:#}", e)));
                    }
                },
                Some(Err(msg)) => {
                    warn!("{}: render failed: {}", leaf, msg);
                    summary.failed.push((leaf.to_string(), msg.clone()));
                }
                None => {}
            }
        }
    }

    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parse_catalog;
    use anyhow::{bail, Result};

    /// Serves a fixed body, failing for URLs containing "broken".
    struct FakeFetcher;

    impl Fetcher for FakeFetcher {
        fn fetch(&self, url: &str) -> Result<Vec<u8>> {
            if url.contains("broken") {
                bail!("HTTP 404 for {}", url);
            }
            Ok(b"polygon\nEND\n".to_vec())
        }
    }

    fn catalog(render_template: &str) -> Vec<Source> {
        let text = format!(
            r#"{{ "src": {{
                "zones": {{ "z": {{ "r": ["Good", "broken", "Other"] }} }},
                "filenames": {{ "poly": "{{name}}.poly", "render": "{{name}}.py", "transform": "lowercase" }},
                "output": {{ "poly": "polys/{{zone}}", "render": "render/{{zone}}" }},
                "url": "http://example.org/{{region}}/{{filename}}",
                "process": {{ "poly": true, "render": true }},
                "template": "{}"
            }} }}"#,
            render_template
        );
        parse_catalog(&text, Path::new("zones.json")).unwrap()
    }

    #[test]
    fn one_failing_leaf_does_not_stop_the_rest() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join("r.template"), "poly={polyname}\n").unwrap();

        let summary = run(&catalog("r.template"), tmp.path(), &FakeFetcher);

        assert_eq!(summary.leaves, 3);
        assert_eq!(summary.fetched, 2);
        assert_eq!(summary.rendered, 3);
        assert_eq!(summary.failed.len(), 1);
        assert_eq!(summary.failed[0].0, "src/z/r/broken");
        assert!(!summary.is_ok());

        assert!(tmp.path().join("polys/z/good.poly").exists());
        assert!(tmp.path().join("polys/z/other.poly").exists());
        assert_eq!(
            fs::read_to_string(tmp.path().join("render/z/good.py")).unwrap(),
            "poly=good.poly\n"
        );
    }

    #[test]
    fn second_run_skips_existing_polys() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join("r.template"), "x\n").unwrap();
        let sources = catalog("r.template");

        run(&sources, tmp.path(), &FakeFetcher);
        let again = run(&sources, tmp.path(), &FakeFetcher);

        assert_eq!(again.fetched, 0);
        assert_eq!(again.existing, 2);
    }

    #[test]
    fn missing_template_fails_render_only() {
        let tmp = tempfile::tempdir().unwrap();

        let summary = run(&catalog("absent.template"), tmp.path(), &FakeFetcher);

        assert_eq!(summary.fetched, 2);
        assert_eq!(summary.rendered, 0);
        // Three render failures plus the broken download.
        assert_eq!(summary.failed.len(), 4);
    }

    #[test]
    fn disabled_processes_touch_nothing() {
        let tmp = tempfile::tempdir().unwrap();
        let text = r#"{ "s": { "zones": { "z": { "r": "Leaf" } } } }"#;
        let sources = parse_catalog(text, Path::new("zones.json")).unwrap();

        let summary = run(&sources, tmp.path(), &FakeFetcher);

        assert_eq!(summary.leaves, 1);
        assert_eq!(summary.fetched + summary.rendered, 0);
        assert!(summary.is_ok());
        assert_eq!(fs::read_dir(tmp.path()).unwrap().count(), 0);
    }
}
