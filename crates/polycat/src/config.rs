//! Catalog file: one entry per poly source.

use std::{
    fs,
    path::{Path, PathBuf},
};

use indexmap::IndexMap;
use serde::Deserialize;
use thiserror::Error;

use crate::expand::{parse_transforms, Transform};

/// Template used when a source does not name its own.
pub const DEFAULT_TEMPLATE: &str = "templates/render.template";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("cannot parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("source `{entry}`: {message}")]
    Invalid { entry: String, message: String },
}

/// Subregions of a region: one name, a list of names, or `id -> name`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum Subregions {
    One(String),
    Many(Vec<String>),
    Named(IndexMap<String, String>),
}

impl Subregions {
    /// `(id, name)` per leaf. Only the `Named` form carries ids.
    pub fn leaves(&self) -> Vec<(Option<&str>, &str)> {
        match self {
            Subregions::One(name) => vec![(None, name.as_str())],
            Subregions::Many(names) => names.iter().map(|n| (None, n.as_str())).collect(),
            Subregions::Named(map) => map
                .iter()
                .map(|(id, name)| (Some(id.as_str()), name.as_str()))
                .collect(),
        }
    }
}

/// zone -> region -> subregions, in file order.
pub type ZoneTree = IndexMap<String, IndexMap<String, Subregions>>;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceSettings {
    #[serde(default)]
    pub overwrite_existing_files: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Filenames {
    #[serde(default)]
    pub poly: String,
    #[serde(default)]
    pub render: String,
    /// Comma-separated transforms applied to leaf names, e.g. `lowercase,spacedash`.
    #[serde(default)]
    pub transform: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Outputs {
    #[serde(default)]
    pub poly: String,
    #[serde(default)]
    pub render: String,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct Process {
    #[serde(default)]
    pub poly: bool,
    #[serde(default)]
    pub render: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
    pub zones: ZoneTree,
    #[serde(default)]
    pub settings: SourceSettings,
    #[serde(default)]
    pub filenames: Filenames,
    #[serde(default)]
    pub output: Outputs,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub process: Process,
    #[serde(default)]
    pub template: Option<PathBuf>,
}

/// A validated catalog entry.
#[derive(Debug, Clone)]
pub struct Source {
    pub name: String,
    pub config: SourceConfig,
    pub transforms: Vec<Transform>,
}

impl Source {
    pub fn validate(name: &str, config: SourceConfig) -> Result<Self, ConfigError> {
        let invalid = |message: String| ConfigError::Invalid {
            entry: name.to_owned(),
            message,
        };

        let transforms = parse_transforms(&config.filenames.transform).map_err(&invalid)?;

        let required = |value: &str, field: &str| {
            if value.trim().is_empty() {
                Err(invalid(format!("`{}` is required", field)))
            } else {
                Ok(())
            }
        };

        if config.process.poly {
            required(&config.url, "url")?;
            required(&config.filenames.poly, "filenames.poly")?;
            required(&config.output.poly, "output.poly")?;
        }
        if config.process.render {
            required(&config.filenames.render, "filenames.render")?;
            required(&config.output.render, "output.render")?;
        }

        Ok(Self {
            name: name.to_owned(),
            config,
            transforms,
        })
    }

    /// Render template path, relative paths resolved against `base`.
    pub fn template_path(&self, base: &Path) -> PathBuf {
        let path = self
            .config
            .template
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_TEMPLATE));
        base.join(path)
    }
}

/// Parse and validate a catalog from text. Sources keep their file order.
pub fn parse_catalog(text: &str, path: &Path) -> Result<Vec<Source>, ConfigError> {
    let raw: IndexMap<String, SourceConfig> =
        zonekit::jsonc::from_str(text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

    raw.into_iter()
        .map(|(name, config)| Source::validate(&name, config))
        .collect()
}

pub fn load_catalog(path: &Path) -> Result<Vec<Source>, ConfigError> {
    let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    parse_catalog(&text, path)
}
