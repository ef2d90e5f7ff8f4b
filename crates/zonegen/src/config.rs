//! Zone catalog (`zones.json`) and per-zone (`zone.json`) configuration.

use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::{de::DeserializeOwned, Deserialize};
use thiserror::Error;
use zonekit::{ZoomBand, DEFAULT_BANDS};

pub const INDEX_FILE: &str = "zones.json";
pub const ZONE_FILE: &str = "zone.json";

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

    #[error("{}: {message}", path.display())]
    Invalid { path: PathBuf, message: String },
}

/// Paths the zone pipeline reads from and writes to.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Directory holding `zones.json` and one sub-directory per zone.
    pub zones_dir: PathBuf,
    /// Job script template with `{ZONEID}`, `{PARTID}`, `{PARTNAME}`, `{CONTENT}`.
    pub template: PathBuf,
    /// Root of the generated `<zone>/<part>.py|.json` tree.
    pub output_dir: PathBuf,
}

impl Settings {
    #[inline]
    pub fn index_path(&self) -> PathBuf {
        self.zones_dir.join(INDEX_FILE)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ZonesIndex {
    pub zones: Vec<ZoneRef>,
}

/// One entry of `zones.json`, pointing at a zone directory.
#[derive(Debug, Clone, Deserialize)]
pub struct ZoneRef {
    pub path: String,
}

/// Attribute names holding the record id and display name.
#[derive(Debug, Clone, Deserialize)]
pub struct Mapping {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ZoneConfig {
    #[serde(default)]
    pub disabled: bool,
    pub name: String,
    /// Shapefile path, relative to the zone directory.
    pub source: String,
    /// Cumulative bounding boxes instead of per-point segments.
    #[serde(default, rename = "box")]
    pub box_mode: bool,
    #[serde(default)]
    pub mapping: Option<Mapping>,
    #[serde(default)]
    pub bands: Option<Vec<ZoomBand>>,
}

impl ZoneConfig {
    fn validate(&self, path: &Path) -> Result<(), ConfigError> {
        let invalid = |message: &str| ConfigError::Invalid {
            path: path.to_path_buf(),
            message: message.to_owned(),
        };

        if self.name.trim().is_empty() {
            return Err(invalid("`name` must not be empty"));
        }
        if self.source.trim().is_empty() {
            return Err(invalid("`source` must not be empty"));
        }
        if let Some(m) = &self.mapping {
            if m.id.trim().is_empty() || m.name.trim().is_empty() {
                return Err(invalid("`mapping.id` and `mapping.name` must not be empty"));
            }
        }
        if let Some(bands) = &self.bands {
            if bands.is_empty() {
                return Err(invalid("`bands` must list at least one zoom band"));
            }
            if let Some(bad) = bands.iter().find(|b| !b.is_valid()) {
                return Err(ConfigError::Invalid {
                    path: path.to_path_buf(),
                    message: format!("invalid zoom band {}-{}", bad.min, bad.max),
                });
            }
        }

        Ok(())
    }

    /// Configured zoom bands, or the default four.
    pub fn zoom_bands(&self) -> &[ZoomBand] {
        self.bands.as_deref().unwrap_or(&DEFAULT_BANDS)
    }

    /// Output directory name: the lowercased zone name.
    pub fn output_name(&self) -> String {
        self.name.to_lowercase()
    }
}

/// A validated zone together with the directory it was loaded from.
#[derive(Debug, Clone)]
pub struct LoadedZone {
    pub dir: PathBuf,
    pub config: ZoneConfig,
}

impl LoadedZone {
    pub fn source_path(&self) -> PathBuf {
        self.dir.join(&self.config.source)
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    zonekit::jsonc::from_str(&text).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

pub fn load_index(settings: &Settings) -> Result<ZonesIndex, ConfigError> {
    read_json(&settings.index_path())
}

pub fn load_zone(settings: &Settings, zone: &ZoneRef) -> Result<LoadedZone, ConfigError> {
    let dir = settings.zones_dir.join(&zone.path);
    let path = dir.join(ZONE_FILE);

    let config: ZoneConfig = read_json(&path)?;
    config.validate(&path)?;

    Ok(LoadedZone { dir, config })
}
