//! GeoJSON preview of the emitted rectangles.

use serde::{Deserialize, Serialize};

use crate::jobs::RenderParams;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureCollection {
    #[serde(rename = "type")]
    pub kind: String,
    pub crs: Crs,
    pub features: Vec<Feature>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Crs {
    #[serde(rename = "type")]
    pub kind: String,
    pub properties: CrsProperties,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrsProperties {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    #[serde(rename = "type")]
    pub kind: String,
    pub properties: FeatureProperties,
    pub geometry: LineString,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureProperties {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineString {
    #[serde(rename = "type")]
    pub kind: String,
    pub coordinates: Vec<[f64; 2]>,
}

impl FeatureCollection {
    /// An empty collection in EPSG:4326.
    pub fn wgs84() -> Self {
        Self {
            kind: "FeatureCollection".into(),
            crs: Crs {
                kind: "name".into(),
                properties: CrsProperties {
                    name: "EPSG:4326".into(),
                },
            },
            features: Vec::new(),
        }
    }
}

/// Collects one LineString feature per [`RenderParams`] for a single part.
#[derive(Debug, Clone)]
pub struct GeoJsonEmitter {
    collection: FeatureCollection,
}

impl Default for GeoJsonEmitter {
    fn default() -> Self {
        Self::new()
    }
}

impl GeoJsonEmitter {
    pub fn new() -> Self {
        Self {
            collection: FeatureCollection::wgs84(),
        }
    }

    pub fn emit(&mut self, params: &RenderParams) {
        self.collection.features.push(Feature {
            kind: "Feature".into(),
            properties: FeatureProperties {
                name: params.name.clone(),
            },
            geometry: LineString {
                kind: "LineString".into(),
                coordinates: params.json.clone(),
            },
        });
    }

    /// Move every feature of `other` after this emitter's own.
    pub fn append(&mut self, other: GeoJsonEmitter) {
        self.collection
            .features
            .extend(other.collection.features);
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.collection.features.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.collection.features.is_empty()
    }

    pub fn finish(self) -> FeatureCollection {
        self.collection
    }

    /// Compact JSON of the whole collection, ready to be written as a file.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(&self.collection)
    }
}
