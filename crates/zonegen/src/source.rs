//! Shape records as the pipeline sees them.

use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use shapefile::dbase::{FieldValue, Record};
use shapefile::Shape;

/// One shapefile feature: trimmed attribute strings plus its parts.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShapeRecord {
    pub attributes: BTreeMap<String, String>,
    /// Raw `(x, y)` points per part; `None` when the shape carries no parts.
    pub parts: Option<Vec<Vec<(f64, f64)>>>,
}

impl ShapeRecord {
    /// Attribute value, or an empty string when the field is absent.
    pub fn attribute(&self, name: &str) -> &str {
        self.attributes.get(name).map(String::as_str).unwrap_or("")
    }
}

/// Sequential reader of shape records.
pub trait RecordSource {
    /// Next record, or `None` once the source is exhausted.
    fn next_record(&mut self) -> Result<Option<ShapeRecord>>;
}

/// Records served from memory, in order.
#[derive(Debug, Default)]
pub struct MemorySource {
    records: std::collections::VecDeque<ShapeRecord>,
}

impl MemorySource {
    pub fn new(records: Vec<ShapeRecord>) -> Self {
        Self {
            records: records.into(),
        }
    }
}

impl RecordSource for MemorySource {
    fn next_record(&mut self) -> Result<Option<ShapeRecord>> {
        Ok(self.records.pop_front())
    }
}

/// `.shp` + `.dbf` pair read through the `shapefile` crate.
pub struct ShapefileSource {
    path: PathBuf,
    records: std::vec::IntoIter<(Shape, Record)>,
}

impl ShapefileSource {
    pub fn open(path: &Path) -> Result<Self> {
        let mut reader = shapefile::Reader::from_path(path)
            .with_context(|| format!("opening shapefile {}", path.display()))?;

        let records = reader
            .iter_shapes_and_records()
            .collect::<Result<Vec<_>, _>>()
            .with_context(|| format!("reading records from {}", path.display()))?;

        log::debug!("{}: {} records", path.display(), records.len());

        Ok(Self {
            path: path.to_path_buf(),
            records: records.into_iter(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RecordSource for ShapefileSource {
    fn next_record(&mut self) -> Result<Option<ShapeRecord>> {
        Ok(self.records.next().map(|(shape, record)| ShapeRecord {
            attributes: record
                .into_iter()
                .map(|(name, value)| (name, field_to_string(&value)))
                .collect(),
            parts: shape_parts(&shape),
        }))
    }
}

fn field_to_string(value: &FieldValue) -> String {
    match value {
        FieldValue::Character(Some(s)) => s.trim().to_owned(),
        FieldValue::Memo(s) => s.trim().to_owned(),
        FieldValue::Numeric(Some(n)) => n.to_string(),
        FieldValue::Float(Some(f)) => f.to_string(),
        FieldValue::Double(d) => d.to_string(),
        FieldValue::Integer(i) => i.to_string(),
        FieldValue::Logical(Some(b)) => b.to_string(),
        _ => String::new(),
    }
}

/// Flatten polygon rings / polyline parts into `(x, y)` lists.
fn shape_parts(shape: &Shape) -> Option<Vec<Vec<(f64, f64)>>> {
    macro_rules! rings {
        ($poly:expr) => {
            $poly
                .rings()
                .iter()
                .map(|ring| ring.points().iter().map(|p| (p.x, p.y)).collect())
                .collect()
        };
    }

    macro_rules! lines {
        ($line:expr) => {
            $line
                .parts()
                .iter()
                .map(|part| part.iter().map(|p| (p.x, p.y)).collect())
                .collect()
        };
    }

    match shape {
        Shape::Polygon(p) => Some(rings!(p)),
        Shape::PolygonM(p) => Some(rings!(p)),
        Shape::PolygonZ(p) => Some(rings!(p)),
        Shape::Polyline(l) => Some(lines!(l)),
        Shape::PolylineM(l) => Some(lines!(l)),
        Shape::PolylineZ(l) => Some(lines!(l)),
        _ => None,
    }
}
