//! Attribute listing used to pick a zone's `mapping`.

use std::collections::BTreeMap;

use anyhow::Result;
use log::warn;

use crate::config::{self, Settings, ZoneRef};
use crate::pipeline::SourceOpener;
use crate::source::RecordSource;

/// Attributes of the first record, if the source has any.
pub fn first_record_fields(source: &mut dyn RecordSource) -> Result<Option<BTreeMap<String, String>>> {
    Ok(source.next_record()?.map(|r| r.attributes))
}

/// Render `zone` and its first-record attributes as an indented listing.
pub fn format_fields(zone: &str, fields: &BTreeMap<String, String>) -> String {
    let width = fields.keys().map(|k| k.len()).max().unwrap_or(0);

    let mut out = format!("[FIELDS] {}\n", zone);
    for (name, value) in fields {
        out.push_str(&format!("    {:<width$} = {:?}\n", name, value, width = width));
    }
    out
}

/// Print the first record of every enabled zone.
pub fn list_fields(settings: &Settings, zones: &[ZoneRef], open: &SourceOpener) -> Result<()> {
    for zone_ref in zones {
        let zone = match config::load_zone(settings, zone_ref) {
            Ok(zone) if !zone.config.disabled => zone,
            Ok(_) => continue,
            Err(err) => {
                warn!("[ZONE] {}: skipped: {}", zone_ref.path, err);
                continue;
            }
        };

        let mut source = open(&zone.source_path())?;
        match first_record_fields(source.as_mut())? {
            Some(fields) => print!("{}", format_fields(&zone.config.name, &fields)),
            None => warn!("[ZONE] {}: shapefile has no records", zone.config.name),
        }
    }

    Ok(())
}
