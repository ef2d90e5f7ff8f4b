// src/lib.rs
//! Zone tile-job generator.
//!
//! Reads a catalog of zones, walks the shape records of each zone's shapefile
//! and writes one render-job script plus one GeoJSON preview per record.

pub mod config;
pub mod fields;
pub mod pipeline;
pub mod source;
