//! Encodings of geometries: WKB, WKT and interchange geometry objects.

pub mod interchange;
pub mod wkb;
pub mod wkt;
