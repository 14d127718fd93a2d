//! Read and write geometries as [Well-Known Text](https://libgeos.org/specifications/wkt/).

mod reader;
mod writer;

pub use reader::read_wkt;
pub use writer::{to_wkt, write_geometry, WktOptions};
