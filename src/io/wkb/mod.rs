//! Read and write geometries as [Well-Known Binary](https://libgeos.org/specifications/wkb/).

mod common;
mod reader;
mod writer;

pub use common::{Endianness, WkbOptions};
pub use reader::read_wkb;
pub use writer::{to_wkb, write_wkb};
