//! The columnar geometry array.

pub use geometry::{Comparand, DecodeOptions, GeometryArray, OnInvalid};
pub use input::GeometryInput;
pub use metadata::ArrayMetadata;

mod geometry;
mod input;
pub mod metadata;
