//! Scalar values: geometry handles and the dynamically typed values passed to kernels.

mod geometry;
mod value;

pub use geometry::{Geometry, GeometryType};
pub(crate) use geometry::is_empty_geometry;
pub use value::ScalarValue;
