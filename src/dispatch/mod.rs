//! Routing of named operations to kernel functions.
//!
//! Every operation is described once in [`OPERATIONS`]: which kernel function it calls and how
//! the result is wrapped. [`apply_unary`] and [`apply_binary`] take care of the wrapping, so
//! accessors only pick the operation by name.

mod binary;
pub mod descriptors;
mod manner;
mod registry;
mod unary;

pub use binary::{apply_binary, BinaryOutput, DispatchWarning, Other, Outcome};
pub use descriptors::{Expansion, OperationDescriptor, ResultShape, BOUNDS_LABELS, OPERATIONS};
pub use manner::Manner;
pub use registry::{Operation, Registry};
pub use unary::{apply_unary, OpOutput};

use crate::array::GeometryArray;
use crate::error::{GeoFrameError, Result};
use crate::kernel::Values;
use crate::table::{Column, GeoSeries};

/// The geometries of `series`, failing if it holds anything else.
pub(crate) fn geometry_operand(series: &GeoSeries) -> Result<&GeometryArray> {
    series.geometry_array().ok_or_else(|| {
        GeoFrameError::IncorrectType(
            format!(
                "series '{}' holds '{}', not geometries",
                series.name(),
                series.values().dtype_name()
            )
            .into(),
        )
    })
}

/// Turn 1-d kernel values into a column.
pub(crate) fn wrap_column(descriptor: &OperationDescriptor, values: Values) -> Result<Column> {
    if values.ndim() != 1 {
        return Err(GeoFrameError::General(format!(
            "kernel '{}' returned shape {:?} where one value per row was expected",
            descriptor.kernel,
            values.shape()
        )));
    }
    match values {
        Values::Geometry(geoms) if descriptor.geometry_output => {
            Ok(Column::Geometry(GeometryArray::new(geoms.into_data())))
        }
        values if descriptor.geometry_output => Err(GeoFrameError::General(format!(
            "kernel '{}' returned {:?}-shaped non-geometry values",
            descriptor.kernel,
            values.shape()
        ))),
        values => Ok(Column::Arrow(values.to_arrow()?)),
    }
}
