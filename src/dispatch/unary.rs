use indexmap::IndexMap;

use crate::dispatch::descriptors::ResultShape;
use crate::dispatch::registry::Operation;
use crate::dispatch::{geometry_operand, wrap_column};
use crate::error::{GeoFrameError, Result};
use crate::kernel::{KernelArgs, KernelFunction, KernelOutput, NdArray, Values};
use crate::table::{GeoFrame, GeoSeries, Label, RowIndex};

/// Result of a single-operand operation.
#[derive(Debug, Clone)]
pub enum OpOutput {
    Series(GeoSeries),
    Frame(GeoFrame),
    /// The kernel result as is.
    Raw(KernelOutput),
}

impl OpOutput {
    pub fn into_series(self) -> Result<GeoSeries> {
        match self {
            OpOutput::Series(series) => Ok(series),
            other => Err(unexpected("a series", &other)),
        }
    }

    pub fn into_frame(self) -> Result<GeoFrame> {
        match self {
            OpOutput::Frame(frame) => Ok(frame),
            other => Err(unexpected("a table", &other)),
        }
    }

    pub fn into_raw(self) -> Result<KernelOutput> {
        match self {
            OpOutput::Raw(output) => Ok(output),
            other => Err(unexpected("a raw kernel result", &other)),
        }
    }
}

fn unexpected(expected: &str, got: &OpOutput) -> GeoFrameError {
    let got = match got {
        OpOutput::Series(_) => "a series",
        OpOutput::Frame(_) => "a table",
        OpOutput::Raw(_) => "a raw kernel result",
    };
    GeoFrameError::IncorrectType(
        format!("expected {expected}, the operation returned {got}").into(),
    )
}

fn expect_values(op: &Operation, output: KernelOutput) -> Result<Values> {
    output.into_values().ok_or_else(|| {
        GeoFrameError::General(format!("kernel '{}' did not return values", op.descriptor().kernel))
    })
}

/// Apply a single-operand operation to a geometry series and wrap the result according to the
/// operation's [`ResultShape`].
pub fn apply_unary(op: &Operation, series: &GeoSeries, args: &KernelArgs) -> Result<OpOutput> {
    let KernelFunction::Unary(function) = op.function() else {
        return Err(GeoFrameError::IncorrectType(
            format!("'{}' takes two geometry operands", op.name()).into(),
        ));
    };
    let array = geometry_operand(series)?;
    let output = function(array.data(), args)?;
    let descriptor = op.descriptor();

    match descriptor.shape {
        ResultShape::PassThrough => Ok(OpOutput::Raw(output)),
        ResultShape::PerRow => {
            let column = wrap_column(descriptor, expect_values(op, output)?)?;
            Ok(OpOutput::Series(GeoSeries::try_new(
                op.name(),
                series.index().clone(),
                column,
            )?))
        }
        ResultShape::RowVector(labels) => {
            let values = expect_values(op, output)?;
            if values.shape() != [series.len(), labels.len()] {
                return Err(GeoFrameError::General(format!(
                    "kernel '{}' returned shape {:?}, expected {:?}",
                    descriptor.kernel,
                    values.shape(),
                    [series.len(), labels.len()]
                )));
            }
            let columns = labels
                .iter()
                .zip(values.columns()?)
                .map(|(label, values)| Ok((label.to_string(), wrap_column(descriptor, values)?)))
                .collect::<Result<IndexMap<_, _>>>()?;
            Ok(OpOutput::Frame(GeoFrame::try_new_with_index(
                series.index().clone(),
                columns,
            )?))
        }
        ResultShape::Reduce(labels) => {
            let values = match output {
                KernelOutput::Values(values) if values.ndim() == 0 => values.reshape(vec![1])?,
                KernelOutput::Values(values) => values,
                KernelOutput::Geometry(geom) => Values::Geometry(NdArray::from_vec(vec![geom])),
                KernelOutput::SpatialIndex(_) => {
                    return Err(GeoFrameError::General(format!(
                        "kernel '{}' returned a spatial index",
                        descriptor.kernel
                    )))
                }
            };
            let index = if labels.is_empty() {
                RowIndex::range(values.len())
            } else {
                labels.iter().map(|&label| Label::from(label)).collect()
            };
            let column = wrap_column(descriptor, values)?;
            Ok(OpOutput::Series(GeoSeries::try_new(op.name(), index, column)?))
        }
        ResultShape::Binary => Err(GeoFrameError::IncorrectType(
            format!("'{}' takes two geometry operands", op.name()).into(),
        )),
    }
}
