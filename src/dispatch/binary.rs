use std::fmt;

use crate::dispatch::registry::Operation;
use crate::dispatch::{geometry_operand, wrap_column, Manner};
use crate::error::{GeoFrameError, Result};
use crate::kernel::{KernelArgs, KernelFunction, NdArray, Values};
use crate::scalar::Geometry;
use crate::table::GeoSeries;

/// The right-hand operand of a binary operation.
#[derive(Debug, Clone, Copy)]
pub enum Other<'a> {
    /// No operand: every row is paired with every row of the same series.
    SelfExpand,
    /// A labeled geometry series.
    Series(&'a GeoSeries),
    /// Unlabeled geometries of any dimensionality.
    Buffer(&'a NdArray<Option<Geometry>>),
    /// A single geometry, paired with every row.
    Scalar(&'a Geometry),
}

/// A request that could not be honored. The operation still ran, in a degraded form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchWarning {
    /// There was no right-hand operand, so the operation expanded regardless of the request.
    ExpandForced { requested: Manner },
    /// The two series had different row labels and were aligned on their union.
    IndexAligned,
    /// Unlabeled data has nothing to align on; kept as is.
    CannotAlignBuffer,
    /// Only 1-d buffers can be expanded; kept as is.
    CannotExpandMultiDimensional,
    /// A single geometry can only be kept.
    ScalarKeepOnly { requested: Manner },
}

impl fmt::Display for DispatchWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DispatchWarning::ExpandForced { requested } => write!(
                f,
                "no other operand given, expanding instead of '{requested}'"
            ),
            DispatchWarning::IndexAligned => {
                f.write_str("the indexes of the two series differ, aligning them")
            }
            DispatchWarning::CannotAlignBuffer => f.write_str("cannot align an unlabeled buffer"),
            DispatchWarning::CannotExpandMultiDimensional => {
                f.write_str("cannot expand a multi-dimensional buffer")
            }
            DispatchWarning::ScalarKeepOnly { requested } => write!(
                f,
                "cannot '{requested}' a single geometry, keeping it"
            ),
        }
    }
}

/// A result together with the warnings raised while producing it.
#[derive(Debug, Clone)]
pub struct Outcome<T> {
    pub value: T,
    pub warnings: Vec<DispatchWarning>,
}

impl<T> Outcome<T> {
    pub fn into_value(self) -> T {
        self.value
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// Result of a binary operation.
#[derive(Debug, Clone)]
pub enum BinaryOutput {
    /// One value per row of the (possibly aligned) left operand.
    Series(GeoSeries),
    /// Anything else, such as the matrix of an expanded operation.
    Raw(Values),
}

impl BinaryOutput {
    pub fn into_series(self) -> Result<GeoSeries> {
        match self {
            BinaryOutput::Series(series) => Ok(series),
            BinaryOutput::Raw(values) => Err(GeoFrameError::IncorrectType(
                format!("expected a series, got values of shape {:?}", values.shape()).into(),
            )),
        }
    }

    pub fn into_values(self) -> Result<Values> {
        match self {
            BinaryOutput::Raw(values) => Ok(values),
            BinaryOutput::Series(series) => Err(GeoFrameError::IncorrectType(
                format!("expected raw values, got series '{}'", series.name()).into(),
            )),
        }
    }
}

fn flat(data: &[Option<Geometry>]) -> NdArray<Option<Geometry>> {
    NdArray::from_vec(data.to_vec())
}

/// `(n, 1)`
fn column(data: &[Option<Geometry>]) -> Result<NdArray<Option<Geometry>>> {
    NdArray::try_new(vec![data.len(), 1], data.to_vec())
}

/// `(1, n)`
fn row(data: &[Option<Geometry>]) -> Result<NdArray<Option<Geometry>>> {
    NdArray::try_new(vec![1, data.len()], data.to_vec())
}

/// Apply a two-operand operation to `series` and `other`.
///
/// `manner` picks how the operands are lined up; when it is `None` the default depends on
/// `other`:
///
/// | other | allowed | default |
/// | --- | --- | --- |
/// | [`Other::Series`] | keep, align, expand | align |
/// | 1-d [`Other::Buffer`] | keep, expand | keep |
/// | n-d [`Other::Buffer`] | keep | keep |
/// | [`Other::Scalar`] | keep | keep |
/// | [`Other::SelfExpand`] | expand | expand |
///
/// A manner that is not allowed is ignored with a [`DispatchWarning`]. A 1-d result as long as
/// the left operand is returned as a series labeled like it; anything else is returned raw.
pub fn apply_binary(
    op: &Operation,
    series: &GeoSeries,
    other: Other<'_>,
    manner: Option<Manner>,
    args: &KernelArgs,
) -> Result<Outcome<BinaryOutput>> {
    let KernelFunction::Binary(function) = op.function() else {
        return Err(GeoFrameError::IncorrectType(
            format!("'{}' takes a single geometry operand", op.name()).into(),
        ));
    };
    let data = geometry_operand(series)?.data();
    let mut index = series.index().clone();
    let mut warnings = Vec::new();

    let (left, right) = match other {
        Other::SelfExpand => {
            if let Some(requested) = manner.filter(|m| *m != Manner::Expand) {
                warnings.push(DispatchWarning::ExpandForced { requested });
            }
            (column(data)?, row(data)?)
        }
        Other::Series(other) => {
            let other_data = other
                .geometry_array()
                .ok_or_else(|| {
                    GeoFrameError::InvalidValue(
                        format!(
                            "other should be a geometry series, a geometry buffer or a single \
                             geometry, got a '{}' series",
                            other.values().dtype_name()
                        )
                        .into(),
                    )
                })?
                .data();
            match manner {
                Some(Manner::Expand) => (column(data)?, row(other_data)?),
                Some(Manner::Keep) => (flat(data), flat(other_data)),
                None | Some(Manner::Align) if series.index() != other.index() => {
                    warnings.push(DispatchWarning::IndexAligned);
                    let (this, that) = series.align(other)?;
                    index = this.index().clone();
                    (
                        flat(geometry_operand(&this)?.data()),
                        flat(geometry_operand(&that)?.data()),
                    )
                }
                None | Some(Manner::Align) => (flat(data), flat(other_data)),
            }
        }
        Other::Buffer(buffer) if buffer.ndim() == 1 => match manner {
            Some(Manner::Expand) => (column(data)?, row(buffer.data())?),
            Some(Manner::Align) => {
                warnings.push(DispatchWarning::CannotAlignBuffer);
                (flat(data), buffer.clone())
            }
            _ => (flat(data), buffer.clone()),
        },
        Other::Buffer(buffer) => {
            match manner {
                Some(Manner::Expand) => {
                    warnings.push(DispatchWarning::CannotExpandMultiDimensional)
                }
                Some(Manner::Align) => warnings.push(DispatchWarning::CannotAlignBuffer),
                _ => {}
            }
            (flat(data), buffer.clone())
        }
        Other::Scalar(geom) => {
            if let Some(requested) = manner.filter(|m| *m != Manner::Keep) {
                warnings.push(DispatchWarning::ScalarKeepOnly { requested });
            }
            (flat(data), NdArray::scalar(Some(geom.clone())))
        }
    };

    for warning in &warnings {
        tracing::warn!(operation = op.name(), "{warning}");
    }

    let mut values = function(&left, &right, args)?;
    if values.ndim() == 0 {
        values = values.reshape(vec![1])?;
    }
    let value = if values.ndim() == 1 && values.len() == index.len() {
        let column = wrap_column(op.descriptor(), values)?;
        BinaryOutput::Series(GeoSeries::try_new(op.name(), index, column)?)
    } else {
        BinaryOutput::Raw(values)
    };
    Ok(Outcome { value, warnings })
}
