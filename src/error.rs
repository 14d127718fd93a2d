//! Defines [`GeoFrameError`], representing all errors returned by this crate.

use std::borrow::Cow;
use std::fmt::Debug;

use arrow_schema::ArrowError;
use thiserror::Error;

/// Enum with all errors in this crate.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum GeoFrameError {
    /// An operand, column or value of the wrong type was passed to an operation.
    #[error("Incorrect type passed to operation: {0}")]
    IncorrectType(Cow<'static, str>),

    /// The operation is deliberately unsupported, such as assigning into an immutable array.
    #[error("Not implemented: {0}")]
    NotImplemented(Cow<'static, str>),

    /// A value of the right type that cannot be used, such as an ambiguous geometry column
    /// selection or operands that cannot be broadcast together.
    #[error("Invalid value: {0}")]
    InvalidValue(Cow<'static, str>),

    /// Position outside of an array.
    #[error("Index {index} is out of bounds for length {len}")]
    OutOfBounds { index: i64, len: usize },

    /// A named column, operation or kernel function does not exist.
    #[error("Missing attribute: {0}")]
    MissingAttribute(String),

    /// Malformed WKB input.
    #[error("WKB error at row {index}: {reason}")]
    Wkb { index: usize, reason: String },

    /// Malformed WKT input.
    #[error("WKT error at row {index}: {reason}")]
    Wkt { index: usize, reason: String },

    /// Geometries have no total order.
    #[error("Geometries are not orderable")]
    Unorderable,

    /// General error.
    #[error("General error: {0}")]
    General(String),

    /// [ArrowError]
    #[error(transparent)]
    Arrow(#[from] ArrowError),

    /// [serde_json::Error]
    #[error(transparent)]
    SerdeJson(#[from] serde_json::Error),

    /// [std::io::Error]
    #[error(transparent)]
    IOError(#[from] std::io::Error),
}

/// Coarse classification of [`GeoFrameError`], mirroring the families callers usually branch on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Type,
    Value,
    Lookup,
    Decode,
    Unorderable,
    Other,
}

impl GeoFrameError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            GeoFrameError::IncorrectType(_) | GeoFrameError::NotImplemented(_) => ErrorKind::Type,
            GeoFrameError::InvalidValue(_) | GeoFrameError::OutOfBounds { .. } => {
                ErrorKind::Value
            }
            GeoFrameError::MissingAttribute(_) => ErrorKind::Lookup,
            GeoFrameError::Wkb { .. } | GeoFrameError::Wkt { .. } => ErrorKind::Decode,
            GeoFrameError::Unorderable => ErrorKind::Unorderable,
            _ => ErrorKind::Other,
        }
    }

    /// Attach the row a decode error came from. Other errors pass through.
    pub(crate) fn at_row(self, row: usize) -> Self {
        match self {
            GeoFrameError::Wkb { reason, .. } => GeoFrameError::Wkb { index: row, reason },
            GeoFrameError::Wkt { reason, .. } => GeoFrameError::Wkt { index: row, reason },
            other => other,
        }
    }
}

/// Crate-specific result type.
pub type Result<T> = std::result::Result<T, GeoFrameError>;

impl From<GeoFrameError> for ArrowError {
    /// Arrow callbacks require [ArrowError], so this keeps the conversion terse at those call
    /// sites.
    fn from(err: GeoFrameError) -> Self {
        match err {
            GeoFrameError::Arrow(err) => err,
            _ => ArrowError::ExternalError(Box::new(err)),
        }
    }
}
