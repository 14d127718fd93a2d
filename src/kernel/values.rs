use std::sync::Arc;

use arrow_array::{ArrayRef, BooleanArray, Float64Array, Int64Array, StringArray};

use crate::array::GeometryArray;
use crate::error::Result;
use crate::io::wkb::WkbOptions;
use crate::kernel::NdArray;
use crate::scalar::Geometry;

/// The typed n-dimensional result of a kernel function.
#[derive(Debug, Clone)]
#[cfg_attr(test, derive(PartialEq))]
pub enum Values {
    Boolean(NdArray<Option<bool>>),
    Float64(NdArray<Option<f64>>),
    Int64(NdArray<Option<i64>>),
    Utf8(NdArray<Option<String>>),
    Geometry(NdArray<Option<Geometry>>),
}

macro_rules! dispatch {
    ($self:expr, $array:ident => $body:expr) => {
        match $self {
            Values::Boolean($array) => $body,
            Values::Float64($array) => $body,
            Values::Int64($array) => $body,
            Values::Utf8($array) => $body,
            Values::Geometry($array) => $body,
        }
    };
}

impl Values {
    pub fn shape(&self) -> &[usize] {
        dispatch!(self, array => array.shape())
    }

    pub fn ndim(&self) -> usize {
        self.shape().len()
    }

    /// Total number of elements.
    pub fn len(&self) -> usize {
        dispatch!(self, array => array.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_geometry(&self) -> bool {
        matches!(self, Values::Geometry(_))
    }

    pub fn reshape(self, shape: Vec<usize>) -> Result<Self> {
        Ok(match self {
            Values::Boolean(array) => Values::Boolean(array.reshape(shape)?),
            Values::Float64(array) => Values::Float64(array.reshape(shape)?),
            Values::Int64(array) => Values::Int64(array.reshape(shape)?),
            Values::Utf8(array) => Values::Utf8(array.reshape(shape)?),
            Values::Geometry(array) => Values::Geometry(array.reshape(shape)?),
        })
    }

    /// Split 2-d values into 1-d columns.
    pub fn columns(&self) -> Result<Vec<Values>> {
        Ok(match self {
            Values::Boolean(array) => array.columns()?.into_iter().map(Values::Boolean).collect(),
            Values::Float64(array) => array.columns()?.into_iter().map(Values::Float64).collect(),
            Values::Int64(array) => array.columns()?.into_iter().map(Values::Int64).collect(),
            Values::Utf8(array) => array.columns()?.into_iter().map(Values::Utf8).collect(),
            Values::Geometry(array) => array.columns()?.into_iter().map(Values::Geometry).collect(),
        })
    }

    pub fn as_boolean(&self) -> Option<&NdArray<Option<bool>>> {
        match self {
            Values::Boolean(array) => Some(array),
            _ => None,
        }
    }

    pub fn as_float64(&self) -> Option<&NdArray<Option<f64>>> {
        match self {
            Values::Float64(array) => Some(array),
            _ => None,
        }
    }

    pub fn as_int64(&self) -> Option<&NdArray<Option<i64>>> {
        match self {
            Values::Int64(array) => Some(array),
            _ => None,
        }
    }

    pub fn as_utf8(&self) -> Option<&NdArray<Option<String>>> {
        match self {
            Values::Utf8(array) => Some(array),
            _ => None,
        }
    }

    pub fn as_geometry(&self) -> Option<&NdArray<Option<Geometry>>> {
        match self {
            Values::Geometry(array) => Some(array),
            _ => None,
        }
    }

    /// Flatten into an Arrow array in row-major order. Geometries are encoded as WKB.
    pub fn to_arrow(&self) -> Result<ArrayRef> {
        Ok(match self {
            Values::Boolean(array) => Arc::new(BooleanArray::from(array.data().to_vec())),
            Values::Float64(array) => Arc::new(Float64Array::from(array.data().to_vec())),
            Values::Int64(array) => Arc::new(Int64Array::from(array.data().to_vec())),
            Values::Utf8(array) => Arc::new(StringArray::from(array.data().to_vec())),
            Values::Geometry(array) => Arc::new(
                GeometryArray::new(array.data().to_vec()).to_wkb(&WkbOptions::default())?,
            ),
        })
    }
}

#[cfg(test)]
mod test {
    use arrow_array::Array;

    use super::*;

    #[test]
    fn flatten_grid() {
        let values = Values::Float64(
            NdArray::try_new(vec![2, 2], vec![Some(1.), None, Some(3.), Some(4.)]).unwrap(),
        );
        assert_eq!(values.shape(), &[2, 2]);
        let arrow = values.to_arrow().unwrap();
        assert_eq!(arrow.len(), 4);
        assert_eq!(arrow.null_count(), 1);
    }

    #[test]
    fn reshape_scalar() {
        let values = Values::Boolean(NdArray::scalar(Some(true)));
        assert_eq!(values.ndim(), 0);
        let values = values.reshape(vec![1]).unwrap();
        assert_eq!(values.shape(), &[1]);
    }
}
