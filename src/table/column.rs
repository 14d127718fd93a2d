use arrow::compute::take;
use arrow_array::{Array, ArrayRef, UInt64Array};
use arrow_schema::Field;

use crate::array::GeometryArray;
use crate::datatypes::GeometryDtype;
use crate::error::{GeoFrameError, Result};

/// A table column: either geometries or any plain Arrow array.
#[derive(Debug, Clone)]
pub enum Column {
    Geometry(GeometryArray),
    Arrow(ArrayRef),
}

impl Column {
    pub fn len(&self) -> usize {
        match self {
            Column::Geometry(array) => array.len(),
            Column::Arrow(array) => array.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_geometry(&self) -> bool {
        matches!(self, Column::Geometry(_))
    }

    pub fn as_geometry(&self) -> Option<&GeometryArray> {
        match self {
            Column::Geometry(array) => Some(array),
            Column::Arrow(_) => None,
        }
    }

    /// Name of the column type, `"geos"` for geometry columns.
    pub fn dtype_name(&self) -> String {
        match self {
            Column::Geometry(_) => GeometryDtype::NAME.to_string(),
            Column::Arrow(array) => array.data_type().to_string(),
        }
    }

    /// Gather rows by position, `-1` producing a null row.
    pub fn take(&self, indices: &[i64]) -> Result<Column> {
        match self {
            Column::Geometry(array) => Ok(Column::Geometry(array.take(indices, true, None)?)),
            Column::Arrow(array) => {
                let indices = indices
                    .iter()
                    .map(|&i| match i {
                        -1 => Ok(None),
                        i if i >= 0 && (i as usize) < array.len() => Ok(Some(i as u64)),
                        i => Err(GeoFrameError::OutOfBounds {
                            index: i,
                            len: array.len(),
                        }),
                    })
                    .collect::<Result<UInt64Array>>()?;
                Ok(Column::Arrow(take(array.as_ref(), &indices, None)?))
            }
        }
    }

    /// The column as Arrow data and the field describing it.
    pub fn to_arrow(&self, name: &str) -> Result<(Field, ArrayRef)> {
        match self {
            Column::Geometry(array) => Ok((array.extension_field(name)?, array.to_arrow()?)),
            Column::Arrow(array) => Ok((
                Field::new(name, array.data_type().clone(), true),
                array.clone(),
            )),
        }
    }

    /// Rebuild a column from Arrow data, decoding fields tagged as geometry.
    pub fn from_arrow(field: &Field, array: &ArrayRef) -> Result<Column> {
        if GeometryDtype::matches_field(field) {
            Ok(Column::Geometry(GeometryArray::try_from((
                array.as_ref(),
                field,
            ))?))
        } else {
            Ok(Column::Arrow(array.clone()))
        }
    }
}

impl From<GeometryArray> for Column {
    fn from(value: GeometryArray) -> Self {
        Column::Geometry(value)
    }
}

impl From<ArrayRef> for Column {
    fn from(value: ArrayRef) -> Self {
        Column::Arrow(value)
    }
}

#[cfg(test)]
mod test {
    use std::sync::Arc;

    use arrow_array::cast::AsArray;
    use arrow_array::types::Int64Type;
    use arrow_array::Int64Array;

    use super::*;
    use crate::test::point::point_array;

    #[test]
    fn take_with_fill() {
        let column = Column::Arrow(Arc::new(Int64Array::from(vec![10, 20, 30])));
        let taken = column.take(&[2, -1, 0]).unwrap();
        let Column::Arrow(array) = taken else {
            panic!("expected an arrow column");
        };
        let values = array.as_primitive::<Int64Type>();
        assert_eq!(values.iter().collect::<Vec<_>>(), vec![Some(30), None, Some(10)]);

        assert!(column.take(&[3]).is_err());

        let geoms = Column::Geometry(point_array());
        let taken = geoms.take(&[-1, 1]).unwrap();
        assert!(taken.as_geometry().unwrap().is_null(0));
    }

    #[test]
    fn arrow_round_trip() {
        let column = Column::Geometry(point_array());
        let (field, array) = column.to_arrow("geometry").unwrap();
        let back = Column::from_arrow(&field, &array).unwrap();
        assert_eq!(back.as_geometry(), Some(&point_array()));
        assert_eq!(back.dtype_name(), "geos");
    }
}
