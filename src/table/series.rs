use arrow::compute::kernels::cmp::eq;
use arrow::compute::sort_to_indices;
use arrow_array::BooleanArray;

use crate::array::{Comparand, GeometryArray};
use crate::error::{GeoFrameError, Result};
use crate::table::{Column, GeosAccessor, RowIndex};

/// A named, labeled column.
#[derive(Debug, Clone)]
pub struct GeoSeries {
    name: String,
    index: RowIndex,
    values: Column,
}

impl GeoSeries {
    /// A series with the default `0..len` index.
    pub fn new(name: impl Into<String>, values: impl Into<Column>) -> Self {
        let values = values.into();
        Self {
            name: name.into(),
            index: RowIndex::range(values.len()),
            values,
        }
    }

    pub fn try_new(
        name: impl Into<String>,
        index: RowIndex,
        values: impl Into<Column>,
    ) -> Result<Self> {
        let values = values.into();
        if index.len() != values.len() {
            return Err(GeoFrameError::InvalidValue(
                format!(
                    "index of length {} does not match {} values",
                    index.len(),
                    values.len()
                )
                .into(),
            ));
        }
        Ok(Self {
            name: name.into(),
            index,
            values,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn rename(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.rename(name);
        self
    }

    pub fn index(&self) -> &RowIndex {
        &self.index
    }

    pub fn values(&self) -> &Column {
        &self.values
    }

    pub fn into_parts(self) -> (String, RowIndex, Column) {
        (self.name, self.index, self.values)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn is_geometry(&self) -> bool {
        self.values.is_geometry()
    }

    pub fn geometry_array(&self) -> Option<&GeometryArray> {
        self.values.as_geometry()
    }

    /// Geometry operations on this series.
    ///
    /// Fails with [`GeoFrameError::MissingAttribute`] if the series does not hold geometries.
    pub fn geos(&self) -> Result<GeosAccessor<'_>> {
        GeosAccessor::try_new(self)
    }

    /// Conform to `index`: rows are looked up by label, missing labels become null.
    pub fn reindex(&self, index: &RowIndex) -> Result<GeoSeries> {
        let positions = self.index.positions_of(index)?;
        Ok(Self {
            name: self.name.clone(),
            index: index.clone(),
            values: self.values.take(&positions)?,
        })
    }

    /// Reindex both series to the sorted union of their labels.
    pub fn align(&self, other: &GeoSeries) -> Result<(GeoSeries, GeoSeries)> {
        let index = self.index.union(&other.index)?;
        Ok((self.reindex(&index)?, other.reindex(&index)?))
    }

    /// Positions that would sort the values. Geometry series are not orderable.
    pub fn argsort(&self) -> Result<Vec<usize>> {
        match &self.values {
            Column::Geometry(array) => array.argsort(),
            Column::Arrow(array) => Ok(sort_to_indices(array.as_ref(), None, None)?
                .values()
                .iter()
                .map(|&i| i as usize)
                .collect()),
        }
    }

    /// Gather rows, labels included, by position.
    pub fn take(&self, positions: &[usize]) -> Result<GeoSeries> {
        let indices = positions
            .iter()
            .map(|&i| {
                i64::try_from(i).map_err(|_| GeoFrameError::OutOfBounds {
                    index: i64::MAX,
                    len: self.len(),
                })
            })
            .collect::<Result<Vec<_>>>()?;
        let values = self.values.take(&indices)?;
        Ok(Self {
            name: self.name.clone(),
            index: self.index.take(positions),
            values,
        })
    }

    /// Element-wise equality of two identically labeled series.
    pub fn equals(&self, other: &GeoSeries) -> Result<BooleanArray> {
        if self.index != other.index {
            return Err(GeoFrameError::InvalidValue(
                "can only compare identically-labeled series".into(),
            ));
        }
        match (&self.values, &other.values) {
            (Column::Geometry(left), Column::Geometry(right)) => left
                .equals(Comparand::Array(right))?
                .ok_or_else(|| GeoFrameError::General("geometry comparison was deferred".into())),
            (Column::Arrow(left), Column::Arrow(right)) => Ok(eq(left, right)?),
            (left, right) => Err(GeoFrameError::IncorrectType(
                format!(
                    "cannot compare '{}' with '{}'",
                    left.dtype_name(),
                    right.dtype_name()
                )
                .into(),
            )),
        }
    }
}

#[cfg(test)]
mod test {
    use std::sync::Arc;

    use arrow_array::Int64Array;

    use super::*;
    use crate::error::ErrorKind;
    use crate::table::Label;
    use crate::test::point::point_array;

    fn labeled(labels: &[i64]) -> RowIndex {
        labels.iter().copied().map(Label::Int).collect()
    }

    #[test]
    fn align_outer_join() {
        let left = GeoSeries::try_new("a", labeled(&[0, 1, 2]), point_array()).unwrap();
        let right = GeoSeries::try_new("b", labeled(&[2, 3]), point_array().slice(0, 2).unwrap())
            .unwrap();
        let (l, r) = left.align(&right).unwrap();
        assert_eq!(l.index(), &labeled(&[0, 1, 2, 3]));
        assert_eq!(l.len(), 4);
        let r = r.geometry_array().unwrap();
        assert!(r.is_null(0) && r.is_null(1));
        assert!(!r.is_null(2) && !r.is_null(3));
    }

    #[test]
    fn index_length_mismatch() {
        let err = GeoSeries::try_new("a", labeled(&[0]), point_array()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Value);
    }

    #[test]
    fn argsort() {
        let geoms = GeoSeries::new("g", point_array());
        assert_eq!(geoms.argsort().unwrap_err().kind(), ErrorKind::Unorderable);

        let numbers = GeoSeries::new("n", Column::Arrow(Arc::new(Int64Array::from(vec![3, 1, 2]))));
        let order = numbers.argsort().unwrap();
        assert_eq!(order, vec![1, 2, 0]);
        let sorted = numbers.take(&order).unwrap();
        assert_eq!(sorted.index(), &labeled(&[1, 2, 0]));
    }

    #[test]
    fn equality() {
        let a = GeoSeries::new("a", point_array());
        let b = GeoSeries::new("b", point_array());
        let eq = a.equals(&b).unwrap();
        assert_eq!(eq.iter().collect::<Vec<_>>(), vec![Some(true); 3]);

        let shifted = GeoSeries::try_new("c", labeled(&[1, 2, 3]), point_array()).unwrap();
        assert!(a.equals(&shifted).is_err());

        let deferred = point_array().equals(Comparand::Series(&a)).unwrap();
        assert!(deferred.is_none());
    }
}
