//! Conversion to and from tables of boxed geometry objects.
//!
//! A rich column holds one independently owned [`geo::Geometry`] per row plus an optional
//! coordinate reference system, instead of handles into a shared buffer. Converting a single
//! column can move the geometries ([`RichSeries::into_geo_series`], [`GeoSeries::into_rich`]) or
//! copy them; converting a whole table always copies.

use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::Value;

use crate::array::{ArrayMetadata, GeometryArray};
use crate::error::{GeoFrameError, Result};
use crate::io::interchange::{InterchangeGeometry, InterchangeOptions};
use crate::table::{Column, GeoFrame, GeoSeries, GeosAccessor, GeosFrameAccessor, RowIndex};

fn metadata(crs: Option<Value>) -> Arc<ArrayMetadata> {
    Arc::new(ArrayMetadata { crs })
}

/// A labeled column of boxed geometries.
#[derive(Debug, Clone, PartialEq)]
pub struct RichSeries {
    pub name: String,
    pub index: RowIndex,
    pub geometries: Vec<Option<InterchangeGeometry>>,
    pub crs: Option<Value>,
}

impl RichSeries {
    pub fn try_new(
        name: impl Into<String>,
        index: RowIndex,
        geometries: Vec<Option<InterchangeGeometry>>,
        crs: Option<Value>,
    ) -> Result<Self> {
        if index.len() != geometries.len() {
            return Err(GeoFrameError::InvalidValue(
                format!(
                    "index of length {} does not match {} geometries",
                    index.len(),
                    geometries.len()
                )
                .into(),
            ));
        }
        Ok(Self {
            name: name.into(),
            index,
            geometries,
            crs,
        })
    }

    pub fn len(&self) -> usize {
        self.geometries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.geometries.is_empty()
    }

    /// Move the geometries behind new handles.
    pub fn into_geo_series(self) -> Result<GeoSeries> {
        let array =
            GeometryArray::from_interchange(self.geometries).with_metadata(metadata(self.crs));
        GeoSeries::try_new(self.name, self.index, array)
    }

    /// Copy the geometries, leaving `self` untouched.
    pub fn to_geo_series(&self) -> Result<GeoSeries> {
        self.clone().into_geo_series()
    }
}

impl GeosAccessor<'_> {
    /// Copy into a rich column. `crs` overrides the reference system stored on the array.
    pub fn to_rich(&self, crs: Option<Value>) -> Result<RichSeries> {
        let array = self.array();
        let geometries = array.to_interchange(&InterchangeOptions::default())?;
        let crs = crs.or_else(|| array.metadata().crs.clone());
        RichSeries::try_new(
            self.series().name(),
            self.series().index().clone(),
            geometries,
            crs,
        )
    }
}

impl GeoSeries {
    /// Move into a rich column. Geometries whose handles are shared elsewhere are copied.
    pub fn into_rich(self, crs: Option<Value>) -> Result<RichSeries> {
        let (name, index, values) = self.into_parts();
        let array = match values {
            Column::Geometry(array) => array,
            values => {
                return Err(GeoFrameError::IncorrectType(
                    format!(
                        "series '{name}' holds '{}', not geometries",
                        values.dtype_name()
                    )
                    .into(),
                ))
            }
        };
        let crs = crs.or_else(|| array.metadata().crs.clone());
        let geometries = array
            .into_inner()
            .into_iter()
            .map(|geom| geom.map(|geom| geom.into_geo()))
            .collect();
        RichSeries::try_new(name, index, geometries, crs)
    }
}

/// A column of a [`RichFrame`].
#[derive(Debug, Clone)]
pub enum RichColumn {
    Geometry(Vec<Option<InterchangeGeometry>>),
    Column(Column),
}

impl RichColumn {
    pub fn len(&self) -> usize {
        match self {
            RichColumn::Geometry(geometries) => geometries.len(),
            RichColumn::Column(column) => column.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A table with one designated column of boxed geometries.
#[derive(Debug, Clone)]
pub struct RichFrame {
    pub index: RowIndex,
    pub columns: IndexMap<String, RichColumn>,
    /// Name of the designated geometry column.
    pub geometry: String,
    pub crs: Option<Value>,
}

impl RichFrame {
    /// Copy into a [`GeoFrame`]. Every boxed geometry column becomes a geometry column; the
    /// reference system is attached to all of them.
    pub fn to_geo_frame(&self) -> Result<GeoFrame> {
        if !matches!(self.columns.get(&self.geometry), Some(RichColumn::Geometry(_))) {
            return Err(GeoFrameError::MissingAttribute(format!(
                "no geometry column named '{}'",
                self.geometry
            )));
        }
        let columns = self
            .columns
            .iter()
            .map(|(name, column)| {
                let column = match column {
                    RichColumn::Geometry(geometries) => Column::Geometry(
                        GeometryArray::from_interchange(geometries.clone())
                            .with_metadata(metadata(self.crs.clone())),
                    ),
                    RichColumn::Column(column) => column.clone(),
                };
                (name.clone(), column)
            })
            .collect();
        GeoFrame::try_new_with_index(self.index.clone(), columns)
    }
}

impl GeosFrameAccessor<'_> {
    /// Copy into a [`RichFrame`] with `geometry` as its designated column.
    ///
    /// Without a name the table must have exactly one geometry column. Other geometry columns
    /// are converted to boxed geometries too.
    pub fn to_rich(&self, geometry: Option<&str>, crs: Option<Value>) -> Result<RichFrame> {
        let frame = self.frame();
        let geometry = match geometry {
            Some(name) => {
                if !frame.column(name)?.is_geometry() {
                    return Err(GeoFrameError::IncorrectType(
                        format!("column '{name}' does not hold geometries").into(),
                    ));
                }
                name
            }
            None => frame.active_geometry().ok_or_else(|| {
                GeoFrameError::InvalidValue(
                    format!(
                        "expected exactly one geometry column, found {:?}; name one explicitly",
                        frame.geometry_column_names()
                    )
                    .into(),
                )
            })?,
        };
        let crs = match crs {
            Some(crs) => Some(crs),
            None => frame
                .column(geometry)?
                .as_geometry()
                .and_then(|array| array.metadata().crs.clone()),
        };

        let options = InterchangeOptions::default();
        let columns = frame
            .columns()
            .iter()
            .map(|(name, column)| {
                let column = match column {
                    Column::Geometry(array) => {
                        RichColumn::Geometry(array.to_interchange(&options)?)
                    }
                    column => RichColumn::Column(column.clone()),
                };
                Ok((name.clone(), column))
            })
            .collect::<Result<IndexMap<_, _>>>()?;
        Ok(RichFrame {
            index: frame.index().clone(),
            columns,
            geometry: geometry.to_string(),
            crs,
        })
    }
}

#[cfg(test)]
mod test {
    use serde_json::json;

    use super::*;
    use crate::error::ErrorKind;
    use crate::scalar::Geometry;
    use crate::test::point::point_array;
    use crate::test::properties::{frame, frame_with_labels};

    #[test]
    fn series_round_trip() {
        let series = GeoSeries::new("points", point_array());
        let rich = series.geos().unwrap().to_rich(Some(json!("EPSG:4326"))).unwrap();
        assert_eq!(rich.len(), 3);
        assert!(rich.geometries[2].is_none());

        let back = rich.to_geo_series().unwrap();
        let array = back.geometry_array().unwrap();
        assert_eq!(array.data(), point_array().data());
        assert_eq!(array.metadata().crs, Some(json!("EPSG:4326")));

        let moved = back.into_rich(None).unwrap();
        assert_eq!(moved.crs, Some(json!("EPSG:4326")));
        assert_eq!(moved, rich);
    }

    #[test]
    fn empty_point_survives() {
        let array = GeometryArray::new(vec![Some(Geometry::empty_point())]);
        let rich = GeoSeries::new("p", array).geos().unwrap().to_rich(None).unwrap();
        let back = rich.into_geo_series().unwrap();
        assert!(back.geometry_array().unwrap().value(0).unwrap().is_empty_point());
    }

    #[test]
    fn single_candidate_rule() {
        let frame = frame();
        let geos = frame.geos().unwrap();
        assert_eq!(geos.to_rich(None, None).unwrap_err().kind(), ErrorKind::Value);
        assert_eq!(
            geos.to_rich(Some("value"), None).unwrap_err().kind(),
            ErrorKind::Type
        );
        assert_eq!(
            geos.to_rich(Some("missing"), None).unwrap_err().kind(),
            ErrorKind::Lookup
        );
        let rich = geos.to_rich(Some("geomB"), None).unwrap();
        assert_eq!(rich.geometry, "geomB");
    }

    #[test]
    fn frame_round_trip() {
        let frame = frame_with_labels();
        let rich = frame
            .geos()
            .unwrap()
            .to_rich(Some("geomA"), Some(json!("EPSG:3857")))
            .unwrap();
        assert!(matches!(rich.columns["value"], RichColumn::Column(_)));
        let back = rich.to_geo_frame().unwrap();
        assert_eq!(back.index(), frame.index());
        assert_eq!(back.geometry_column_names(), vec!["geomA", "geomB"]);
        let geom_a = back.column("geomA").unwrap().as_geometry().unwrap();
        assert_eq!(geom_a.data(), frame.column("geomA").unwrap().as_geometry().unwrap().data());
        assert_eq!(geom_a.metadata().crs, Some(json!("EPSG:3857")));
    }
}
