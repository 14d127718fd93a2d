use std::fmt;
use std::sync::Arc;

use geo::HasDimensions;
use num_enum::{IntoPrimitive, TryFromPrimitive};

use crate::io::wkt::{write_geometry, WktOptions};
use crate::kernel::eq::geometry_eq;

/// A handle to an immutable geometry owned by the kernel.
///
/// Cloning a handle is cheap and never copies the underlying geometry; arrays that are copied,
/// sliced or gathered share their geometries but own their handle buffers.
///
/// The empty point is stored as a point with NaN coordinates, the same convention WKB uses.
#[derive(Clone)]
pub struct Geometry(Arc<geo::Geometry<f64>>);

impl Geometry {
    pub fn new(geom: geo::Geometry<f64>) -> Self {
        Self(Arc::new(geom))
    }

    /// `POINT EMPTY`
    pub fn empty_point() -> Self {
        Self::new(geo::Geometry::Point(geo::Point::new(f64::NAN, f64::NAN)))
    }

    /// Borrow the kernel geometry behind this handle.
    pub fn as_geo(&self) -> &geo::Geometry<f64> {
        &self.0
    }

    /// Deep copy of the kernel geometry.
    pub fn to_geo(&self) -> geo::Geometry<f64> {
        self.0.as_ref().clone()
    }

    /// Take the kernel geometry out of the handle, copying only if it is shared.
    pub fn into_geo(self) -> geo::Geometry<f64> {
        Arc::try_unwrap(self.0).unwrap_or_else(|shared| shared.as_ref().clone())
    }

    /// Whether both handles refer to the very same kernel geometry.
    pub fn ptr_eq(&self, other: &Geometry) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    pub fn geometry_type(&self) -> GeometryType {
        GeometryType::of(&self.0)
    }

    pub fn is_empty(&self) -> bool {
        is_empty_geometry(&self.0)
    }

    pub fn is_empty_point(&self) -> bool {
        matches!(self.as_geo(), geo::Geometry::Point(p) if p.x().is_nan() && p.y().is_nan())
    }

    /// Structural equality where every coordinate may differ by at most `tolerance`.
    pub fn equals_exact(&self, other: &Geometry, tolerance: f64) -> bool {
        self.ptr_eq(other) || geometry_eq(self.as_geo(), other.as_geo(), tolerance)
    }
}

pub(crate) fn is_empty_geometry(geom: &geo::Geometry<f64>) -> bool {
    match geom {
        geo::Geometry::Point(p) => p.x().is_nan() && p.y().is_nan(),
        geo::Geometry::GeometryCollection(collection) => {
            collection.0.iter().all(is_empty_geometry)
        }
        other => other.is_empty(),
    }
}

/// Content equality for assertions only. Library code compares with [`Geometry::ptr_eq`] or
/// [`Geometry::equals_exact`].
#[cfg(test)]
impl PartialEq for Geometry {
    fn eq(&self, other: &Self) -> bool {
        self.equals_exact(other, 0.0)
    }
}

impl fmt::Debug for Geometry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Geometry({self})")
    }
}

impl fmt::Display for Geometry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::new();
        write_geometry(&mut out, self.as_geo(), &WktOptions::default())?;
        f.write_str(&out)
    }
}

impl AsRef<geo::Geometry<f64>> for Geometry {
    fn as_ref(&self) -> &geo::Geometry<f64> {
        &self.0
    }
}

macro_rules! impl_from_geo {
    ($geo_type:ty) => {
        impl From<$geo_type> for Geometry {
            fn from(value: $geo_type) -> Self {
                Self::new(value.into())
            }
        }
    };
}

impl_from_geo!(geo::Geometry<f64>);
impl_from_geo!(geo::Point<f64>);
impl_from_geo!(geo::Line<f64>);
impl_from_geo!(geo::LineString<f64>);
impl_from_geo!(geo::Polygon<f64>);
impl_from_geo!(geo::MultiPoint<f64>);
impl_from_geo!(geo::MultiLineString<f64>);
impl_from_geo!(geo::MultiPolygon<f64>);
impl_from_geo!(geo::Rect<f64>);

impl From<geo::GeometryCollection<f64>> for Geometry {
    fn from(value: geo::GeometryCollection<f64>) -> Self {
        Self::new(geo::Geometry::GeometryCollection(value))
    }
}

impl_from_geo!(geo::Triangle<f64>);

/// The geometry type codes shared by WKB and the kernel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive)]
#[repr(u32)]
pub enum GeometryType {
    Point = 1,
    LineString = 2,
    Polygon = 3,
    MultiPoint = 4,
    MultiLineString = 5,
    MultiPolygon = 6,
    GeometryCollection = 7,
}

impl GeometryType {
    /// `Line` reports as a line string, `Rect` and `Triangle` as polygons.
    pub fn of(geom: &geo::Geometry<f64>) -> Self {
        match geom {
            geo::Geometry::Point(_) => GeometryType::Point,
            geo::Geometry::Line(_) | geo::Geometry::LineString(_) => GeometryType::LineString,
            geo::Geometry::Polygon(_) | geo::Geometry::Rect(_) | geo::Geometry::Triangle(_) => {
                GeometryType::Polygon
            }
            geo::Geometry::MultiPoint(_) => GeometryType::MultiPoint,
            geo::Geometry::MultiLineString(_) => GeometryType::MultiLineString,
            geo::Geometry::MultiPolygon(_) => GeometryType::MultiPolygon,
            geo::Geometry::GeometryCollection(_) => GeometryType::GeometryCollection,
        }
    }

    pub fn wkt_tag(&self) -> &'static str {
        match self {
            GeometryType::Point => "POINT",
            GeometryType::LineString => "LINESTRING",
            GeometryType::Polygon => "POLYGON",
            GeometryType::MultiPoint => "MULTIPOINT",
            GeometryType::MultiLineString => "MULTILINESTRING",
            GeometryType::MultiPolygon => "MULTIPOLYGON",
            GeometryType::GeometryCollection => "GEOMETRYCOLLECTION",
        }
    }
}

#[cfg(test)]
mod test {
    use geo::{point, polygon};

    use super::*;

    #[test]
    fn empty_point_is_empty() {
        let empty = Geometry::empty_point();
        assert!(empty.is_empty());
        assert!(empty.is_empty_point());
        assert_eq!(empty.geometry_type(), GeometryType::Point);
        assert_eq!(empty, Geometry::empty_point());
    }

    #[test]
    fn clone_shares_handle() {
        let geom = Geometry::from(point!(x: 1., y: 2.));
        let other = geom.clone();
        assert!(geom.ptr_eq(&other));
        assert!(!geom.ptr_eq(&Geometry::from(point!(x: 1., y: 2.))));
    }

    #[test]
    fn content_comparison_is_explicit() {
        let geom = Geometry::from(point!(x: 1., y: 2.));
        let twin = Geometry::from(point!(x: 1., y: 2.));
        assert!(!geom.ptr_eq(&twin));
        assert!(geom.equals_exact(&twin, 0.0));
        assert!(!geom.equals_exact(&Geometry::from(point!(x: 1., y: 2.5)), 0.25));
        assert!(geom.equals_exact(&Geometry::from(point!(x: 1., y: 2.5)), 0.5));
    }

    #[test]
    fn rect_reports_polygon() {
        let geom = Geometry::from(geo::Rect::new((0., 0.), (1., 1.)));
        assert_eq!(geom.geometry_type(), GeometryType::Polygon);
        let poly = Geometry::from(polygon![(x: 0., y: 0.), (x: 1., y: 0.), (x: 1., y: 1.)]);
        assert!(!poly.is_empty());
    }

    #[test]
    fn display_is_wkt() {
        let geom = Geometry::from(point!(x: 0., y: 1.5));
        assert_eq!(geom.to_string(), "POINT (0 1.5)");
        assert_eq!(format!("{:?}", geom), "Geometry(POINT (0 1.5))");
    }
}
