use std::borrow::Cow;

use geo::{Coord, Geometry, LineString, MultiLineString, MultiPoint, MultiPolygon, Polygon};

fn value_eq(left: f64, right: f64, tolerance: f64) -> bool {
    left == right || (left.is_nan() && right.is_nan()) || (left - right).abs() <= tolerance
}

pub fn coord_eq(left: &Coord, right: &Coord, tolerance: f64) -> bool {
    value_eq(left.x, right.x, tolerance) && value_eq(left.y, right.y, tolerance)
}

pub fn line_string_eq(left: &LineString, right: &LineString, tolerance: f64) -> bool {
    if left.0.len() != right.0.len() {
        return false;
    }

    left.0
        .iter()
        .zip(right.0.iter())
        .all(|(l, r)| coord_eq(l, r, tolerance))
}

pub fn polygon_eq(left: &Polygon, right: &Polygon, tolerance: f64) -> bool {
    if left.interiors().len() != right.interiors().len() {
        return false;
    }

    if !line_string_eq(left.exterior(), right.exterior(), tolerance) {
        return false;
    }

    left.interiors()
        .iter()
        .zip(right.interiors().iter())
        .all(|(l, r)| line_string_eq(l, r, tolerance))
}

pub fn multi_point_eq(left: &MultiPoint, right: &MultiPoint, tolerance: f64) -> bool {
    if left.0.len() != right.0.len() {
        return false;
    }

    left.0
        .iter()
        .zip(right.0.iter())
        .all(|(l, r)| coord_eq(&l.0, &r.0, tolerance))
}

pub fn multi_line_string_eq(
    left: &MultiLineString,
    right: &MultiLineString,
    tolerance: f64,
) -> bool {
    if left.0.len() != right.0.len() {
        return false;
    }

    left.0
        .iter()
        .zip(right.0.iter())
        .all(|(l, r)| line_string_eq(l, r, tolerance))
}

pub fn multi_polygon_eq(left: &MultiPolygon, right: &MultiPolygon, tolerance: f64) -> bool {
    if left.0.len() != right.0.len() {
        return false;
    }

    left.0
        .iter()
        .zip(right.0.iter())
        .all(|(l, r)| polygon_eq(l, r, tolerance))
}

/// `Line`, `Rect` and `Triangle` compare as the line string or polygon they describe.
fn normalized(geom: &Geometry) -> Cow<'_, Geometry> {
    match geom {
        Geometry::Line(line) => Cow::Owned(Geometry::LineString(LineString::new(vec![
            line.start, line.end,
        ]))),
        Geometry::Rect(rect) => Cow::Owned(Geometry::Polygon(rect.to_polygon())),
        Geometry::Triangle(triangle) => Cow::Owned(Geometry::Polygon(triangle.to_polygon())),
        other => Cow::Borrowed(other),
    }
}

/// Structural equality of two geometries: same type, same structure, and coordinates within
/// `tolerance` of each other. NaN coordinates are equal to each other, so empty points compare
/// equal.
pub fn geometry_eq(left: &Geometry, right: &Geometry, tolerance: f64) -> bool {
    let left = normalized(left);
    let right = normalized(right);
    match (left.as_ref(), right.as_ref()) {
        (Geometry::Point(l), Geometry::Point(r)) => coord_eq(&l.0, &r.0, tolerance),
        (Geometry::LineString(l), Geometry::LineString(r)) => line_string_eq(l, r, tolerance),
        (Geometry::Polygon(l), Geometry::Polygon(r)) => polygon_eq(l, r, tolerance),
        (Geometry::MultiPoint(l), Geometry::MultiPoint(r)) => multi_point_eq(l, r, tolerance),
        (Geometry::MultiLineString(l), Geometry::MultiLineString(r)) => {
            multi_line_string_eq(l, r, tolerance)
        }
        (Geometry::MultiPolygon(l), Geometry::MultiPolygon(r)) => {
            multi_polygon_eq(l, r, tolerance)
        }
        (Geometry::GeometryCollection(l), Geometry::GeometryCollection(r)) => {
            l.0.len() == r.0.len()
                && l.0
                    .iter()
                    .zip(r.0.iter())
                    .all(|(l, r)| geometry_eq(l, r, tolerance))
        }
        _ => false,
    }
}

#[cfg(test)]
mod test {
    use geo::{line_string, point, polygon};

    use super::*;

    #[test]
    fn nan_coordinates_are_equal() {
        let empty: Geometry = geo::Point::new(f64::NAN, f64::NAN).into();
        assert!(geometry_eq(&empty, &empty.clone(), 0.0));
        assert!(!geometry_eq(&empty, &point!(x: 0., y: 0.).into(), 0.0));
    }

    #[test]
    fn tolerance() {
        let a: Geometry = line_string![(x: 0., y: 0.), (x: 1., y: 1.)].into();
        let b: Geometry = line_string![(x: 0., y: 0.), (x: 1.05, y: 1.)].into();
        assert!(!geometry_eq(&a, &b, 0.0));
        assert!(geometry_eq(&a, &b, 0.1));
    }

    #[test]
    fn rect_equals_its_polygon() {
        let rect = geo::Rect::new((0., 0.), (1., 1.));
        let poly: Geometry = rect.to_polygon().into();
        let rect: Geometry = rect.into();
        assert!(geometry_eq(&rect, &poly, 0.0));
        let other: Geometry = polygon![(x: 0., y: 0.), (x: 2., y: 0.), (x: 2., y: 2.)].into();
        assert!(!geometry_eq(&rect, &other, 0.0));
    }

    #[test]
    fn different_types_are_not_equal() {
        let p: Geometry = point!(x: 0., y: 0.).into();
        let mp: Geometry = MultiPoint::new(vec![point!(x: 0., y: 0.)]).into();
        assert!(!geometry_eq(&p, &mp, 0.0));
    }
}
