use std::str::FromStr;

use geo::{
    Coord, GeometryCollection, LineString, MultiLineString, MultiPoint, MultiPolygon, Point,
    Polygon,
};
use wkt::Wkt;

use crate::error::{GeoFrameError, Result};

fn coord(coord: &wkt::types::Coord<f64>) -> Coord {
    Coord {
        x: coord.x,
        y: coord.y,
    }
}

fn point(point: &wkt::types::Point<f64>) -> Point {
    match &point.0 {
        Some(c) => Point(coord(c)),
        None => Point::new(f64::NAN, f64::NAN),
    }
}

fn line_string(line: &wkt::types::LineString<f64>) -> LineString {
    LineString::new(line.0.iter().map(coord).collect())
}

fn polygon(polygon: &wkt::types::Polygon<f64>) -> Polygon {
    let mut rings = polygon.0.iter().map(line_string);
    match rings.next() {
        Some(exterior) => Polygon::new(exterior, rings.collect()),
        None => Polygon::new(LineString::new(vec![]), vec![]),
    }
}

fn geometry(geom: &wkt::Geometry<f64>) -> geo::Geometry {
    match geom {
        wkt::Geometry::Point(p) => point(p).into(),
        wkt::Geometry::LineString(l) => line_string(l).into(),
        wkt::Geometry::Polygon(p) => polygon(p).into(),
        wkt::Geometry::MultiPoint(points) => {
            MultiPoint::new(points.0.iter().map(point).collect()).into()
        }
        wkt::Geometry::MultiLineString(lines) => {
            MultiLineString::new(lines.0.iter().map(line_string).collect()).into()
        }
        wkt::Geometry::MultiPolygon(polygons) => {
            MultiPolygon::new(polygons.0.iter().map(polygon).collect()).into()
        }
        wkt::Geometry::GeometryCollection(collection) => {
            geo::Geometry::GeometryCollection(GeometryCollection::new_from(
                collection.0.iter().map(geometry).collect(),
            ))
        }
    }
}

/// Decode one WKT string.
///
/// Empty points decode to a point with NaN coordinates, at any nesting level. Z and M ordinates
/// are dropped. Errors carry row index 0; array-level decoders attach the real row.
pub fn read_wkt(text: &str) -> Result<geo::Geometry<f64>> {
    let parsed = Wkt::<f64>::from_str(text).map_err(|reason| GeoFrameError::Wkt {
        index: 0,
        reason: reason.to_string(),
    })?;
    Ok(geometry(&parsed.item))
}

#[cfg(test)]
mod test {
    use geo::point;

    use super::*;
    use crate::error::ErrorKind;
    use crate::io::wkt::{to_wkt, WktOptions};

    #[test]
    fn read_point() {
        assert_eq!(read_wkt("POINT (1 2)").unwrap(), point!(x: 1., y: 2.).into());
        assert_eq!(read_wkt("POINT Z (1 2 3)").unwrap(), point!(x: 1., y: 2.).into());
    }

    #[test]
    fn read_collection() {
        let geo::Geometry::GeometryCollection(collection) =
            read_wkt("GEOMETRYCOLLECTION (POINT (1 2), LINESTRING (0 0, 1 1))").unwrap()
        else {
            panic!("expected a collection");
        };
        assert_eq!(collection.0.len(), 2);
        assert_eq!(collection.0[0], point!(x: 1., y: 2.).into());
    }

    #[test]
    fn empty_point_survives() {
        let geo::Geometry::Point(p) = read_wkt("POINT EMPTY").unwrap() else {
            panic!("expected a point");
        };
        assert!(p.x().is_nan() && p.y().is_nan());
    }

    #[test]
    fn text_round_trip() {
        for text in [
            "LINESTRING (0 0, 3 4)",
            "POLYGON ((0 0, 1 0, 1 1, 0 1, 0 0), (0.2 0.2, 0.4 0.2, 0.4 0.4, 0.2 0.2))",
            "MULTIPOINT ((0 0), (1 1))",
            "MULTILINESTRING ((0 0, 1 1), (2 2, 3 3))",
            "GEOMETRYCOLLECTION (POINT (1 2), LINESTRING (0 0, 1 1))",
            "POLYGON EMPTY",
        ] {
            let geom = read_wkt(text).unwrap();
            assert_eq!(to_wkt(&geom, &WktOptions::default()), text);
        }
    }

    #[test]
    fn malformed() {
        let err = read_wkt("POINT (1").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Decode);
        assert!(read_wkt("CIRCLE (0 0)").is_err());
    }
}
