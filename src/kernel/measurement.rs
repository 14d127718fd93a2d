//! Planar measurements.

use geo::{
    Area, BoundingRect, EuclideanDistance, EuclideanLength, FrechetDistance,
    HausdorffDistance, Intersects, LineString, Point, Polygon,
};

use crate::error::{GeoFrameError, Result};
use crate::kernel::{
    binary_map, unary_map, KernelArgs, KernelOutput, NdArray, Values,
};
use crate::scalar::{is_empty_geometry, Geometry};

/// Unsigned area. Non-polygonal geometries have zero area.
pub fn area(data: &[Option<Geometry>], _args: &KernelArgs) -> Result<KernelOutput> {
    let values = unary_map(data, |geom| Some(geom.as_geo().unsigned_area()));
    Ok(KernelOutput::Values(Values::Float64(values)))
}

/// Length of lines, perimeter of polygons, zero for points.
pub fn length(data: &[Option<Geometry>], _args: &KernelArgs) -> Result<KernelOutput> {
    let values = unary_map(data, |geom| Some(euclidean_length(geom.as_geo())));
    Ok(KernelOutput::Values(Values::Float64(values)))
}

fn euclidean_length(geom: &geo::Geometry) -> f64 {
    match geom {
        geo::Geometry::Point(_) | geo::Geometry::MultiPoint(_) => 0.,
        geo::Geometry::Line(line) => line.euclidean_length(),
        geo::Geometry::LineString(line_string) => line_string.euclidean_length(),
        geo::Geometry::MultiLineString(lines) => lines.euclidean_length(),
        geo::Geometry::Polygon(polygon) => perimeter(polygon),
        geo::Geometry::MultiPolygon(polygons) => polygons.0.iter().map(perimeter).sum(),
        geo::Geometry::Rect(rect) => perimeter(&rect.to_polygon()),
        geo::Geometry::Triangle(triangle) => perimeter(&triangle.to_polygon()),
        geo::Geometry::GeometryCollection(collection) => {
            collection.0.iter().map(euclidean_length).sum()
        }
    }
}

fn perimeter(polygon: &Polygon) -> f64 {
    polygon.exterior().euclidean_length()
        + polygon
            .interiors()
            .iter()
            .map(|ring| ring.euclidean_length())
            .sum::<f64>()
}

/// `[xmin, ymin, xmax, ymax]`, NaN for empty geometries.
fn bounding_box(geom: &Geometry) -> [f64; 4] {
    if geom.is_empty() {
        return [f64::NAN; 4];
    }
    match geom.as_geo().bounding_rect() {
        Some(rect) => [rect.min().x, rect.min().y, rect.max().x, rect.max().y],
        None => [f64::NAN; 4],
    }
}

/// Per-row bounds as an `n x 4` array with columns `xmin, ymin, xmax, ymax`.
pub fn bounds(data: &[Option<Geometry>], _args: &KernelArgs) -> Result<KernelOutput> {
    let mut values = Vec::with_capacity(data.len() * 4);
    for geom in data {
        match geom {
            Some(geom) => values.extend(bounding_box(geom).map(Some)),
            None => values.extend([None; 4]),
        }
    }
    let values = NdArray::try_new(vec![data.len(), 4], values)?;
    Ok(KernelOutput::Values(Values::Float64(values)))
}

/// Bounds of the whole buffer, ignoring nulls and empty geometries. NaN if nothing remains.
pub fn total_bounds(data: &[Option<Geometry>], _args: &KernelArgs) -> Result<KernelOutput> {
    let mut total = [f64::INFINITY, f64::INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY];
    let mut seen = false;
    for geom in data.iter().flatten() {
        let [xmin, ymin, xmax, ymax] = bounding_box(geom);
        if xmin.is_nan() {
            continue;
        }
        seen = true;
        total[0] = total[0].min(xmin);
        total[1] = total[1].min(ymin);
        total[2] = total[2].max(xmax);
        total[3] = total[3].max(ymax);
    }
    if !seen {
        total = [f64::NAN; 4];
    }
    let values = NdArray::from_vec(total.map(Some).to_vec());
    Ok(KernelOutput::Values(Values::Float64(values)))
}

/// The point, line and polygon parts of a geometry.
#[derive(Default)]
struct Parts {
    points: Vec<Point>,
    lines: Vec<LineString>,
    polygons: Vec<Polygon>,
}

impl Parts {
    fn collect(geom: &geo::Geometry) -> Self {
        let mut parts = Parts::default();
        parts.push(geom);
        parts
    }

    fn push(&mut self, geom: &geo::Geometry) {
        if is_empty_geometry(geom) {
            return;
        }
        match geom {
            geo::Geometry::Point(point) => self.points.push(*point),
            geo::Geometry::MultiPoint(points) => self.points.extend(points.0.iter().copied()),
            geo::Geometry::Line(line) => self
                .lines
                .push(LineString::new(vec![line.start, line.end])),
            geo::Geometry::LineString(line) => self.lines.push(line.clone()),
            geo::Geometry::MultiLineString(lines) => self.lines.extend(lines.0.iter().cloned()),
            geo::Geometry::Polygon(polygon) => self.polygons.push(polygon.clone()),
            geo::Geometry::MultiPolygon(polygons) => {
                self.polygons.extend(polygons.0.iter().cloned())
            }
            geo::Geometry::Rect(rect) => self.polygons.push(rect.to_polygon()),
            geo::Geometry::Triangle(triangle) => self.polygons.push(triangle.to_polygon()),
            geo::Geometry::GeometryCollection(collection) => {
                collection.0.iter().for_each(|g| self.push(g))
            }
        }
    }

    fn distance_to(&self, other: &Parts) -> f64 {
        let mut min = f64::INFINITY;
        for p in &self.points {
            for q in &other.points {
                min = min.min(p.euclidean_distance(q));
            }
            for l in &other.lines {
                min = min.min(p.euclidean_distance(l));
            }
            for poly in &other.polygons {
                min = min.min(p.euclidean_distance(poly));
            }
        }
        for l in &self.lines {
            for q in &other.points {
                min = min.min(q.euclidean_distance(l));
            }
            for m in &other.lines {
                min = min.min(l.euclidean_distance(m));
            }
            for poly in &other.polygons {
                min = min.min(l.euclidean_distance(poly));
            }
        }
        for poly in &self.polygons {
            for q in &other.points {
                min = min.min(q.euclidean_distance(poly));
            }
            for m in &other.lines {
                min = min.min(m.euclidean_distance(poly));
            }
            for other_poly in &other.polygons {
                min = min.min(poly.euclidean_distance(other_poly));
            }
        }
        min
    }
}

/// Minimum planar distance. NaN if either side is empty.
pub fn distance(
    left: &NdArray<Option<Geometry>>,
    right: &NdArray<Option<Geometry>>,
    _args: &KernelArgs,
) -> Result<Values> {
    let values = binary_map(left, right, |l, r| {
        if l.is_empty() || r.is_empty() {
            return Ok(Some(f64::NAN));
        }
        if l.as_geo().intersects(r.as_geo()) {
            return Ok(Some(0.));
        }
        Ok(Some(Parts::collect(l.as_geo()).distance_to(&Parts::collect(r.as_geo()))))
    })?;
    Ok(Values::Float64(values))
}

/// Discrete Hausdorff distance between the vertex sets of both geometries.
pub fn hausdorff_distance(
    left: &NdArray<Option<Geometry>>,
    right: &NdArray<Option<Geometry>>,
    _args: &KernelArgs,
) -> Result<Values> {
    let values = binary_map(left, right, |l, r| {
        if l.is_empty() || r.is_empty() {
            return Ok(Some(f64::NAN));
        }
        Ok(Some(l.as_geo().hausdorff_distance(r.as_geo())))
    })?;
    Ok(Values::Float64(values))
}

fn as_line_string(geom: &Geometry) -> Result<LineString> {
    match geom.as_geo() {
        geo::Geometry::LineString(line) => Ok(line.clone()),
        geo::Geometry::Line(line) => Ok(LineString::new(vec![line.start, line.end])),
        _ => Err(GeoFrameError::IncorrectType(
            format!(
                "frechet distance requires line strings, got {}",
                geom.geometry_type().wkt_tag()
            )
            .into(),
        )),
    }
}

/// Discrete Fréchet distance between two line strings. NaN if either side is empty.
pub fn frechet_distance(
    left: &NdArray<Option<Geometry>>,
    right: &NdArray<Option<Geometry>>,
    _args: &KernelArgs,
) -> Result<Values> {
    let values = binary_map(left, right, |l, r| {
        if l.is_empty() || r.is_empty() {
            return Ok(Some(f64::NAN));
        }
        Ok(Some(as_line_string(l)?.frechet_distance(&as_line_string(r)?)))
    })?;
    Ok(Values::Float64(values))
}

#[cfg(test)]
mod test {
    use approx::assert_relative_eq;
    use geo::line_string;

    use super::*;
    use crate::test::linestring::{ls0, ls1};
    use crate::test::point::{p0, p1};
    use crate::test::polygon::{poly0, poly2, square};

    fn float64(output: KernelOutput) -> NdArray<Option<f64>> {
        match output.into_values() {
            Some(Values::Float64(values)) => values,
            other => panic!("unexpected output {:?}", other),
        }
    }

    #[test]
    fn area_and_length() {
        let data = vec![
            Some(Geometry::from(square(0., 0., 2.))),
            Some(Geometry::from(ls0())),
            Some(Geometry::from(p0())),
            None,
        ];
        let areas = float64(area(&data, &KernelArgs::new()).unwrap());
        assert_eq!(areas.data(), &[Some(4.), Some(0.), Some(0.), None]);

        let lengths = float64(length(&data, &KernelArgs::new()).unwrap());
        assert_eq!(lengths.data(), &[Some(8.), Some(5.), Some(0.), None]);

        let ring = vec![Some(Geometry::from(ls1()))];
        let lengths = float64(length(&ring, &KernelArgs::new()).unwrap());
        assert_relative_eq!(lengths.data()[0].unwrap(), 2. + 2f64.sqrt());
    }

    #[test]
    fn bounds_per_row() {
        let data = vec![Some(Geometry::from(poly2())), None, Some(Geometry::empty_point())];
        let values = float64(bounds(&data, &KernelArgs::new()).unwrap());
        assert_eq!(values.shape(), &[3, 4]);
        assert_eq!(&values.data()[0..4], &[Some(10.), Some(10.), Some(12.), Some(12.)]);
        assert_eq!(&values.data()[4..8], &[None; 4]);
        assert!(values.data()[8].unwrap().is_nan());
    }

    #[test]
    fn total_bounds_skip_nulls() {
        let data = vec![Some(Geometry::from(poly0())), None, Some(Geometry::from(poly2()))];
        let values = float64(total_bounds(&data, &KernelArgs::new()).unwrap());
        assert_eq!(values.data(), &[Some(0.), Some(0.), Some(12.), Some(12.)]);

        let values = float64(total_bounds(&[None], &KernelArgs::new()).unwrap());
        assert!(values.data().iter().all(|v| v.unwrap().is_nan()));
    }

    #[test]
    fn pairwise_distance() {
        let left = NdArray::from_vec(vec![
            Some(Geometry::from(p0())),
            Some(Geometry::from(p1())),
            None,
        ]);
        let right = NdArray::scalar(Some(Geometry::from(square(3., 0., 1.))));
        let values = distance(&left, &right, &KernelArgs::new()).unwrap();
        let values = values.as_float64().unwrap();
        assert_relative_eq!(values.data()[0].unwrap(), 3.);
        assert_relative_eq!(values.data()[1].unwrap(), 2.);
        assert_eq!(values.data()[2], None);

        let inside = NdArray::scalar(Some(Geometry::from(geo::point!(x: 0.5, y: 0.5))));
        let square = NdArray::scalar(Some(Geometry::from(poly0())));
        let values = distance(&inside, &square, &KernelArgs::new()).unwrap();
        assert_eq!(values.as_float64().unwrap().data(), &[Some(0.)]);
    }

    #[test]
    fn hausdorff() {
        let left = NdArray::scalar(Some(Geometry::from(ls0())));
        let right = NdArray::scalar(Some(Geometry::from(geo::line_string![
            (x: 0., y: 0.),
            (x: 3., y: 0.)
        ])));
        let values = hausdorff_distance(&left, &right, &KernelArgs::new()).unwrap();
        assert_relative_eq!(values.as_float64().unwrap().data()[0].unwrap(), 4.);
    }

    #[test]
    fn frechet() {
        let left = NdArray::from_vec(vec![Some(Geometry::from(ls0())), None]);
        let right = NdArray::scalar(Some(Geometry::from(geo::line_string![
            (x: 0., y: 1.),
            (x: 3., y: 5.)
        ])));
        let values = frechet_distance(&left, &right, &KernelArgs::new()).unwrap();
        let values = values.as_float64().unwrap();
        assert_relative_eq!(values.data()[0].unwrap(), 1.);
        assert_eq!(values.data()[1], None);

        let polygon = NdArray::scalar(Some(Geometry::from(poly0())));
        let err = frechet_distance(&polygon, &right, &KernelArgs::new()).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Type);
    }
}
