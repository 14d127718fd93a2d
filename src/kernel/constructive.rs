//! Operations that derive a new geometry from each input geometry.

use geo::{
    BooleanOps, BoundingRect, Centroid, Contains, ConvexHull, Coord, CoordsIter,
    GeometryCollection, InteriorPoint, LineString, MultiLineString, MultiPoint, MultiPolygon,
    Point, Polygon, Rect, Simplify,
};
use indexmap::{IndexMap, IndexSet};

use crate::error::{GeoFrameError, Result};
use crate::kernel::{try_unary_map, unary_map, KernelArgs, KernelOutput, Values};
use crate::scalar::{is_empty_geometry, Geometry};

fn geometry_output(values: crate::kernel::NdArray<Option<Geometry>>) -> KernelOutput {
    KernelOutput::Values(Values::Geometry(values))
}

fn empty_collection() -> geo::Geometry {
    geo::Geometry::GeometryCollection(GeometryCollection::new_from(vec![]))
}

/// Center of mass. Empty geometries give `POINT EMPTY`.
pub fn centroid(data: &[Option<Geometry>], _args: &KernelArgs) -> Result<KernelOutput> {
    let values = unary_map(data, |geom| {
        if geom.is_empty() {
            return Some(Geometry::empty_point());
        }
        Some(match geom.as_geo().centroid() {
            Some(point) => Geometry::from(point),
            None => Geometry::empty_point(),
        })
    });
    Ok(geometry_output(values))
}

/// Smallest convex polygon containing the geometry, collapsed to a point or a line string when
/// the input is degenerate.
pub fn convex_hull(data: &[Option<Geometry>], _args: &KernelArgs) -> Result<KernelOutput> {
    let values = unary_map(data, |geom| {
        if geom.is_empty() {
            return Some(Geometry::new(empty_collection()));
        }
        if let geo::Geometry::Point(_) = geom.as_geo() {
            return Some(geom.clone());
        }
        let hull = geom.as_geo().convex_hull();
        let mut coords: Vec<Coord> = Vec::with_capacity(hull.exterior().0.len());
        for coord in hull.exterior().coords() {
            if !coords.contains(coord) {
                coords.push(*coord);
            }
        }
        Some(match coords.len() {
            0 => Geometry::new(empty_collection()),
            1 => Geometry::from(Point(coords[0])),
            2 => Geometry::from(LineString::new(coords)),
            _ => Geometry::from(hull),
        })
    });
    Ok(geometry_output(values))
}

/// Bounding rectangle as a polygon, or a point when it has no extent.
pub fn envelope(data: &[Option<Geometry>], _args: &KernelArgs) -> Result<KernelOutput> {
    let values = unary_map(data, |geom| {
        if geom.is_empty() {
            return Some(Geometry::empty_point());
        }
        Some(match geom.as_geo().bounding_rect() {
            None => Geometry::empty_point(),
            Some(rect) if rect.width() == 0. && rect.height() == 0. => {
                Geometry::from(Point(rect.min()))
            }
            Some(rect) => {
                let (min, max) = (rect.min(), rect.max());
                Geometry::from(Polygon::new(
                    LineString::from(vec![
                        (min.x, min.y),
                        (max.x, min.y),
                        (max.x, max.y),
                        (min.x, max.y),
                        (min.x, min.y),
                    ]),
                    vec![],
                ))
            }
        })
    });
    Ok(geometry_output(values))
}

/// All distinct vertices as a multi point, in order of first appearance.
pub fn extract_unique_points(
    data: &[Option<Geometry>],
    _args: &KernelArgs,
) -> Result<KernelOutput> {
    let values = unary_map(data, |geom| {
        let mut seen = IndexSet::new();
        for coord in geom.as_geo().coords_iter() {
            if coord.x.is_nan() && coord.y.is_nan() {
                continue;
            }
            seen.insert((coord.x.to_bits(), coord.y.to_bits()));
        }
        let points = seen
            .into_iter()
            .map(|(x, y)| Point::new(f64::from_bits(x), f64::from_bits(y)))
            .collect::<Vec<_>>();
        Some(Geometry::from(MultiPoint::new(points)))
    });
    Ok(geometry_output(values))
}

/// A point guaranteed to lie on the geometry.
pub fn point_on_surface(data: &[Option<Geometry>], _args: &KernelArgs) -> Result<KernelOutput> {
    let values = unary_map(data, |geom| {
        if geom.is_empty() {
            return Some(Geometry::empty_point());
        }
        Some(match geom.as_geo().interior_point() {
            Some(point) => Geometry::from(point),
            None => Geometry::empty_point(),
        })
    });
    Ok(geometry_output(values))
}

fn reverse_line_string(line: &LineString) -> LineString {
    LineString::new(line.0.iter().rev().copied().collect())
}

fn reverse_polygon(polygon: &Polygon) -> Polygon {
    Polygon::new(
        reverse_line_string(polygon.exterior()),
        polygon.interiors().iter().map(reverse_line_string).collect(),
    )
}

fn reverse_geometry(geom: &geo::Geometry) -> geo::Geometry {
    match geom {
        geo::Geometry::Point(_) | geo::Geometry::MultiPoint(_) => geom.clone(),
        geo::Geometry::Line(line) => {
            geo::Geometry::LineString(LineString::new(vec![line.end, line.start]))
        }
        geo::Geometry::LineString(line) => reverse_line_string(line).into(),
        geo::Geometry::MultiLineString(lines) => {
            MultiLineString::new(lines.0.iter().map(reverse_line_string).collect()).into()
        }
        geo::Geometry::Polygon(polygon) => reverse_polygon(polygon).into(),
        geo::Geometry::MultiPolygon(polygons) => {
            MultiPolygon::new(polygons.0.iter().map(reverse_polygon).collect()).into()
        }
        geo::Geometry::Rect(rect) => reverse_polygon(&rect.to_polygon()).into(),
        geo::Geometry::Triangle(triangle) => reverse_polygon(&triangle.to_polygon()).into(),
        geo::Geometry::GeometryCollection(collection) => {
            geo::Geometry::GeometryCollection(GeometryCollection::new_from(
                collection.0.iter().map(reverse_geometry).collect(),
            ))
        }
    }
}

/// Reverse the vertex order of every linear component.
pub fn reverse(data: &[Option<Geometry>], _args: &KernelArgs) -> Result<KernelOutput> {
    let values = unary_map(data, |geom| Some(Geometry::new(reverse_geometry(geom.as_geo()))));
    Ok(geometry_output(values))
}

fn simplify_geometry(geom: &geo::Geometry, tolerance: &f64) -> geo::Geometry {
    match geom {
        geo::Geometry::LineString(line) => line.simplify(tolerance).into(),
        geo::Geometry::MultiLineString(lines) => lines.simplify(tolerance).into(),
        geo::Geometry::Polygon(polygon) => polygon.simplify(tolerance).into(),
        geo::Geometry::MultiPolygon(polygons) => polygons.simplify(tolerance).into(),
        geo::Geometry::GeometryCollection(collection) => {
            geo::Geometry::GeometryCollection(GeometryCollection::new_from(
                collection
                    .0
                    .iter()
                    .map(|g| simplify_geometry(g, tolerance))
                    .collect(),
            ))
        }
        other => other.clone(),
    }
}

/// Douglas-Peucker simplification with keyword `tolerance` (default 0).
pub fn simplify(data: &[Option<Geometry>], args: &KernelArgs) -> Result<KernelOutput> {
    let tolerance = args.f64_or(0, "tolerance", 0.)?;
    let values = try_unary_map(data, |geom| {
        if is_empty_geometry(geom.as_geo()) {
            return Ok(Some(geom.clone()));
        }
        Ok(Some(Geometry::new(simplify_geometry(geom.as_geo(), &tolerance))))
    })?;
    Ok(geometry_output(values))
}

/// Endpoints that occur an odd number of times across the open lines.
fn line_endpoints<'a>(lines: impl IntoIterator<Item = &'a LineString>) -> MultiPoint {
    let mut counts: IndexMap<(u64, u64), usize> = IndexMap::new();
    for line in lines {
        if line.0.is_empty() || line.is_closed() {
            continue;
        }
        for coord in [line.0[0], line.0[line.0.len() - 1]] {
            *counts.entry((coord.x.to_bits(), coord.y.to_bits())).or_default() += 1;
        }
    }
    counts
        .into_iter()
        .filter(|(_, count)| count % 2 == 1)
        .map(|((x, y), _)| Point::new(f64::from_bits(x), f64::from_bits(y)))
        .collect()
}

fn polygon_rings(polygons: &[Polygon]) -> Vec<LineString> {
    polygons
        .iter()
        .flat_map(|polygon| {
            std::iter::once(polygon.exterior().clone()).chain(polygon.interiors().iter().cloned())
        })
        .filter(|ring| !ring.0.is_empty())
        .collect()
}

fn rings_geometry(mut rings: Vec<LineString>) -> geo::Geometry {
    if rings.len() == 1 {
        geo::Geometry::LineString(rings.remove(0))
    } else {
        geo::Geometry::MultiLineString(MultiLineString::new(rings))
    }
}

fn boundary_geometry(geom: &geo::Geometry) -> Option<geo::Geometry> {
    Some(match geom {
        geo::Geometry::Point(_) | geo::Geometry::MultiPoint(_) => empty_collection(),
        geo::Geometry::Line(line) => {
            let line = LineString::new(vec![line.start, line.end]);
            line_endpoints([&line]).into()
        }
        geo::Geometry::LineString(line) => line_endpoints([line]).into(),
        geo::Geometry::MultiLineString(lines) => line_endpoints(&lines.0).into(),
        geo::Geometry::Polygon(polygon) => {
            rings_geometry(polygon_rings(std::slice::from_ref(polygon)))
        }
        geo::Geometry::MultiPolygon(polygons) => {
            geo::Geometry::MultiLineString(MultiLineString::new(polygon_rings(&polygons.0)))
        }
        geo::Geometry::Rect(rect) => rings_geometry(polygon_rings(&[rect.to_polygon()])),
        geo::Geometry::Triangle(triangle) => {
            rings_geometry(polygon_rings(&[triangle.to_polygon()]))
        }
        geo::Geometry::GeometryCollection(_) => return None,
    })
}

/// Topological boundary: rings for polygons and the odd-count endpoints for lines.
///
/// Points have an empty boundary. Collections have no defined boundary and give null.
pub fn boundary(data: &[Option<Geometry>], _args: &KernelArgs) -> Result<KernelOutput> {
    let values = unary_map(data, |geom| boundary_geometry(geom.as_geo()).map(Geometry::new));
    Ok(geometry_output(values))
}

fn clip_geometry(geom: &geo::Geometry, rect: &Rect) -> geo::Geometry {
    let window = MultiPolygon::new(vec![rect.to_polygon()]);
    let lines = |lines: MultiLineString| -> geo::Geometry {
        let mut clipped = window.clip(&lines, false);
        match clipped.0.len() {
            0 => empty_collection(),
            1 => geo::Geometry::LineString(clipped.0.remove(0)),
            _ => geo::Geometry::MultiLineString(clipped),
        }
    };
    let polygons = |polygons: MultiPolygon| -> geo::Geometry {
        let mut clipped = window.intersection(&polygons);
        match clipped.0.len() {
            0 => empty_collection(),
            1 => geo::Geometry::Polygon(clipped.0.remove(0)),
            _ => geo::Geometry::MultiPolygon(clipped),
        }
    };
    match geom {
        geo::Geometry::Point(point) if rect.contains(point) => geom.clone(),
        geo::Geometry::Point(_) => empty_collection(),
        geo::Geometry::MultiPoint(points) => {
            let inside: Vec<Point> = points.iter().filter(|p| rect.contains(*p)).copied().collect();
            match inside.len() {
                0 => empty_collection(),
                1 => geo::Geometry::Point(inside[0]),
                _ => geo::Geometry::MultiPoint(MultiPoint::new(inside)),
            }
        }
        geo::Geometry::Line(line) => lines(MultiLineString::new(vec![LineString::new(vec![
            line.start, line.end,
        ])])),
        geo::Geometry::LineString(line) => lines(MultiLineString::new(vec![line.clone()])),
        geo::Geometry::MultiLineString(multi) => lines(multi.clone()),
        geo::Geometry::Polygon(polygon) => polygons(MultiPolygon::new(vec![polygon.clone()])),
        geo::Geometry::MultiPolygon(multi) => polygons(multi.clone()),
        geo::Geometry::Rect(r) => polygons(MultiPolygon::new(vec![r.to_polygon()])),
        geo::Geometry::Triangle(t) => polygons(MultiPolygon::new(vec![t.to_polygon()])),
        geo::Geometry::GeometryCollection(collection) => {
            let parts: Vec<geo::Geometry> = collection
                .0
                .iter()
                .map(|part| clip_geometry(part, rect))
                .filter(|part| !is_empty_geometry(part))
                .collect();
            geo::Geometry::GeometryCollection(GeometryCollection::new_from(parts))
        }
    }
}

/// The part of each geometry inside the rectangle given by keywords `xmin`, `ymin`, `xmax` and
/// `ymax`. Nothing inside gives `GEOMETRYCOLLECTION EMPTY`.
pub fn clip_by_rect(data: &[Option<Geometry>], args: &KernelArgs) -> Result<KernelOutput> {
    let xmin = args.require_f64(0, "xmin")?;
    let ymin = args.require_f64(1, "ymin")?;
    let xmax = args.require_f64(2, "xmax")?;
    let ymax = args.require_f64(3, "ymax")?;
    if xmin > xmax || ymin > ymax {
        return Err(GeoFrameError::InvalidValue(
            format!("invalid clipping rectangle ({xmin}, {ymin}, {xmax}, {ymax})").into(),
        ));
    }
    let rect = Rect::new((xmin, ymin), (xmax, ymax));
    let values = try_unary_map(data, |geom| {
        if is_empty_geometry(geom.as_geo()) {
            return Ok(Some(Geometry::new(empty_collection())));
        }
        Ok(Some(Geometry::new(clip_geometry(geom.as_geo(), &rect))))
    })?;
    Ok(geometry_output(values))
}
