use std::fmt::{self, Write};

use geo::{Coord, LineString, Polygon};

/// Options for encoding WKT.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WktOptions {
    /// Digits after the decimal point. `None` writes the shortest representation that reads
    /// back to the same value.
    pub rounding_precision: Option<usize>,
    /// Strip trailing zeros after rounding.
    pub trim: bool,
}

impl Default for WktOptions {
    fn default() -> Self {
        Self {
            rounding_precision: None,
            trim: true,
        }
    }
}

fn write_number<W: Write>(out: &mut W, value: f64, options: &WktOptions) -> fmt::Result {
    // -0 prints as 0
    let value = if value == 0. { 0. } else { value };
    match options.rounding_precision {
        None => write!(out, "{value}"),
        Some(precision) => {
            let text = format!("{value:.precision$}");
            let mut text = text.as_str();
            if options.trim && text.contains('.') {
                text = text.trim_end_matches('0').trim_end_matches('.');
            }
            // rounded to zero
            if let Some(unsigned) = text.strip_prefix('-') {
                if unsigned.chars().all(|c| c == '0' || c == '.') {
                    text = unsigned;
                }
            }
            out.write_str(text)
        }
    }
}

fn write_coord<W: Write>(out: &mut W, coord: &Coord, options: &WktOptions) -> fmt::Result {
    write_number(out, coord.x, options)?;
    out.write_char(' ')?;
    write_number(out, coord.y, options)
}

/// `(x y, x y, ...)`
fn write_coords<W: Write>(out: &mut W, line: &LineString, options: &WktOptions) -> fmt::Result {
    out.write_char('(')?;
    for (i, coord) in line.0.iter().enumerate() {
        if i > 0 {
            out.write_str(", ")?;
        }
        write_coord(out, coord, options)?;
    }
    out.write_char(')')
}

/// `((x y, ...), (x y, ...))` or `EMPTY`
fn write_rings<W: Write>(out: &mut W, polygon: &Polygon, options: &WktOptions) -> fmt::Result {
    if polygon.exterior().0.is_empty() {
        return out.write_str("EMPTY");
    }
    out.write_char('(')?;
    write_coords(out, polygon.exterior(), options)?;
    for ring in polygon.interiors() {
        out.write_str(", ")?;
        write_coords(out, ring, options)?;
    }
    out.write_char(')')
}

fn write_list<W: Write, T>(
    out: &mut W,
    items: &[T],
    options: &WktOptions,
    mut write_item: impl FnMut(&mut W, &T, &WktOptions) -> fmt::Result,
) -> fmt::Result {
    if items.is_empty() {
        return out.write_str("EMPTY");
    }
    out.write_char('(')?;
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            out.write_str(", ")?;
        }
        write_item(out, item, options)?;
    }
    out.write_char(')')
}

fn is_nan_coord(coord: &Coord) -> bool {
    coord.x.is_nan() && coord.y.is_nan()
}

/// Write a geometry as WKT in the `TYPE (x y, ...)` layout, e.g. `POINT (0 0)`,
/// `MULTIPOINT ((0 0), (1 1))` or `POINT EMPTY`.
pub fn write_geometry<W: Write>(
    out: &mut W,
    geom: &geo::Geometry<f64>,
    options: &WktOptions,
) -> fmt::Result {
    match geom {
        geo::Geometry::Point(point) => {
            out.write_str("POINT ")?;
            if is_nan_coord(&point.0) {
                return out.write_str("EMPTY");
            }
            out.write_char('(')?;
            write_coord(out, &point.0, options)?;
            out.write_char(')')
        }
        geo::Geometry::Line(line) => {
            out.write_str("LINESTRING ")?;
            write_coords(out, &LineString::new(vec![line.start, line.end]), options)
        }
        geo::Geometry::LineString(line) => {
            out.write_str("LINESTRING ")?;
            if line.0.is_empty() {
                return out.write_str("EMPTY");
            }
            write_coords(out, line, options)
        }
        geo::Geometry::Polygon(polygon) => {
            out.write_str("POLYGON ")?;
            write_rings(out, polygon, options)
        }
        geo::Geometry::Rect(rect) => {
            out.write_str("POLYGON ")?;
            write_rings(out, &rect.to_polygon(), options)
        }
        geo::Geometry::Triangle(triangle) => {
            out.write_str("POLYGON ")?;
            write_rings(out, &triangle.to_polygon(), options)
        }
        geo::Geometry::MultiPoint(points) => {
            out.write_str("MULTIPOINT ")?;
            write_list(out, &points.0, options, |out, point, options| {
                if is_nan_coord(&point.0) {
                    return out.write_str("EMPTY");
                }
                out.write_char('(')?;
                write_coord(out, &point.0, options)?;
                out.write_char(')')
            })
        }
        geo::Geometry::MultiLineString(lines) => {
            out.write_str("MULTILINESTRING ")?;
            write_list(out, &lines.0, options, |out, line, options| {
                if line.0.is_empty() {
                    return out.write_str("EMPTY");
                }
                write_coords(out, line, options)
            })
        }
        geo::Geometry::MultiPolygon(polygons) => {
            out.write_str("MULTIPOLYGON ")?;
            write_list(out, &polygons.0, options, |out, polygon, options| {
                write_rings(out, polygon, options)
            })
        }
        geo::Geometry::GeometryCollection(collection) => {
            out.write_str("GEOMETRYCOLLECTION ")?;
            write_list(out, &collection.0, options, |out, part, options| {
                write_geometry(out, part, options)
            })
        }
    }
}

/// Encode a geometry as a WKT string.
pub fn to_wkt(geom: &geo::Geometry<f64>, options: &WktOptions) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = write_geometry(&mut out, geom, options);
    out
}
