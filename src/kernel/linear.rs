//! Operations along line strings.

use geo::{EuclideanLength, LineInterpolatePoint, LineLocatePoint, LineString, Point};

use crate::error::{GeoFrameError, Result};
use crate::kernel::{try_unary_map, KernelArgs, KernelOutput, Values};
use crate::scalar::Geometry;

fn as_line_string(geom: &Geometry) -> Result<Option<LineString>> {
    if geom.is_empty() {
        return Ok(None);
    }
    match geom.as_geo() {
        geo::Geometry::LineString(line) => Ok(Some(line.clone())),
        geo::Geometry::Line(line) => Ok(Some(LineString::new(vec![line.start, line.end]))),
        geo::Geometry::MultiLineString(lines) if lines.0.len() == 1 => Ok(Some(lines.0[0].clone())),
        _ => Err(GeoFrameError::IncorrectType(
            format!(
                "linear operations require a line string, got {}",
                geom.geometry_type().wkt_tag()
            )
            .into(),
        )),
    }
}

/// Point at `distance` along each line. Negative distances count from the end; with
/// `normalized`, `distance` is a fraction of the line length.
pub fn line_interpolate_point(
    data: &[Option<Geometry>],
    args: &KernelArgs,
) -> Result<KernelOutput> {
    let distance = args.require_f64(0, "distance")?;
    let normalized = args.bool_or(1, "normalized", false)?;

    let values = try_unary_map(data, |geom| {
        let Some(line) = as_line_string(geom)? else {
            return Ok(Some(Geometry::empty_point()));
        };
        let length = line.euclidean_length();
        let mut fraction = match (normalized, length > 0.) {
            (true, _) => distance,
            (false, true) => distance / length,
            (false, false) => 0.,
        };
        if fraction < 0. {
            fraction += 1.;
        }
        let point = line.line_interpolate_point(fraction.clamp(0., 1.));
        Ok(Some(point.map_or_else(Geometry::empty_point, Geometry::from)))
    })?;
    Ok(KernelOutput::Values(Values::Geometry(values)))
}

/// Distance along each line to the point on it nearest to the point `other`.
pub fn line_locate_point(data: &[Option<Geometry>], args: &KernelArgs) -> Result<KernelOutput> {
    let other = args.require_geometry(0, "other")?;
    let normalized = args.bool_or(1, "normalized", false)?;
    let point: Point = match other.as_geo() {
        geo::Geometry::Point(point) => *point,
        _ => {
            return Err(GeoFrameError::IncorrectType(
                format!(
                    "argument 'other' must be a point, got {}",
                    other.geometry_type().wkt_tag()
                )
                .into(),
            ))
        }
    };

    let values = try_unary_map(data, |geom| {
        let Some(line) = as_line_string(geom)? else {
            return Ok(Some(f64::NAN));
        };
        if other.is_empty() {
            return Ok(Some(f64::NAN));
        }
        let fraction = line.line_locate_point(&point).unwrap_or(f64::NAN);
        Ok(Some(if normalized {
            fraction
        } else {
            fraction * line.euclidean_length()
        }))
    })?;
    Ok(KernelOutput::Values(Values::Float64(values)))
}
