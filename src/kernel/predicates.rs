//! Unary and binary spatial predicates.
//!
//! Binary predicates follow the DE-9IM definitions. Any predicate involving an empty geometry is
//! false, except `disjoint` which is true.

use geo::coordinate_position::CoordPos;
use geo::dimensions::{Dimensions, HasDimensions};
use geo::{Intersects, Line, LineString, Relate, Winding};

use crate::error::{GeoFrameError, Result};
use crate::kernel::{binary_map, unary_map, KernelArgs, KernelOutput, NdArray, Values};
use crate::scalar::Geometry;

pub fn is_empty(data: &[Option<Geometry>], _args: &KernelArgs) -> Result<KernelOutput> {
    let values = unary_map(data, |geom| Some(geom.is_empty()));
    Ok(KernelOutput::Values(Values::Boolean(values)))
}

/// Never null: true exactly where the buffer holds no geometry.
pub fn is_missing(data: &[Option<Geometry>], _args: &KernelArgs) -> Result<KernelOutput> {
    let values = data.iter().map(|geom| Some(geom.is_none())).collect();
    Ok(KernelOutput::Values(Values::Boolean(NdArray::from_vec(values))))
}

/// Never null: the complement of [`is_missing`].
pub fn is_geometry(data: &[Option<Geometry>], _args: &KernelArgs) -> Result<KernelOutput> {
    let values = data.iter().map(|geom| Some(geom.is_some())).collect();
    Ok(KernelOutput::Values(Values::Boolean(NdArray::from_vec(values))))
}

/// Whether linear geometries start and end at the same coordinate. False for everything else.
pub fn is_closed(data: &[Option<Geometry>], _args: &KernelArgs) -> Result<KernelOutput> {
    let values = unary_map(data, |geom| {
        Some(match geom.as_geo() {
            _ if geom.is_empty() => false,
            geo::Geometry::LineString(line) => line.is_closed(),
            geo::Geometry::MultiLineString(lines) => lines.is_closed(),
            geo::Geometry::Line(line) => line.start == line.end,
            _ => false,
        })
    });
    Ok(KernelOutput::Values(Values::Boolean(values)))
}

fn is_simple_line(line: &LineString) -> bool {
    let segments: Vec<Line> = line.lines().collect();
    let closed = line.is_closed();
    for (i, a) in segments.iter().enumerate() {
        for (j, b) in segments.iter().enumerate().skip(i + 2) {
            if closed && i == 0 && j == segments.len() - 1 {
                continue;
            }
            if a.intersects(b) {
                return false;
            }
        }
    }
    true
}

/// Whether a line string is closed and does not cross itself. False for everything else.
pub fn is_ring(data: &[Option<Geometry>], _args: &KernelArgs) -> Result<KernelOutput> {
    let values = unary_map(data, |geom| {
        Some(match geom.as_geo() {
            geo::Geometry::LineString(line) => {
                !line.0.is_empty() && line.is_closed() && is_simple_line(line)
            }
            _ => false,
        })
    });
    Ok(KernelOutput::Values(Values::Boolean(values)))
}

/// Coordinates are two-dimensional, so this is false for every geometry.
pub fn has_z(data: &[Option<Geometry>], _args: &KernelArgs) -> Result<KernelOutput> {
    let values = unary_map(data, |_| Some(false));
    Ok(KernelOutput::Values(Values::Boolean(values)))
}

/// Whether a line string is oriented counter-clockwise. False for everything else.
pub fn is_ccw(data: &[Option<Geometry>], _args: &KernelArgs) -> Result<KernelOutput> {
    let values = unary_map(data, |geom| {
        Some(match geom.as_geo() {
            geo::Geometry::LineString(line) => line.is_ccw(),
            _ => false,
        })
    });
    Ok(KernelOutput::Values(Values::Boolean(values)))
}

fn relate_matches(left: &Geometry, right: &Geometry, patterns: &[&str]) -> Result<bool> {
    let matrix = left.as_geo().relate(right.as_geo());
    for pattern in patterns {
        let matched = matrix
            .matches(pattern)
            .map_err(|_| {
                GeoFrameError::InvalidValue(format!("invalid DE-9IM pattern '{pattern}'").into())
            })?;
        if matched {
            return Ok(true);
        }
    }
    Ok(false)
}

fn dimension(geom: &Geometry) -> u8 {
    match geom.as_geo().dimensions() {
        Dimensions::Empty => 0,
        Dimensions::ZeroDimensional => 0,
        Dimensions::OneDimensional => 1,
        Dimensions::TwoDimensional => 2,
    }
}

/// Evaluate a predicate over broadcast operands, with the empty-operand rule applied.
fn predicate(
    left: &NdArray<Option<Geometry>>,
    right: &NdArray<Option<Geometry>>,
    if_empty: bool,
    op: impl Fn(&Geometry, &Geometry) -> Result<bool>,
) -> Result<Values> {
    let values = binary_map(left, right, |l, r| {
        if l.is_empty() || r.is_empty() {
            return Ok(Some(if_empty));
        }
        op(l, r).map(Some)
    })?;
    Ok(Values::Boolean(values))
}

pub fn intersects(
    left: &NdArray<Option<Geometry>>,
    right: &NdArray<Option<Geometry>>,
    _args: &KernelArgs,
) -> Result<Values> {
    predicate(left, right, false, |l, r| Ok(l.as_geo().intersects(r.as_geo())))
}

pub fn disjoint(
    left: &NdArray<Option<Geometry>>,
    right: &NdArray<Option<Geometry>>,
    _args: &KernelArgs,
) -> Result<Values> {
    predicate(left, right, true, |l, r| Ok(!l.as_geo().intersects(r.as_geo())))
}

pub fn contains(
    left: &NdArray<Option<Geometry>>,
    right: &NdArray<Option<Geometry>>,
    _args: &KernelArgs,
) -> Result<Values> {
    predicate(left, right, false, |l, r| relate_matches(l, r, &["T*****FF*"]))
}

pub fn within(
    left: &NdArray<Option<Geometry>>,
    right: &NdArray<Option<Geometry>>,
    _args: &KernelArgs,
) -> Result<Values> {
    predicate(left, right, false, |l, r| relate_matches(l, r, &["T*F**F***"]))
}

pub fn covers(
    left: &NdArray<Option<Geometry>>,
    right: &NdArray<Option<Geometry>>,
    _args: &KernelArgs,
) -> Result<Values> {
    predicate(left, right, false, |l, r| {
        relate_matches(l, r, &["T*****FF*", "*T****FF*", "***T**FF*", "****T*FF*"])
    })
}

pub fn covered_by(
    left: &NdArray<Option<Geometry>>,
    right: &NdArray<Option<Geometry>>,
    _args: &KernelArgs,
) -> Result<Values> {
    predicate(left, right, false, |l, r| {
        relate_matches(l, r, &["T*F**F***", "*TF**F***", "**FT*F***", "**F*TF***"])
    })
}

pub fn touches(
    left: &NdArray<Option<Geometry>>,
    right: &NdArray<Option<Geometry>>,
    _args: &KernelArgs,
) -> Result<Values> {
    predicate(left, right, false, |l, r| {
        relate_matches(l, r, &["FT*******", "F**T*****", "F***T****"])
    })
}

pub fn crosses(
    left: &NdArray<Option<Geometry>>,
    right: &NdArray<Option<Geometry>>,
    _args: &KernelArgs,
) -> Result<Values> {
    predicate(left, right, false, |l, r| {
        match (dimension(l), dimension(r)) {
            (1, 1) => relate_matches(l, r, &["0********"]),
            (a, b) if a < b => relate_matches(l, r, &["T*T******"]),
            (a, b) if a > b => relate_matches(l, r, &["T*****T**"]),
            _ => Ok(false),
        }
    })
}

pub fn overlaps(
    left: &NdArray<Option<Geometry>>,
    right: &NdArray<Option<Geometry>>,
    _args: &KernelArgs,
) -> Result<Values> {
    predicate(left, right, false, |l, r| {
        match (dimension(l), dimension(r)) {
            (1, 1) => relate_matches(l, r, &["1*T***T**"]),
            (a, b) if a == b => relate_matches(l, r, &["T*T***T**"]),
            _ => Ok(false),
        }
    })
}

/// Topological equality: same point set, regardless of vertex order or type.
pub fn equals(
    left: &NdArray<Option<Geometry>>,
    right: &NdArray<Option<Geometry>>,
    _args: &KernelArgs,
) -> Result<Values> {
    predicate(left, right, false, |l, r| relate_matches(l, r, &["T*F**FFF*"]))
}

/// Structural equality with every coordinate within `tolerance` (default 0).
pub fn equals_exact(
    left: &NdArray<Option<Geometry>>,
    right: &NdArray<Option<Geometry>>,
    args: &KernelArgs,
) -> Result<Values> {
    let tolerance = args.f64_or(0, "tolerance", 0.)?;
    let values = binary_map(left, right, |l, r| Ok(Some(l.equals_exact(r, tolerance))))?;
    Ok(Values::Boolean(values))
}

/// Whether the DE-9IM matrix of each pair matches `pattern`.
pub fn relate_pattern(
    left: &NdArray<Option<Geometry>>,
    right: &NdArray<Option<Geometry>>,
    args: &KernelArgs,
) -> Result<Values> {
    let pattern = args.require_str(0, "pattern")?;
    if pattern.len() != 9 {
        return Err(GeoFrameError::InvalidValue(
            format!("DE-9IM pattern must have 9 characters, got '{pattern}'").into(),
        ));
    }
    predicate(left, right, false, |l, r| relate_matches(l, r, &[pattern]))
}

fn dimension_char(dim: Dimensions) -> char {
    match dim {
        Dimensions::Empty => 'F',
        Dimensions::ZeroDimensional => '0',
        Dimensions::OneDimensional => '1',
        Dimensions::TwoDimensional => '2',
    }
}

/// The DE-9IM matrix of each pair as a 9 character string, row by row.
pub fn relate(
    left: &NdArray<Option<Geometry>>,
    right: &NdArray<Option<Geometry>>,
    _args: &KernelArgs,
) -> Result<Values> {
    const POSITIONS: [CoordPos; 3] = [CoordPos::Inside, CoordPos::OnBoundary, CoordPos::Outside];
    let values = binary_map(left, right, |l, r| {
        let matrix = l.as_geo().relate(r.as_geo());
        let text = POSITIONS
            .iter()
            .flat_map(|a| POSITIONS.iter().map(move |b| (*a, *b)))
            .map(|(a, b)| dimension_char(matrix.get(a, b)))
            .collect::<String>();
        Ok(Some(text))
    })?;
    Ok(Values::Utf8(values))
}

#[cfg(test)]
mod test {
    use geo::{line_string, point};

    use super::*;
    use crate::test::linestring::{ls0, ls1};
    use crate::test::polygon::{poly0, poly1, poly2};

    fn booleans(values: Values) -> Vec<Option<bool>> {
        values.as_boolean().unwrap().data().to_vec()
    }

    fn unary_booleans(output: KernelOutput) -> Vec<Option<bool>> {
        booleans(output.into_values().unwrap())
    }

    fn scalar(geom: impl Into<Geometry>) -> NdArray<Option<Geometry>> {
        NdArray::scalar(Some(geom.into()))
    }

    #[test]
    fn missing_is_never_null() {
        let data = vec![Some(Geometry::from(poly0())), None];
        let args = KernelArgs::new();
        assert_eq!(
            unary_booleans(is_missing(&data, &args).unwrap()),
            vec![Some(false), Some(true)]
        );
        assert_eq!(
            unary_booleans(is_geometry(&data, &args).unwrap()),
            vec![Some(true), Some(false)]
        );
        assert_eq!(
            unary_booleans(is_empty(&data, &args).unwrap()),
            vec![Some(false), None]
        );
    }

    #[test]
    fn closed_and_ccw() {
        let data = vec![
            Some(Geometry::from(ls0())),
            Some(Geometry::from(ls1())),
            Some(Geometry::from(poly0())),
        ];
        let args = KernelArgs::new();
        assert_eq!(
            unary_booleans(is_closed(&data, &args).unwrap()),
            vec![Some(false), Some(true), Some(false)]
        );
        assert_eq!(
            unary_booleans(is_ccw(&data, &args).unwrap()),
            vec![Some(false), Some(true), Some(false)]
        );
    }

    #[test]
    fn rings() {
        let bowtie = line_string![
            (x: 0., y: 0.),
            (x: 1., y: 1.),
            (x: 1., y: 0.),
            (x: 0., y: 1.),
            (x: 0., y: 0.),
        ];
        let data = vec![
            Some(Geometry::from(ls1())),
            Some(Geometry::from(ls0())),
            Some(Geometry::from(bowtie)),
            Some(Geometry::from(poly0())),
            None,
        ];
        assert_eq!(
            unary_booleans(is_ring(&data, &KernelArgs::new()).unwrap()),
            vec![Some(true), Some(false), Some(false), Some(false), None]
        );
    }

    #[test]
    fn coordinates_are_planar() {
        let data = vec![Some(Geometry::from(poly0())), None, Some(Geometry::empty_point())];
        assert_eq!(
            unary_booleans(has_z(&data, &KernelArgs::new()).unwrap()),
            vec![Some(false), None, Some(false)]
        );
    }

    #[test]
    fn relate_matrix() {
        let args = KernelArgs::new();
        let polys = NdArray::from_vec(vec![
            Some(Geometry::from(poly0())),
            Some(Geometry::from(poly2())),
            None,
        ]);
        let out = relate(&polys, &scalar(poly1()), &args).unwrap();
        assert_eq!(
            out.as_utf8().unwrap().data().to_vec(),
            vec![Some("212101212".to_string()), Some("FF2FF1212".to_string()), None]
        );
        let out = relate(&scalar(point!(x: 0.5, y: 0.5)), &scalar(poly0()), &args).unwrap();
        assert_eq!(out.as_utf8().unwrap().data()[0].as_deref(), Some("0FFFFF212"));
    }

    #[test]
    fn polygon_relations() {
        let args = KernelArgs::new();
        let polys = NdArray::from_vec(vec![
            Some(Geometry::from(poly0())),
            Some(Geometry::from(poly1())),
            Some(Geometry::from(poly2())),
            None,
        ]);
        let other = scalar(poly0());

        assert_eq!(
            booleans(intersects(&polys, &other, &args).unwrap()),
            vec![Some(true), Some(true), Some(false), None]
        );
        assert_eq!(
            booleans(disjoint(&polys, &other, &args).unwrap()),
            vec![Some(false), Some(false), Some(true), None]
        );
        assert_eq!(
            booleans(overlaps(&polys, &other, &args).unwrap()),
            vec![Some(false), Some(true), Some(false), None]
        );
        assert_eq!(
            booleans(equals(&polys, &other, &args).unwrap()),
            vec![Some(true), Some(false), Some(false), None]
        );
    }

    #[test]
    fn point_in_polygon() {
        let args = KernelArgs::new();
        let inside = scalar(point!(x: 0.5, y: 0.5));
        let corner = scalar(point!(x: 0., y: 0.));
        let square = scalar(poly0());

        assert_eq!(booleans(contains(&square, &inside, &args).unwrap()), vec![Some(true)]);
        assert_eq!(booleans(within(&inside, &square, &args).unwrap()), vec![Some(true)]);
        assert_eq!(booleans(contains(&square, &corner, &args).unwrap()), vec![Some(false)]);
        assert_eq!(booleans(covers(&square, &corner, &args).unwrap()), vec![Some(true)]);
        assert_eq!(booleans(covered_by(&corner, &square, &args).unwrap()), vec![Some(true)]);
        assert_eq!(booleans(touches(&corner, &square, &args).unwrap()), vec![Some(true)]);
    }

    #[test]
    fn line_crosses_polygon() {
        let args = KernelArgs::new();
        let line = scalar(line_string![(x: -1., y: 0.5), (x: 2., y: 0.5)]);
        assert_eq!(
            booleans(crosses(&line, &scalar(poly0()), &args).unwrap()),
            vec![Some(true)]
        );
    }

    #[test]
    fn empty_operands() {
        let args = KernelArgs::new();
        let empty = NdArray::scalar(Some(Geometry::empty_point()));
        let square = scalar(poly0());
        assert_eq!(booleans(intersects(&empty, &square, &args).unwrap()), vec![Some(false)]);
        assert_eq!(booleans(disjoint(&empty, &square, &args).unwrap()), vec![Some(true)]);
    }

    #[test]
    fn exact_equality_tolerance() {
        let a = scalar(point!(x: 0., y: 0.));
        let b = scalar(point!(x: 0.01, y: 0.));
        let args = KernelArgs::new();
        assert_eq!(booleans(equals_exact(&a, &b, &args).unwrap()), vec![Some(false)]);
        let args = KernelArgs::new().with_keyword("tolerance", 0.1);
        assert_eq!(booleans(equals_exact(&a, &b, &args).unwrap()), vec![Some(true)]);
    }

    #[test]
    fn pattern() {
        let square = scalar(poly0());
        let args = KernelArgs::new().with_keyword("pattern", "2********");
        assert_eq!(
            booleans(relate_pattern(&square, &scalar(poly1()), &args).unwrap()),
            vec![Some(true)]
        );
        let args = KernelArgs::new().with_keyword("pattern", "2*");
        assert!(relate_pattern(&square, &square, &args).is_err());
        assert!(relate_pattern(&square, &square, &KernelArgs::new()).is_err());
    }
}
