//! Boolean set operations on polygonal geometries.

use geo::{BooleanOps, GeometryCollection, LineString, MultiPolygon, Polygon};

use crate::error::{GeoFrameError, Result};
use crate::kernel::{binary_map, KernelArgs, KernelOutput, NdArray, Values};
use crate::scalar::{is_empty_geometry, Geometry};

#[derive(Debug, Clone, Copy)]
enum Op {
    Intersection,
    Union,
    Difference,
    SymmetricDifference,
}

fn to_multi_polygon(geom: &Geometry) -> Result<MultiPolygon> {
    if is_empty_geometry(geom.as_geo()) {
        return Ok(MultiPolygon::new(vec![]));
    }
    match geom.as_geo() {
        geo::Geometry::Polygon(polygon) => Ok(MultiPolygon::new(vec![polygon.clone()])),
        geo::Geometry::MultiPolygon(polygons) => Ok(polygons.clone()),
        geo::Geometry::Rect(rect) => Ok(MultiPolygon::new(vec![rect.to_polygon()])),
        geo::Geometry::Triangle(triangle) => Ok(MultiPolygon::new(vec![triangle.to_polygon()])),
        _ => Err(GeoFrameError::IncorrectType(
            format!(
                "set operations require polygonal geometries, got {}",
                geom.geometry_type().wkt_tag()
            )
            .into(),
        )),
    }
}

/// A single polygon is unwrapped, an empty result is `POLYGON EMPTY`.
fn from_multi_polygon(mut polygons: MultiPolygon) -> Geometry {
    match polygons.0.len() {
        0 => Geometry::new(Polygon::new(LineString::new(vec![]), vec![]).into()),
        1 => Geometry::new(polygons.0.remove(0).into()),
        _ => Geometry::new(polygons.into()),
    }
}

fn apply(op: Op, left: &MultiPolygon, right: &MultiPolygon) -> MultiPolygon {
    match op {
        Op::Intersection => left.intersection(right),
        Op::Union => left.union(right),
        Op::Difference => left.difference(right),
        Op::SymmetricDifference => left.xor(right),
    }
}

fn set_operation(
    left: &NdArray<Option<Geometry>>,
    right: &NdArray<Option<Geometry>>,
    op: Op,
) -> Result<Values> {
    let values = binary_map(left, right, |l, r| {
        let result = apply(op, &to_multi_polygon(l)?, &to_multi_polygon(r)?);
        Ok(Some(from_multi_polygon(result)))
    })?;
    Ok(Values::Geometry(values))
}

pub fn intersection(
    left: &NdArray<Option<Geometry>>,
    right: &NdArray<Option<Geometry>>,
    _args: &KernelArgs,
) -> Result<Values> {
    set_operation(left, right, Op::Intersection)
}

pub fn union(
    left: &NdArray<Option<Geometry>>,
    right: &NdArray<Option<Geometry>>,
    _args: &KernelArgs,
) -> Result<Values> {
    set_operation(left, right, Op::Union)
}

pub fn difference(
    left: &NdArray<Option<Geometry>>,
    right: &NdArray<Option<Geometry>>,
    _args: &KernelArgs,
) -> Result<Values> {
    set_operation(left, right, Op::Difference)
}

pub fn symmetric_difference(
    left: &NdArray<Option<Geometry>>,
    right: &NdArray<Option<Geometry>>,
    _args: &KernelArgs,
) -> Result<Values> {
    set_operation(left, right, Op::SymmetricDifference)
}

/// Fold every non-null geometry with `op`. Nothing to fold yields `GEOMETRYCOLLECTION EMPTY`.
fn reduce(data: &[Option<Geometry>], op: Op) -> Result<KernelOutput> {
    let mut acc: Option<MultiPolygon> = None;
    for geom in data.iter().flatten() {
        let next = to_multi_polygon(geom)?;
        acc = Some(match acc {
            None => next,
            Some(acc) => apply(op, &acc, &next),
        });
    }
    let result = match acc {
        Some(polygons) => from_multi_polygon(polygons),
        None => Geometry::from(GeometryCollection::<f64>::new_from(vec![])),
    };
    Ok(KernelOutput::Geometry(Some(result)))
}

pub fn union_all(data: &[Option<Geometry>], _args: &KernelArgs) -> Result<KernelOutput> {
    reduce(data, Op::Union)
}

pub fn intersection_all(data: &[Option<Geometry>], _args: &KernelArgs) -> Result<KernelOutput> {
    reduce(data, Op::Intersection)
}

pub fn symmetric_difference_all(
    data: &[Option<Geometry>],
    _args: &KernelArgs,
) -> Result<KernelOutput> {
    reduce(data, Op::SymmetricDifference)
}

/// Union of polygons assumed to form a coverage. The general overlay gives the same result for
/// valid coverages, so this is a plain union.
pub fn coverage_union(
    left: &NdArray<Option<Geometry>>,
    right: &NdArray<Option<Geometry>>,
    _args: &KernelArgs,
) -> Result<Values> {
    set_operation(left, right, Op::Union)
}

pub fn coverage_union_all(data: &[Option<Geometry>], _args: &KernelArgs) -> Result<KernelOutput> {
    reduce(data, Op::Union)
}

#[cfg(test)]
mod test {
    use approx::assert_relative_eq;
    use geo::{point, Area};

    use super::*;
    use crate::error::ErrorKind;
    use crate::test::polygon::{poly0, poly1, poly2, square};

    fn scalar(geom: impl Into<Geometry>) -> NdArray<Option<Geometry>> {
        NdArray::scalar(Some(geom.into()))
    }

    fn single(values: Values) -> Geometry {
        values.as_geometry().unwrap().data()[0].clone().unwrap()
    }

    #[test]
    fn overlapping_squares() {
        let args = KernelArgs::new();
        let a = scalar(poly0());
        let b = scalar(poly1());

        let out = single(intersection(&a, &b, &args).unwrap());
        assert_relative_eq!(out.as_geo().unsigned_area(), 0.25);

        let out = single(union(&a, &b, &args).unwrap());
        assert_relative_eq!(out.as_geo().unsigned_area(), 1.75);

        let out = single(difference(&a, &b, &args).unwrap());
        assert_relative_eq!(out.as_geo().unsigned_area(), 0.75);

        let out = single(symmetric_difference(&a, &b, &args).unwrap());
        assert_relative_eq!(out.as_geo().unsigned_area(), 1.5);
    }

    #[test]
    fn disjoint_intersection_is_empty() {
        let out =
            single(intersection(&scalar(poly0()), &scalar(poly2()), &KernelArgs::new()).unwrap());
        assert!(out.is_empty());
        assert_eq!(out.to_string(), "POLYGON EMPTY");
    }

    #[test]
    fn nulls_propagate() {
        let left = NdArray::from_vec(vec![Some(Geometry::from(poly0())), None]);
        let out = union(&left, &scalar(poly1()), &KernelArgs::new()).unwrap();
        assert_eq!(out.as_geometry().unwrap().data()[1], None);
    }

    #[test]
    fn points_are_rejected() {
        let err = union(&scalar(point!(x: 0., y: 0.)), &scalar(poly0()), &KernelArgs::new())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Type);
    }

    #[test]
    fn reductions() {
        let data = vec![Some(Geometry::from(poly0())), None, Some(Geometry::from(poly1()))];
        let KernelOutput::Geometry(Some(out)) = union_all(&data, &KernelArgs::new()).unwrap() else {
            panic!("expected a geometry");
        };
        assert_relative_eq!(out.as_geo().unsigned_area(), 1.75);

        let KernelOutput::Geometry(Some(out)) =
            intersection_all(&data, &KernelArgs::new()).unwrap()
        else {
            panic!("expected a geometry");
        };
        assert_relative_eq!(out.as_geo().unsigned_area(), 0.25);

        let KernelOutput::Geometry(Some(out)) = union_all(&[None], &KernelArgs::new()).unwrap()
        else {
            panic!("expected a geometry");
        };
        assert_eq!(out.to_string(), "GEOMETRYCOLLECTION EMPTY");
    }

    #[test]
    fn symmetric_difference_reduction() {
        let data = vec![Some(Geometry::from(poly0())), Some(Geometry::from(poly1()))];
        let KernelOutput::Geometry(Some(out)) =
            symmetric_difference_all(&data, &KernelArgs::new()).unwrap()
        else {
            panic!("expected a geometry");
        };
        assert_relative_eq!(out.as_geo().unsigned_area(), 1.5);
    }

    #[test]
    fn coverage_union_of_adjacent_squares() {
        let left = scalar(square(0., 0., 1.));
        let right = scalar(square(1., 0., 1.));
        let out = single(coverage_union(&left, &right, &KernelArgs::new()).unwrap());
        assert_relative_eq!(out.as_geo().unsigned_area(), 2.);
        assert_eq!(out.geometry_type(), crate::scalar::GeometryType::Polygon);

        let data = vec![
            Some(Geometry::from(square(0., 0., 1.))),
            None,
            Some(Geometry::from(square(1., 0., 1.))),
        ];
        let KernelOutput::Geometry(Some(out)) =
            coverage_union_all(&data, &KernelArgs::new()).unwrap()
        else {
            panic!("expected a geometry");
        };
        assert_relative_eq!(out.as_geo().unsigned_area(), 2.);
    }
}
