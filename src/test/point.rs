use geo::{point, Point};

use crate::array::GeometryArray;

pub(crate) fn p0() -> Point {
    point!(
        x: 0., y: 0.
    )
}

pub(crate) fn p1() -> Point {
    point!(
        x: 1., y: 1.
    )
}

pub(crate) fn p2() -> Point {
    point!(
        x: 2., y: 3.
    )
}

/// `[POINT (0 0), POINT (1 1), null]`
pub(crate) fn point_array() -> GeometryArray {
    GeometryArray::new(vec![Some(p0().into()), Some(p1().into()), None])
}
