use geo::{polygon, Polygon};

use crate::array::GeometryArray;

/// Counter-clockwise axis-aligned square.
pub(crate) fn square(x: f64, y: f64, size: f64) -> Polygon {
    polygon![
        (x: x, y: y),
        (x: x + size, y: y),
        (x: x + size, y: y + size),
        (x: x, y: y + size),
        (x: x, y: y),
    ]
}

/// Unit square at the origin.
pub(crate) fn poly0() -> Polygon {
    square(0., 0., 1.)
}

/// Overlaps `poly0` over `[0.5, 1] x [0.5, 1]`.
pub(crate) fn poly1() -> Polygon {
    square(0.5, 0.5, 1.)
}

/// Far away from the others.
pub(crate) fn poly2() -> Polygon {
    square(10., 10., 2.)
}

pub(crate) fn polygon_array() -> GeometryArray {
    GeometryArray::new(vec![
        Some(poly0().into()),
        Some(poly1().into()),
        Some(poly2().into()),
    ])
}
