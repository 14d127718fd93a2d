//! Bulk geometry functions over buffers of geometry handles.
//!
//! Every function works on a buffer of `Option<Geometry>` and comes in one of two shapes:
//!
//! - [`UnaryKernel`]: one flat buffer plus [`KernelArgs`], returning a [`KernelOutput`].
//! - [`BinaryKernel`]: two n-dimensional buffers broadcast against each other, returning
//!   [`Values`] of the broadcast shape.
//!
//! Functions are registered by path (`"namespace.name"`) in a static table, see [`lookup`].

use phf::phf_map;

use crate::error::Result;
use crate::scalar::Geometry;

mod args;
pub mod constructive;
pub mod coordinates;
pub mod eq;
pub mod linear;
pub mod measurement;
mod ndarray;
pub mod predicates;
pub mod set_operations;
pub mod strtree;
mod values;

pub use args::KernelArgs;
pub use ndarray::{broadcast_map, broadcast_shapes, NdArray};
pub use strtree::SpatialIndex;
pub use values::Values;

pub type UnaryKernel = fn(&[Option<Geometry>], &KernelArgs) -> Result<KernelOutput>;

pub type BinaryKernel =
    fn(&NdArray<Option<Geometry>>, &NdArray<Option<Geometry>>, &KernelArgs) -> Result<Values>;

/// A kernel function, tagged by how many geometry operands it takes.
#[derive(Clone, Copy)]
pub enum KernelFunction {
    Unary(UnaryKernel),
    Binary(BinaryKernel),
}

impl KernelFunction {
    pub fn arity(&self) -> usize {
        match self {
            KernelFunction::Unary(_) => 1,
            KernelFunction::Binary(_) => 2,
        }
    }
}

impl std::fmt::Debug for KernelFunction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "KernelFunction(arity = {})", self.arity())
    }
}

/// What a unary kernel function produced.
#[derive(Debug, Clone)]
pub enum KernelOutput {
    /// One value per row, a fixed-width row per input row, or a reduced vector.
    Values(Values),
    /// A single geometry summarizing the whole buffer.
    Geometry(Option<Geometry>),
    /// A derived spatial structure.
    SpatialIndex(SpatialIndex),
}

impl KernelOutput {
    pub fn into_values(self) -> Option<Values> {
        match self {
            KernelOutput::Values(values) => Some(values),
            _ => None,
        }
    }
}

static KERNELS: phf::Map<&'static str, KernelFunction> = phf_map! {
    "measurement.area" => KernelFunction::Unary(measurement::area),
    "measurement.length" => KernelFunction::Unary(measurement::length),
    "measurement.bounds" => KernelFunction::Unary(measurement::bounds),
    "measurement.total_bounds" => KernelFunction::Unary(measurement::total_bounds),
    "measurement.distance" => KernelFunction::Binary(measurement::distance),
    "measurement.hausdorff_distance" => KernelFunction::Binary(measurement::hausdorff_distance),
    "measurement.frechet_distance" => KernelFunction::Binary(measurement::frechet_distance),

    "predicates.is_empty" => KernelFunction::Unary(predicates::is_empty),
    "predicates.is_missing" => KernelFunction::Unary(predicates::is_missing),
    "predicates.is_geometry" => KernelFunction::Unary(predicates::is_geometry),
    "predicates.is_closed" => KernelFunction::Unary(predicates::is_closed),
    "predicates.is_ccw" => KernelFunction::Unary(predicates::is_ccw),
    "predicates.is_ring" => KernelFunction::Unary(predicates::is_ring),
    "predicates.has_z" => KernelFunction::Unary(predicates::has_z),
    "predicates.contains" => KernelFunction::Binary(predicates::contains),
    "predicates.covered_by" => KernelFunction::Binary(predicates::covered_by),
    "predicates.covers" => KernelFunction::Binary(predicates::covers),
    "predicates.crosses" => KernelFunction::Binary(predicates::crosses),
    "predicates.disjoint" => KernelFunction::Binary(predicates::disjoint),
    "predicates.equals" => KernelFunction::Binary(predicates::equals),
    "predicates.equals_exact" => KernelFunction::Binary(predicates::equals_exact),
    "predicates.intersects" => KernelFunction::Binary(predicates::intersects),
    "predicates.overlaps" => KernelFunction::Binary(predicates::overlaps),
    "predicates.touches" => KernelFunction::Binary(predicates::touches),
    "predicates.within" => KernelFunction::Binary(predicates::within),
    "predicates.relate_pattern" => KernelFunction::Binary(predicates::relate_pattern),
    "predicates.relate" => KernelFunction::Binary(predicates::relate),

    "set_operations.difference" => KernelFunction::Binary(set_operations::difference),
    "set_operations.intersection" => KernelFunction::Binary(set_operations::intersection),
    "set_operations.symmetric_difference" => KernelFunction::Binary(set_operations::symmetric_difference),
    "set_operations.union" => KernelFunction::Binary(set_operations::union),
    "set_operations.union_all" => KernelFunction::Unary(set_operations::union_all),
    "set_operations.intersection_all" => KernelFunction::Unary(set_operations::intersection_all),
    "set_operations.symmetric_difference_all" => KernelFunction::Unary(set_operations::symmetric_difference_all),
    "set_operations.coverage_union" => KernelFunction::Binary(set_operations::coverage_union),
    "set_operations.coverage_union_all" => KernelFunction::Unary(set_operations::coverage_union_all),

    "constructive.boundary" => KernelFunction::Unary(constructive::boundary),
    "constructive.centroid" => KernelFunction::Unary(constructive::centroid),
    "constructive.clip_by_rect" => KernelFunction::Unary(constructive::clip_by_rect),
    "constructive.convex_hull" => KernelFunction::Unary(constructive::convex_hull),
    "constructive.envelope" => KernelFunction::Unary(constructive::envelope),
    "constructive.extract_unique_points" => KernelFunction::Unary(constructive::extract_unique_points),
    "constructive.point_on_surface" => KernelFunction::Unary(constructive::point_on_surface),
    "constructive.reverse" => KernelFunction::Unary(constructive::reverse),
    "constructive.simplify" => KernelFunction::Unary(constructive::simplify),

    "linear.line_interpolate_point" => KernelFunction::Unary(linear::line_interpolate_point),
    "linear.line_locate_point" => KernelFunction::Unary(linear::line_locate_point),

    "coordinates.count_coordinates" => KernelFunction::Unary(coordinates::count_coordinates),
    "coordinates.get_coordinates" => KernelFunction::Unary(coordinates::get_coordinates),

    "strtree.STRtree" => KernelFunction::Unary(strtree::str_tree),
};

/// Resolve a kernel function by its dotted path, e.g. `"predicates.intersects"`.
pub fn lookup(path: &str) -> Option<KernelFunction> {
    KERNELS.get(path).copied()
}

/// All registered kernel paths, in no particular order.
pub fn paths() -> impl Iterator<Item = &'static str> {
    KERNELS.keys().copied()
}

/// Map every non-null geometry, keeping nulls.
pub(crate) fn unary_map<T>(
    data: &[Option<Geometry>],
    mut op: impl FnMut(&Geometry) -> Option<T>,
) -> NdArray<Option<T>> {
    NdArray::from_vec(data.iter().map(|geom| geom.as_ref().and_then(&mut op)).collect())
}

pub(crate) fn try_unary_map<T>(
    data: &[Option<Geometry>],
    mut op: impl FnMut(&Geometry) -> Result<Option<T>>,
) -> Result<NdArray<Option<T>>> {
    let values = data
        .iter()
        .map(|geom| match geom {
            Some(geom) => op(geom),
            None => Ok(None),
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(NdArray::from_vec(values))
}

/// Broadcast two operands and map every pair where both sides are non-null.
pub(crate) fn binary_map<T>(
    left: &NdArray<Option<Geometry>>,
    right: &NdArray<Option<Geometry>>,
    mut op: impl FnMut(&Geometry, &Geometry) -> Result<Option<T>>,
) -> Result<NdArray<Option<T>>> {
    broadcast_map(left, right, |l, r| match (l, r) {
        (Some(l), Some(r)) => op(l, r),
        _ => Ok(None),
    })
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn every_path_is_namespaced() {
        for path in paths() {
            assert!(path.contains('.'), "{path}");
            assert!(lookup(path).is_some());
        }
        assert!(lookup("predicates.nonexistent").is_none());
    }

    #[test]
    fn arity() {
        assert_eq!(lookup("measurement.area").unwrap().arity(), 1);
        assert_eq!(lookup("predicates.intersects").unwrap().arity(), 2);
    }
}
