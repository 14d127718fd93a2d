//! The static list of column-level operations.

/// Labels of the four bounding box values.
pub const BOUNDS_LABELS: &[&str] = &["xmin", "ymin", "xmax", "ymax"];

/// What an operation returns, and how the kernel result is wrapped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultShape {
    /// One value per row, labeled like the input.
    PerRow,
    /// A fixed-width row of values per input row, returned as a table with these columns.
    RowVector(&'static [&'static str]),
    /// A summary of the whole column. The result is labeled with these labels, or by position if
    /// there are none.
    Reduce(&'static [&'static str]),
    /// The kernel result, unwrapped.
    PassThrough,
    /// A binary operation, see [`apply_binary`](crate::dispatch::apply_binary).
    Binary,
}

/// Whether an operation can be applied to every geometry column of a table at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expansion {
    None,
    /// One result column per geometry column, with the table's row labels. May replace the
    /// source columns in place.
    PerColumn,
    /// One summary column per geometry column.
    Summary,
}

/// Binds an operation name to a kernel function and describes its result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperationDescriptor {
    pub name: &'static str,
    /// Path of the kernel function, see [`kernel::lookup`](crate::kernel::lookup).
    pub kernel: &'static str,
    pub shape: ResultShape,
    /// Whether values are geometries, wrapped in a [`GeometryArray`](crate::GeometryArray).
    pub geometry_output: bool,
    pub expansion: Expansion,
}

const fn per_row(
    name: &'static str,
    kernel: &'static str,
    geometry_output: bool,
) -> OperationDescriptor {
    OperationDescriptor {
        name,
        kernel,
        shape: ResultShape::PerRow,
        geometry_output,
        expansion: Expansion::PerColumn,
    }
}

const fn binary(
    name: &'static str,
    kernel: &'static str,
    geometry_output: bool,
) -> OperationDescriptor {
    OperationDescriptor {
        name,
        kernel,
        shape: ResultShape::Binary,
        geometry_output,
        expansion: Expansion::None,
    }
}

const fn pass_through(name: &'static str, kernel: &'static str) -> OperationDescriptor {
    OperationDescriptor {
        name,
        kernel,
        shape: ResultShape::PassThrough,
        geometry_output: false,
        expansion: Expansion::None,
    }
}

pub static OPERATIONS: &[OperationDescriptor] = &[
    // measurement
    per_row("area", "measurement.area", false),
    OperationDescriptor {
        name: "bounds",
        kernel: "measurement.bounds",
        shape: ResultShape::RowVector(BOUNDS_LABELS),
        geometry_output: false,
        expansion: Expansion::None,
    },
    binary("distance", "measurement.distance", false),
    binary("frechet_distance", "measurement.frechet_distance", false),
    binary("hausdorff_distance", "measurement.hausdorff_distance", false),
    per_row("length", "measurement.length", false),
    OperationDescriptor {
        name: "total_bounds",
        kernel: "measurement.total_bounds",
        shape: ResultShape::Reduce(BOUNDS_LABELS),
        geometry_output: false,
        expansion: Expansion::Summary,
    },
    // predicates
    binary("contains", "predicates.contains", false),
    binary("covered_by", "predicates.covered_by", false),
    binary("covers", "predicates.covers", false),
    binary("crosses", "predicates.crosses", false),
    binary("disjoint", "predicates.disjoint", false),
    binary("equals", "predicates.equals", false),
    binary("equals_exact", "predicates.equals_exact", false),
    per_row("has_z", "predicates.has_z", false),
    binary("intersects", "predicates.intersects", false),
    per_row("is_ccw", "predicates.is_ccw", false),
    per_row("is_closed", "predicates.is_closed", false),
    per_row("is_empty", "predicates.is_empty", false),
    per_row("is_geometry", "predicates.is_geometry", false),
    per_row("is_missing", "predicates.is_missing", false),
    per_row("is_ring", "predicates.is_ring", false),
    binary("overlaps", "predicates.overlaps", false),
    binary("relate", "predicates.relate", false),
    binary("relate_pattern", "predicates.relate_pattern", false),
    binary("touches", "predicates.touches", false),
    binary("within", "predicates.within", false),
    // set operations
    binary("coverage_union", "set_operations.coverage_union", true),
    pass_through("coverage_union_all", "set_operations.coverage_union_all"),
    binary("difference", "set_operations.difference", true),
    binary("intersection", "set_operations.intersection", true),
    pass_through("intersection_all", "set_operations.intersection_all"),
    binary("symmetric_difference", "set_operations.symmetric_difference", true),
    pass_through("symmetric_difference_all", "set_operations.symmetric_difference_all"),
    binary("union", "set_operations.union", true),
    pass_through("union_all", "set_operations.union_all"),
    // constructive
    per_row("boundary", "constructive.boundary", true),
    per_row("centroid", "constructive.centroid", true),
    per_row("clip_by_rect", "constructive.clip_by_rect", true),
    per_row("convex_hull", "constructive.convex_hull", true),
    per_row("envelope", "constructive.envelope", true),
    per_row("extract_unique_points", "constructive.extract_unique_points", true),
    per_row("point_on_surface", "constructive.point_on_surface", true),
    per_row("reverse", "constructive.reverse", true),
    per_row("simplify", "constructive.simplify", true),
    // linear
    per_row("line_interpolate_point", "linear.line_interpolate_point", true),
    per_row("line_locate_point", "linear.line_locate_point", false),
    // coordinates
    per_row("count_coordinates", "coordinates.count_coordinates", false),
    pass_through("get_coordinates", "coordinates.get_coordinates"),
    // spatial index
    pass_through("STRtree", "strtree.STRtree"),
];
