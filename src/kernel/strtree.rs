//! A packed R-tree over the bounding boxes of a geometry buffer.

use rstar::primitives::{GeomWithData, Rectangle};
use rstar::{RStarInsertionStrategy, RTree, RTreeParams, AABB};

use crate::error::{GeoFrameError, Result};
use crate::kernel::{lookup, KernelArgs, KernelFunction, KernelOutput, NdArray};
use crate::scalar::Geometry;

type Entry = GeomWithData<Rectangle<[f64; 2]>, usize>;

const DEFAULT_NODE_CAPACITY: usize = 10;

/// Node size parameters with a maximum of `MAX` children per node.
#[derive(Debug, Clone, Copy)]
struct NodeParams<const MAX: usize>;

impl<const MAX: usize> RTreeParams for NodeParams<MAX> {
    const MIN_SIZE: usize = if MAX / 3 > 1 { MAX / 3 } else { 1 };
    const MAX_SIZE: usize = MAX;
    const REINSERTION_COUNT: usize = if MAX / 3 > 1 { MAX / 3 } else { 1 };
    type DefaultInsertionStrategy = RStarInsertionStrategy;
}

/// A bulk-loaded tree, packed with the smallest supported fan-out that fits the requested node
/// capacity. Capacities above 64 are packed 64 wide.
#[derive(Debug, Clone)]
enum Tree {
    Four(RTree<Entry, NodeParams<4>>),
    Eight(RTree<Entry, NodeParams<8>>),
    Sixteen(RTree<Entry, NodeParams<16>>),
    ThirtyTwo(RTree<Entry, NodeParams<32>>),
    SixtyFour(RTree<Entry, NodeParams<64>>),
}

macro_rules! with_tree {
    ($tree:expr, $name:ident => $body:expr) => {
        match $tree {
            Tree::Four($name) => $body,
            Tree::Eight($name) => $body,
            Tree::Sixteen($name) => $body,
            Tree::ThirtyTwo($name) => $body,
            Tree::SixtyFour($name) => $body,
        }
    };
}

impl Tree {
    fn bulk_load(entries: Vec<Entry>, node_capacity: usize) -> Self {
        match node_capacity {
            0..=4 => Tree::Four(RTree::bulk_load_with_params(entries)),
            5..=8 => Tree::Eight(RTree::bulk_load_with_params(entries)),
            9..=16 => Tree::Sixteen(RTree::bulk_load_with_params(entries)),
            17..=32 => Tree::ThirtyTwo(RTree::bulk_load_with_params(entries)),
            _ => Tree::SixtyFour(RTree::bulk_load_with_params(entries)),
        }
    }

    fn fan_out(&self) -> usize {
        match self {
            Tree::Four(_) => 4,
            Tree::Eight(_) => 8,
            Tree::Sixteen(_) => 16,
            Tree::ThirtyTwo(_) => 32,
            Tree::SixtyFour(_) => 64,
        }
    }

    fn size(&self) -> usize {
        with_tree!(self, tree => tree.size())
    }

    fn locate(&self, envelope: &AABB<[f64; 2]>) -> Vec<usize> {
        with_tree!(self, tree => tree
            .locate_in_envelope_intersecting(envelope)
            .map(|entry| entry.data)
            .collect())
    }
}

/// Spatial index over the non-null, non-empty geometries of a buffer.
///
/// Queries report positions in the buffer the index was built from.
#[derive(Debug, Clone)]
pub struct SpatialIndex {
    tree: Tree,
    geometries: Vec<Option<Geometry>>,
    node_capacity: usize,
}

fn envelope(geom: &Geometry) -> Option<([f64; 2], [f64; 2])> {
    use geo::BoundingRect;

    if geom.is_empty() {
        return None;
    }
    let rect = geom.as_geo().bounding_rect()?;
    Some(([rect.min().x, rect.min().y], [rect.max().x, rect.max().y]))
}

impl SpatialIndex {
    pub fn new(data: &[Option<Geometry>], node_capacity: usize) -> Self {
        let entries = data
            .iter()
            .enumerate()
            .filter_map(|(i, geom)| {
                let (min, max) = envelope(geom.as_ref()?)?;
                Some(GeomWithData::new(Rectangle::from_corners(min, max), i))
            })
            .collect();
        Self {
            tree: Tree::bulk_load(entries, node_capacity),
            geometries: data.to_vec(),
            node_capacity,
        }
    }

    /// Number of indexed geometries.
    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn node_capacity(&self) -> usize {
        self.node_capacity
    }

    /// Maximum children per node of the packed tree, at least [`Self::node_capacity`] up to 64.
    pub fn fan_out(&self) -> usize {
        self.tree.fan_out()
    }

    pub fn geometries(&self) -> &[Option<Geometry>] {
        &self.geometries
    }

    /// Positions whose bounding box intersects the bounding box of `geometry`, refined by the
    /// binary predicate named `predicate` (`"intersects"`, `"contains"`, `"within"`, ...)
    /// evaluated as `predicate(geometry, tree_geometry)`. Sorted ascending.
    pub fn query(&self, geometry: &Geometry, predicate: Option<&str>) -> Result<Vec<usize>> {
        let refine = predicate.map(resolve_predicate).transpose()?;
        self.query_with(geometry, refine)
    }

    /// Query every geometry of `data`, returning `(input position, tree position)` pairs.
    pub fn query_bulk(
        &self,
        data: &[Option<Geometry>],
        predicate: Option<&str>,
    ) -> Result<Vec<(usize, usize)>> {
        let refine = predicate.map(resolve_predicate).transpose()?;
        let mut pairs = vec![];
        for (i, geom) in data.iter().enumerate() {
            let Some(geom) = geom else { continue };
            pairs.extend(self.query_with(geom, refine)?.into_iter().map(|j| (i, j)));
        }
        Ok(pairs)
    }

    fn query_with(
        &self,
        geometry: &Geometry,
        refine: Option<crate::kernel::BinaryKernel>,
    ) -> Result<Vec<usize>> {
        let Some((min, max)) = envelope(geometry) else {
            return Ok(vec![]);
        };
        let mut candidates = self.tree.locate(&AABB::from_corners(min, max));
        candidates.sort_unstable();

        let Some(refine) = refine else {
            return Ok(candidates);
        };
        let left = NdArray::scalar(Some(geometry.clone()));
        let right = NdArray::from_vec(
            candidates
                .iter()
                .map(|&i| self.geometries[i].clone())
                .collect(),
        );
        let matches = refine(&left, &right, &KernelArgs::new())?;
        let matches = matches.as_boolean().ok_or_else(|| {
            GeoFrameError::IncorrectType("query predicate must return booleans".into())
        })?;
        Ok(candidates
            .into_iter()
            .zip(matches.data())
            .filter_map(|(i, hit)| (*hit == Some(true)).then_some(i))
            .collect())
    }
}

fn resolve_predicate(name: &str) -> Result<crate::kernel::BinaryKernel> {
    match lookup(&format!("predicates.{name}")) {
        Some(KernelFunction::Binary(f)) => Ok(f),
        _ => Err(GeoFrameError::InvalidValue(
            format!("'{name}' is not a binary predicate").into(),
        )),
    }
}

/// Build a [`SpatialIndex`]; keyword `node_capacity` (default 10) must be at least 2.
pub fn str_tree(data: &[Option<Geometry>], args: &KernelArgs) -> Result<KernelOutput> {
    let node_capacity = args.usize_or(0, "node_capacity", DEFAULT_NODE_CAPACITY)?;
    if node_capacity < 2 {
        return Err(GeoFrameError::InvalidValue(
            format!("node_capacity must be at least 2, got {node_capacity}").into(),
        ));
    }
    tracing::debug!(len = data.len(), node_capacity, "building spatial index");
    Ok(KernelOutput::SpatialIndex(SpatialIndex::new(
        data,
        node_capacity,
    )))
}
