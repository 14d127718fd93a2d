//! The `geos` accessors of [`GeoSeries`] and [`GeoFrame`].

use indexmap::IndexMap;

use crate::array::GeometryArray;
use crate::dispatch::{
    apply_binary, apply_unary, BinaryOutput, Expansion, Manner, OpOutput, Operation, Other,
    Outcome, Registry,
};
use crate::error::{GeoFrameError, Result};
use crate::kernel::{KernelArgs, KernelOutput, SpatialIndex, Values};
use crate::scalar::Geometry;
use crate::table::{GeoFrame, GeoSeries};

fn operation(name: &str) -> Result<&'static Operation> {
    Registry::global()?.get(name)
}

/// Geometry operations on a single geometry series.
#[derive(Debug, Clone, Copy)]
pub struct GeosAccessor<'a> {
    series: &'a GeoSeries,
    array: &'a GeometryArray,
}

impl<'a> GeosAccessor<'a> {
    pub fn try_new(series: &'a GeoSeries) -> Result<Self> {
        let array = series.geometry_array().ok_or_else(|| {
            GeoFrameError::MissingAttribute(format!(
                "can only use the geos accessor with geometry values, series '{}' holds '{}'",
                series.name(),
                series.values().dtype_name()
            ))
        })?;
        Ok(Self { series, array })
    }

    pub fn series(&self) -> &'a GeoSeries {
        self.series
    }

    pub fn array(&self) -> &'a GeometryArray {
        self.array
    }

    /// Apply any single-operand operation by name.
    pub fn call(&self, name: &str, args: &KernelArgs) -> Result<OpOutput> {
        apply_unary(operation(name)?, self.series, args)
    }

    /// Apply any two-operand operation by name, see [`apply_binary`].
    pub fn call_binary(
        &self,
        name: &str,
        other: Other<'_>,
        manner: Option<Manner>,
        args: &KernelArgs,
    ) -> Result<Outcome<BinaryOutput>> {
        apply_binary(operation(name)?, self.series, other, manner, args)
    }

    fn per_row(&self, name: &str, args: &KernelArgs) -> Result<GeoSeries> {
        self.call(name, args)?.into_series()
    }

    fn raw(&self, name: &str, args: &KernelArgs) -> Result<KernelOutput> {
        self.call(name, args)?.into_raw()
    }

    pub fn area(&self) -> Result<GeoSeries> {
        self.per_row("area", &KernelArgs::default())
    }

    pub fn length(&self) -> Result<GeoSeries> {
        self.per_row("length", &KernelArgs::default())
    }

    pub fn is_empty(&self) -> Result<GeoSeries> {
        self.per_row("is_empty", &KernelArgs::default())
    }

    /// Never null: `true` where a row holds no geometry.
    pub fn is_missing(&self) -> Result<GeoSeries> {
        self.per_row("is_missing", &KernelArgs::default())
    }

    pub fn centroid(&self) -> Result<GeoSeries> {
        self.per_row("centroid", &KernelArgs::default())
    }

    pub fn convex_hull(&self) -> Result<GeoSeries> {
        self.per_row("convex_hull", &KernelArgs::default())
    }

    pub fn envelope(&self) -> Result<GeoSeries> {
        self.per_row("envelope", &KernelArgs::default())
    }

    pub fn point_on_surface(&self) -> Result<GeoSeries> {
        self.per_row("point_on_surface", &KernelArgs::default())
    }

    pub fn reverse(&self) -> Result<GeoSeries> {
        self.per_row("reverse", &KernelArgs::default())
    }

    pub fn count_coordinates(&self) -> Result<GeoSeries> {
        self.per_row("count_coordinates", &KernelArgs::default())
    }

    pub fn simplify(&self, tolerance: f64) -> Result<GeoSeries> {
        self.per_row("simplify", &KernelArgs::new().with_keyword("tolerance", tolerance))
    }

    /// Bounding box of every row, as a table with columns `xmin`, `ymin`, `xmax`, `ymax`.
    pub fn bounds(&self) -> Result<GeoFrame> {
        self.call("bounds", &KernelArgs::default())?.into_frame()
    }

    /// Bounding box of the whole series, labeled `xmin`, `ymin`, `xmax`, `ymax`.
    pub fn total_bounds(&self) -> Result<GeoSeries> {
        self.per_row("total_bounds", &KernelArgs::default())
    }

    /// Union of all geometries. The result is not tied to any row.
    pub fn union_all(&self) -> Result<Option<Geometry>> {
        match self.raw("union_all", &KernelArgs::default())? {
            KernelOutput::Geometry(geom) => Ok(geom),
            other => Err(unexpected_output("union_all", &other)),
        }
    }

    pub fn intersection_all(&self) -> Result<Option<Geometry>> {
        match self.raw("intersection_all", &KernelArgs::default())? {
            KernelOutput::Geometry(geom) => Ok(geom),
            other => Err(unexpected_output("intersection_all", &other)),
        }
    }

    /// All coordinates as a `(n, 2)` buffer.
    pub fn get_coordinates(&self) -> Result<Values> {
        match self.raw("get_coordinates", &KernelArgs::default())? {
            KernelOutput::Values(values) => Ok(values),
            other => Err(unexpected_output("get_coordinates", &other)),
        }
    }

    /// Build a spatial index over the series. Row labels are not kept: query results are
    /// positions.
    pub fn str_tree(&self, node_capacity: usize) -> Result<SpatialIndex> {
        let node_capacity = i64::try_from(node_capacity).map_err(|_| {
            GeoFrameError::InvalidValue(
                format!("node capacity {node_capacity} is too large").into(),
            )
        })?;
        let args = KernelArgs::new().with_keyword("node_capacity", node_capacity);
        match self.raw("STRtree", &args)? {
            KernelOutput::SpatialIndex(tree) => Ok(tree),
            other => Err(unexpected_output("STRtree", &other)),
        }
    }

    pub fn intersects(
        &self,
        other: Other<'_>,
        manner: Option<Manner>,
    ) -> Result<Outcome<BinaryOutput>> {
        self.call_binary("intersects", other, manner, &KernelArgs::default())
    }

    pub fn distance(
        &self,
        other: Other<'_>,
        manner: Option<Manner>,
    ) -> Result<Outcome<BinaryOutput>> {
        self.call_binary("distance", other, manner, &KernelArgs::default())
    }
}

fn unexpected_output(name: &str, output: &KernelOutput) -> GeoFrameError {
    let got = match output {
        KernelOutput::Values(_) => "values",
        KernelOutput::Geometry(_) => "a geometry",
        KernelOutput::SpatialIndex(_) => "a spatial index",
    };
    GeoFrameError::General(format!("'{name}' returned {got}"))
}

fn expandable(name: &str) -> Result<&'static Operation> {
    let op = operation(name)?;
    if !op.is_expandable() {
        return Err(GeoFrameError::MissingAttribute(format!(
            "'{name}' cannot be applied to a whole table"
        )));
    }
    Ok(op)
}

/// Apply `op` to every geometry column of `frame`, keyed by column name.
fn expand_columns(
    frame: &GeoFrame,
    op: &Operation,
    args: &KernelArgs,
) -> Result<IndexMap<String, GeoSeries>> {
    frame
        .geometry_column_names()
        .into_iter()
        .map(|name| {
            let series = frame.series(name)?;
            let result = apply_unary(op, &series, args)?.into_series()?;
            Ok((name.to_string(), result))
        })
        .collect()
}

/// Geometry operations over every geometry column of a table.
#[derive(Debug, Clone, Copy)]
pub struct GeosFrameAccessor<'a> {
    frame: &'a GeoFrame,
}

impl<'a> GeosFrameAccessor<'a> {
    pub fn try_new(frame: &'a GeoFrame) -> Result<Self> {
        if frame.geometry_column_names().is_empty() {
            return Err(GeoFrameError::MissingAttribute(
                "the table has no geometry column".to_string(),
            ));
        }
        Ok(Self { frame })
    }

    pub fn frame(&self) -> &'a GeoFrame {
        self.frame
    }

    /// Apply an expandable operation to every geometry column.
    ///
    /// The result has one column per geometry column, under the same name. Per-row operations
    /// keep the table's index; summaries are labeled like the summary.
    pub fn expand(&self, name: &str, args: &KernelArgs) -> Result<GeoFrame> {
        let op = expandable(name)?;
        let results = expand_columns(self.frame, op, args)?;
        let index = match op.descriptor().expansion {
            Expansion::Summary => match results.values().next() {
                Some(series) => series.index().clone(),
                None => self.frame.index().clone(),
            },
            _ => self.frame.index().clone(),
        };
        let columns = results
            .into_iter()
            .map(|(name, series)| {
                let (_, _, values) = series.into_parts();
                (name, values)
            })
            .collect();
        GeoFrame::try_new_with_index(index, columns)
    }

    pub fn area(&self) -> Result<GeoFrame> {
        self.expand("area", &KernelArgs::default())
    }

    pub fn length(&self) -> Result<GeoFrame> {
        self.expand("length", &KernelArgs::default())
    }

    pub fn is_empty(&self) -> Result<GeoFrame> {
        self.expand("is_empty", &KernelArgs::default())
    }

    pub fn centroid(&self) -> Result<GeoFrame> {
        self.expand("centroid", &KernelArgs::default())
    }

    pub fn convex_hull(&self) -> Result<GeoFrame> {
        self.expand("convex_hull", &KernelArgs::default())
    }

    pub fn envelope(&self) -> Result<GeoFrame> {
        self.expand("envelope", &KernelArgs::default())
    }

    pub fn total_bounds(&self) -> Result<GeoFrame> {
        self.expand("total_bounds", &KernelArgs::default())
    }
}

/// Like [`GeosFrameAccessor`], but replaces the source columns.
#[derive(Debug)]
pub struct GeosFrameAccessorMut<'a> {
    frame: &'a mut GeoFrame,
}

impl<'a> GeosFrameAccessorMut<'a> {
    pub fn try_new(frame: &'a mut GeoFrame) -> Result<Self> {
        GeosFrameAccessor::try_new(frame)?;
        Ok(Self { frame })
    }

    /// Apply a per-row operation to every geometry column and store each result under the
    /// source column's name.
    pub fn expand_inplace(&mut self, name: &str, args: &KernelArgs) -> Result<()> {
        let op = expandable(name)?;
        if op.descriptor().expansion != Expansion::PerColumn {
            return Err(GeoFrameError::InvalidValue(
                format!("'{name}' summarizes each column and cannot replace it").into(),
            ));
        }
        let results = expand_columns(self.frame, op, args)?;
        tracing::debug!(operation = name, columns = results.len(), "replacing columns");
        for (name, series) in results {
            let (_, _, values) = series.into_parts();
            self.frame.set_column(name, values)?;
        }
        Ok(())
    }

    pub fn centroid(&mut self) -> Result<()> {
        self.expand_inplace("centroid", &KernelArgs::default())
    }

    pub fn convex_hull(&mut self) -> Result<()> {
        self.expand_inplace("convex_hull", &KernelArgs::default())
    }

    pub fn envelope(&mut self) -> Result<()> {
        self.expand_inplace("envelope", &KernelArgs::default())
    }
}
