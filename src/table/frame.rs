use std::collections::HashMap;
use std::io::Cursor;
use std::sync::Arc;

use arrow::compute::concat_batches;
use arrow_array::RecordBatch;
use arrow_ipc::reader::StreamReader;
use arrow_ipc::writer::StreamWriter;
use arrow_schema::{Schema, SchemaRef};
use indexmap::IndexMap;

use crate::error::{GeoFrameError, Result};
use crate::table::{Column, GeoSeries, GeosFrameAccessor, GeosFrameAccessorMut, RowIndex};

/// Schema metadata key holding the JSON row labels of a non-default index.
const INDEX_METADATA_KEY: &str = "geoframe:index";

/// A table of named columns sharing one row index.
#[derive(Debug, Clone)]
pub struct GeoFrame {
    index: RowIndex,
    columns: IndexMap<String, Column>,
}

impl GeoFrame {
    /// A table with the default `0..len` index.
    pub fn try_new(columns: IndexMap<String, Column>) -> Result<Self> {
        let len = columns.values().next().map_or(0, Column::len);
        Self::try_new_with_index(RowIndex::range(len), columns)
    }

    pub fn try_new_with_index(index: RowIndex, columns: IndexMap<String, Column>) -> Result<Self> {
        if let Some((name, column)) = columns.iter().find(|(_, c)| c.len() != index.len()) {
            return Err(GeoFrameError::InvalidValue(
                format!(
                    "column '{name}' has {} rows, the index has {}",
                    column.len(),
                    index.len()
                )
                .into(),
            ));
        }
        Ok(Self { index, columns })
    }

    pub fn index(&self) -> &RowIndex {
        &self.index
    }

    pub fn columns(&self) -> &IndexMap<String, Column> {
        &self.columns
    }

    pub fn into_parts(self) -> (RowIndex, IndexMap<String, Column>) {
        (self.index, self.columns)
    }

    pub fn num_rows(&self) -> usize {
        self.index.len()
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn column(&self, name: &str) -> Result<&Column> {
        self.columns
            .get(name)
            .ok_or_else(|| GeoFrameError::MissingAttribute(format!("no column named '{name}'")))
    }

    /// A column as a series carrying the table's index.
    pub fn series(&self, name: &str) -> Result<GeoSeries> {
        GeoSeries::try_new(name, self.index.clone(), self.column(name)?.clone())
    }

    /// Replace or append a column.
    pub fn set_column(&mut self, name: impl Into<String>, column: Column) -> Result<()> {
        if column.len() != self.num_rows() {
            return Err(GeoFrameError::InvalidValue(
                format!(
                    "column has {} rows, the table has {}",
                    column.len(),
                    self.num_rows()
                )
                .into(),
            ));
        }
        self.columns.insert(name.into(), column);
        Ok(())
    }

    /// Names of the geometry-typed columns, in column order.
    pub fn geometry_column_names(&self) -> Vec<&str> {
        self.columns
            .iter()
            .filter(|(_, column)| column.is_geometry())
            .map(|(name, _)| name.as_str())
            .collect()
    }

    /// The geometry column, if there is exactly one.
    pub fn active_geometry(&self) -> Option<&str> {
        match self.geometry_column_names().as_slice() {
            [name] => Some(name),
            _ => None,
        }
    }

    /// Geometry operations over every geometry column.
    ///
    /// Fails with [`GeoFrameError::MissingAttribute`] if the table has no geometry column.
    pub fn geos(&self) -> Result<GeosFrameAccessor<'_>> {
        GeosFrameAccessor::try_new(self)
    }

    pub fn geos_mut(&mut self) -> Result<GeosFrameAccessorMut<'_>> {
        GeosFrameAccessorMut::try_new(self)
    }

    /// Geometry columns become WKB columns tagged with the `"geos"` extension name. A non-default
    /// index is kept as JSON in the schema metadata.
    pub fn to_record_batch(&self) -> Result<RecordBatch> {
        let mut fields = Vec::with_capacity(self.num_columns());
        let mut arrays = Vec::with_capacity(self.num_columns());
        for (name, column) in &self.columns {
            let (field, array) = column.to_arrow(name)?;
            fields.push(field);
            arrays.push(array);
        }
        let mut metadata = HashMap::new();
        if !self.index.is_range() {
            metadata.insert(
                INDEX_METADATA_KEY.to_string(),
                serde_json::to_string(&self.index)?,
            );
        }
        let schema = Arc::new(Schema::new_with_metadata(fields, metadata));
        Ok(RecordBatch::try_new(schema, arrays)?)
    }

    pub fn try_from_record_batch(batch: &RecordBatch) -> Result<Self> {
        let schema = batch.schema();
        let index = match schema.metadata().get(INDEX_METADATA_KEY) {
            Some(json) => serde_json::from_str(json)?,
            None => RowIndex::range(batch.num_rows()),
        };
        let columns = schema
            .fields()
            .iter()
            .zip(batch.columns())
            .map(|(field, array)| Ok((field.name().clone(), Column::from_arrow(field, array)?)))
            .collect::<Result<IndexMap<_, _>>>()?;
        Self::try_new_with_index(index, columns)
    }

    /// Serialize as an Arrow IPC stream.
    pub fn to_ipc_bytes(&self) -> Result<Vec<u8>> {
        let batch = self.to_record_batch()?;
        let mut writer = StreamWriter::try_new(Vec::new(), &batch.schema())?;
        writer.write(&batch)?;
        writer.finish()?;
        Ok(writer.into_inner()?)
    }

    pub fn from_ipc_bytes(bytes: &[u8]) -> Result<Self> {
        let reader = StreamReader::try_new(Cursor::new(bytes), None)?;
        let schema: SchemaRef = reader.schema();
        let batches = reader.collect::<std::result::Result<Vec<_>, _>>()?;
        let batch = concat_batches(&schema, &batches)?;
        Self::try_from_record_batch(&batch)
    }
}
