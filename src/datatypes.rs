//! The column type marker for geometry columns and its Arrow extension type representation.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use arrow_schema::{DataType, Field};

use crate::array::metadata::ArrayMetadata;
use crate::error::{GeoFrameError, Result};

pub(crate) const EXTENSION_NAME_KEY: &str = "ARROW:extension:name";
pub(crate) const EXTENSION_METADATA_KEY: &str = "ARROW:extension:metadata";

/// Marker identifying a column that holds geometries.
///
/// There is exactly one geometry dtype; two instances always compare equal. It can only be
/// constructed from its name, `"geos"`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct GeometryDtype;

impl GeometryDtype {
    pub const NAME: &'static str = "geos";

    pub fn name(&self) -> &'static str {
        Self::NAME
    }

    /// Parse the dtype from its name. Any other string is a type error.
    pub fn construct_from_string(s: &str) -> Result<Self> {
        if s == Self::NAME {
            Ok(GeometryDtype)
        } else {
            Err(GeoFrameError::IncorrectType(
                format!("Cannot construct a '{}' from '{}'", Self::NAME, s).into(),
            ))
        }
    }

    /// Geometry columns are stored as WKB when they leave the crate as Arrow data.
    pub fn storage_type(&self) -> DataType {
        DataType::Binary
    }

    /// Build an Arrow field carrying this extension type and the serialized array metadata.
    pub fn to_field(&self, name: &str, nullable: bool, metadata: &ArrayMetadata) -> Result<Field> {
        let mut field_metadata = HashMap::with_capacity(2);
        field_metadata.insert(EXTENSION_NAME_KEY.to_string(), Self::NAME.to_string());
        if metadata.should_serialize() {
            field_metadata.insert(
                EXTENSION_METADATA_KEY.to_string(),
                serde_json::to_string(metadata)?,
            );
        }
        Ok(Field::new(name, self.storage_type(), nullable).with_metadata(field_metadata))
    }

    /// Whether an Arrow field is tagged with this extension type.
    pub fn matches_field(field: &Field) -> bool {
        field
            .metadata()
            .get(EXTENSION_NAME_KEY)
            .is_some_and(|name| name == Self::NAME)
    }
}

impl FromStr for GeometryDtype {
    type Err = GeoFrameError;

    fn from_str(s: &str) -> Result<Self> {
        Self::construct_from_string(s)
    }
}

impl fmt::Display for GeometryDtype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(Self::NAME)
    }
}
