//! Metadata carried alongside a geometry column when it leaves the crate as Arrow data.

use arrow_schema::Field;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::datatypes::EXTENSION_METADATA_KEY;
use crate::error::GeoFrameError;

/// Column-level metadata for a geometry column.
///
/// This is serialized to JSON in the `ARROW:extension:metadata` key of the field when a
/// [`GeometryArray`](crate::GeometryArray) is exported to Arrow and read back on import.
#[derive(Default, Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ArrayMetadata {
    /// Coordinate reference system, as whatever JSON value the producer supplied (an authority
    /// string such as `"EPSG:4326"` or a PROJJSON object). Omitted when unknown.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crs: Option<Value>,
}

impl ArrayMetadata {
    pub fn with_crs(crs: impl Into<Value>) -> Self {
        Self {
            crs: Some(crs.into()),
        }
    }

    /// Whether there is anything worth writing to the field metadata.
    pub fn should_serialize(&self) -> bool {
        self.crs.is_some()
    }
}

impl TryFrom<&Field> for ArrayMetadata {
    type Error = GeoFrameError;

    fn try_from(value: &Field) -> Result<Self, Self::Error> {
        if let Some(ext_meta) = value.metadata().get(EXTENSION_METADATA_KEY) {
            Ok(serde_json::from_str(ext_meta)?)
        } else {
            Ok(Default::default())
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn empty_metadata_is_not_serialized() {
        assert!(!ArrayMetadata::default().should_serialize());
        assert!(ArrayMetadata::with_crs("EPSG:3857").should_serialize());
        assert_eq!(
            serde_json::to_string(&ArrayMetadata::default()).unwrap(),
            "{}"
        );
    }
}
