use crate::scalar::Geometry;

/// A dynamically typed scalar, used for kernel arguments and fill values.
#[derive(Debug, Clone)]
#[cfg_attr(test, derive(PartialEq))]
pub enum ScalarValue {
    Null,
    Boolean(bool),
    Int64(i64),
    Float64(f64),
    Utf8(String),
    Binary(Vec<u8>),
    Geometry(Geometry),
}

impl ScalarValue {
    pub fn is_null(&self) -> bool {
        matches!(self, ScalarValue::Null)
    }

    /// Name of the variant, used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            ScalarValue::Null => "null",
            ScalarValue::Boolean(_) => "bool",
            ScalarValue::Int64(_) => "int64",
            ScalarValue::Float64(_) => "float64",
            ScalarValue::Utf8(_) => "utf8",
            ScalarValue::Binary(_) => "binary",
            ScalarValue::Geometry(_) => "geometry",
        }
    }

    /// Integers widen to floats.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ScalarValue::Float64(value) => Some(*value),
            ScalarValue::Int64(value) => Some(*value as f64),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ScalarValue::Int64(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ScalarValue::Boolean(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ScalarValue::Utf8(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_geometry(&self) -> Option<&Geometry> {
        match self {
            ScalarValue::Geometry(value) => Some(value),
            _ => None,
        }
    }
}

impl From<bool> for ScalarValue {
    fn from(value: bool) -> Self {
        ScalarValue::Boolean(value)
    }
}

impl From<i64> for ScalarValue {
    fn from(value: i64) -> Self {
        ScalarValue::Int64(value)
    }
}

impl From<i32> for ScalarValue {
    fn from(value: i32) -> Self {
        ScalarValue::Int64(value.into())
    }
}

impl From<f64> for ScalarValue {
    fn from(value: f64) -> Self {
        ScalarValue::Float64(value)
    }
}

impl From<&str> for ScalarValue {
    fn from(value: &str) -> Self {
        ScalarValue::Utf8(value.to_string())
    }
}

impl From<String> for ScalarValue {
    fn from(value: String) -> Self {
        ScalarValue::Utf8(value)
    }
}

impl From<Vec<u8>> for ScalarValue {
    fn from(value: Vec<u8>) -> Self {
        ScalarValue::Binary(value)
    }
}

impl From<Geometry> for ScalarValue {
    fn from(value: Geometry) -> Self {
        ScalarValue::Geometry(value)
    }
}

impl From<Option<Geometry>> for ScalarValue {
    fn from(value: Option<Geometry>) -> Self {
        value.map_or(ScalarValue::Null, ScalarValue::Geometry)
    }
}
