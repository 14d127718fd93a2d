use indexmap::IndexMap;

use crate::error::{GeoFrameError, Result};
use crate::scalar::{Geometry, ScalarValue};

/// Extra arguments passed through to a kernel function, after the geometry operand(s).
///
/// Kernels look a parameter up by keyword first and by position second, so callers may pass
/// either form. A [`ScalarValue::Null`] counts as absent.
#[derive(Debug, Clone, Default)]
#[cfg_attr(test, derive(PartialEq))]
pub struct KernelArgs {
    pub positional: Vec<ScalarValue>,
    pub keywords: IndexMap<String, ScalarValue>,
}

impl KernelArgs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_positional(mut self, value: impl Into<ScalarValue>) -> Self {
        self.positional.push(value.into());
        self
    }

    pub fn with_keyword(mut self, name: impl Into<String>, value: impl Into<ScalarValue>) -> Self {
        self.keywords.insert(name.into(), value.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.positional.is_empty() && self.keywords.is_empty()
    }

    pub fn get(&self, position: usize, name: &str) -> Option<&ScalarValue> {
        self.keywords
            .get(name)
            .or_else(|| self.positional.get(position))
            .filter(|value| !value.is_null())
    }

    pub fn f64_or(&self, position: usize, name: &str, default: f64) -> Result<f64> {
        match self.get(position, name) {
            None => Ok(default),
            Some(value) => value
                .as_f64()
                .ok_or_else(|| wrong_type(name, "float64", value)),
        }
    }

    pub fn require_f64(&self, position: usize, name: &str) -> Result<f64> {
        match self.get(position, name) {
            None => Err(missing(name)),
            Some(value) => value
                .as_f64()
                .ok_or_else(|| wrong_type(name, "float64", value)),
        }
    }

    pub fn bool_or(&self, position: usize, name: &str, default: bool) -> Result<bool> {
        match self.get(position, name) {
            None => Ok(default),
            Some(value) => value
                .as_bool()
                .ok_or_else(|| wrong_type(name, "bool", value)),
        }
    }

    pub fn usize_or(&self, position: usize, name: &str, default: usize) -> Result<usize> {
        match self.get(position, name) {
            None => Ok(default),
            Some(value) => value
                .as_i64()
                .and_then(|v| usize::try_from(v).ok())
                .ok_or_else(|| wrong_type(name, "non-negative int64", value)),
        }
    }

    pub fn require_str(&self, position: usize, name: &str) -> Result<&str> {
        match self.get(position, name) {
            None => Err(missing(name)),
            Some(value) => value.as_str().ok_or_else(|| wrong_type(name, "utf8", value)),
        }
    }

    pub fn require_geometry(&self, position: usize, name: &str) -> Result<&Geometry> {
        match self.get(position, name) {
            None => Err(missing(name)),
            Some(value) => value
                .as_geometry()
                .ok_or_else(|| wrong_type(name, "geometry", value)),
        }
    }
}

fn wrong_type(name: &str, expected: &str, value: &ScalarValue) -> GeoFrameError {
    GeoFrameError::IncorrectType(
        format!(
            "argument '{}' must be {}, got {}",
            name,
            expected,
            value.type_name()
        )
        .into(),
    )
}

fn missing(name: &str) -> GeoFrameError {
    GeoFrameError::IncorrectType(format!("missing required argument '{}'", name).into())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn keyword_wins_over_position() {
        let args = KernelArgs::new()
            .with_positional(1.0)
            .with_keyword("tolerance", 2.0);
        assert_eq!(args.f64_or(0, "tolerance", 0.0).unwrap(), 2.0);
        assert_eq!(args.f64_or(1, "other", 7.0).unwrap(), 7.0);
    }

    #[test]
    fn integers_widen() {
        let args = KernelArgs::new().with_positional(3i64);
        assert_eq!(args.require_f64(0, "distance").unwrap(), 3.0);
        assert_eq!(args.usize_or(0, "node_capacity", 10).unwrap(), 3);
    }

    #[test]
    fn wrong_type_is_type_error() {
        let args = KernelArgs::new().with_keyword("normalized", "yes");
        let err = args.bool_or(1, "normalized", false).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Type);
        assert!(args.require_f64(0, "distance").is_err());
    }

    #[test]
    fn null_counts_as_absent() {
        let args = KernelArgs::new().with_keyword("tolerance", ScalarValue::Null);
        assert_eq!(args.f64_or(0, "tolerance", 0.5).unwrap(), 0.5);
    }
}
