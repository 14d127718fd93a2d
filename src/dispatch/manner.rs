use std::fmt;
use std::str::FromStr;

use crate::error::{GeoFrameError, Result};

/// How a binary operation lines up its two operands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Manner {
    /// Use both operands as they are; the kernel broadcasts them.
    Keep,
    /// Align two labeled series on their row labels first.
    Align,
    /// Pair every row of the left operand with every row of the right one, producing a matrix.
    Expand,
}

impl Manner {
    pub fn as_str(&self) -> &'static str {
        match self {
            Manner::Keep => "keep",
            Manner::Align => "align",
            Manner::Expand => "expand",
        }
    }
}

impl FromStr for Manner {
    type Err = GeoFrameError;

    /// Accepts any non-empty, case-insensitive prefix of a variant name, so `"e"`, `"exp"` and
    /// `"Expand"` all parse to [`Manner::Expand`].
    fn from_str(s: &str) -> Result<Self> {
        let lower = s.to_ascii_lowercase();
        [Manner::Keep, Manner::Align, Manner::Expand]
            .into_iter()
            .find(|manner| !lower.is_empty() && manner.as_str().starts_with(&lower))
            .ok_or_else(|| {
                GeoFrameError::InvalidValue(
                    format!("unknown manner '{s}', expected 'keep', 'align' or 'expand'").into(),
                )
            })
    }
}

impl fmt::Display for Manner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn prefixes() {
        for s in ["e", "E", "exp", "Expand", "EXPAND"] {
            assert_eq!(s.parse::<Manner>().unwrap(), Manner::Expand);
        }
        assert_eq!("a".parse::<Manner>().unwrap(), Manner::Align);
        assert_eq!("Keep".parse::<Manner>().unwrap(), Manner::Keep);
    }

    #[test]
    fn unknown_is_an_error() {
        for s in ["", "x", "expanded", "keeper", "al ign"] {
            let err = s.parse::<Manner>().unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Value, "{s}");
        }
    }
}
