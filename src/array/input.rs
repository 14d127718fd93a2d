use crate::scalar::Geometry;

/// One element of a sequence a [`GeometryArray`](crate::GeometryArray) can be built from.
///
/// All non-null elements of a sequence must be of the same kind; the first non-null element
/// decides how the sequence is decoded.
#[derive(Debug, Clone)]
pub enum GeometryInput {
    Null,
    Handle(Geometry),
    Wkb(Vec<u8>),
    Wkt(String),
    Interchange(geo::Geometry<f64>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum InputKind {
    Handle,
    Wkb,
    Wkt,
    Interchange,
}

impl InputKind {
    pub(crate) fn name(&self) -> &'static str {
        match self {
            InputKind::Handle => "geometry",
            InputKind::Wkb => "WKB",
            InputKind::Wkt => "WKT",
            InputKind::Interchange => "interchange geometry",
        }
    }
}

impl GeometryInput {
    pub(crate) fn kind(&self) -> Option<InputKind> {
        match self {
            GeometryInput::Null => None,
            GeometryInput::Handle(_) => Some(InputKind::Handle),
            GeometryInput::Wkb(_) => Some(InputKind::Wkb),
            GeometryInput::Wkt(_) => Some(InputKind::Wkt),
            GeometryInput::Interchange(_) => Some(InputKind::Interchange),
        }
    }
}

impl From<Geometry> for GeometryInput {
    fn from(value: Geometry) -> Self {
        GeometryInput::Handle(value)
    }
}

impl From<Option<Geometry>> for GeometryInput {
    fn from(value: Option<Geometry>) -> Self {
        value.map_or(GeometryInput::Null, GeometryInput::Handle)
    }
}

impl From<Vec<u8>> for GeometryInput {
    fn from(value: Vec<u8>) -> Self {
        GeometryInput::Wkb(value)
    }
}

impl From<&[u8]> for GeometryInput {
    fn from(value: &[u8]) -> Self {
        GeometryInput::Wkb(value.to_vec())
    }
}

impl From<String> for GeometryInput {
    fn from(value: String) -> Self {
        GeometryInput::Wkt(value)
    }
}

impl From<&str> for GeometryInput {
    fn from(value: &str) -> Self {
        GeometryInput::Wkt(value.to_string())
    }
}

impl From<geo::Geometry<f64>> for GeometryInput {
    fn from(value: geo::Geometry<f64>) -> Self {
        GeometryInput::Interchange(value)
    }
}
