//! Conversion to and from interchange geometry objects: owned [`geo::Geometry`] values as used
//! by the rich geometry-table ecosystem.
//!
//! There are two ways to produce an interchange object from a handle. The direct path clones the
//! kernel geometry. The WKB path encodes the handle and decodes it again with `geozero`, which is
//! slower but goes through the same decoder every other consumer of the bytes would use. A
//! capability check, run once per process, checks that both paths agree; [`InterchangePath::Auto`]
//! uses the direct path only if they do.

use std::sync::OnceLock;

use geo::{line_string, point, polygon, MultiPolygon};
use geozero::wkb::Wkb;
use geozero::ToGeo;

use crate::error::{GeoFrameError, Result};
use crate::io::wkb::{to_wkb, WkbOptions};
use crate::io::wkt::read_wkt;
use crate::kernel::eq::geometry_eq;
use crate::scalar::Geometry;

/// The peer geometry object.
pub type InterchangeGeometry = geo::Geometry<f64>;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum InterchangePath {
    /// Direct if the capability check passed, WKB otherwise.
    #[default]
    Auto,
    Direct,
    Wkb,
}

/// Options for [`to_interchange`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InterchangeOptions {
    pub path: InterchangePath,
}

static DIRECT_PATH: OnceLock<bool> = OnceLock::new();

/// Whether the direct path and the WKB path agree, checked once and cached.
pub fn direct_path_supported() -> bool {
    *DIRECT_PATH.get_or_init(|| {
        let supported = paths_agree();
        tracing::debug!(supported, "interchange capability check");
        supported
    })
}

fn sample_geometries() -> Vec<Geometry> {
    vec![
        point!(x: 1., y: -2.).into(),
        line_string![(x: 0., y: 0.), (x: 1., y: 1.), (x: 2., y: 0.)].into(),
        polygon!(
            exterior: [(x: 0., y: 0.), (x: 4., y: 0.), (x: 4., y: 4.), (x: 0., y: 4.), (x: 0., y: 0.)],
            interiors: [[(x: 1., y: 1.), (x: 2., y: 1.), (x: 2., y: 2.), (x: 1., y: 1.)]],
        )
        .into(),
        MultiPolygon::new(vec![polygon![(x: 0., y: 0.), (x: 1., y: 0.), (x: 0., y: 1.)]]).into(),
    ]
}

fn paths_agree() -> bool {
    sample_geometries().iter().all(|geom| match via_wkb(geom) {
        Ok(decoded) => geometry_eq(&decoded, geom.as_geo(), 0.),
        Err(_) => false,
    })
}

/// Encode as WKB and decode with `geozero`.
///
/// WKB cannot be relied on to carry the empty point, so that one case is rebuilt from its WKT
/// literal.
fn via_wkb(geom: &Geometry) -> Result<InterchangeGeometry> {
    if geom.is_empty_point() {
        return read_wkt("POINT EMPTY");
    }
    let bytes = to_wkb(geom.as_geo(), &WkbOptions::default())?;
    Wkb(bytes)
        .to_geo()
        .map_err(|err| GeoFrameError::General(format!("WKB interchange failed: {err}")))
}

fn resolve(path: InterchangePath) -> InterchangePath {
    match path {
        InterchangePath::Auto if direct_path_supported() => InterchangePath::Direct,
        InterchangePath::Auto => {
            tracing::warn!("direct interchange conversion unavailable, falling back to WKB");
            InterchangePath::Wkb
        }
        other => other,
    }
}

/// Convert a handle buffer to interchange objects. Nulls stay `None`.
pub fn to_interchange(
    data: &[Option<Geometry>],
    options: &InterchangeOptions,
) -> Result<Vec<Option<InterchangeGeometry>>> {
    match resolve(options.path) {
        InterchangePath::Wkb => data
            .iter()
            .map(|geom| geom.as_ref().map(via_wkb).transpose())
            .collect(),
        _ => Ok(data
            .iter()
            .map(|geom| geom.as_ref().map(Geometry::to_geo))
            .collect()),
    }
}

/// Take ownership of interchange objects as handles, without copying them.
pub fn from_interchange(objects: Vec<Option<InterchangeGeometry>>) -> Vec<Option<Geometry>> {
    objects.into_iter().map(|geom| geom.map(Geometry::new)).collect()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn direct_path_agrees_with_wkb() {
        assert!(direct_path_supported());
    }

    #[test]
    fn paths_agree() {
        let mut data: Vec<Option<Geometry>> = sample_geometries().into_iter().map(Some).collect();
        data.push(None);
        data.push(Some(Geometry::empty_point()));

        let direct = to_interchange(
            &data,
            &InterchangeOptions {
                path: InterchangePath::Direct,
            },
        )
        .unwrap();
        let wkb = to_interchange(
            &data,
            &InterchangeOptions {
                path: InterchangePath::Wkb,
            },
        )
        .unwrap();
        assert_eq!(direct.len(), wkb.len());
        for (d, w) in direct.iter().zip(wkb.iter()) {
            match (d, w) {
                (Some(d), Some(w)) => assert!(geometry_eq(d, w, 0.)),
                (None, None) => {}
                _ => panic!("null mismatch"),
            }
        }
    }

    #[test]
    fn empty_point_survives_wkb_path() {
        let out = to_interchange(
            &[Some(Geometry::empty_point())],
            &InterchangeOptions {
                path: InterchangePath::Wkb,
            },
        )
        .unwrap();
        let handles = from_interchange(out);
        assert_eq!(handles[0], Some(Geometry::empty_point()));
    }
}
