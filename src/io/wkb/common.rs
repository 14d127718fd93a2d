use num_enum::{IntoPrimitive, TryFromPrimitive};

use crate::error::{GeoFrameError, Result};
use crate::scalar::GeometryType;

/// Byte order marker at the start of every WKB geometry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, TryFromPrimitive, IntoPrimitive)]
#[repr(u8)]
pub enum Endianness {
    BigEndian = 0,
    #[default]
    LittleEndian = 1,
}

/// Options for encoding WKB.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WkbOptions {
    pub byte_order: Endianness,
}

/// Dimensions stored per coordinate, beyond x and y.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ExtraDims {
    pub has_z: bool,
    pub has_m: bool,
    pub has_srid: bool,
}

impl ExtraDims {
    pub fn count(&self) -> usize {
        usize::from(self.has_z) + usize::from(self.has_m)
    }
}

const EWKB_Z: u32 = 0x8000_0000;
const EWKB_M: u32 = 0x4000_0000;
const EWKB_SRID: u32 = 0x2000_0000;

/// Split a WKB type code into the geometry type and its dimensions.
///
/// Both the ISO (`1001` = point Z) and the extended (`0x80000001` = point Z) conventions are
/// understood.
pub(crate) fn split_type_code(code: u32) -> Result<(GeometryType, ExtraDims)> {
    let mut dims = ExtraDims {
        has_z: code & EWKB_Z != 0,
        has_m: code & EWKB_M != 0,
        has_srid: code & EWKB_SRID != 0,
    };
    let iso = code & 0x0FFF_FFFF;
    match iso / 1000 {
        0 => {}
        1 => dims.has_z = true,
        2 => dims.has_m = true,
        3 => {
            dims.has_z = true;
            dims.has_m = true;
        }
        _ => return Err(invalid(format!("unknown geometry type code {code}"))),
    }
    let geometry_type = GeometryType::try_from(iso % 1000)
        .map_err(|_| invalid(format!("unknown geometry type code {code}")))?;
    Ok((geometry_type, dims))
}

pub(crate) fn invalid(reason: impl Into<String>) -> GeoFrameError {
    GeoFrameError::Wkb {
        index: 0,
        reason: reason.into(),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn type_codes() {
        let (ty, dims) = split_type_code(3).unwrap();
        assert_eq!(ty, GeometryType::Polygon);
        assert_eq!(dims.count(), 0);

        let (ty, dims) = split_type_code(1001).unwrap();
        assert_eq!(ty, GeometryType::Point);
        assert!(dims.has_z && !dims.has_m);

        let (ty, dims) = split_type_code(0x8000_0002).unwrap();
        assert_eq!(ty, GeometryType::LineString);
        assert_eq!(dims.count(), 1);

        let (_, dims) = split_type_code(3007).unwrap();
        assert_eq!(dims.count(), 2);

        assert!(split_type_code(8).is_err());
        assert!(split_type_code(5001).is_err());
    }
}
