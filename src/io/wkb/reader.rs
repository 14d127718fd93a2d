use std::io::Cursor;

use byteorder::{BigEndian, LittleEndian, ReadBytesExt};
use geo::{
    Coord, GeometryCollection, LineString, MultiLineString, MultiPoint, MultiPolygon, Point,
    Polygon,
};

use crate::error::Result;
use crate::io::wkb::common::{invalid, split_type_code, Endianness, ExtraDims};
use crate::scalar::GeometryType;

/// Decode one WKB geometry.
///
/// Z and M ordinates are accepted and dropped. A point with NaN coordinates decodes to the empty
/// point. Bytes left over after the geometry are an error. Errors carry row index 0; array-level
/// decoders attach the real row.
pub fn read_wkb(buf: &[u8]) -> Result<geo::Geometry<f64>> {
    let mut reader = WkbReader {
        cursor: Cursor::new(buf),
    };
    let geometry = reader.read_geometry()?;
    match reader.remaining() {
        0 => Ok(geometry),
        trailing => Err(invalid(format!("{trailing} trailing bytes after geometry"))),
    }
}

struct WkbReader<'a> {
    cursor: Cursor<&'a [u8]>,
}

impl<'a> WkbReader<'a> {
    fn remaining(&self) -> usize {
        let len = self.cursor.get_ref().len() as u64;
        len.saturating_sub(self.cursor.position()) as usize
    }

    fn read_u8(&mut self) -> Result<u8> {
        self.cursor
            .read_u8()
            .map_err(|_| invalid("unexpected end of buffer"))
    }

    fn read_u32(&mut self, byte_order: Endianness) -> Result<u32> {
        match byte_order {
            Endianness::LittleEndian => self.cursor.read_u32::<LittleEndian>(),
            Endianness::BigEndian => self.cursor.read_u32::<BigEndian>(),
        }
        .map_err(|_| invalid("unexpected end of buffer"))
    }

    fn read_f64(&mut self, byte_order: Endianness) -> Result<f64> {
        match byte_order {
            Endianness::LittleEndian => self.cursor.read_f64::<LittleEndian>(),
            Endianness::BigEndian => self.cursor.read_f64::<BigEndian>(),
        }
        .map_err(|_| invalid("unexpected end of buffer"))
    }

    /// Read a count and check that at least `count * min_item_size` bytes are left.
    fn read_count(&mut self, byte_order: Endianness, min_item_size: usize) -> Result<usize> {
        let count = self.read_u32(byte_order)? as usize;
        if count.saturating_mul(min_item_size) > self.remaining() {
            return Err(invalid(format!("count {count} exceeds buffer length")));
        }
        Ok(count)
    }

    fn read_header(&mut self) -> Result<(Endianness, GeometryType, ExtraDims)> {
        let byte_order = Endianness::try_from(self.read_u8()?)
            .map_err(|err| invalid(format!("invalid byte order {}", err.number)))?;
        let (geometry_type, dims) = split_type_code(self.read_u32(byte_order)?)?;
        if dims.has_srid {
            self.read_u32(byte_order)?;
        }
        Ok((byte_order, geometry_type, dims))
    }

    fn read_coord(&mut self, byte_order: Endianness, dims: ExtraDims) -> Result<Coord> {
        let x = self.read_f64(byte_order)?;
        let y = self.read_f64(byte_order)?;
        for _ in 0..dims.count() {
            self.read_f64(byte_order)?;
        }
        Ok(Coord { x, y })
    }

    fn read_line_string(&mut self, byte_order: Endianness, dims: ExtraDims) -> Result<LineString> {
        let coord_size = 8 * (2 + dims.count());
        let count = self.read_count(byte_order, coord_size)?;
        let coords = (0..count)
            .map(|_| self.read_coord(byte_order, dims))
            .collect::<Result<Vec<_>>>()?;
        Ok(LineString::new(coords))
    }

    fn read_polygon(&mut self, byte_order: Endianness, dims: ExtraDims) -> Result<Polygon> {
        let count = self.read_count(byte_order, 4)?;
        let mut rings = (0..count)
            .map(|_| self.read_line_string(byte_order, dims))
            .collect::<Result<Vec<_>>>()?;
        if rings.is_empty() {
            return Ok(Polygon::new(LineString::new(vec![]), vec![]));
        }
        let exterior = rings.remove(0);
        Ok(Polygon::new(exterior, rings))
    }

    /// Read the parts of a multi geometry, each of which must be of `expected` type.
    fn read_parts(
        &mut self,
        byte_order: Endianness,
        expected: GeometryType,
    ) -> Result<Vec<geo::Geometry>> {
        let count = self.read_count(byte_order, 5)?;
        (0..count)
            .map(|_| {
                let (part_order, part_type, part_dims) = self.read_header()?;
                if part_type != expected {
                    return Err(invalid(format!(
                        "expected {} part, got {}",
                        expected.wkt_tag(),
                        part_type.wkt_tag()
                    )));
                }
                self.read_body(part_order, part_type, part_dims)
            })
            .collect()
    }

    fn read_geometry(&mut self) -> Result<geo::Geometry> {
        let (byte_order, geometry_type, dims) = self.read_header()?;
        self.read_body(byte_order, geometry_type, dims)
    }

    fn read_body(
        &mut self,
        byte_order: Endianness,
        geometry_type: GeometryType,
        dims: ExtraDims,
    ) -> Result<geo::Geometry> {
        Ok(match geometry_type {
            GeometryType::Point => Point(self.read_coord(byte_order, dims)?).into(),
            GeometryType::LineString => self.read_line_string(byte_order, dims)?.into(),
            GeometryType::Polygon => self.read_polygon(byte_order, dims)?.into(),
            GeometryType::MultiPoint => {
                let points = self
                    .read_parts(byte_order, GeometryType::Point)?
                    .into_iter()
                    .filter_map(|g| Point::try_from(g).ok())
                    .collect::<Vec<_>>();
                MultiPoint::new(points).into()
            }
            GeometryType::MultiLineString => {
                let lines = self
                    .read_parts(byte_order, GeometryType::LineString)?
                    .into_iter()
                    .filter_map(|g| LineString::try_from(g).ok())
                    .collect::<Vec<_>>();
                MultiLineString::new(lines).into()
            }
            GeometryType::MultiPolygon => {
                let polygons = self
                    .read_parts(byte_order, GeometryType::Polygon)?
                    .into_iter()
                    .filter_map(|g| Polygon::try_from(g).ok())
                    .collect::<Vec<_>>();
                MultiPolygon::new(polygons).into()
            }
            GeometryType::GeometryCollection => {
                let count = self.read_count(byte_order, 5)?;
                let parts = (0..count)
                    .map(|_| self.read_geometry())
                    .collect::<Result<Vec<_>>>()?;
                geo::Geometry::GeometryCollection(GeometryCollection::new_from(parts))
            }
        })
    }
}
