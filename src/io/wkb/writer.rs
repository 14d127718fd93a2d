use std::io::Write;

use byteorder::{BigEndian, ByteOrder, LittleEndian, WriteBytesExt};
use geo::{Coord, LineString, Polygon};

use crate::error::Result;
use crate::io::wkb::common::{Endianness, WkbOptions};
use crate::scalar::GeometryType;

/// Encode a geometry as 2D WKB.
///
/// `Line` is written as a line string, `Rect` and `Triangle` as polygons. The empty point is
/// written as a point with NaN coordinates.
pub fn write_wkb<W: Write>(
    writer: &mut W,
    geom: &geo::Geometry<f64>,
    options: &WkbOptions,
) -> Result<()> {
    match options.byte_order {
        Endianness::LittleEndian => write_geometry::<W, LittleEndian>(writer, geom)?,
        Endianness::BigEndian => write_geometry::<W, BigEndian>(writer, geom)?,
    }
    Ok(())
}

/// Encode a geometry into a new buffer.
pub fn to_wkb(geom: &geo::Geometry<f64>, options: &WkbOptions) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    write_wkb(&mut buf, geom, options)?;
    Ok(buf)
}

/// A byteorder type together with the marker byte that announces it.
trait WkbByteOrder: ByteOrder {
    const MARKER: Endianness;
}

impl WkbByteOrder for LittleEndian {
    const MARKER: Endianness = Endianness::LittleEndian;
}

impl WkbByteOrder for BigEndian {
    const MARKER: Endianness = Endianness::BigEndian;
}

fn write_header<W: Write, B: WkbByteOrder>(
    writer: &mut W,
    geometry_type: GeometryType,
) -> std::io::Result<()> {
    writer.write_u8(B::MARKER.into())?;
    writer.write_u32::<B>(geometry_type.into())
}

fn write_coord<W: Write, B: WkbByteOrder>(writer: &mut W, coord: &Coord) -> std::io::Result<()> {
    writer.write_f64::<B>(coord.x)?;
    writer.write_f64::<B>(coord.y)
}

fn write_ring<W: Write, B: WkbByteOrder>(writer: &mut W, ring: &LineString) -> std::io::Result<()> {
    writer.write_u32::<B>(ring.0.len() as u32)?;
    ring.0.iter().try_for_each(|c| write_coord::<W, B>(writer, c))
}

fn write_polygon<W: Write, B: WkbByteOrder>(
    writer: &mut W,
    polygon: &Polygon,
) -> std::io::Result<()> {
    write_header::<W, B>(writer, GeometryType::Polygon)?;
    if polygon.exterior().0.is_empty() {
        return writer.write_u32::<B>(0);
    }
    writer.write_u32::<B>(1 + polygon.interiors().len() as u32)?;
    write_ring::<W, B>(writer, polygon.exterior())?;
    polygon
        .interiors()
        .iter()
        .try_for_each(|ring| write_ring::<W, B>(writer, ring))
}

fn write_geometry<W: Write, B: WkbByteOrder>(
    writer: &mut W,
    geom: &geo::Geometry<f64>,
) -> std::io::Result<()> {
    match geom {
        geo::Geometry::Point(point) => {
            write_header::<W, B>(writer, GeometryType::Point)?;
            write_coord::<W, B>(writer, &point.0)
        }
        geo::Geometry::Line(line) => {
            write_header::<W, B>(writer, GeometryType::LineString)?;
            write_ring::<W, B>(writer, &LineString::new(vec![line.start, line.end]))
        }
        geo::Geometry::LineString(line) => {
            write_header::<W, B>(writer, GeometryType::LineString)?;
            write_ring::<W, B>(writer, line)
        }
        geo::Geometry::Polygon(polygon) => write_polygon::<W, B>(writer, polygon),
        geo::Geometry::Rect(rect) => write_polygon::<W, B>(writer, &rect.to_polygon()),
        geo::Geometry::Triangle(triangle) => {
            write_polygon::<W, B>(writer, &triangle.to_polygon())
        }
        geo::Geometry::MultiPoint(points) => {
            write_header::<W, B>(writer, GeometryType::MultiPoint)?;
            writer.write_u32::<B>(points.0.len() as u32)?;
            points.0.iter().try_for_each(|point| {
                write_header::<W, B>(writer, GeometryType::Point)?;
                write_coord::<W, B>(writer, &point.0)
            })
        }
        geo::Geometry::MultiLineString(lines) => {
            write_header::<W, B>(writer, GeometryType::MultiLineString)?;
            writer.write_u32::<B>(lines.0.len() as u32)?;
            lines.0.iter().try_for_each(|line| {
                write_header::<W, B>(writer, GeometryType::LineString)?;
                write_ring::<W, B>(writer, line)
            })
        }
        geo::Geometry::MultiPolygon(polygons) => {
            write_header::<W, B>(writer, GeometryType::MultiPolygon)?;
            writer.write_u32::<B>(polygons.0.len() as u32)?;
            polygons
                .0
                .iter()
                .try_for_each(|polygon| write_polygon::<W, B>(writer, polygon))
        }
        geo::Geometry::GeometryCollection(collection) => {
            write_header::<W, B>(writer, GeometryType::GeometryCollection)?;
            writer.write_u32::<B>(collection.0.len() as u32)?;
            collection
                .0
                .iter()
                .try_for_each(|part| write_geometry::<W, B>(writer, part))
        }
    }
}

#[cfg(test)]
mod test {
    use geo::{line_string, point, Geometry, GeometryCollection, MultiPoint};

    use super::*;
    use crate::io::wkb::read_wkb;
    use crate::test::polygon::poly0;

    #[test]
    fn point_layout() {
        let buf = to_wkb(&point!(x: 1., y: 2.).into(), &WkbOptions::default()).unwrap();
        assert_eq!(buf.len(), 21);
        assert_eq!(buf[0], 1);
        assert_eq!(&buf[1..5], &1u32.to_le_bytes());
        assert_eq!(&buf[5..13], &1f64.to_le_bytes());

        let options = WkbOptions {
            byte_order: Endianness::BigEndian,
        };
        let buf = to_wkb(&point!(x: 1., y: 2.).into(), &options).unwrap();
        assert_eq!(buf[0], 0);
        assert_eq!(&buf[13..21], &2f64.to_be_bytes());
    }

    #[test]
    fn round_trip_mixed() {
        let geoms: Vec<Geometry> = vec![
            line_string![(x: 0., y: 0.), (x: 1., y: 1.)].into(),
            poly0().into(),
            MultiPoint::new(vec![point!(x: 0., y: 0.), point!(x: 1., y: 1.)]).into(),
            Geometry::GeometryCollection(GeometryCollection::new_from(vec![
                point!(x: 5., y: 5.).into(),
                poly0().into(),
            ])),
        ];
        for geom in geoms {
            for byte_order in [Endianness::LittleEndian, Endianness::BigEndian] {
                let buf = to_wkb(&geom, &WkbOptions { byte_order }).unwrap();
                assert_eq!(read_wkb(&buf).unwrap(), geom);
            }
        }
    }

    #[test]
    fn empty_point_is_nan() {
        let empty = Geometry::Point(geo::Point::new(f64::NAN, f64::NAN));
        let buf = to_wkb(&empty, &WkbOptions::default()).unwrap();
        let Geometry::Point(point) = read_wkb(&buf).unwrap() else {
            panic!("expected a point");
        };
        assert!(point.x().is_nan() && point.y().is_nan());
    }
}
