//! Well-Known Binary reader and writer with the EWKB SRID extension
//!
//! Layout of every buffer produced here:
//! ```text
//! [order: u8][type word: u32][srid: i32, only if SRID_FLAG][count: u32, line strings only][ordinates: f64...]
//! ```
//! Every multi-byte field uses the order named by the first byte. The writer
//! picks that order from its own configuration; the reader always trusts the
//! marker of the buffer it is given.

use std::io::{Cursor, Write};

use byteorder::{BigEndian, LittleEndian, ReadBytesExt, WriteBytesExt};
use log::trace;

use super::byte_order::{default_byte_order, ByteOrder};
use super::hex;
use crate::error::{GeometryError, Result};
use crate::geometry::{CoordinateSequence, Geometry, GeometryTypeId};

/// EWKB: an SRID follows the type word
pub const SRID_FLAG: u32 = 0x2000_0000;
/// EWKB: coordinates carry a Z ordinate
pub const Z_FLAG: u32 = 0x8000_0000;
/// EWKB: coordinates carry an M ordinate (not supported)
pub const M_FLAG: u32 = 0x4000_0000;
/// Flag bit with no assigned meaning; a type word carrying it is rejected
pub const RESERVED_FLAG: u32 = 0x1000_0000;
/// Type word without the EWKB flag bits; what remains is the (ISO) type code
pub const TYPE_CODE_MASK: u32 = 0x0FFF_FFFF;

/// ISO type codes encode dimensions in thousands: 1000 = Z, 2000 = M, 3000 = ZM
const ISO_DIMENSION_STEP: u32 = 1000;

/// Bytes taken by one ordinate
const ORDINATE_SIZE: usize = 8;

/// Build the type word for a geometry header
fn encode_type_word(geometry_type: GeometryTypeId, has_z: bool, has_srid: bool) -> u32 {
    let mut word = geometry_type.wkb_id();
    if has_z {
        word |= Z_FLAG;
    }
    if has_srid {
        word |= SRID_FLAG;
    }
    word
}

/// Decoded contents of a type word
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct TypeWord {
    geometry_type: GeometryTypeId,
    has_z: bool,
    has_srid: bool,
}

impl TypeWord {
    fn decode(word: u32) -> Result<Self> {
        if word & M_FLAG != 0 {
            return Err(GeometryError::MalformedBuffer(
                "geometries with M ordinates are not supported".to_string(),
            ));
        }
        if word & RESERVED_FLAG != 0 {
            return Err(GeometryError::MalformedBuffer(format!(
                "reserved bit set in type word 0x{:08X}",
                word
            )));
        }

        let code = word & TYPE_CODE_MASK;
        let (base, iso_z) = match code / ISO_DIMENSION_STEP {
            0 => (code, false),
            1 => (code - ISO_DIMENSION_STEP, true),
            2 | 3 => {
                return Err(GeometryError::MalformedBuffer(
                    "geometries with M ordinates are not supported".to_string(),
                ))
            }
            _ => {
                return Err(GeometryError::MalformedBuffer(format!(
                    "unsupported geometry type code {}",
                    code
                )))
            }
        };

        Ok(TypeWord {
            geometry_type: GeometryTypeId::try_from_wkb_id(base)?,
            has_z: iso_z || word & Z_FLAG != 0,
            has_srid: word & SRID_FLAG != 0,
        })
    }
}

/// Encodes geometries as (E)WKB
///
/// The byte order is part of the writer, so writers with different orders can
/// be used side by side. `WkbWriter::default()` takes its order from the
/// process-wide default at construction time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WkbWriter {
    byte_order: ByteOrder,
    output_dimension: usize,
    include_srid: bool,
}

impl Default for WkbWriter {
    fn default() -> Self {
        Self::new(default_byte_order())
    }
}

impl WkbWriter {
    /// Writer in the given byte order that writes Z when present and includes the SRID
    pub fn new(byte_order: ByteOrder) -> Self {
        Self {
            byte_order,
            output_dimension: 3,
            include_srid: true,
        }
    }

    /// Limit the ordinates written per coordinate; 2 drops Z, 3 keeps it when present
    pub fn with_output_dimension(mut self, dimension: usize) -> Result<Self> {
        if !(2..=3).contains(&dimension) {
            return Err(GeometryError::Config(format!(
                "output dimension must be 2 or 3, got {}",
                dimension
            )));
        }
        self.output_dimension = dimension;
        Ok(self)
    }

    /// Whether a set SRID is written (EWKB) or dropped (plain WKB)
    pub fn with_include_srid(mut self, include_srid: bool) -> Self {
        self.include_srid = include_srid;
        self
    }

    pub fn byte_order(&self) -> ByteOrder {
        self.byte_order
    }

    pub fn output_dimension(&self) -> usize {
        self.output_dimension
    }

    pub fn include_srid(&self) -> bool {
        self.include_srid
    }

    /// Encode `geom` into a new buffer
    pub fn write(&self, geom: &Geometry) -> Result<Vec<u8>> {
        let mut buf = Vec::with_capacity(self.encoded_len(geom));
        self.write_to(&mut buf, geom)?;
        Ok(buf)
    }

    /// Encode `geom` and hex-encode the result
    pub fn write_hex(&self, geom: &Geometry) -> Result<String> {
        Ok(hex::to_hex(&self.write(geom)?))
    }

    /// Encode `geom` into any byte sink
    pub fn write_to<W: Write>(&self, out: &mut W, geom: &Geometry) -> Result<()> {
        match self.byte_order {
            ByteOrder::Xdr => self.write_body::<BigEndian, W>(out, geom),
            ByteOrder::Ndr => self.write_body::<LittleEndian, W>(out, geom),
        }
    }

    fn write_body<E: byteorder::ByteOrder, W: Write>(
        &self,
        out: &mut W,
        geom: &Geometry,
    ) -> Result<()> {
        let coords = geom.coord_seq();
        let write_z = self.writes_z(geom);
        let srid = geom.srid().filter(|_| self.include_srid);
        let type_word = encode_type_word(geom.geometry_type(), write_z, srid.is_some());

        trace!(
            "writing WKB {:?} type word 0x{:08X} srid {:?}",
            self.byte_order,
            type_word,
            srid
        );

        out.write_u8(self.byte_order.marker())?;
        out.write_u32::<E>(type_word)?;
        if let Some(srid) = srid {
            out.write_i32::<E>(srid)?;
        }

        if geom.geometry_type() == GeometryTypeId::LineString {
            let count: u32 = coords.size().try_into().map_err(|_| {
                GeometryError::InvalidGeometry(format!(
                    "{} coordinates do not fit a WKB point count",
                    coords.size()
                ))
            })?;
            out.write_u32::<E>(count)?;
        }

        for c in coords.iter() {
            out.write_f64::<E>(c.x)?;
            out.write_f64::<E>(c.y)?;
            if write_z {
                out.write_f64::<E>(c.z.unwrap_or(f64::NAN))?;
            }
        }
        Ok(())
    }

    fn writes_z(&self, geom: &Geometry) -> bool {
        self.output_dimension == 3 && geom.has_z()
    }

    /// Exact size of the buffer `write` produces for `geom`
    pub fn encoded_len(&self, geom: &Geometry) -> usize {
        let mut len = 1 + 4;
        if self.include_srid && geom.srid().is_some() {
            len += 4;
        }
        if geom.geometry_type() == GeometryTypeId::LineString {
            len += 4;
        }
        let dims = if self.writes_z(geom) { 3 } else { 2 };
        len + geom.coord_seq().size() * dims * ORDINATE_SIZE
    }
}

/// Decodes (E)WKB buffers
///
/// The reader has no byte order setting: each buffer declares its own.
#[derive(Debug, Clone, Copy, Default)]
pub struct WkbReader;

impl WkbReader {
    pub fn new() -> Self {
        WkbReader
    }

    /// Decode one geometry; the whole buffer must be consumed
    pub fn read(&self, buf: &[u8]) -> Result<Geometry> {
        let mut cursor = Cursor::new(buf);
        let order = ByteOrder::from_marker(cursor.read_u8()?)?;

        let geom = match order {
            ByteOrder::Xdr => read_body::<BigEndian>(&mut cursor, order)?,
            ByteOrder::Ndr => read_body::<LittleEndian>(&mut cursor, order)?,
        };

        let consumed = cursor.position() as usize;
        if consumed != buf.len() {
            return Err(GeometryError::MalformedBuffer(format!(
                "{} trailing bytes after geometry",
                buf.len() - consumed
            )));
        }
        Ok(geom)
    }

    /// Hex-decode `text` and decode the resulting buffer
    pub fn read_hex(&self, text: &str) -> Result<Geometry> {
        self.read(&hex::from_hex(text)?)
    }
}

fn read_body<E: byteorder::ByteOrder>(
    cursor: &mut Cursor<&[u8]>,
    order: ByteOrder,
) -> Result<Geometry> {
    let type_word = cursor.read_u32::<E>()?;
    let header = TypeWord::decode(type_word)?;

    let srid = if header.has_srid {
        Some(cursor.read_i32::<E>()?)
    } else {
        None
    };

    trace!(
        "reading WKB {:?} type word 0x{:08X} ({:?}, z={}) srid {:?}",
        order,
        type_word,
        header.geometry_type,
        header.has_z,
        srid
    );

    let count = match header.geometry_type {
        GeometryTypeId::Point => 1,
        GeometryTypeId::LineString => cursor.read_u32::<E>()? as usize,
    };
    let dimension = if header.has_z { 3 } else { 2 };

    // Reject impossible counts before allocating for them
    let remaining = cursor.get_ref().len() - cursor.position() as usize;
    let needed = count
        .checked_mul(dimension * ORDINATE_SIZE)
        .ok_or_else(|| GeometryError::MalformedBuffer(format!("point count {} overflows", count)))?;
    if needed > remaining {
        return Err(GeometryError::MalformedBuffer(format!(
            "{} coordinates need {} bytes, only {} left",
            count, needed, remaining
        )));
    }

    let mut coords = CoordinateSequence::new(count, dimension)?;
    for i in 0..count {
        coords.set_x(i, cursor.read_f64::<E>()?)?;
        coords.set_y(i, cursor.read_f64::<E>()?)?;
        if header.has_z {
            coords.set_z(i, cursor.read_f64::<E>()?)?;
        }
    }

    let mut geom = Geometry::new(header.geometry_type, coords)
        .map_err(|e| GeometryError::MalformedBuffer(e.to_string()))?;
    geom.set_srid(srid);
    Ok(geom)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Coord;
    use proptest::prelude::*;
    use rstest::rstest;

    const POINT_7_8_SRID_4326_NDR: &str = "0101000020E61000000000000000001C400000000000002040";
    const POINT_7_8_SRID_4326_XDR: &str = "0020000001000010E6401C0000000000004020000000000000";

    fn point_7_8() -> Geometry {
        Geometry::point_xy(7.0, 8.0)
    }

    #[test]
    fn test_type_word_flags() {
        assert_eq!(encode_type_word(GeometryTypeId::Point, false, false), 0x0000_0001);
        assert_eq!(encode_type_word(GeometryTypeId::Point, false, true), 0x2000_0001);
        assert_eq!(encode_type_word(GeometryTypeId::LineString, true, true), 0xA000_0002);
    }

    #[rstest]
    #[case(0x0000_0001, GeometryTypeId::Point, false, false)]
    #[case(0x2000_0001, GeometryTypeId::Point, false, true)]
    #[case(0x8000_0001, GeometryTypeId::Point, true, false)]
    #[case(1001, GeometryTypeId::Point, true, false)]
    #[case(0x2000_0002, GeometryTypeId::LineString, false, true)]
    #[case(1002, GeometryTypeId::LineString, true, false)]
    fn test_type_word_decode(
        #[case] word: u32,
        #[case] geometry_type: GeometryTypeId,
        #[case] has_z: bool,
        #[case] has_srid: bool,
    ) {
        let decoded = TypeWord::decode(word).unwrap();
        assert_eq!(
            decoded,
            TypeWord {
                geometry_type,
                has_z,
                has_srid
            }
        );
    }

    #[rstest]
    #[case(0x4000_0001)]
    #[case(2001)]
    #[case(3001)]
    #[case(3)]
    #[case(7)]
    #[case(5001)]
    #[case(0x1000_0001)]
    #[case(0x3000_0002)]
    fn test_type_word_unsupported(#[case] word: u32) {
        assert!(matches!(
            TypeWord::decode(word),
            Err(GeometryError::MalformedBuffer(_))
        ));
    }

    #[test]
    fn test_write_point_with_srid_ndr() {
        let geom = point_7_8().with_srid(4326);
        let hex = WkbWriter::new(ByteOrder::Ndr).write_hex(&geom).unwrap();
        assert_eq!(hex, POINT_7_8_SRID_4326_NDR);
    }

    #[test]
    fn test_write_point_with_srid_xdr() {
        let geom = point_7_8().with_srid(4326);
        let hex = WkbWriter::new(ByteOrder::Xdr).write_hex(&geom).unwrap();
        assert_eq!(hex, POINT_7_8_SRID_4326_XDR);
    }

    #[test]
    fn test_unset_srid_never_sets_flag() {
        let buf = WkbWriter::new(ByteOrder::Ndr).write(&point_7_8()).unwrap();
        assert_eq!(buf.len(), 21);
        assert_eq!(&buf[..5], &[0x01, 0x01, 0x00, 0x00, 0x00]);

        let buf = WkbWriter::new(ByteOrder::Xdr).write(&point_7_8()).unwrap();
        assert_eq!(&buf[..5], &[0x00, 0x00, 0x00, 0x00, 0x01]);
    }

    #[test]
    fn test_include_srid_off_drops_srid() {
        let geom = point_7_8().with_srid(4326);
        let writer = WkbWriter::new(ByteOrder::Ndr).with_include_srid(false);
        let decoded = WkbReader::new().read(&writer.write(&geom).unwrap()).unwrap();
        assert_eq!(decoded.srid(), None);
        assert_eq!(decoded.coord_seq().get_x(0).unwrap(), 7.0);
    }

    #[test]
    fn test_read_ignores_writer_order() {
        // both buffers decode the same, whatever the ambient default says
        let ndr = WkbReader::new().read_hex(POINT_7_8_SRID_4326_NDR).unwrap();
        let xdr = WkbReader::new().read_hex(POINT_7_8_SRID_4326_XDR).unwrap();
        assert_eq!(ndr, xdr);
        assert_eq!(ndr.srid(), Some(4326));
        assert_eq!(ndr.coord_seq().get_x(0).unwrap(), 7.0);
        assert_eq!(ndr.coord_seq().get_y(0).unwrap(), 8.0);
    }

    #[rstest]
    fn test_point_roundtrip(
        #[values(ByteOrder::Ndr, ByteOrder::Xdr)] order: ByteOrder,
        #[values(None, Some(0), Some(4326), Some(-1), Some(i32::MIN), Some(i32::MAX))] srid: Option<i32>,
    ) {
        let mut geom = Geometry::point_xy(-122.4194, 1.0e-300);
        geom.set_srid(srid);

        let buf = WkbWriter::new(order).write(&geom).unwrap();
        assert_eq!(buf[0], order.marker());
        assert_eq!(buf.len(), WkbWriter::new(order).encoded_len(&geom));

        let decoded = WkbReader::new().read(&buf).unwrap();
        assert_eq!(decoded, geom);
    }

    proptest! {
        #[test]
        fn test_point_roundtrip_any_bits(
            x in any::<u64>().prop_map(f64::from_bits),
            y in any::<u64>().prop_map(f64::from_bits),
            srid in proptest::option::of(any::<i32>()),
            order in prop_oneof![Just(ByteOrder::Ndr), Just(ByteOrder::Xdr)],
        ) {
            let mut geom = Geometry::point_xy(x, y);
            geom.set_srid(srid);

            let buf = WkbWriter::new(order).write(&geom).unwrap();
            let decoded = WkbReader::new().read(&buf).unwrap();
            prop_assert_eq!(decoded.srid(), srid);
            prop_assert_eq!(decoded.coord_seq().get_x(0).unwrap().to_bits(), x.to_bits());
            prop_assert_eq!(decoded.coord_seq().get_y(0).unwrap().to_bits(), y.to_bits());
        }

        #[test]
        fn test_read_arbitrary_bytes_never_panics(buf in proptest::collection::vec(any::<u8>(), 0..64)) {
            let _ = WkbReader::new().read(&buf);
        }
    }

    #[test]
    fn test_line_string_z_roundtrip() {
        let coords = CoordinateSequence::from_coords(&[
            Coord::xyz(0.0, 0.0, 1.0),
            Coord::xyz(1.5, -2.5, 3.0),
            Coord::xyz(f64::MAX, f64::MIN, 0.0),
        ])
        .unwrap();
        let geom = Geometry::line_string(coords).unwrap().with_srid(3857);

        for order in [ByteOrder::Ndr, ByteOrder::Xdr] {
            let buf = WkbWriter::new(order).write(&geom).unwrap();
            // order + type + srid + count + 3 * 3 ordinates
            assert_eq!(buf.len(), 1 + 4 + 4 + 4 + 72);
            assert_eq!(WkbReader::new().read(&buf).unwrap(), geom);
        }
    }

    #[test]
    fn test_empty_line_string_roundtrip() {
        let geom = Geometry::line_string(CoordinateSequence::new(0, 2).unwrap()).unwrap();
        let buf = WkbWriter::new(ByteOrder::Ndr).write(&geom).unwrap();
        assert_eq!(buf, vec![0x01, 0x02, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00]);
        assert!(WkbReader::new().read(&buf).unwrap().is_empty());
    }

    #[test]
    fn test_output_dimension_2_drops_z() {
        let geom = Geometry::point(CoordinateSequence::single(Coord::xyz(1.0, 2.0, 3.0))).unwrap();
        let writer = WkbWriter::new(ByteOrder::Ndr).with_output_dimension(2).unwrap();
        let decoded = WkbReader::new().read(&writer.write(&geom).unwrap()).unwrap();
        assert!(!decoded.has_z());
        assert_eq!(decoded.coord_seq().get_y(0).unwrap(), 2.0);

        assert!(matches!(
            WkbWriter::new(ByteOrder::Ndr).with_output_dimension(4),
            Err(GeometryError::Config(_))
        ));
    }

    #[test]
    fn test_iso_z_point() {
        // ISO type 1001, NDR, POINT Z (1 2 3)
        let mut buf = vec![0x01, 0xE9, 0x03, 0x00, 0x00];
        for v in [1.0f64, 2.0, 3.0] {
            buf.extend_from_slice(&v.to_le_bytes());
        }
        let geom = WkbReader::new().read(&buf).unwrap();
        assert!(geom.has_z());
        assert_eq!(geom.coord_seq().get_z(0).unwrap(), 3.0);
    }

    #[test]
    fn test_every_truncation_is_malformed() {
        let buf = crate::io::hex::from_hex(POINT_7_8_SRID_4326_NDR).unwrap();
        for len in 0..buf.len() {
            assert!(
                matches!(
                    WkbReader::new().read(&buf[..len]),
                    Err(GeometryError::MalformedBuffer(_))
                ),
                "prefix of length {} should not decode",
                len
            );
        }
    }

    #[test]
    fn test_trailing_bytes_rejected() {
        let mut buf = crate::io::hex::from_hex(POINT_7_8_SRID_4326_NDR).unwrap();
        buf.push(0);
        assert!(matches!(
            WkbReader::new().read(&buf),
            Err(GeometryError::MalformedBuffer(_))
        ));
    }

    #[test]
    fn test_bad_order_marker() {
        let mut buf = crate::io::hex::from_hex(POINT_7_8_SRID_4326_NDR).unwrap();
        buf[0] = 0x02;
        assert!(matches!(
            WkbReader::new().read(&buf),
            Err(GeometryError::MalformedBuffer(_))
        ));
    }

    #[test]
    fn test_huge_point_count_rejected_without_allocation() {
        // LINESTRING claiming u32::MAX points with no ordinate data
        let buf = [0x01, 0x02, 0x00, 0x00, 0x00, 0xFF, 0xFF, 0xFF, 0xFF];
        let err = WkbReader::new().read(&buf).unwrap_err();
        assert!(matches!(err, GeometryError::MalformedBuffer(_)));
    }

    #[test]
    fn test_single_point_line_string_rejected() {
        let mut buf = vec![0x01, 0x02, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00];
        buf.extend_from_slice(&1.0f64.to_le_bytes());
        buf.extend_from_slice(&2.0f64.to_le_bytes());
        assert!(matches!(
            WkbReader::new().read(&buf),
            Err(GeometryError::MalformedBuffer(_))
        ));
    }
}
