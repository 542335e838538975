//! Geometry serialization with SRID support
//!
//! Converts geometries to and from Well-Known Text and (hex-encoded)
//! Well-Known Binary. A set SRID travels in the EWKB header; WKT output leaves
//! it out unless asked otherwise.

pub mod error;
pub mod geometry;
pub mod io;

pub use error::{GeometryError, Result};
pub use geometry::{Coord, CoordinateSequence, Geometry, GeometryTypeId};
pub use io::{
    default_byte_order, set_default_byte_order, ByteOrder, WkbConfig, WkbReader, WkbWriter,
    WktReader, WktWriter,
};

/// Parses WKT text into a geometry
///
/// # Arguments
/// * `text` - WKT such as `POINT(7 8)`, optionally prefixed with `SRID=n;`
///
/// # Returns
/// * `Result<Geometry>` - The geometry, or `GeometryError::Parse`
///
/// # Example
/// ```ignore
/// let mut geom = from_wkt("POINT(7 8)")?;
/// geom.set_srid(Some(4326));
/// ```
pub fn from_wkt(text: &str) -> Result<Geometry> {
    WktReader::new().read(text)
}

/// Renders a geometry as WKT (without SRID)
pub fn to_wkt(geom: &Geometry) -> String {
    WktWriter::new().write(geom)
}

/// Encodes a geometry as WKB in the process-wide default byte order
pub fn to_wkb(geom: &Geometry) -> Result<Vec<u8>> {
    WkbWriter::default().write(geom)
}

/// Decodes a WKB buffer; the buffer's own order marker decides endianness
pub fn from_wkb(buf: &[u8]) -> Result<Geometry> {
    WkbReader::new().read(buf)
}

/// Encodes a geometry as upper-case hex WKB in the process-wide default byte order
///
/// # Example
/// ```ignore
/// let geom = Geometry::point_xy(7.0, 8.0).with_srid(4326);
/// assert_eq!(to_hex(&geom)?, "0101000020E61000000000000000001C400000000000002040");
/// ```
pub fn to_hex(geom: &Geometry) -> Result<String> {
    WkbWriter::default().write_hex(geom)
}

/// Decodes hex-encoded WKB (either case)
///
/// # Returns
/// * `Result<Geometry>` - `GeometryError::Format` for bad hex text,
///   `GeometryError::MalformedBuffer` for bad WKB
pub fn from_hex(text: &str) -> Result<Geometry> {
    WkbReader::new().read_hex(text)
}
