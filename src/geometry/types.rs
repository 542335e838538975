//! Core geometry types
//!
//! A `Geometry` owns exactly one coordinate sequence, carries a type tag that
//! is fixed at construction and an optional SRID.

use serde::Serialize;

use super::coord_seq::{Coord, CoordinateSequence};
use crate::error::{GeometryError, Result};

/// Geometry type tag, numbered as in the WKB type word
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum GeometryTypeId {
    Point,
    LineString,
}

impl GeometryTypeId {
    /// Base WKB code (low bits of the type word)
    pub fn wkb_id(&self) -> u32 {
        match self {
            GeometryTypeId::Point => 1,
            GeometryTypeId::LineString => 2,
        }
    }

    /// Map a base WKB code back to a type tag
    pub fn try_from_wkb_id(code: u32) -> Result<Self> {
        match code {
            1 => Ok(GeometryTypeId::Point),
            2 => Ok(GeometryTypeId::LineString),
            _ => Err(GeometryError::MalformedBuffer(format!(
                "unsupported geometry type code {}",
                code
            ))),
        }
    }

    /// Upper-case WKT keyword
    pub fn wkt_keyword(&self) -> &'static str {
        match self {
            GeometryTypeId::Point => "POINT",
            GeometryTypeId::LineString => "LINESTRING",
        }
    }
}

/// A geometry with an optional spatial reference identifier
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Geometry {
    geometry_type: GeometryTypeId,
    coords: CoordinateSequence,
    #[serde(skip_serializing_if = "Option::is_none")]
    srid: Option<i32>,
}

impl Geometry {
    /// Wrap a sequence of exactly one coordinate as a point
    pub fn point(coords: CoordinateSequence) -> Result<Self> {
        if coords.size() != 1 {
            return Err(GeometryError::InvalidGeometry(format!(
                "a point needs exactly 1 coordinate, got {}",
                coords.size()
            )));
        }
        Ok(Self::from_parts(GeometryTypeId::Point, coords))
    }

    /// Wrap a sequence as a line string; it must be empty or hold at least 2 coordinates
    pub fn line_string(coords: CoordinateSequence) -> Result<Self> {
        if coords.size() == 1 {
            return Err(GeometryError::InvalidGeometry(
                "a line string needs 0 or at least 2 coordinates, got 1".to_string(),
            ));
        }
        Ok(Self::from_parts(GeometryTypeId::LineString, coords))
    }

    /// Convenience constructor for a 2D point
    pub fn point_xy(x: f64, y: f64) -> Self {
        Self::from_parts(GeometryTypeId::Point, CoordinateSequence::single(Coord::xy(x, y)))
    }

    /// Dispatch on `geometry_type`, applying that type's checks
    pub fn new(geometry_type: GeometryTypeId, coords: CoordinateSequence) -> Result<Self> {
        match geometry_type {
            GeometryTypeId::Point => Self::point(coords),
            GeometryTypeId::LineString => Self::line_string(coords),
        }
    }

    fn from_parts(geometry_type: GeometryTypeId, coords: CoordinateSequence) -> Self {
        Self {
            geometry_type,
            coords,
            srid: None,
        }
    }

    pub fn geometry_type(&self) -> GeometryTypeId {
        self.geometry_type
    }

    /// The owned coordinate sequence
    pub fn coord_seq(&self) -> &CoordinateSequence {
        &self.coords
    }

    /// Mutable access to ordinate values; size and dimension stay fixed
    pub fn coord_seq_mut(&mut self) -> &mut CoordinateSequence {
        &mut self.coords
    }

    /// `None` until an SRID is assigned
    pub fn srid(&self) -> Option<i32> {
        self.srid
    }

    pub fn set_srid(&mut self, srid: Option<i32>) {
        self.srid = srid;
    }

    /// Builder form of [`Geometry::set_srid`]
    pub fn with_srid(mut self, srid: i32) -> Self {
        self.srid = Some(srid);
        self
    }

    pub fn has_z(&self) -> bool {
        self.coords.has_z()
    }

    pub fn is_empty(&self) -> bool {
        self.coords.is_empty()
    }
}
