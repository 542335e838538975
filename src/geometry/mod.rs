//! Geometry model
//!
//! # Submodules
//! - `coord_seq` - Fixed-size coordinate storage
//! - `types` - Geometry type tags and the `Geometry` container

mod coord_seq;
mod types;

pub use coord_seq::{Coord, CoordinateSequence};
pub use types::{Geometry, GeometryTypeId};
