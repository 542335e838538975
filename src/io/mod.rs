//! Text and binary codecs for geometries
//!
//! # Submodules
//! - `byte_order` - NDR/XDR byte order and the process-wide default
//! - `wkb` - Well-Known Binary reader and writer (EWKB SRID extension)
//! - `wkt` - Well-Known Text reader and writer
//! - `hex` - Hex transport for WKB buffers
//! - `config` - Serializable WKB writer settings

mod byte_order;
mod config;
mod hex;
mod wkb;
mod wkt;

pub use byte_order::{default_byte_order, set_default_byte_order, ByteOrder};
pub use config::WkbConfig;
pub use hex::{from_hex, to_hex};
pub use wkb::{WkbReader, WkbWriter, M_FLAG, RESERVED_FLAG, SRID_FLAG, TYPE_CODE_MASK, Z_FLAG};
pub use wkt::{WktReader, WktWriter};
