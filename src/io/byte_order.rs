//! WKB byte order and the process-wide default used by default-constructed writers

use std::sync::atomic::{AtomicU8, Ordering};

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{GeometryError, Result};

/// WKB byte order, named after the marker byte conventions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ByteOrder {
    /// Big-endian, marker `0x00`
    Xdr,
    /// Little-endian, marker `0x01`
    #[default]
    Ndr,
}

impl ByteOrder {
    /// The leading marker byte of a WKB buffer in this order
    pub fn marker(&self) -> u8 {
        match self {
            ByteOrder::Xdr => 0x00,
            ByteOrder::Ndr => 0x01,
        }
    }

    /// Interpret a WKB marker byte
    pub fn from_marker(byte: u8) -> Result<Self> {
        match byte {
            0x00 => Ok(ByteOrder::Xdr),
            0x01 => Ok(ByteOrder::Ndr),
            other => Err(GeometryError::MalformedBuffer(format!(
                "invalid byte order marker 0x{:02X}",
                other
            ))),
        }
    }
}

/// Process-wide default, stored as the marker byte
static DEFAULT_BYTE_ORDER: AtomicU8 = AtomicU8::new(0x01);

/// Set the byte order picked up by `WkbWriter::default()`
///
/// Writers that already exist keep the order they were built with.
pub fn set_default_byte_order(order: ByteOrder) {
    let previous = DEFAULT_BYTE_ORDER.swap(order.marker(), Ordering::SeqCst);
    if previous != order.marker() {
        debug!("default WKB byte order set to {:?}", order);
    }
}

/// Current process-wide default byte order (NDR until changed)
pub fn default_byte_order() -> ByteOrder {
    match DEFAULT_BYTE_ORDER.load(Ordering::SeqCst) {
        0x00 => ByteOrder::Xdr,
        _ => ByteOrder::Ndr,
    }
}
