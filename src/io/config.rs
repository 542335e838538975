//! Serializable WKB writer settings
//!
//! Every field is optional so a config only has to name what it changes:
//! ```json
//! { "byte_order": "xdr", "output_dimension": 2, "include_srid": false }
//! ```

use log::debug;
use serde::{Deserialize, Serialize};

use super::byte_order::{default_byte_order, ByteOrder};
use super::wkb::WkbWriter;
use crate::error::{GeometryError, Result};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WkbConfig {
    /// Falls back to the process-wide default when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub byte_order: Option<ByteOrder>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_dimension: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include_srid: Option<bool>,
}

impl WkbConfig {
    /// Parse a config from JSON text
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| GeometryError::Config(e.to_string()))
    }

    /// Resolve the config into a writer, validating it on the way
    pub fn writer(&self) -> Result<WkbWriter> {
        let mut writer = WkbWriter::new(self.byte_order.unwrap_or_else(default_byte_order));
        if let Some(dimension) = self.output_dimension {
            writer = writer.with_output_dimension(dimension)?;
        }
        if let Some(include_srid) = self.include_srid {
            writer = writer.with_include_srid(include_srid);
        }
        debug!(
            "WKB writer configured: order={:?} dimension={} include_srid={}",
            writer.byte_order(),
            writer.output_dimension(),
            writer.include_srid()
        );
        Ok(writer)
    }
}

impl From<WkbWriter> for WkbConfig {
    fn from(writer: WkbWriter) -> Self {
        WkbConfig {
            byte_order: Some(writer.byte_order()),
            output_dimension: Some(writer.output_dimension()),
            include_srid: Some(writer.include_srid()),
        }
    }
}
