//! Error type shared by the geometry model and every codec
//!
//! Each variant matches one failure family: coordinate access, text parsing,
//! binary decoding and hex transport. Failures are reported at the call that
//! caused them and never leave a half-built geometry behind.

use std::io;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum GeometryError {
    /// Coordinate index outside `[0, size)`
    #[error("coordinate index {index} out of range for sequence of size {size}")]
    Index { index: usize, size: usize },

    /// Z access on a 2D sequence, or an unsupported dimension count
    #[error("{0}")]
    Dimension(String),

    /// Malformed WKT; `offset` is the byte position in the input
    #[error("WKT parse error at offset {offset}: {message}")]
    Parse { offset: usize, message: String },

    /// Truncated or otherwise invalid WKB
    #[error("malformed WKB: {0}")]
    MalformedBuffer(String),

    /// Invalid hex text
    #[error("invalid hex: {0}")]
    Format(String),

    /// A coordinate sequence that cannot back the requested geometry type
    #[error("invalid geometry: {0}")]
    InvalidGeometry(String),

    /// Unusable codec configuration
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Failure of the sink a writer was given
    #[error("{0}")]
    Io(io::Error),
}

impl From<io::Error> for GeometryError {
    fn from(value: io::Error) -> Self {
        match value.kind() {
            io::ErrorKind::UnexpectedEof => {
                GeometryError::MalformedBuffer("unexpected end of buffer".to_string())
            }
            _ => GeometryError::Io(value),
        }
    }
}

pub type Result<T> = std::result::Result<T, GeometryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = GeometryError::Index { index: 3, size: 1 };
        assert_eq!(
            err.to_string(),
            "coordinate index 3 out of range for sequence of size 1"
        );

        let err = GeometryError::Parse {
            offset: 5,
            message: "expected '('".to_string(),
        };
        assert_eq!(err.to_string(), "WKT parse error at offset 5: expected '('");

        let err = GeometryError::Format("odd length 3".to_string());
        assert_eq!(err.to_string(), "invalid hex: odd length 3");
    }

    #[test]
    fn test_eof_maps_to_malformed_buffer() {
        let eof = io::Error::new(io::ErrorKind::UnexpectedEof, "eof");
        let err: GeometryError = eof.into();
        assert!(matches!(err, GeometryError::MalformedBuffer(_)));
        assert_eq!(err.to_string(), "malformed WKB: unexpected end of buffer");

        let other = io::Error::new(io::ErrorKind::BrokenPipe, "pipe closed");
        let err: GeometryError = other.into();
        assert!(matches!(err, GeometryError::Io(_)));
        assert_eq!(err.to_string(), "pipe closed");
    }
}
