use thiserror::Error;

/// Custom error types for the spaten library.
#[derive(Error, Debug)]
pub enum Error {
    /// Underlying I/O errors from std::io operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The file preamble is not a Spaten header this library can read.
    #[error("Format error: {0}")]
    Format(#[from] FormatError),

    /// A block uses a wire feature this version does not implement.
    #[error("Unsupported feature: {0}")]
    Unsupported(#[from] UnsupportedFeature),

    /// A declared field or body ended before all of its bytes were read.
    #[error("Truncated stream while reading {context}: expected {expected} bytes, got {actual}")]
    TruncatedStream {
        context: &'static str,
        expected: usize,
        actual: usize,
    },

    /// A block body does not fit the 32-bit length field or a configured limit.
    #[error("Block too large: {len} bytes exceeds limit of {limit}")]
    BlockTooLarge { len: usize, limit: usize },

    /// The block body could not be parsed by the message codec.
    #[error("Protobuf decode error: {0}")]
    Decode(#[from] prost::DecodeError),

    /// A tag carries a type code outside STRING/INT/DOUBLE.
    #[error("Unsupported tag type {code} for key {key:?}")]
    UnsupportedTagType { key: String, code: i32 },

    /// A property value has a kind that cannot be expressed as a tag.
    #[error("Unsupported property type {kind} for key {key:?}")]
    UnsupportedPropertyType { key: String, kind: &'static str },

    /// A tag's value bytes do not match the layout required by its type.
    #[error("Invalid value for tag {key:?}: {reason}")]
    InvalidTagValue { key: String, reason: String },

    /// The geometry collaborator rejected a blob.
    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),

    /// An earlier failed block write may have left a partial block in the sink.
    #[error("Writer poisoned by an earlier failed write")]
    Poisoned,
}

/// Header validation failures.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatError {
    #[error("invalid cookie {found:?}")]
    InvalidCookie { found: [u8; 4] },

    #[error("unsupported version {0}, only version 0 is supported")]
    UnsupportedVersion(u32),
}

/// Block header fields carrying values other than zero.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnsupportedFeature {
    #[error("compression mode {0}")]
    Compression(u8),

    #[error("serialization mode {0}")]
    SerializationMode(u8),
}

impl Error {
    /// Create a new `TruncatedStream` error for a short read.
    pub fn truncated(context: &'static str, expected: usize, actual: usize) -> Self {
        Self::TruncatedStream {
            context,
            expected,
            actual,
        }
    }

    /// Create a new `BlockTooLarge` error.
    pub fn block_too_large(len: usize, limit: usize) -> Self {
        Self::BlockTooLarge { len, limit }
    }

    /// Create a new `InvalidTagValue` error with a descriptive reason.
    pub fn invalid_tag_value(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidTagValue {
            key: key.into(),
            reason: reason.into(),
        }
    }

    /// Returns true for errors raised while validating the file header.
    pub fn is_format(&self) -> bool {
        matches!(self, Self::Format(_))
    }

    /// Returns true for short reads inside a header, block header or body.
    pub fn is_truncated(&self) -> bool {
        matches!(self, Self::TruncatedStream { .. })
    }
}

/// Result type alias for the library operations.
pub type Result<T> = std::result::Result<T, Error>;
