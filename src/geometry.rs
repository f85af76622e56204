//! The geometry collaborator seam.
//!
//! Spaten stores geometries as well-known binary and never looks inside them.
//! Implement [`Geometry`] to plug a geometry library into the codec; the
//! crate's own [`Wkb`] type keeps the blob opaque.

use crate::error::Result;

/// A geometry that converts to and from well-known binary.
pub trait Geometry: Sized {
    /// Encodes the geometry as well-known binary.
    fn to_wkb(&self) -> Result<Vec<u8>>;

    /// Decodes a geometry from well-known binary.
    ///
    /// Implementations report rejected blobs as `Error::InvalidGeometry`.
    fn from_wkb(bytes: &[u8]) -> Result<Self>;
}

/// An opaque well-known-binary blob, passed through byte for byte.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Wkb(Vec<u8>);

impl Wkb {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    /// Builds a little-endian 2D point.
    pub fn point(x: f64, y: f64) -> Self {
        const WKB_POINT: u32 = 1;
        let mut bytes = Vec::with_capacity(21);
        bytes.push(1); // NDR
        bytes.extend_from_slice(&WKB_POINT.to_le_bytes());
        bytes.extend_from_slice(&x.to_le_bytes());
        bytes.extend_from_slice(&y.to_le_bytes());
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }
}

impl AsRef<[u8]> for Wkb {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<Vec<u8>> for Wkb {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl Geometry for Wkb {
    fn to_wkb(&self) -> Result<Vec<u8>> {
        Ok(self.0.clone())
    }

    fn from_wkb(bytes: &[u8]) -> Result<Self> {
        Ok(Self(bytes.to_vec()))
    }
}
