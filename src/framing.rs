//! Defines the block framing and deframing strategies for the byte stream.
//!
//! Every block is `[4-byte body length | 2-byte flags | 1-byte compression |
//! 1-byte serialization mode | body]`, all integers little-endian.

use crate::error::{Error, Result, UnsupportedFeature};
use std::io::{self, Read, Write};
use tracing::trace;

/// Size of the fixed block header in bytes.
pub const BLOCK_HEADER_LEN: usize = 8;

/// The fixed-size header preceding every block body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockHeader {
    pub body_len: u32,
    /// Reserved; always written as zero and ignored on read.
    pub flags: u16,
    pub compression: u8,
    pub serialization: u8,
}

impl BlockHeader {
    /// A header for an uncompressed, protobuf-serialized body.
    pub fn new(body_len: u32) -> Self {
        Self {
            body_len,
            flags: 0,
            compression: 0,
            serialization: 0,
        }
    }

    pub fn to_bytes(&self) -> [u8; BLOCK_HEADER_LEN] {
        let mut out = [0u8; BLOCK_HEADER_LEN];
        out[0..4].copy_from_slice(&self.body_len.to_le_bytes());
        out[4..6].copy_from_slice(&self.flags.to_le_bytes());
        out[6] = self.compression;
        out[7] = self.serialization;
        out
    }

    pub fn from_bytes(bytes: [u8; BLOCK_HEADER_LEN]) -> Self {
        Self {
            body_len: u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]),
            flags: u16::from_le_bytes([bytes[4], bytes[5]]),
            compression: bytes[6],
            serialization: bytes[7],
        }
    }

    /// Rejects compressed bodies and non-protobuf serialization modes.
    pub fn check_supported(&self) -> Result<()> {
        if self.compression != 0 {
            return Err(UnsupportedFeature::Compression(self.compression).into());
        }
        if self.serialization != 0 {
            return Err(UnsupportedFeature::SerializationMode(self.serialization).into());
        }
        Ok(())
    }
}

/// Reads until `buf` is full or the reader is exhausted, returning the number
/// of bytes read. Unlike `read_exact`, a short count is not an error here so
/// callers can tell a clean end of stream from a truncated structure.
pub(crate) fn read_full<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

/// Reads and validates the next block header.
///
/// Returns `Ok(None)` when the reader is exhausted exactly at a block boundary.
/// Compression and serialization mode are checked here, before any body bytes
/// are read.
pub fn read_block_header<R: Read>(reader: &mut R) -> Result<Option<BlockHeader>> {
    let mut bytes = [0u8; BLOCK_HEADER_LEN];
    match read_full(reader, &mut bytes)? {
        0 => return Ok(None), // Clean EOF
        BLOCK_HEADER_LEN => {}
        n => return Err(Error::truncated("block header", BLOCK_HEADER_LEN, n)),
    }

    let header = BlockHeader::from_bytes(bytes);
    header.check_supported()?;
    trace!(body_len = header.body_len, flags = header.flags, "read block header");
    Ok(Some(header))
}

/// Reads exactly `body_len` bytes into `buffer`.
///
/// Uses `Read::take` so a corrupt length does not allocate the declared size
/// up front.
pub fn read_block_body<R: Read>(reader: &mut R, buffer: &mut Vec<u8>, body_len: u32) -> Result<()> {
    let body_len = body_len as usize;
    buffer.clear();
    reader.take(body_len as u64).read_to_end(buffer)?;
    if buffer.len() != body_len {
        return Err(Error::truncated("block body", body_len, buffer.len()));
    }
    Ok(())
}

//--- Framer Trait and Implementations ---

/// A trait that defines how an encoded block body is framed and written to a stream.
pub trait Framer {
    fn frame_and_write<W: Write>(&self, writer: &mut W, body: &[u8]) -> Result<()>;
}

/// The only framing this format version defines: zero flags, no compression,
/// protobuf serialization.
#[derive(Debug, Clone, Copy, Default)]
pub struct SpatenFramer;

impl Framer for SpatenFramer {
    fn frame_and_write<W: Write>(&self, writer: &mut W, body: &[u8]) -> Result<()> {
        // Enforce 32-bit length header contract to avoid truncation on cast
        let body_len = u32::try_from(body.len())
            .map_err(|_| Error::block_too_large(body.len(), u32::MAX as usize))?;
        writer.write_all(&BlockHeader::new(body_len).to_bytes())?;
        writer.write_all(body)?;
        Ok(())
    }
}

/// A composable adapter that enforces a maximum body length for any framer.
#[derive(Debug, Clone, Copy)]
pub struct BoundedFramer<F: Framer> {
    inner: F,
    max_len: usize,
}

impl<F: Framer> BoundedFramer<F> {
    pub fn new(inner: F, max_len: usize) -> Self {
        Self { inner, max_len }
    }
}

impl<F: Framer> Framer for BoundedFramer<F> {
    fn frame_and_write<W: Write>(&self, writer: &mut W, body: &[u8]) -> Result<()> {
        if body.len() > self.max_len {
            return Err(Error::block_too_large(body.len(), self.max_len));
        }
        self.inner.frame_and_write(writer, body)
    }
}

//--- Deframer Trait and Implementations ---

/// A trait that defines how a block is deframed and read from a stream.
pub trait Deframer {
    /// Reads the next block body into `buffer`.
    /// Returns Ok(Some(header)) on success, Ok(None) on clean EOF.
    fn read_and_deframe<R: Read>(
        &self,
        reader: &mut R,
        buffer: &mut Vec<u8>,
    ) -> Result<Option<BlockHeader>>;

    /// Called when the block header has already been read and validated.
    fn read_after_header<R: Read>(
        &self,
        reader: &mut R,
        buffer: &mut Vec<u8>,
        header: BlockHeader,
    ) -> Result<BlockHeader>;
}

/// The default deframing strategy.
#[derive(Debug, Clone, Copy, Default)]
pub struct SpatenDeframer;

impl Deframer for SpatenDeframer {
    fn read_and_deframe<R: Read>(
        &self,
        reader: &mut R,
        buffer: &mut Vec<u8>,
    ) -> Result<Option<BlockHeader>> {
        match read_block_header(reader)? {
            Some(header) => self.read_after_header(reader, buffer, header).map(Some),
            None => Ok(None),
        }
    }

    fn read_after_header<R: Read>(
        &self,
        reader: &mut R,
        buffer: &mut Vec<u8>,
        header: BlockHeader,
    ) -> Result<BlockHeader> {
        read_block_body(reader, buffer, header.body_len)?;
        Ok(header)
    }
}

/// A composable adapter that enforces a maximum block body length for any
/// deframer. The limit is checked against the declared length, before the
/// body is read.
#[derive(Debug, Clone, Copy)]
pub struct BoundedDeframer<D: Deframer> {
    inner: D,
    max: usize,
}

impl<D: Deframer> BoundedDeframer<D> {
    pub fn new(inner: D, max: usize) -> Self {
        Self { inner, max }
    }
}

impl<D: Deframer> Deframer for BoundedDeframer<D> {
    fn read_and_deframe<R: Read>(
        &self,
        reader: &mut R,
        buffer: &mut Vec<u8>,
    ) -> Result<Option<BlockHeader>> {
        match read_block_header(reader)? {
            Some(header) => self.read_after_header(reader, buffer, header).map(Some),
            None => Ok(None),
        }
    }

    fn read_after_header<R: Read>(
        &self,
        reader: &mut R,
        buffer: &mut Vec<u8>,
        header: BlockHeader,
    ) -> Result<BlockHeader> {
        if header.body_len as usize > self.max {
            return Err(Error::block_too_large(header.body_len as usize, self.max));
        }
        self.inner.read_after_header(reader, buffer, header)
    }
}

//--- Fluent Extension Traits ---

/// Extension methods for framers to enable fluent composition.
pub trait FramerExt: Framer + Sized {
    /// Enforce a maximum body length.
    fn bounded(self, max: usize) -> BoundedFramer<Self> {
        BoundedFramer::new(self, max)
    }
}

impl<T: Framer> FramerExt for T {}

/// Extension methods for deframers to enable fluent composition.
pub trait DeframerExt: Deframer + Sized {
    /// Enforce a maximum body length.
    fn bounded(self, max: usize) -> BoundedDeframer<Self> {
        BoundedDeframer::new(self, max)
    }
}

impl<T: Deframer> DeframerExt for T {}
