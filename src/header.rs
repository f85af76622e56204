//! The 8-byte file preamble: `[4-byte cookie | 4-byte little-endian version]`.
//!
//! A header is written exactly once, at offset 0, and validated exactly once
//! when a stream is opened. Nothing after it is self-describing.

use crate::error::{Error, FormatError, Result};
use crate::framing::{read_block_header, read_full, BLOCK_HEADER_LEN};
use std::io::{Read, Seek, SeekFrom, Write};
use tracing::debug;

/// The fixed magic cookie opening every Spaten stream.
pub const MAGIC: [u8; 4] = *b"SPAT";

/// The only format version this library reads or writes.
pub const VERSION: u32 = 0;

/// Size of the file preamble in bytes.
pub const HEADER_LEN: usize = 8;

/// Reads and validates the file header, returning its version.
///
/// Fails with `Error::TruncatedStream` if fewer than 8 bytes are available,
/// `FormatError::InvalidCookie` if the magic does not match and
/// `FormatError::UnsupportedVersion` for any version other than [`VERSION`].
pub fn read_header<R: Read>(reader: &mut R) -> Result<u32> {
    let mut cookie = [0u8; 4];
    let n = read_full(reader, &mut cookie)?;
    if n < cookie.len() {
        return Err(Error::truncated("header cookie", cookie.len(), n));
    }
    if cookie != MAGIC {
        return Err(FormatError::InvalidCookie { found: cookie }.into());
    }

    let mut version_bytes = [0u8; 4];
    let n = read_full(reader, &mut version_bytes)?;
    if n < version_bytes.len() {
        return Err(Error::truncated("header version", version_bytes.len(), n));
    }
    let version = u32::from_le_bytes(version_bytes);
    if version != VERSION {
        return Err(FormatError::UnsupportedVersion(version).into());
    }

    debug!(version, "validated spaten header");
    Ok(version)
}

/// Writes the magic cookie followed by the supported version.
pub fn write_header<W: Write>(writer: &mut W) -> Result<()> {
    let mut header = [0u8; HEADER_LEN];
    header[..4].copy_from_slice(&MAGIC);
    header[4..].copy_from_slice(&VERSION.to_le_bytes());
    writer.write_all(&header)?;
    debug!(version = VERSION, "wrote spaten header");
    Ok(())
}

/// What opening a channel for appending did to its header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderState {
    /// The channel was empty and a fresh header was written.
    Created,
    /// An existing header was validated; carries its version.
    Existing(u32),
}

/// Prepares a seekable channel for appending blocks.
///
/// An empty channel gets a new header. A non-empty channel must start with a
/// valid header followed by whole, supported blocks; the block headers are
/// walked without reading bodies. On success the channel is left positioned
/// at its end so new blocks follow the existing ones.
///
/// A last block cut short fails with `Error::TruncatedStream` and nothing is
/// written.
pub fn prepare_append<S: Read + Write + Seek>(channel: &mut S) -> Result<HeaderState> {
    let end = channel.seek(SeekFrom::End(0))?;
    if end == 0 {
        write_header(channel)?;
        return Ok(HeaderState::Created);
    }

    channel.seek(SeekFrom::Start(0))?;
    let version = read_header(channel)?;

    let mut offset = HEADER_LEN as u64;
    let mut blocks = 0u64;
    while let Some(block) = read_block_header(channel)? {
        let body_start = offset + BLOCK_HEADER_LEN as u64;
        let body_end = body_start + u64::from(block.body_len);
        if body_end > end {
            let actual = (end - body_start) as usize;
            return Err(Error::truncated("block body", block.body_len as usize, actual));
        }
        offset = channel.seek(SeekFrom::Start(body_end))?;
        blocks += 1;
    }

    debug!(len = end, blocks, "appending to existing spaten stream");
    Ok(HeaderState::Existing(version))
}
