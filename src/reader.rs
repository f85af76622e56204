//! A lazy, block-at-a-time reader for Spaten streams.

use crate::codec::decode_body;
use crate::error::Result;
use crate::feature::Feature;
use crate::framing::{BoundedDeframer, Deframer, DeframerExt, SpatenDeframer};
use crate::geometry::{Geometry, Wkb};
use crate::header::read_header;
use crate::options::StreamOptions;
use std::collections::VecDeque;
use std::fs::File;
use std::io::{BufReader, Read};
use std::iter::FusedIterator;
use std::path::Path;
use tracing::debug;

/// Reads the next block and decodes it into features.
/// Returns Ok(None) on clean EOF at a block boundary.
pub fn read_block<R: Read, D: Deframer, G: Geometry>(
    reader: &mut R,
    deframer: &D,
    buffer: &mut Vec<u8>,
) -> Result<Option<Vec<Feature<G>>>> {
    let header = match deframer.read_and_deframe(reader, buffer)? {
        Some(header) => header,
        None => return Ok(None),
    };
    let features = decode_body(buffer)?;
    debug!(
        body_len = header.body_len,
        features = features.len(),
        "read block"
    );
    Ok(Some(features))
}

/// A reader for the features of a Spaten stream.
///
/// The header is validated when the reader is constructed. Blocks are then
/// read one at a time, only when the features of the previous block have been
/// consumed, so memory use is bounded by the largest block rather than the
/// whole stream.
///
/// The reader is an `Iterator` over `Result<Feature<G>>`. Iteration ends at
/// the first error or at a clean end of stream and cannot be restarted.
///
/// ```rust
/// # use spaten::{Feature, SpatenReader, SpatenWriter, SpatenDeframer, SpatenFramer, Wkb};
/// # use std::io::Cursor;
/// # let mut writer = SpatenWriter::new(Vec::new(), SpatenFramer)?;
/// # writer.append(Feature::from_geometry(Wkb::point(1.0, 2.0)))?;
/// # let data = writer.close()?;
/// let reader = SpatenReader::new(Cursor::new(data), SpatenDeframer)?;
/// for feature in reader {
///     let feature = feature?;
///     println!("{} bytes of geometry", feature.geometry.as_bytes().len());
/// }
/// # Ok::<(), spaten::Error>(())
/// ```
pub struct SpatenReader<R: Read, D: Deframer = SpatenDeframer, G: Geometry = Wkb> {
    reader: R,
    deframer: D,
    version: u32,
    // Body bytes of the current block, reused across blocks.
    buffer: Vec<u8>,
    pending: VecDeque<Feature<G>>,
    finished: bool,
}

impl<R: Read, D: Deframer> SpatenReader<R, D> {
    /// Creates a reader yielding opaque `Wkb` geometries, validating the
    /// header immediately.
    pub fn new(reader: R, deframer: D) -> Result<Self> {
        Self::new_typed(reader, deframer)
    }
}

impl SpatenReader<BufReader<File>> {
    /// Opens a Spaten file read-only.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        Self::new(BufReader::new(file), SpatenDeframer)
    }
}

impl SpatenReader<BufReader<File>, BoundedDeframer<SpatenDeframer>> {
    /// Opens a Spaten file read-only, rejecting blocks larger than
    /// `options.max_block_len`.
    pub fn open_with_options<P: AsRef<Path>>(path: P, options: &StreamOptions) -> Result<Self> {
        let file = File::open(path)?;
        let deframer = SpatenDeframer.bounded(options.body_limit());
        Self::new(BufReader::new(file), deframer)
    }
}

impl<R: Read, D: Deframer, G: Geometry> SpatenReader<R, D, G> {
    /// Creates a reader decoding geometries with `G`.
    pub fn new_typed(mut reader: R, deframer: D) -> Result<Self> {
        let version = read_header(&mut reader)?;
        Ok(Self {
            reader,
            deframer,
            version,
            buffer: Vec::new(),
            pending: VecDeque::new(),
            finished: false,
        })
    }

    /// The format version found in the header.
    pub fn version(&self) -> u32 {
        self.version
    }

    /// Reads the next whole block.
    ///
    /// Features the iterator has already read ahead but not yet yielded are
    /// returned first, as one batch.
    /// Returns Ok(None) on clean end of stream.
    pub fn read_block(&mut self) -> Result<Option<Vec<Feature<G>>>> {
        if !self.pending.is_empty() {
            return Ok(Some(self.pending.drain(..).collect()));
        }
        if self.finished {
            return Ok(None);
        }
        let block = read_block(&mut self.reader, &self.deframer, &mut self.buffer);
        if !matches!(block, Ok(Some(_))) {
            self.finished = true;
        }
        block
    }

    /// Processes all remaining features using a closure.
    ///
    /// Stops at the first error, whether from reading or from the closure.
    pub fn process_all<F>(&mut self, mut processor: F) -> Result<()>
    where
        F: FnMut(Feature<G>) -> Result<()>,
    {
        while let Some(block) = self.read_block()? {
            for feature in block {
                processor(feature)?;
            }
        }
        Ok(())
    }

    /// Consumes the reader, returning the underlying reader.
    pub fn into_inner(self) -> R {
        self.reader
    }

    // Returns false once the stream is exhausted.
    fn fill(&mut self) -> Result<bool> {
        match read_block(&mut self.reader, &self.deframer, &mut self.buffer)? {
            Some(features) => {
                self.pending.extend(features);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

impl<R: Read, D: Deframer, G: Geometry> Iterator for SpatenReader<R, D, G> {
    type Item = Result<Feature<G>>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(feature) = self.pending.pop_front() {
                return Some(Ok(feature));
            }
            if self.finished {
                return None;
            }
            // Blocks may be empty, so keep reading until one yields features.
            match self.fill() {
                Ok(true) => continue,
                Ok(false) => {
                    self.finished = true;
                    return None;
                }
                Err(e) => {
                    self.finished = true;
                    return Some(Err(e));
                }
            }
        }
    }
}

impl<R: Read, D: Deframer, G: Geometry> FusedIterator for SpatenReader<R, D, G> {}
