//! A buffering, append-only writer for Spaten streams.

use crate::codec::encode_body;
use crate::error::{Error, Result};
use crate::feature::Feature;
use crate::framing::{BoundedFramer, Framer, FramerExt, SpatenFramer};
use crate::geometry::{Geometry, Wkb};
use crate::header::{prepare_append, write_header, HeaderState};
use crate::options::{StreamOptions, DEFAULT_BLOCK_SIZE};
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Read, Seek, Write};
use std::mem::ManuallyDrop;
use std::ptr;
use std::path::Path;
use tracing::{debug, warn};

/// Encodes `features` as one block body and writes it with `framer`.
/// Returns the body length in bytes.
pub fn write_block<W: Write, F: Framer, G: Geometry>(
    writer: &mut W,
    framer: &F,
    features: &[Feature<G>],
) -> Result<usize> {
    let body = encode_body(features)?;
    framer.frame_and_write(writer, &body)?;
    debug!(body_len = body.len(), features = features.len(), "wrote block");
    Ok(body.len())
}

/// A writer for streaming features into a Spaten stream.
///
/// Appended features are buffered and written as one block once the buffer
/// holds `block_size` features, on `flush()`, and on `close()`.
///
/// An I/O failure while writing a block may leave part of that block in the
/// sink. The writer is then poisoned: every later `append`, `flush` and
/// `close` fails with `Error::Poisoned` and dropping it writes nothing, so a
/// torn block is never followed by more data.
///
/// Dropping an open writer flushes it; errors on that path can only be
/// logged, so prefer `close()` when the outcome matters.
pub struct SpatenWriter<W: Write, F: Framer = SpatenFramer, G: Geometry = Wkb> {
    sink: W,
    framer: F,
    block_size: usize,
    pending: Vec<Feature<G>>,
    poisoned: bool,
}

impl<W: Write, F: Framer> SpatenWriter<W, F> {
    /// Starts a new stream on `sink`, writing the header at its current position.
    pub fn new(sink: W, framer: F) -> Result<Self> {
        Self::new_typed(sink, framer)
    }
}

impl<S: Read + Write + Seek, F: Framer> SpatenWriter<S, F> {
    /// Opens `channel` for appending: an empty channel gets a fresh header,
    /// a non-empty one must hold a valid header followed by whole blocks and
    /// new blocks are written after its existing content.
    pub fn append_to(channel: S, framer: F) -> Result<Self> {
        Self::append_to_typed(channel, framer)
    }
}

impl SpatenWriter<BufWriter<File>> {
    /// Opens or creates a Spaten file for appending.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = open_for_append(path.as_ref())?;
        Ok(Self::from_parts(BufWriter::new(file), SpatenFramer))
    }
}

impl SpatenWriter<BufWriter<File>, BoundedFramer<SpatenFramer>> {
    /// Opens or creates a Spaten file for appending with explicit options.
    pub fn create_with_options<P: AsRef<Path>>(path: P, options: &StreamOptions) -> Result<Self> {
        let file = open_for_append(path.as_ref())?;
        let framer = SpatenFramer.bounded(options.body_limit());
        Ok(Self::from_parts(BufWriter::new(file), framer).with_options(options))
    }
}

impl<S: Read + Write + Seek, F: Framer, G: Geometry> SpatenWriter<S, F, G> {
    /// Like [`SpatenWriter::append_to`], for features with geometry type `G`.
    pub fn append_to_typed(mut channel: S, framer: F) -> Result<Self> {
        prepare_append(&mut channel)?;
        Ok(Self::from_parts(channel, framer))
    }
}

impl<W: Write, F: Framer, G: Geometry> SpatenWriter<W, F, G> {
    /// Like [`SpatenWriter::new`], for features with geometry type `G`.
    pub fn new_typed(mut sink: W, framer: F) -> Result<Self> {
        write_header(&mut sink)?;
        Ok(Self::from_parts(sink, framer))
    }

    fn from_parts(sink: W, framer: F) -> Self {
        Self {
            sink,
            framer,
            block_size: DEFAULT_BLOCK_SIZE,
            pending: Vec::new(),
            poisoned: false,
        }
    }

    /// Applies `options.block_size` to this writer.
    ///
    /// # Panics
    /// Panics if `options.block_size` is zero.
    pub fn with_options(mut self, options: &StreamOptions) -> Self {
        assert!(options.block_size > 0, "block_size must be at least 1");
        self.block_size = options.block_size;
        self
    }

    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// Number of appended features not yet written as a block.
    pub fn buffered(&self) -> usize {
        self.pending.len()
    }

    /// Whether an earlier I/O failure left the sink in an unknown state.
    pub fn is_poisoned(&self) -> bool {
        self.poisoned
    }

    /// Appends a feature, writing a block if the buffer reaches `block_size`.
    pub fn append(&mut self, feature: Feature<G>) -> Result<()> {
        self.check_poisoned()?;
        self.pending.push(feature);
        if self.pending.len() >= self.block_size {
            debug!(block_size = self.block_size, "write buffer full");
            self.write_pending()?;
        }
        Ok(())
    }

    /// Appends every feature from `features`, in order.
    pub fn append_all<I>(&mut self, features: I) -> Result<()>
    where
        I: IntoIterator<Item = Feature<G>>,
    {
        for feature in features {
            self.append(feature)?;
        }
        Ok(())
    }

    /// Writes any buffered features as one block and flushes the sink.
    pub fn flush(&mut self) -> Result<()> {
        self.check_poisoned()?;
        self.write_pending()?;
        let flushed = self.sink.flush().map_err(Error::from);
        self.poison_on_io(flushed)
    }

    /// Returns a reference to the underlying sink.
    pub fn get_ref(&self) -> &W {
        &self.sink
    }

    /// Flushes buffered features and releases the sink.
    ///
    /// A poisoned writer fails with `Error::Poisoned` and its sink is dropped.
    pub fn close(mut self) -> Result<W> {
        if let Err(e) = self.flush() {
            // Disarms the flush on drop; the outcome has been reported here.
            self.poisoned = true;
            return Err(e);
        }
        let this = ManuallyDrop::new(self);
        // SAFETY: `this` is never touched again and its destructor never runs,
        // so each field is moved out exactly once.
        let (sink, _framer, _pending) = unsafe {
            (
                ptr::read(&this.sink),
                ptr::read(&this.framer),
                ptr::read(&this.pending),
            )
        };
        Ok(sink)
    }

    fn write_pending(&mut self) -> Result<()> {
        if self.pending.is_empty() {
            return Ok(());
        }
        let written = write_block(&mut self.sink, &self.framer, &self.pending);
        self.poison_on_io(written)?;
        self.pending.clear();
        Ok(())
    }

    // Encoding and size errors are raised before any byte reaches the sink;
    // only I/O errors can leave a partial block behind.
    fn poison_on_io<T>(&mut self, result: Result<T>) -> Result<T> {
        if let Err(Error::Io(e)) = &result {
            warn!(error = %e, pending = self.pending.len(), "spaten writer poisoned");
            self.poisoned = true;
        }
        result
    }

    fn check_poisoned(&self) -> Result<()> {
        if self.poisoned {
            return Err(Error::Poisoned);
        }
        Ok(())
    }
}

impl<W: Write, F: Framer, G: Geometry> Drop for SpatenWriter<W, F, G> {
    fn drop(&mut self) {
        if self.poisoned {
            if !self.pending.is_empty() {
                warn!(pending = self.pending.len(), "discarding features of poisoned spaten writer");
            }
            return;
        }
        if let Err(e) = self.flush() {
            warn!(error = %e, pending = self.pending.len(), "failed to flush spaten writer on drop");
        }
    }
}

fn open_for_append(path: &Path) -> Result<File> {
    let mut file = OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(false)
        .open(path)?;
    if let HeaderState::Existing(version) = prepare_append(&mut file)? {
        debug!(path = %path.display(), version, "opened existing spaten file");
    }
    Ok(file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framing::{BLOCK_HEADER_LEN, SpatenDeframer};
    use crate::header::HEADER_LEN;
    use crate::reader::SpatenReader;
    use std::io::Cursor;

    fn point() -> Feature {
        Feature::from_geometry(Wkb::point(10.0, 10.0))
    }

    fn count_blocks(data: &[u8]) -> usize {
        let mut reader = SpatenReader::new(Cursor::new(data), SpatenDeframer).unwrap();
        let mut blocks = 0;
        while reader.read_block().unwrap().is_some() {
            blocks += 1;
        }
        blocks
    }

    #[test]
    fn test_new_writes_header_only() {
        let writer = SpatenWriter::new(Vec::new(), SpatenFramer).unwrap();
        let data = writer.close().unwrap();
        assert_eq!(data, b"SPAT\0\0\0\0");
    }

    #[test]
    fn test_append_buffers_until_flush() {
        let mut writer = SpatenWriter::new(Vec::new(), SpatenFramer).unwrap();
        writer.append(point()).unwrap();
        writer.append(point()).unwrap();
        assert_eq!(writer.buffered(), 2);
        assert_eq!(writer.get_ref().len(), HEADER_LEN);

        writer.flush().unwrap();
        assert_eq!(writer.buffered(), 0);
        assert!(writer.get_ref().len() > HEADER_LEN + BLOCK_HEADER_LEN);
    }

    #[test]
    fn test_flush_block() {
        let options = StreamOptions::new().with_block_size(3);
        let mut writer = SpatenWriter::new(Vec::new(), SpatenFramer)
            .unwrap()
            .with_options(&options);
        for _ in 0..3 {
            writer.append(point()).unwrap();
        }
        assert_eq!(writer.buffered(), 0);

        writer.append(point()).unwrap();
        assert_eq!(writer.buffered(), 1);
        let data = writer.close().unwrap();
        assert_eq!(count_blocks(&data), 2);
    }

    #[test]
    fn test_default_block_size_flush() {
        let mut writer = SpatenWriter::new(Vec::new(), SpatenFramer).unwrap();
        assert_eq!(writer.block_size(), DEFAULT_BLOCK_SIZE);
        writer
            .append_all((0..DEFAULT_BLOCK_SIZE).map(|_| point()))
            .unwrap();
        assert_eq!(writer.buffered(), 0);
    }

    #[test]
    fn test_empty_flush_writes_nothing() {
        let mut writer = SpatenWriter::new(Vec::new(), SpatenFramer).unwrap();
        writer.flush().unwrap();
        writer.flush().unwrap();
        let data = writer.close().unwrap();
        assert_eq!(data.len(), HEADER_LEN);
    }

    #[test]
    fn test_drop_flushes_pending() {
        let mut buffer = Vec::new();
        {
            let mut writer = SpatenWriter::new(&mut buffer, SpatenFramer).unwrap();
            writer.append(point()).unwrap();
        }
        assert_eq!(count_blocks(&buffer), 1);
    }

    #[test]
    fn test_append_to_existing_stream() {
        let mut first = SpatenWriter::append_to(Cursor::new(Vec::new()), SpatenFramer).unwrap();
        first.append(point().with_property("n", 1u64)).unwrap();
        let channel = first.close().unwrap();

        let mut second = SpatenWriter::append_to(channel, SpatenFramer).unwrap();
        second.append(point().with_property("n", 2u64)).unwrap();
        let data = second.close().unwrap().into_inner();

        let reader = SpatenReader::new(Cursor::new(data), SpatenDeframer).unwrap();
        let ns: Vec<u64> = reader
            .map(|f| f.unwrap().property("n").and_then(|v| v.as_int()).unwrap())
            .collect();
        assert_eq!(ns, vec![1, 2]);
    }

    #[test]
    fn test_append_to_rejects_invalid_header() {
        let channel = Cursor::new(b"GARBAGE!".to_vec());
        let result = SpatenWriter::append_to(channel, SpatenFramer);
        assert!(result.err().unwrap().is_format());
    }

    #[test]
    fn test_bounded_framer_rejects_large_block() {
        let mut writer = SpatenWriter::new(Vec::new(), SpatenFramer.bounded(8)).unwrap();
        writer.append(point()).unwrap();
        assert!(matches!(
            writer.flush(),
            Err(crate::Error::BlockTooLarge { limit: 8, .. })
        ));
        // Nothing reached the sink, so the writer stays usable.
        assert_eq!(writer.buffered(), 1);
        assert!(!writer.is_poisoned());
        assert_eq!(writer.get_ref().len(), HEADER_LEN);
    }
}
