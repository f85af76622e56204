//! Stream configuration.

/// Default number of features buffered before a block is written.
pub const DEFAULT_BLOCK_SIZE: usize = 100_000;

/// Tunables shared by readers and writers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "RawStreamOptions"))]
pub struct StreamOptions {
    /// Features per block on the write path. Reaching it flushes the buffer.
    pub block_size: usize,
    /// Largest block body accepted on read or produced on write, in bytes.
    pub max_block_len: Option<u32>,
}

impl StreamOptions {
    pub fn new() -> Self {
        Self {
            block_size: DEFAULT_BLOCK_SIZE,
            max_block_len: None,
        }
    }

    /// Sets the write buffer threshold.
    ///
    /// # Panics
    /// Panics if `block_size` is zero.
    pub fn with_block_size(mut self, block_size: usize) -> Self {
        assert!(block_size > 0, "block_size must be at least 1");
        self.block_size = block_size;
        self
    }

    pub fn with_max_block_len(mut self, max_block_len: u32) -> Self {
        self.max_block_len = Some(max_block_len);
        self
    }

    /// The effective body limit: the configured one, or the 32-bit length field.
    pub fn body_limit(&self) -> usize {
        self.max_block_len.unwrap_or(u32::MAX) as usize
    }
}

impl Default for StreamOptions {
    fn default() -> Self {
        Self::new()
    }
}

// Deserialized form, validated before it becomes a `StreamOptions`.
#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
#[serde(default)]
struct RawStreamOptions {
    block_size: usize,
    max_block_len: Option<u32>,
}

#[cfg(feature = "serde")]
impl Default for RawStreamOptions {
    fn default() -> Self {
        let options = StreamOptions::default();
        Self {
            block_size: options.block_size,
            max_block_len: options.max_block_len,
        }
    }
}

#[cfg(feature = "serde")]
impl TryFrom<RawStreamOptions> for StreamOptions {
    type Error = String;

    fn try_from(raw: RawStreamOptions) -> Result<Self, Self::Error> {
        if raw.block_size == 0 {
            return Err("block_size must be at least 1".to_string());
        }
        Ok(Self {
            block_size: raw.block_size,
            max_block_len: raw.max_block_len,
        })
    }
}
