use std::io::{Read, Result};

/// Wraps a reader and misbehaves in controlled ways.
pub struct FaultyReader<R: Read> {
    inner: R,
    mode: FaultMode,
    calls: usize,
    delivered: usize,
}

pub enum FaultMode {
    /// Every read returns at most one byte.
    OneByteChunks,
    /// Every n-th read call fails with `Interrupted`.
    InterruptedEvery(usize),
    /// Reports end of stream once this many bytes have been delivered.
    EofAfterBytes(usize),
}

impl<R: Read> FaultyReader<R> {
    pub fn new(inner: R, mode: FaultMode) -> Self {
        Self {
            inner,
            mode,
            calls: 0,
            delivered: 0,
        }
    }
}

impl<R: Read> Read for FaultyReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        self.calls += 1;
        let n = match self.mode {
            FaultMode::OneByteChunks => {
                let len = buf.len().min(1);
                self.inner.read(&mut buf[..len])?
            }
            FaultMode::InterruptedEvery(n) if n != 0 && self.calls % n == 0 => {
                return Err(std::io::Error::from(std::io::ErrorKind::Interrupted));
            }
            FaultMode::EofAfterBytes(limit) => {
                let len = buf.len().min(limit.saturating_sub(self.delivered));
                self.inner.read(&mut buf[..len])?
            }
            _ => self.inner.read(buf)?,
        };
        self.delivered += n;
        Ok(n)
    }
}
