use std::ops::Range;

use crate::error::{JriscError, Result};
use crate::stream::{Backing, Stream};

/// In-memory backing with separate read and write regions.
///
/// Either region may be owned (`Vec<u8>`, `Box<[u8]>`) or borrowed; an owned
/// region is freed when the stream is dropped.
#[derive(Debug, Clone)]
pub struct MemoryBacking<R, W = Vec<u8>> {
    read: R,
    write: W,
}

impl<R: AsRef<[u8]>> MemoryBacking<R, Vec<u8>> {
    /// A backing whose write region is empty, so every write fails.
    pub fn read_only(read: R) -> Self {
        Self {
            read,
            write: Vec::new(),
        }
    }
}

impl<R, W> MemoryBacking<R, W> {
    pub fn new(read: R, write: W) -> Self {
        Self { read, write }
    }

    pub fn write_region(&self) -> &W {
        &self.write
    }

    pub fn into_parts(self) -> (R, W) {
        (self.read, self.write)
    }
}

fn region(location: u64, size: usize, len: usize) -> Option<Range<usize>> {
    let start = usize::try_from(location).ok()?;
    let end = start.checked_add(size)?;
    (end <= len).then_some(start..end)
}

impl<R: AsRef<[u8]>, W: AsMut<[u8]>> Backing for MemoryBacking<R, W> {
    fn read_at(&mut self, location: u64, dst: &mut [u8]) -> Result<()> {
        let mem = self.read.as_ref();
        let range = region(location, dst.len(), mem.len())
            .ok_or_else(|| JriscError::short_transfer("read", location, dst.len()))?;
        dst.copy_from_slice(&mem[range]);
        Ok(())
    }

    fn write_at(&mut self, location: u64, src: &[u8]) -> Result<()> {
        let mem = self.write.as_mut();
        let range = region(location, src.len(), mem.len())
            .ok_or_else(|| JriscError::short_transfer("write", location, src.len()))?;
        mem[range].copy_from_slice(src);
        Ok(())
    }
}

pub type MemoryStream<R, W = Vec<u8>> = Stream<MemoryBacking<R, W>>;

impl<R: AsRef<[u8]>> Stream<MemoryBacking<R, Vec<u8>>> {
    /// Read-only stream over `mem`, with its first byte at logical `base`.
    pub fn from_memory(mem: R, base: u64) -> Self {
        Stream::new(MemoryBacking::read_only(mem), base)
    }
}

impl<R: AsRef<[u8]>, W: AsMut<[u8]>> Stream<MemoryBacking<R, W>> {
    pub fn with_write_buffer(read: R, write: W, base: u64) -> Self {
        Stream::new(MemoryBacking::new(read, write), base)
    }
}
