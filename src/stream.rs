//! Position-tracking byte streams the decoder reads from and the encoder
//! writes to.
//!
//! A [`Stream`] keeps one cursor per direction. Each cursor pairs the
//! location handed to the backing medium with the logical address reported
//! to callers; both move together and only on success.

use crate::error::Result;

/// Sequential reads and writes that report the logical address of every
/// transfer.
pub trait AddressableStream {
    /// Fill `dst` completely; returns the address of its first byte.
    fn read(&mut self, dst: &mut [u8]) -> Result<u64>;

    /// Write all of `src`; returns the address of its first byte.
    fn write(&mut self, src: &[u8]) -> Result<u64>;

    /// Address the next read will report.
    fn read_address(&self) -> u64;

    /// Address the next write will report.
    fn write_address(&self) -> u64;

    fn read_be_u16(&mut self) -> Result<(u64, u16)> {
        let mut raw = [0u8; 2];
        let address = self.read(&mut raw)?;
        Ok((address, u16::from_be_bytes(raw)))
    }

    fn write_be_u16(&mut self, word: u16) -> Result<u64> {
        self.write(&word.to_be_bytes())
    }
}

/// The medium behind a [`Stream`]. Transfers are all-or-nothing.
pub trait Backing {
    fn read_at(&mut self, location: u64, dst: &mut [u8]) -> Result<()>;
    fn write_at(&mut self, location: u64, src: &[u8]) -> Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Cursor {
    /// Offset handed to the backing medium.
    pub location: u64,
    /// Logical address reported to callers.
    pub address: u64,
}

impl Cursor {
    fn at(address: u64) -> Self {
        Self {
            location: 0,
            address,
        }
    }

    fn advance(&mut self, n: usize) {
        self.location = self.location.wrapping_add(n as u64);
        self.address = self.address.wrapping_add(n as u64);
    }
}

/// A backing medium plus independent read and write cursors.
///
/// Dropping the stream drops the backing, which releases whatever it owns.
#[derive(Debug)]
pub struct Stream<B> {
    backing: B,
    read: Cursor,
    write: Cursor,
}

impl<B: Backing> Stream<B> {
    /// Both cursors start at location 0, reporting `base` as their address.
    pub fn new(backing: B, base: u64) -> Self {
        Self {
            backing,
            read: Cursor::at(base),
            write: Cursor::at(base),
        }
    }

    pub fn read_cursor(&self) -> Cursor {
        self.read
    }

    pub fn write_cursor(&self) -> Cursor {
        self.write
    }

    pub fn backing(&self) -> &B {
        &self.backing
    }

    pub fn into_backing(self) -> B {
        self.backing
    }
}

impl<B: Backing> AddressableStream for Stream<B> {
    fn read(&mut self, dst: &mut [u8]) -> Result<u64> {
        self.backing.read_at(self.read.location, dst)?;
        let address = self.read.address;
        self.read.advance(dst.len());
        Ok(address)
    }

    fn write(&mut self, src: &[u8]) -> Result<u64> {
        self.backing.write_at(self.write.location, src)?;
        let address = self.write.address;
        self.write.advance(src.len());
        Ok(address)
    }

    fn read_address(&self) -> u64 {
        self.read.address
    }

    fn write_address(&self) -> u64 {
        self.write.address
    }
}
