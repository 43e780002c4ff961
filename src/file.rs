use std::fs::File;
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;

use tracing::debug;

use crate::error::{JriscError, Result};
use crate::stream::{Backing, Stream};

/// Backing over a file-like handle.
///
/// Stream locations map to `bias + location` in the handle. The handle is
/// only repositioned when that offset differs from where the last transfer
/// left it, so pipes and other unseekable handles work as long as the
/// stream is consumed in order; any out-of-order access fails on the seek.
#[derive(Debug)]
pub struct FileBacking<F> {
    file: F,
    bias: u64,
    /// Last known physical offset; `None` after a failed transfer.
    position: Option<u64>,
}

impl<F> FileBacking<F> {
    /// `file` is assumed to be positioned at offset 0.
    pub fn new(file: F, bias: u64) -> Self {
        Self {
            file,
            bias,
            position: Some(0),
        }
    }

    pub fn get_ref(&self) -> &F {
        &self.file
    }

    pub fn into_inner(self) -> F {
        self.file
    }
}

impl<F: Seek> FileBacking<F> {
    fn reposition(&mut self, location: u64) -> Result<u64> {
        let offset = self
            .bias
            .checked_add(location)
            .ok_or_else(|| JriscError::short_transfer("seek", location, 0))?;
        if self.position != Some(offset) {
            debug!(from = ?self.position, to = offset, "repositioning file handle");
            self.position = None;
            self.file.seek(SeekFrom::Start(offset))?;
        }
        Ok(offset)
    }
}

impl<F: Read + Write + Seek> Backing for FileBacking<F> {
    fn read_at(&mut self, location: u64, dst: &mut [u8]) -> Result<()> {
        let offset = self.reposition(location)?;
        if let Err(e) = self.file.read_exact(dst) {
            self.position = None;
            return Err(e.into());
        }
        self.position = Some(offset + dst.len() as u64);
        Ok(())
    }

    fn write_at(&mut self, location: u64, src: &[u8]) -> Result<()> {
        let offset = self.reposition(location)?;
        if let Err(e) = self.file.write_all(src) {
            self.position = None;
            return Err(e.into());
        }
        self.position = Some(offset + src.len() as u64);
        Ok(())
    }
}

pub type FileStream<F = File> = Stream<FileBacking<F>>;

impl<F: Read + Write + Seek> Stream<FileBacking<F>> {
    /// Stream over `file` starting `bias` bytes in, reporting `base` as the
    /// address of that first byte.
    pub fn from_file(file: F, bias: u64, base: u64) -> Self {
        Stream::new(FileBacking::new(file, bias), base)
    }
}

impl Stream<FileBacking<File>> {
    /// Open `path` read-only.
    pub fn open(path: impl AsRef<Path>, bias: u64, base: u64) -> Result<Self> {
        let file = File::open(path)?;
        Ok(Stream::from_file(file, bias, base))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stream::AddressableStream;
    use std::io::{self, Cursor};

    #[test]
    fn bias_skips_leading_bytes() {
        let data = Cursor::new(vec![0xff, 0xff, 0xe4, 0x00]);
        let mut s = FileStream::from_file(data, 2, 0xf03000);
        assert_eq!(s.read_be_u16().unwrap(), (0xf03000, 0xe400));
        assert!(s.read_be_u16().unwrap_err().is_io());
        assert_eq!(s.read_address(), 0xf03002);
    }

    #[test]
    fn write_then_read_share_handle() {
        let mut s = FileStream::from_file(Cursor::new(vec![0u8; 4]), 0, 0);
        s.write_be_u16(0x981f).unwrap();
        // read cursor still at 0, so the handle is rewound
        assert_eq!(s.read_be_u16().unwrap(), (0, 0x981f));
    }

    /// Reads like a pipe: in order only, any seek fails.
    struct Pipe(Cursor<Vec<u8>>);

    impl Read for Pipe {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            self.0.read(buf)
        }
    }

    impl Write for Pipe {
        fn write(&mut self, _: &[u8]) -> io::Result<usize> {
            Err(io::ErrorKind::Unsupported.into())
        }
        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl Seek for Pipe {
        fn seek(&mut self, _: SeekFrom) -> io::Result<u64> {
            Err(io::Error::new(io::ErrorKind::Unsupported, "illegal seek"))
        }
    }

    #[test]
    fn unseekable_handle_reads_in_order() {
        let mut s = FileStream::from_file(Pipe(Cursor::new(vec![0xe4, 0, 0xe4, 0])), 0, 0);
        assert_eq!(s.read_be_u16().unwrap().1, 0xe400);
        assert_eq!(s.read_be_u16().unwrap().1, 0xe400);
    }

    #[test]
    fn unseekable_handle_fails_on_mismatch() {
        let mut s = FileStream::from_file(Pipe(Cursor::new(vec![0u8; 8])), 4, 0);
        assert!(s.read_be_u16().unwrap_err().is_io());
        assert_eq!(s.read_address(), 0);
    }
}
