use std::{io, fs};
use std::io::{Read, Seek};
use crate::error::{Result};

/// Positioned, exact-length reads from the backing image.
pub trait Volume {
  fn read(&mut self, offset: u64, buffer: &mut [u8]) -> Result<()>;
}

pub struct FileVolume(pub fs::File);

impl Volume for FileVolume {
  fn read(&mut self, offset: u64, buffer: &mut [u8]) -> Result<()> {
    self.0.seek(io::SeekFrom::Start(offset))?;
    self.0.read_exact(buffer)?;
    Ok(())
  }
}

/// Volume over any seekable reader, e.g. an in-memory `io::Cursor`.
pub struct ReadVolume<R>(pub R);

impl<R: Read + Seek> Volume for ReadVolume<R> {
  fn read(&mut self, offset: u64, buffer: &mut [u8]) -> Result<()> {
    self.0.seek(io::SeekFrom::Start(offset))?;
    self.0.read_exact(buffer)?;
    Ok(())
  }
}
