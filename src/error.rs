use std::{io, result};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("IO error")]
  Io(#[from] io::Error),

  #[error("Bad magic 0x{found:x}, expected 0x{expected:x}")]
  BadMagic { found: u16, expected: u16 },

  #[error("Inode {ino} is out of range (volume has {inodes_count} inodes)")]
  InvalidInode { ino: u64, inodes_count: u32 },

  #[error("Inode {0} is not a directory")]
  NotADirectory(u64),

  #[error("Inode {0} is not a regular file")]
  NotARegularFile(u64),

  #[error("Malformed {record}: {reason}")]
  MalformedRecord { record: &'static str, reason: String },

  #[error("No such file or directory: {0}")]
  NotFound(String),

  #[error("Volume uses incompatible features (0x{0:x})")]
  UnsupportedFeatures(u32),
}

pub type Result<T> = result::Result<T, Error>;

impl Error {
  pub fn malformed(record: &'static str, reason: String) -> Error {
    Error::MalformedRecord { record: record, reason: reason }
  }

  pub fn short_record(record: &'static str, needed: usize, len: usize) -> Error {
    Error::malformed(record, format!("need {} bytes, got {}", needed, len))
  }
}
