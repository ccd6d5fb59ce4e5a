use std::io;
use log::debug;
use crate::prelude::*;

/// Lazy stream of a regular file's contents, one block-sized chunk at a time.
///
/// Only the direct block pointers are followed: the stream ends at the first
/// zero pointer, after the twelfth block, or when the declared size has been
/// emitted, whichever comes first.
pub struct FileBlocks<'f> {
  fs: &'f mut Filesystem,
  ino: u64,
  blocks: [u32; DIRECT_BLOCKS],
  size: u64,
  block_idx: usize,
  emitted: u64,
  done: bool,
}

pub fn read_file<'f>(fs: &'f mut Filesystem, inode: &Inode) -> Result<FileBlocks<'f>> {
  if inode.file_type() != FileType::Regular {
    return Err(Error::NotARegularFile(inode.ino));
  }
  let mut blocks = [0; DIRECT_BLOCKS];
  blocks.copy_from_slice(inode.direct_blocks());
  Ok(FileBlocks {
    fs: fs,
    ino: inode.ino,
    blocks: blocks,
    size: inode.size,
    block_idx: 0,
    emitted: 0,
    done: false,
  })
}

impl<'f> FileBlocks<'f> {
  /// Bytes produced so far.
  pub fn emitted(&self) -> u64 {
    self.emitted
  }

  fn finish(&mut self) -> Option<Result<Vec<u8>>> {
    self.done = true;
    if self.emitted < self.size {
      debug!("inode {}: emitted {} of {} bytes, the rest is not reachable \
        through direct blocks", self.ino, self.emitted, self.size);
    }
    None
  }
}

impl<'f> Iterator for FileBlocks<'f> {
  type Item = Result<Vec<u8>>;

  fn next(&mut self) -> Option<Result<Vec<u8>>> {
    if self.done || self.emitted >= self.size || self.block_idx >= DIRECT_BLOCKS {
      return self.finish();
    }
    let block = self.blocks[self.block_idx];
    if block == 0 {
      return self.finish();
    }

    match read_block(self.fs, block) {
      Ok(mut chunk) => {
        let length = cmp::min(chunk.len() as u64, self.size - self.emitted);
        chunk.truncate(length as usize);
        self.emitted += length;
        self.block_idx += 1;
        Some(Ok(chunk))
      },
      Err(err) => {
        self.done = true;
        Some(Err(err))
      },
    }
  }
}

/// Writes the file's contents to `out` and returns the number of bytes
/// written.
pub fn copy_file(fs: &mut Filesystem, inode: &Inode, out: &mut dyn io::Write) -> Result<u64> {
  let mut blocks = read_file(fs, inode)?;
  for chunk in &mut blocks {
    out.write_all(&chunk?[..])?;
  }
  Ok(blocks.emitted())
}

pub fn read_file_to_vec(fs: &mut Filesystem, inode: &Inode) -> Result<Vec<u8>> {
  let mut data = Vec::new();
  copy_file(fs, inode, &mut data)?;
  Ok(data)
}

/// Reads up to `buffer.len()` bytes starting at `offset`. Returns fewer
/// bytes at the end of the readable part of the file.
pub fn read_file_at(fs: &mut Filesystem, inode: &Inode,
  offset: u64, buffer: &mut [u8]) -> Result<usize>
{
  if inode.file_type() != FileType::Regular {
    return Err(Error::NotARegularFile(inode.ino));
  }

  let block_size = fs.block_size();
  let readable = cmp::min(inode.size, DIRECT_BLOCKS as u64 * block_size);
  let mut done = 0;
  while done < buffer.len() {
    let pos = offset + done as u64;
    if pos >= readable {
      break;
    }
    let block = inode.block[(pos / block_size) as usize];
    if block == 0 {
      break;
    }

    let block_offset = pos % block_size;
    let length = cmp::min(
      cmp::min(block_size - block_offset, readable - pos),
      (buffer.len() - done) as u64) as usize;
    fs.volume.read(block as u64 * block_size + block_offset,
      &mut buffer[done..done + length])?;
    done += length;
  }
  Ok(done)
}
