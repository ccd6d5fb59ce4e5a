use log::trace;
use crate::prelude::*;

/// Reads one whole block. Block 0 means "unallocated" and callers stop
/// before asking for it.
pub fn read_block(fs: &mut Filesystem, block: u32) -> Result<Vec<u8>> {
  if block == 0 {
    return Err(Error::malformed("block pointer", format!("block 0 is not allocated")));
  }
  let block_size = fs.block_size();
  let mut buffer = make_buffer(block_size);
  trace!("reading block {}", block);
  fs.volume.read(block as u64 * block_size, &mut buffer[..])?;
  Ok(buffer)
}

pub fn read_range(fs: &mut Filesystem, offset: u64, length: u64) -> Result<Vec<u8>> {
  let mut buffer = make_buffer(length);
  fs.volume.read(offset, &mut buffer[..])?;
  Ok(buffer)
}
