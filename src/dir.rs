use log::{debug, warn};
use crate::prelude::*;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirLine {
  pub ino: u32,
  pub file_type: FileType,
  pub name: Vec<u8>,
}

impl DirLine {
  pub fn name_lossy(&self) -> String {
    String::from_utf8_lossy(&self.name[..]).into_owned()
  }
}

/// Lazy walk over the entries of a directory, in on-disk order.
///
/// Only direct blocks are visited. The walk ends at the first zero block
/// pointer or when the declared directory size is used up. Corrupt entries
/// end the scan of their block but never fail the walk; a failed block read
/// is yielded once as an error and ends the walk.
pub struct DirIter<'f> {
  fs: &'f mut Filesystem,
  ino: u64,
  blocks: [u32; DIRECT_BLOCKS],
  size: u64,
  block_idx: usize,
  consumed: u64,
  block_buf: Option<Vec<u8>>,
  pos: usize,
  done: bool,
}

pub fn read_dir<'f>(fs: &'f mut Filesystem, inode: &Inode) -> Result<DirIter<'f>> {
  if inode.file_type() != FileType::Dir {
    return Err(Error::NotADirectory(inode.ino));
  }
  let mut blocks = [0; DIRECT_BLOCKS];
  blocks.copy_from_slice(inode.direct_blocks());
  Ok(DirIter {
    fs: fs,
    ino: inode.ino,
    blocks: blocks,
    size: inode.size,
    block_idx: 0,
    consumed: 0,
    block_buf: None,
    pos: 0,
    done: false,
  })
}

pub fn list_dir(fs: &mut Filesystem, ino: u64) -> Result<Vec<DirLine>> {
  let inode = get_dir_inode(fs, ino)?;
  read_dir(fs, &inode)?.collect()
}

/// Inode number of the first entry called `name`, if there is one.
pub fn lookup_in_dir(fs: &mut Filesystem, dir_inode: &Inode, name: &[u8])
  -> Result<Option<u32>>
{
  for line in read_dir(fs, dir_inode)? {
    let line = line?;
    if line.name == name {
      return Ok(Some(line.ino));
    }
  }
  Ok(None)
}

impl<'f> DirIter<'f> {
  fn load_next_block(&mut self) -> Option<Result<()>> {
    if self.block_idx >= DIRECT_BLOCKS || self.consumed >= self.size {
      return None;
    }
    let block = self.blocks[self.block_idx];
    if block == 0 {
      return None;
    }

    let block_size = self.fs.block_size();
    match read_block(self.fs, block) {
      Ok(mut buf) => {
        let limit = cmp::min(block_size, self.size - self.consumed);
        buf.truncate(limit as usize);
        self.block_buf = Some(buf);
        self.pos = 0;
        Some(Ok(()))
      },
      Err(err) => Some(Err(err)),
    }
  }
}

impl<'f> Iterator for DirIter<'f> {
  type Item = Result<DirLine>;

  fn next(&mut self) -> Option<Result<DirLine>> {
    while !self.done {
      let step = match self.block_buf {
        Some(ref buf) => scan_entry(self.ino, buf, self.pos),
        None => {
          match self.load_next_block() {
            Some(Ok(())) => continue,
            Some(Err(err)) => {
              self.done = true;
              return Some(Err(err));
            },
            None => {
              self.done = true;
              return None;
            },
          }
        },
      };

      match step {
        ScanStep::Entry(line, next) => {
          self.pos = next;
          return Some(Ok(line));
        },
        ScanStep::Skip(next) => self.pos = next,
        ScanStep::End => {
          self.block_buf = None;
          self.block_idx += 1;
          self.consumed += self.fs.block_size();
        },
      }
    }
    None
  }
}

#[derive(Debug, PartialEq, Eq)]
pub enum ScanStep {
  Entry(DirLine, usize),
  Skip(usize),
  End,
}

/// Decodes the entry starting at `pos` in the usable part of a directory
/// block and says where the next one starts.
pub fn scan_entry(ino: u64, block: &[u8], pos: usize) -> ScanStep {
  if pos >= block.len() {
    return ScanStep::End;
  }
  let entry = match decode_dir_entry(&block[pos..]) {
    Ok(entry) => entry,
    Err(_) => {
      debug!("directory {}: {} trailing bytes at offset {} are too short for an entry",
        ino, block.len() - pos, pos);
      return ScanStep::End;
    },
  };

  let rec_len = entry.rec_len as usize;
  if rec_len == 0 {
    warn!("directory {}: zero record length at offset {}, skipping rest of block",
      ino, pos);
    return ScanStep::End;
  }

  let next = pos + rec_len;
  if entry.ino == 0 {
    return ScanStep::Skip(next);
  }

  let name_start = pos + DIR_ENTRY_HEADER_SIZE;
  let max_name_len = cmp::min(
    cmp::min(rec_len.saturating_sub(DIR_ENTRY_HEADER_SIZE), MAX_NAME_LEN),
    block.len() - name_start);
  let name_len = cmp::min(entry.name_len as usize, max_name_len);
  if name_len < entry.name_len as usize {
    warn!("directory {}: entry at offset {} claims a {} byte name, clamped to {}",
      ino, pos, entry.name_len, name_len);
  }

  ScanStep::Entry(DirLine {
    ino: entry.ino,
    file_type: entry.file_type,
    name: block[name_start..name_start + name_len].to_vec(),
  }, next)
}
