use log::trace;
use crate::prelude::*;

/// Reads and decodes inode `ino`. Nothing is cached; every call goes to the
/// volume.
pub fn get_inode(fs: &mut Filesystem, ino: u64) -> Result<Inode> {
  let offset = locate_inode(fs, ino)?;
  trace!("reading inode {} at offset {}", ino, offset);
  let inode_buf = read_range(fs, offset, INODE_DECODE_SIZE as u64)?;
  decode_inode(&fs.superblock, ino, &inode_buf[..])
}

/// Byte offset of inode `ino` in the volume.
pub fn locate_inode(fs: &Filesystem, ino: u64) -> Result<u64> {
  let inodes_count = fs.superblock.inodes_count;
  if ino < 1 || ino > inodes_count as u64 {
    return Err(Error::InvalidInode { ino: ino, inodes_count: inodes_count });
  }

  let (group_idx, local_idx) = get_ino_group(fs, ino);
  let group = match fs.groups.get(group_idx as usize) {
    Some(group) => group,
    None => return Err(Error::InvalidInode { ino: ino, inodes_count: inodes_count }),
  };
  let inode_table = group.inode_table as u64;
  Ok(inode_table * fs.block_size() + local_idx * fs.superblock.inode_stride())
}

pub fn get_dir_inode(fs: &mut Filesystem, ino: u64) -> Result<Inode> {
  let inode = get_inode(fs, ino)?;
  if inode.file_type() != FileType::Dir {
    return Err(Error::NotADirectory(ino));
  }
  Ok(inode)
}

pub fn get_file_inode(fs: &mut Filesystem, ino: u64) -> Result<Inode> {
  let inode = get_inode(fs, ino)?;
  if inode.file_type() != FileType::Regular {
    return Err(Error::NotARegularFile(ino));
  }
  Ok(inode)
}
