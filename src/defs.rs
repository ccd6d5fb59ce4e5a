//! On-disk records of an ext2 volume, decoded into plain values.

pub const SUPERBLOCK_MAGIC: u16 = 0xef53;
pub const SUPERBLOCK_OFFSET: u64 = 1024;
pub const SUPERBLOCK_SIZE: usize = 1024;
pub const GROUP_DESC_SIZE: usize = 32;
/// Only this many bytes of every inode are decoded, whatever the declared
/// inode size is.
pub const INODE_DECODE_SIZE: usize = 128;
pub const DIR_ENTRY_HEADER_SIZE: usize = 8;
pub const MAX_NAME_LEN: usize = 255;
pub const DIRECT_BLOCKS: usize = 12;
pub const BASE_BLOCK_SIZE: u64 = 1024;
pub const MAX_LOG_BLOCK_SIZE: u32 = 6;
pub const STATE_CLEAN: u16 = 1;

pub const FEATURE_INCOMPAT_FILETYPE: u32 = 0x0002;
pub const SUPPORTED_INCOMPAT_FEATURES: u32 = FEATURE_INCOMPAT_FILETYPE;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Superblock {
  pub inodes_count: u32,
  pub blocks_count: u32,
  pub free_blocks_count: u32,
  pub free_inodes_count: u32,
  pub first_data_block: u32,
  pub log_block_size: u32,
  pub blocks_per_group: u32,
  pub inodes_per_group: u32,
  pub magic: u16,
  pub state: u16,
  pub rev_level: u32,
  pub first_ino: u32,
  pub inode_size: u16,
  pub feature_compat: u32,
  pub feature_incompat: u32,
  pub feature_ro_compat: u32,
  pub uuid: [u8; 16],
  pub volume_name: [u8; 16],
}

impl Superblock {
  pub fn block_size(&self) -> u64 {
    BASE_BLOCK_SIZE << self.log_block_size
  }

  /// Distance between two consecutive inodes in the inode table.
  pub fn inode_stride(&self) -> u64 {
    if self.rev_level >= 1 && self.inode_size as usize > INODE_DECODE_SIZE {
      self.inode_size as u64
    } else {
      INODE_DECODE_SIZE as u64
    }
  }

  pub fn volume_name_lossy(&self) -> String {
    let end = self.volume_name.iter().position(|&b| b == 0)
      .unwrap_or(self.volume_name.len());
    String::from_utf8_lossy(&self.volume_name[..end]).into_owned()
  }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct GroupDesc {
  pub block_bitmap: u32,
  pub inode_bitmap: u32,
  pub inode_table: u32,
  pub free_blocks_count: u16,
  pub free_inodes_count: u16,
  pub used_dirs_count: u16,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Inode {
  pub ino: u64,
  pub mode: Mode,
  pub attr: FileAttr,
  pub size: u64,
  pub size_512: u32,
  pub links_count: u16,
  pub flags: u32,
  pub block: [u32; 15],
  pub file_acl: u32,
}

impl Inode {
  pub fn file_type(&self) -> FileType {
    self.mode.file_type
  }

  /// The first twelve block pointers, the only ones this crate follows.
  pub fn direct_blocks(&self) -> &[u32] {
    &self.block[..DIRECT_BLOCKS]
  }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Mode {
  pub file_type: FileType,
  pub suid: bool,
  pub sgid: bool,
  pub sticky: bool,
  pub access_rights: u16,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct FileAttr {
  pub uid: u32,
  pub gid: u32,
  pub atime: u32,
  pub ctime: u32,
  pub mtime: u32,
  pub dtime: u32,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum FileType {
  Unknown,
  Regular,
  Dir,
  CharDev,
  BlockDev,
  Fifo,
  Socket,
  Symlink,
}

impl FileType {
  pub fn name(self) -> &'static str {
    match self {
      FileType::Unknown => "unknown",
      FileType::Regular => "file",
      FileType::Dir => "dir",
      FileType::CharDev => "chardev",
      FileType::BlockDev => "blockdev",
      FileType::Fifo => "fifo",
      FileType::Socket => "socket",
      FileType::Symlink => "link",
    }
  }
}

/// Fixed header of a directory entry. The name follows it in the block.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct DirEntry {
  pub ino: u32,
  pub rec_len: u16,
  pub name_len: u8,
  pub file_type: FileType,
}
