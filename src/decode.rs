use crate::defs::*;
use crate::error::{Error, Result};

pub fn decode_superblock(bytes: &[u8]) -> Result<Superblock> {
  check_len("superblock", bytes, SUPERBLOCK_SIZE)?;
  let magic = decode_u16(&bytes[56..]);
  if magic != SUPERBLOCK_MAGIC {
    return Err(Error::BadMagic { found: magic, expected: SUPERBLOCK_MAGIC });
  }

  let rev = decode_u32(&bytes[76..]);
  let log_block_size = decode_u32(&bytes[24..]);
  if log_block_size > MAX_LOG_BLOCK_SIZE {
    return Err(Error::malformed("superblock",
        format!("block size exponent {} is too large", log_block_size)));
  }

  let mut uuid = [0; 16];
  uuid.copy_from_slice(&bytes[104..120]);
  let mut volume_name = [0; 16];
  volume_name.copy_from_slice(&bytes[120..136]);

  Ok(Superblock {
    inodes_count: decode_u32(&bytes[0..]),
    blocks_count: decode_u32(&bytes[4..]),
    free_blocks_count: decode_u32(&bytes[12..]),
    free_inodes_count: decode_u32(&bytes[16..]),
    first_data_block: decode_u32(&bytes[20..]),
    log_block_size: log_block_size,
    blocks_per_group: decode_u32(&bytes[32..]),
    inodes_per_group: decode_u32(&bytes[40..]),
    magic: magic,
    state: decode_u16(&bytes[58..]),
    rev_level: rev,
    first_ino: if rev >= 1 { decode_u32(&bytes[84..]) } else { 11 },
    inode_size: if rev >= 1 { decode_u16(&bytes[88..]) } else { 128 },
    feature_compat: if rev >= 1 { decode_u32(&bytes[92..]) } else { 0 },
    feature_incompat: if rev >= 1 { decode_u32(&bytes[96..]) } else { 0 },
    feature_ro_compat: if rev >= 1 { decode_u32(&bytes[100..]) } else { 0 },
    uuid: uuid,
    volume_name: volume_name,
  })
}

pub fn decode_group_desc(bytes: &[u8]) -> Result<GroupDesc> {
  check_len("group descriptor", bytes, GROUP_DESC_SIZE)?;
  Ok(GroupDesc {
    block_bitmap: decode_u32(&bytes[0..]),
    inode_bitmap: decode_u32(&bytes[4..]),
    inode_table: decode_u32(&bytes[8..]),
    free_blocks_count: decode_u16(&bytes[12..]),
    free_inodes_count: decode_u16(&bytes[14..]),
    used_dirs_count: decode_u16(&bytes[16..]),
  })
}

/// Decodes the first 128 bytes of an inode; anything past them is ignored.
pub fn decode_inode(superblock: &Superblock, ino: u64, bytes: &[u8]) -> Result<Inode> {
  check_len("inode", bytes, INODE_DECODE_SIZE)?;
  let mode = decode_inode_mode(decode_u16(&bytes[0..]));

  let size_low = decode_u32(&bytes[4..]) as u64;
  let size_high =
    if superblock.rev_level >= 1 && mode.file_type == FileType::Regular {
      decode_u32(&bytes[108..])
    } else {
      0
    } as u64;

  let uid_low = decode_u16(&bytes[2..]) as u32;
  let uid_high = decode_u16(&bytes[120..]) as u32;
  let gid_low = decode_u16(&bytes[24..]) as u32;
  let gid_high = decode_u16(&bytes[122..]) as u32;

  let mut block = [0; 15];
  for (i, ptr) in block.iter_mut().enumerate() {
    *ptr = decode_u32(&bytes[40 + 4*i..]);
  }

  Ok(Inode {
    ino: ino,
    mode: mode,
    attr: FileAttr {
      uid: uid_low + (uid_high << 16),
      gid: gid_low + (gid_high << 16),
      atime: decode_u32(&bytes[8..]),
      ctime: decode_u32(&bytes[12..]),
      mtime: decode_u32(&bytes[16..]),
      dtime: decode_u32(&bytes[20..]),
    },
    size: size_low + (size_high << 32),
    size_512: decode_u32(&bytes[28..]),
    links_count: decode_u16(&bytes[26..]),
    flags: decode_u32(&bytes[32..]),
    block: block,
    file_acl: decode_u32(&bytes[104..]),
  })
}

pub fn decode_inode_mode(mode: u16) -> Mode {
  Mode {
    file_type: decode_inode_file_type(mode),
    suid: (mode & 0x0800) != 0,
    sgid: (mode & 0x0400) != 0,
    sticky: (mode & 0x0200) != 0,
    access_rights: mode & 0x01ff,
  }
}

fn decode_inode_file_type(mode: u16) -> FileType {
  match (mode & 0xf000) >> 12 {
    1  => FileType::Fifo,
    2  => FileType::CharDev,
    4  => FileType::Dir,
    6  => FileType::BlockDev,
    8  => FileType::Regular,
    10 => FileType::Symlink,
    12 => FileType::Socket,
    _ => FileType::Unknown,
  }
}

/// Decodes the fixed header of a directory entry. The name is not touched;
/// the caller validates `name_len` against `rec_len` before slicing it out.
pub fn decode_dir_entry(bytes: &[u8]) -> Result<DirEntry> {
  check_len("directory entry", bytes, DIR_ENTRY_HEADER_SIZE)?;
  Ok(DirEntry {
    ino: decode_u32(&bytes[0..]),
    rec_len: decode_u16(&bytes[4..]),
    name_len: bytes[6],
    file_type: decode_dir_entry_file_type(bytes[7]),
  })
}

pub fn decode_dir_entry_file_type(byte: u8) -> FileType {
  match byte {
    1 => FileType::Regular,
    2 => FileType::Dir,
    3 => FileType::CharDev,
    4 => FileType::BlockDev,
    5 => FileType::Fifo,
    6 => FileType::Socket,
    7 => FileType::Symlink,
    _ => FileType::Unknown,
  }
}

fn check_len(record: &'static str, bytes: &[u8], needed: usize) -> Result<()> {
  if bytes.len() < needed {
    Err(Error::short_record(record, needed, bytes.len()))
  } else {
    Ok(())
  }
}

pub fn decode_u16(bytes: &[u8]) -> u16 {
  (bytes[0] as u16) +
  ((bytes[1] as u16) << 8)
}

pub fn decode_u32(bytes: &[u8]) -> u32 {
  (bytes[0] as u32) +
  ((bytes[1] as u32) << 8) +
  ((bytes[2] as u32) << 16) +
  ((bytes[3] as u32) << 24)
}
