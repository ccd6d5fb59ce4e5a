#![allow(dead_code)]

use std::cell::Cell;
use std::io::Cursor;
use std::rc::Rc;

use ext2ro::{Filesystem, MountOptions, ReadVolume, Result, Volume, mount_fs};

pub const INODES_COUNT: u32 = 32;
pub const BLOCKS_COUNT: u32 = 64;

pub const S_IFREG: u16 = 0x8000;
pub const S_IFDIR: u16 = 0x4000;
pub const S_IFLNK: u16 = 0xa000;

pub const FT_FILE: u8 = 1;
pub const FT_DIR: u8 = 2;

/// Builds small ext2 images in memory. Images start out as a single group;
/// `split_groups` and `set_group_desc` carve them into more.
pub struct ImageBuilder {
  pub data: Vec<u8>,
  pub block_size: usize,
  pub inode_size: usize,
  pub inode_table: u32,
  next_block: u32,
}

impl ImageBuilder {
  pub fn new() -> ImageBuilder {
    ImageBuilder::with_geometry(0, 128)
  }

  pub fn with_geometry(log_block_size: u32, inode_size: u16) -> ImageBuilder {
    let block_size = 1024usize << log_block_size;
    let first_data_block: u32 = if block_size == 1024 { 1 } else { 0 };
    let gdt_block = first_data_block + 1;
    let inode_table = gdt_block + 3;
    let table_blocks = (INODES_COUNT as usize * inode_size as usize + block_size - 1)
      / block_size;

    let mut builder = ImageBuilder {
      data: vec![0; BLOCKS_COUNT as usize * block_size],
      block_size: block_size,
      inode_size: inode_size as usize,
      inode_table: inode_table,
      next_block: inode_table + table_blocks as u32,
    };

    let sb = 1024;
    builder.put_u32(sb, INODES_COUNT);
    builder.put_u32(sb + 4, BLOCKS_COUNT);
    builder.put_u32(sb + 20, first_data_block);
    builder.put_u32(sb + 24, log_block_size);
    builder.put_u32(sb + 32, 8192);
    builder.put_u32(sb + 40, INODES_COUNT);
    builder.put_u16(sb + 56, 0xef53);
    builder.put_u16(sb + 58, 1);
    builder.put_u32(sb + 76, 1);
    builder.put_u32(sb + 84, 11);
    builder.put_u16(sb + 88, inode_size);
    builder.put_u32(sb + 96, 0x0002);
    builder.data[sb + 120..sb + 125].copy_from_slice(b"image");

    let gd = gdt_block as usize * block_size;
    builder.put_u32(gd, gdt_block + 1);
    builder.put_u32(gd + 4, gdt_block + 2);
    builder.put_u32(gd + 8, inode_table);
    builder
  }

  pub fn put_u16(&mut self, offset: usize, value: u16) {
    self.data[offset..offset + 2].copy_from_slice(&value.to_le_bytes());
  }

  pub fn put_u32(&mut self, offset: usize, value: u32) {
    self.data[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
  }

  pub fn alloc_block(&mut self) -> u32 {
    let block = self.next_block;
    assert!(block < BLOCKS_COUNT, "test image is full");
    self.next_block += 1;
    block
  }

  pub fn write_block(&mut self, block: u32, bytes: &[u8]) {
    assert!(bytes.len() <= self.block_size);
    let offset = block as usize * self.block_size;
    self.data[offset..offset + bytes.len()].copy_from_slice(bytes);
  }

  pub fn inode_offset(&self, ino: u32) -> usize {
    self.inode_table as usize * self.block_size + (ino as usize - 1) * self.inode_size
  }

  /// Rewrites the group geometry. Inodes placed with `set_inode` must then
  /// belong to group 0.
  pub fn split_groups(&mut self, blocks_per_group: u32, inodes_per_group: u32) {
    self.put_u32(1024 + 32, blocks_per_group);
    self.put_u32(1024 + 40, inodes_per_group);
  }

  pub fn gdt_block(&self) -> u32 {
    if self.block_size == 1024 { 2 } else { 1 }
  }

  /// Writes descriptor `group`, continuing into the blocks after the first
  /// table block when `group` does not fit there.
  pub fn set_group_desc(&mut self, group: u32, inode_table: u32) {
    let offset = self.gdt_block() as usize * self.block_size + group as usize * 32;
    self.put_u32(offset + 8, inode_table);
  }

  pub fn set_inode(&mut self, ino: u32, mode: u16, size: u32, blocks: &[u32]) {
    let offset = self.inode_offset(ino);
    self.set_inode_at(offset, mode, size, blocks);
  }

  pub fn set_inode_at(&mut self, offset: usize, mode: u16, size: u32, blocks: &[u32]) {
    self.put_u16(offset, mode);
    self.put_u32(offset + 4, size);
    self.put_u16(offset + 26, 1);
    for (i, &block) in blocks.iter().enumerate() {
      self.put_u32(offset + 40 + 4 * i, block);
    }
  }

  /// Writes `data` into freshly allocated blocks and returns their numbers.
  pub fn store(&mut self, data: &[u8]) -> Vec<u32> {
    let block_size = self.block_size;
    let mut blocks = Vec::new();
    for chunk in data.chunks(block_size) {
      let block = self.alloc_block();
      self.write_block(block, chunk);
      blocks.push(block);
    }
    blocks
  }

  pub fn add_file(&mut self, ino: u32, data: &[u8]) {
    let blocks = self.store(data);
    self.set_inode(ino, S_IFREG | 0o644, data.len() as u32, &blocks);
  }

  pub fn add_dir(&mut self, ino: u32, entries: &[(u32, u8, &str)]) {
    let block = dir_block(self.block_size, entries);
    let blocks = self.store(&block);
    self.set_inode(ino, S_IFDIR | 0o755, self.block_size as u32, &blocks);
  }

  pub fn build(self) -> Vec<u8> {
    self.data
  }

  pub fn mount(self) -> Filesystem {
    mount_image(self.build())
  }
}

/// One directory block holding `entries`; the last record spans the rest of
/// the block.
pub fn dir_block(block_size: usize, entries: &[(u32, u8, &str)]) -> Vec<u8> {
  let mut block = vec![0; block_size];
  let mut pos = 0;
  for (i, &(ino, file_type, name)) in entries.iter().enumerate() {
    let rec_len = if i + 1 == entries.len() {
      block_size - pos
    } else {
      (8 + name.len() + 3) & !3
    };
    put_entry(&mut block, pos, ino, rec_len as u16, name.len() as u8, file_type,
      name.as_bytes());
    pos += rec_len;
  }
  block
}

pub fn put_entry(block: &mut [u8], pos: usize, ino: u32, rec_len: u16,
  name_len: u8, file_type: u8, name: &[u8])
{
  block[pos..pos + 4].copy_from_slice(&ino.to_le_bytes());
  block[pos + 4..pos + 6].copy_from_slice(&rec_len.to_le_bytes());
  block[pos + 6] = name_len;
  block[pos + 7] = file_type;
  block[pos + 8..pos + 8 + name.len()].copy_from_slice(name);
}

/// The minimal image: the root directory holds a single file `hello.txt`
/// (inode 12) containing `world`.
pub fn hello_image() -> ImageBuilder {
  let mut builder = ImageBuilder::new();
  builder.add_dir(2, &[(2, FT_DIR, "."), (2, FT_DIR, ".."), (12, FT_FILE, "hello.txt")]);
  builder.add_file(12, b"world");
  builder
}

pub fn mount_image(image: Vec<u8>) -> Filesystem {
  mount_fs(Box::new(ReadVolume(Cursor::new(image))), MountOptions::default())
    .expect("mount test image")
}

/// Volume that records how it is used.
pub struct CountingVolume {
  pub inner: ReadVolume<Cursor<Vec<u8>>>,
  pub reads: Rc<Cell<usize>>,
  pub dropped: Rc<Cell<bool>>,
}

impl CountingVolume {
  pub fn new(image: Vec<u8>) -> (CountingVolume, Rc<Cell<usize>>, Rc<Cell<bool>>) {
    let reads = Rc::new(Cell::new(0));
    let dropped = Rc::new(Cell::new(false));
    let volume = CountingVolume {
      inner: ReadVolume(Cursor::new(image)),
      reads: reads.clone(),
      dropped: dropped.clone(),
    };
    (volume, reads, dropped)
  }
}

impl Volume for CountingVolume {
  fn read(&mut self, offset: u64, buffer: &mut [u8]) -> Result<()> {
    self.reads.set(self.reads.get() + 1);
    self.inner.read(offset, buffer)
  }
}

impl Drop for CountingVolume {
  fn drop(&mut self) {
    self.dropped.set(true);
  }
}
