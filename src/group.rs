use crate::prelude::*;

/// Block holding the first group descriptor: right after the superblock,
/// which occupies block 1 on 1 KiB volumes and part of block 0 otherwise.
pub fn group_desc_table_block(superblock: &Superblock) -> u64 {
  if superblock.block_size() == BASE_BLOCK_SIZE { 2 } else { 1 }
}

pub fn group_count(superblock: &Superblock) -> u64 {
  let data_blocks = superblock.blocks_count
    .saturating_sub(superblock.first_data_block) as u64;
  let group_size = superblock.blocks_per_group as u64;
  (data_blocks + group_size - 1) / group_size
}

/// Loads the whole descriptor table. The table is fetched one block at a time,
/// so a bogus group count fails on the first missing block instead of
/// allocating the whole claimed table up front.
pub fn read_group_descs(volume: &mut dyn Volume, superblock: &Superblock)
  -> Result<Vec<GroupDesc>>
{
  let count = group_count(superblock);
  if count == 0 {
    return Err(Error::malformed("superblock",
        format!("{} blocks do not form a single group", superblock.blocks_count)));
  }

  let block_size = superblock.block_size();
  let descs_per_block = block_size / GROUP_DESC_SIZE as u64;
  let table_block = group_desc_table_block(superblock);

  let mut groups = Vec::new();
  let mut block_buf = make_buffer(block_size);
  let mut table_idx = 0;
  while (groups.len() as u64) < count {
    volume.read((table_block + table_idx) * block_size, &mut block_buf[..])?;
    let in_block = cmp::min(descs_per_block, count - groups.len() as u64);
    for desc_bytes in block_buf.chunks(GROUP_DESC_SIZE).take(in_block as usize) {
      groups.push(decode_group_desc(desc_bytes)?);
    }
    table_idx += 1;
  }
  Ok(groups)
}

pub fn get_ino_group(fs: &Filesystem, ino: u64) -> (u64, u64) {
  let group_size = fs.superblock.inodes_per_group as u64;
  ((ino - 1) / group_size, (ino - 1) % group_size)
}
