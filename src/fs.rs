use log::{debug, warn};
use crate::prelude::*;

/// Knobs for opening a volume.
#[derive(Debug, Copy, Clone, Default)]
pub struct MountOptions {
  /// Refuse volumes that use incompatible features this crate does not
  /// understand instead of only warning about them.
  pub strict_features: bool,
}

pub struct Filesystem {
  pub volume: Box<dyn Volume>,
  pub superblock: Superblock,
  pub groups: Vec<GroupDesc>,
}

impl Filesystem {
  pub const ROOT_INO: u64 = 2;

  pub fn block_size(&self) -> u64 {
    self.superblock.block_size()
  }

  pub fn group_count(&self) -> u64 {
    self.groups.len() as u64
  }

  pub fn superblock(&self) -> &Superblock {
    &self.superblock
  }

  pub fn group_descs(&self) -> &[GroupDesc] {
    &self.groups[..]
  }
}

/// Opens a session on `volume`. If this fails, the volume has already been
/// dropped by the time the error reaches the caller.
pub fn mount_fs(mut volume: Box<dyn Volume>, options: MountOptions) -> Result<Filesystem> {
  let mut superblock_buf = make_buffer(SUPERBLOCK_SIZE as u64);
  volume.read(SUPERBLOCK_OFFSET, &mut superblock_buf[..])?;
  let superblock = decode_superblock(&superblock_buf[..])?;
  check_superblock(&superblock, options)?;

  let groups = read_group_descs(&mut *volume, &superblock)?;
  debug!("mounted volume: {} blocks of {} bytes, {} inodes, {} groups",
    superblock.blocks_count, superblock.block_size(),
    superblock.inodes_count, groups.len());

  Ok(Filesystem { volume: volume, superblock: superblock, groups: groups })
}

fn check_superblock(superblock: &Superblock, options: MountOptions) -> Result<()> {
  if superblock.blocks_per_group == 0 {
    return Err(Error::malformed("superblock", format!("zero blocks per group")));
  }
  if superblock.inodes_per_group == 0 {
    return Err(Error::malformed("superblock", format!("zero inodes per group")));
  }

  if superblock.state != STATE_CLEAN {
    warn!("volume is in state 0x{:x}, it may not have been cleanly unmounted",
      superblock.state);
  }

  let unsupported = superblock.feature_incompat & !SUPPORTED_INCOMPAT_FEATURES;
  if unsupported != 0 {
    if options.strict_features {
      return Err(Error::UnsupportedFeatures(superblock.feature_incompat));
    }
    warn!("volume uses incompatible features (0x{:x}), reading anyway",
      superblock.feature_incompat);
  }
  Ok(())
}

pub fn make_buffer(size: u64) -> Vec<u8> {
  vec![0; size as usize]
}
