pub use std::cmp;
pub use crate::block::{read_block, read_range};
pub use crate::decode::*;
pub use crate::defs::*;
pub use crate::dir::{lookup_in_dir};
pub use crate::error::{Error, Result};
pub use crate::fs::{Filesystem, make_buffer};
pub use crate::group::{get_ino_group, read_group_descs};
pub use crate::inode::{get_dir_inode};
pub use crate::volume::{Volume};
