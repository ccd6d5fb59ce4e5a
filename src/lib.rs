//! Read-only access to ext2 volume images: path lookup, directory listing
//! and extraction of regular files.
//!
//! Only the twelve direct block pointers of an inode are followed, so files
//! and directories larger than twelve blocks are cut short.
pub use defs::*;
pub use error::{Error, Result};
pub use volume::{Volume, FileVolume, ReadVolume};
pub use fs::{Filesystem, MountOptions, mount_fs};
pub use group::{group_count, group_desc_table_block};
pub use block::{read_block};
pub use inode::{get_inode, get_dir_inode, get_file_inode, locate_inode};
pub use dir::{DirIter, DirLine, ScanStep, read_dir, list_dir, lookup_in_dir, scan_entry};
pub use path::{lookup_path, path_components};
pub use file::{FileBlocks, read_file, copy_file, read_file_to_vec, read_file_at};
pub use decode::{decode_superblock, decode_group_desc, decode_inode, decode_dir_entry};

mod block;
mod decode;
mod defs;
mod dir;
mod error;
mod file;
mod fs;
mod group;
mod inode;
mod path;
mod prelude;
mod volume;
