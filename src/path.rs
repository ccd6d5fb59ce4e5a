use log::debug;
use crate::prelude::*;

/// Non-empty components of `path`; repeated, leading and trailing slashes
/// contribute nothing.
pub fn path_components(path: &[u8]) -> Vec<&[u8]> {
  path.split(|&b| b == b'/').filter(|c| !c.is_empty()).collect()
}

/// Resolves an absolute path to an inode number, starting from the root
/// directory. Names compare byte for byte and the first match wins.
pub fn lookup_path(fs: &mut Filesystem, path: &str) -> Result<u64> {
  let mut ino = Filesystem::ROOT_INO;
  for component in path_components(path.as_bytes()) {
    let dir_inode = get_dir_inode(fs, ino)?;
    ino = match lookup_in_dir(fs, &dir_inode, component)? {
      Some(child) => child as u64,
      None => return Err(Error::NotFound(path.to_string())),
    };
    debug!("resolved {:?} to inode {}", String::from_utf8_lossy(component), ino);
  }
  Ok(ino)
}
