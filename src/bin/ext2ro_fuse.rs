use std::ffi::OsStr;
use std::fs;
use std::os::unix::ffi::OsStrExt;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use ext2ro::{Error, FileVolume, Filesystem, MountOptions};
use log::{debug, info};

#[derive(Parser, Debug)]
#[command(author, version, about = "Mount an ext2 image read-only through FUSE")]
struct Args {
  #[arg(value_name = "IMAGE")]
  image: PathBuf,

  #[arg(value_name = "MOUNTPOINT")]
  mountpoint: PathBuf,
}

struct Fuse {
  fs: Filesystem,
}

const TTL: time::Timespec = time::Timespec { sec: 1, nsec: 0 };
const FUSE_ROOT_INO: u64 = 1;

impl fuse::Filesystem for Fuse {
  fn lookup(&mut self, _req: &fuse::Request, parent: u64, name: &OsStr,
    reply: fuse::ReplyEntry)
  {
    debug!("lookup (ino {}, name {:?})", parent, name);
    let res: ext2ro::Result<_> = (|| {
      let parent_inode = ext2ro::get_dir_inode(&mut self.fs, ext2_ino(parent))?;
      match ext2ro::lookup_in_dir(&mut self.fs, &parent_inode, name.as_bytes())? {
        Some(ino) => Ok(Some(ext2ro::get_inode(&mut self.fs, ino as u64)?)),
        None => Ok(None),
      }
    })();

    match res {
      Err(err) => reply.error(errno(&err)),
      Ok(None) => reply.error(libc::ENOENT),
      Ok(Some(inode)) => reply.entry(&TTL, &inode_to_file_attr(&inode), 0),
    }
  }

  fn getattr(&mut self, _req: &fuse::Request, ino: u64, reply: fuse::ReplyAttr) {
    debug!("getattr (ino {})", ino);
    match ext2ro::get_inode(&mut self.fs, ext2_ino(ino)) {
      Err(err) => reply.error(errno(&err)),
      Ok(inode) => reply.attr(&TTL, &inode_to_file_attr(&inode)),
    }
  }

  fn read(&mut self, _req: &fuse::Request, ino: u64, _fh: u64,
    offset: i64, size: u32, reply: fuse::ReplyData)
  {
    debug!("read (ino {}, offset {}, size {})", ino, offset, size);
    if offset < 0 {
      return reply.error(libc::EINVAL);
    }
    let res: ext2ro::Result<_> = (|| {
      let inode = ext2ro::get_inode(&mut self.fs, ext2_ino(ino))?;
      let mut buffer = vec![0; size as usize];
      let length = ext2ro::read_file_at(&mut self.fs, &inode, offset as u64, &mut buffer[..])?;
      buffer.truncate(length);
      Ok(buffer)
    })();

    match res {
      Err(err) => reply.error(errno(&err)),
      Ok(data) => reply.data(&data[..]),
    }
  }

  fn readdir(&mut self, _req: &fuse::Request, ino: u64, _fh: u64,
    offset: i64, mut reply: fuse::ReplyDirectory)
  {
    debug!("readdir (ino {}, offset {})", ino, offset);
    match ext2ro::list_dir(&mut self.fs, ext2_ino(ino)) {
      Err(err) => reply.error(errno(&err)),
      Ok(lines) => {
        for (idx, line) in lines.iter().enumerate().skip(offset as usize) {
          let name = OsStr::from_bytes(&line.name[..]);
          if reply.add(fuse_ino(line.ino as u64), idx as i64 + 1,
              fuse_file_type(line.file_type), name) {
            break;
          }
        }
        reply.ok();
      },
    }
  }
}

fn main() -> Result<()> {
  env_logger::init();
  let args = Args::parse();

  let file = fs::File::open(&args.image)
    .with_context(|| format!("cannot open image {:?}", args.image))?;
  let fs = ext2ro::mount_fs(Box::new(FileVolume(file)), MountOptions::default())
    .with_context(|| format!("cannot mount {:?}", args.image))?;

  info!("mounting {:?} on {:?}", args.image, args.mountpoint);
  let options = ["-o", "ro", "-o", "fsname=ext2ro"].iter()
    .map(|o| o.as_ref())
    .collect::<Vec<&OsStr>>();
  fuse::mount(Fuse { fs: fs }, &args.mountpoint, &options)
    .with_context(|| format!("cannot mount on {:?}", args.mountpoint))?;
  Ok(())
}

fn errno(err: &Error) -> libc::c_int {
  match *err {
    Error::NotFound(_) | Error::InvalidInode { .. } => libc::ENOENT,
    Error::NotADirectory(_) => libc::ENOTDIR,
    Error::NotARegularFile(_) => libc::EISDIR,
    Error::Io(_) | Error::BadMagic { .. } | Error::MalformedRecord { .. }
      | Error::UnsupportedFeatures(_) => libc::EIO,
  }
}

// FUSE numbers its root 1 and ext2 numbers it 2, so the two are swapped
// to keep the mapping one-to-one.
fn ext2_ino(fuse_ino: u64) -> u64 {
  swap_root_ino(fuse_ino)
}

fn fuse_ino(ext2_ino: u64) -> u64 {
  swap_root_ino(ext2_ino)
}

fn swap_root_ino(ino: u64) -> u64 {
  match ino {
    FUSE_ROOT_INO => Filesystem::ROOT_INO,
    Filesystem::ROOT_INO => FUSE_ROOT_INO,
    other => other,
  }
}

fn inode_to_file_attr(inode: &ext2ro::Inode) -> fuse::FileAttr {
  fuse::FileAttr {
    ino: fuse_ino(inode.ino),
    size: inode.size,
    blocks: inode.size_512 as u64,
    atime: fuse_timespec(inode.attr.atime),
    mtime: fuse_timespec(inode.attr.mtime),
    ctime: fuse_timespec(inode.attr.ctime),
    crtime: fuse_timespec(0),
    kind: fuse_file_type(inode.file_type()),
    perm: inode.mode.access_rights,
    nlink: inode.links_count as u32,
    uid: inode.attr.uid,
    gid: inode.attr.gid,
    rdev: 0,
    flags: 0,
  }
}

fn fuse_timespec(epoch: u32) -> time::Timespec {
  time::Timespec::new(epoch as i64, 0)
}

fn fuse_file_type(file_type: ext2ro::FileType) -> fuse::FileType {
  match file_type {
    ext2ro::FileType::Unknown | ext2ro::FileType::Regular => fuse::FileType::RegularFile,
    ext2ro::FileType::Dir => fuse::FileType::Directory,
    ext2ro::FileType::CharDev => fuse::FileType::CharDevice,
    ext2ro::FileType::BlockDev => fuse::FileType::BlockDevice,
    ext2ro::FileType::Fifo => fuse::FileType::NamedPipe,
    ext2ro::FileType::Socket => fuse::FileType::Socket,
    ext2ro::FileType::Symlink => fuse::FileType::Symlink,
  }
}
