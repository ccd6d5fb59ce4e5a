use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use ext2ro::{FileVolume, MountOptions};

#[derive(Parser, Debug)]
#[command(author, version, about = "Read files out of an ext2 image")]
struct Args {
  /// Disk image holding the ext2 volume
  #[arg(value_name = "IMAGE")]
  image: PathBuf,

  /// Refuse volumes with incompatible features instead of warning
  #[arg(long)]
  strict: bool,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Print superblock and group summary
  Info,
  /// List a directory
  Ls {
    #[arg(default_value = "/")]
    path: String,
  },
  /// Copy a regular file from the image to the host
  Cp {
    src: String,
    dst: PathBuf,
  },
}

fn main() -> Result<()> {
  env_logger::init();
  let args = Args::parse();

  let file = fs::File::open(&args.image)
    .with_context(|| format!("cannot open image {:?}", args.image))?;
  let options = MountOptions { strict_features: args.strict };
  let mut fs = ext2ro::mount_fs(Box::new(FileVolume(file)), options)
    .with_context(|| format!("cannot mount {:?}", args.image))?;

  match args.command {
    Command::Info => print_info(&fs),
    Command::Ls { path } => list(&mut fs, &path),
    Command::Cp { src, dst } => copy(&mut fs, &src, &dst),
  }
}

fn print_info(fs: &ext2ro::Filesystem) -> Result<()> {
  let sb = fs.superblock();
  println!("Volume name:  {}", sb.volume_name_lossy());
  println!("Revision:     {}", sb.rev_level);
  println!("Block size:   {} bytes", fs.block_size());
  println!("Blocks:       {} ({} free)", sb.blocks_count, sb.free_blocks_count);
  println!("Inodes:       {} ({} free)", sb.inodes_count, sb.free_inodes_count);
  println!("Inode size:   {}", sb.inode_size);
  println!("Groups:       {}", fs.group_count());
  for (idx, group) in fs.group_descs().iter().enumerate() {
    println!("  group {:>3}: inode table at {}, {} free blocks, {} free inodes",
      idx, group.inode_table, group.free_blocks_count, group.free_inodes_count);
  }
  Ok(())
}

fn list(fs: &mut ext2ro::Filesystem, path: &str) -> Result<()> {
  let ino = ext2ro::lookup_path(fs, path)
    .with_context(|| format!("directory not found: {}", path))?;
  let lines = ext2ro::list_dir(fs, ino)
    .with_context(|| format!("cannot list {}", path))?;

  let stdout = io::stdout();
  let mut out = stdout.lock();
  writeln!(out, "Contents of '{}':", path)?;
  writeln!(out, "{:<30} {:<10} {:<10}", "Name", "Type", "Inode")?;
  writeln!(out, "{}", "-".repeat(46))?;
  for line in lines {
    writeln!(out, "{:<30} {:<10} {:<10}", line.name_lossy(), line.file_type.name(), line.ino)?;
  }
  Ok(())
}

fn copy(fs: &mut ext2ro::Filesystem, src: &str, dst: &Path) -> Result<()> {
  let ino = ext2ro::lookup_path(fs, src)
    .with_context(|| format!("file not found: {}", src))?;
  let inode = ext2ro::get_file_inode(fs, ino)
    .with_context(|| format!("cannot copy {}", src))?;

  let mut out = io::BufWriter::new(fs::File::create(dst)
    .with_context(|| format!("cannot create {:?}", dst))?);
  let written = ext2ro::copy_file(fs, &inode, &mut out)
    .with_context(|| format!("cannot copy {}", src))?;
  out.flush()?;

  if written < inode.size {
    log::warn!("{} has {} bytes, only the first {} are reachable through direct blocks",
      src, inode.size, written);
  }
  println!("File copied: {} -> {:?} ({} bytes)", src, dst, written);
  Ok(())
}
