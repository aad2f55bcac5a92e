#![allow(dead_code)]

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Write `contents` to `dir/name` and return the full path.
pub fn write_config(dir: &Path, name: &str, contents: &str) -> io::Result<PathBuf> {
    let path = dir.join(name);
    fs::write(&path, contents)?;
    Ok(path)
}
