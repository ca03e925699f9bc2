//! All-or-nothing publication of rendered outputs.
//!
//! Every output is first written and synced to a temp file next to its
//! destination. Only when all of them are staged does any rename happen, so a
//! failure while staging leaves the destination untouched.
//!
//! Renames then run in the order given and stop at the first failure. A
//! failure there can leave earlier files replaced and later ones old; callers
//! put the manifest last so a set without a matching manifest is detectable.

use crate::emit::OutputFile;
use crate::errors::{PackError, Result};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

#[cfg(unix)]
fn fsync_dir(dir: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::OpenOptionsExt;
    let f = fs::OpenOptions::new().read(true).custom_flags(libc::O_DIRECTORY).open(dir)?;
    f.sync_all()
}
#[cfg(not(unix))]
fn fsync_dir(_dir: &Path) -> std::io::Result<()> { Ok(()) }

fn parent_of(path: &Path) -> &Path {
    match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    }
}

fn stage(dest: &Path, bytes: &[u8]) -> Result<NamedTempFile> {
    let dir = parent_of(dest);
    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| PackError::io_at(dir, e))?;
    tmp.write_all(bytes).map_err(|e| PackError::io_at(tmp.path(), e))?;
    tmp.as_file().sync_all().map_err(|e| PackError::io_at(tmp.path(), e))?;
    Ok(tmp)
}

/// Write `(destination, bytes)` pairs atomically as a set.
pub fn publish(targets: &[(PathBuf, &[u8])]) -> Result<()> {
    for (dest, _) in targets {
        let dir = parent_of(dest);
        fs::create_dir_all(dir).map_err(|e| PackError::io_at(dir, e))?;
    }

    let mut staged = Vec::with_capacity(targets.len());
    for (dest, bytes) in targets {
        staged.push((stage(dest, bytes)?, dest));
    }

    let mut dirs: Vec<&Path> = Vec::new();
    for (tmp, dest) in staged {
        tmp.persist(dest)?;
        tracing::info!(path = %dest.display(), "published");
        let dir = parent_of(dest);
        if !dirs.contains(&dir) {
            dirs.push(dir);
        }
    }
    for dir in dirs {
        let _ = fsync_dir(dir);
    }
    Ok(())
}

/// Publish every output under `dir`, creating it if missing.
pub fn publish_dir(dir: &Path, outputs: &[OutputFile]) -> Result<Vec<PathBuf>> {
    let targets: Vec<(PathBuf, &[u8])> = outputs.iter().map(|o| (dir.join(&o.name), o.bytes.as_slice())).collect();
    publish(&targets)?;
    Ok(targets.into_iter().map(|(p, _)| p).collect())
}
