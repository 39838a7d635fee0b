//! Output files.
//! - Atomic write: temp file in the same dir + fsync(temp) + rename; fsync(dir) on Unix
//! - Fallback: if rename fails (e.g. cross-device), write the target directly,
//!   fsync it, then remove the temp.

use std::ffi::OsString;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::{debug, info};

use crate::{IoError, IoResult};

/// Write `bytes` to `path`, creating the parent directory if needed.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> IoResult<()> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&parent).map_err(|e| IoError::Path(format!("{}: {e}", parent.display())))?;

    let tmp = unique_tmp_path(path);
    write_synced(&tmp, bytes, true)?;

    match fs::rename(&tmp, path) {
        Ok(()) => {
            let _ = fsync_dir(&parent);
        }
        Err(e) => {
            debug!(error = %e, "rename failed; writing target directly");
            let res = write_synced(path, bytes, false);
            let _ = fs::remove_file(&tmp);
            res?;
            let _ = fsync_dir(&parent);
        }
    }
    info!(path = %path.display(), bytes = bytes.len(), "file written");
    Ok(())
}

fn write_synced(path: &Path, bytes: &[u8], create_new: bool) -> io::Result<()> {
    let mut f = if create_new {
        OpenOptions::new().write(true).create_new(true).open(path)?
    } else {
        OpenOptions::new().write(true).create(true).truncate(true).open(path)?
    };
    f.write_all(bytes)?;
    f.sync_all()
}

/// "<filename>.<pid>.<counter>.tmp" next to `target`.
fn unique_tmp_path(target: &Path) -> PathBuf {
    static COUNTER: AtomicU64 = AtomicU64::new(0);

    let pid = std::process::id();
    let n = COUNTER.fetch_add(1, Ordering::Relaxed);
    let fname = target.file_name().and_then(|s| s.to_str()).unwrap_or("file");
    let tmp_name = OsString::from(format!("{fname}.{pid}.{n}.tmp"));

    match target.parent() {
        Some(dir) => dir.join(tmp_name),
        None => PathBuf::from(tmp_name),
    }
}

#[cfg(unix)]
fn fsync_dir(dir: &Path) -> io::Result<()> {
    OpenOptions::new().read(true).open(dir)?.sync_all()
}

#[cfg(not(unix))]
fn fsync_dir(_dir: &Path) -> io::Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_and_replaces() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("out.csv");
        write_atomic(&path, b"first").unwrap();
        write_atomic(&path, b"second").unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"second");

        let leftovers: Vec<_> = fs::read_dir(path.parent().unwrap())
            .unwrap()
            .filter_map(Result::ok)
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn unwritable_parent_is_a_path_error() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        fs::write(&blocker, b"x").unwrap();
        let err = write_atomic(&blocker.join("out.csv"), b"data").unwrap_err();
        assert!(matches!(err, IoError::Path(_)));
    }
}
