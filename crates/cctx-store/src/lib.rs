pub mod config;
pub mod dataset;
pub mod paths;
pub mod query;

pub use config::CctxConfig;
pub use dataset::Dataset;
pub use paths::CctxPaths;

use fs2::FileExt;
use std::fs;
use std::io::Write;
use std::path::Path;

/// Atomic write: write to temp file in same dir, then rename.
pub fn write_atomic(path: &Path, data: &[u8]) -> anyhow::Result<()> {
    let parent = path
        .parent()
        .ok_or_else(|| anyhow::anyhow!("no parent dir for {}", path.display()))?;
    fs::create_dir_all(parent)?;
    let mut tmp = tempfile::NamedTempFile::new_in(parent)?;
    tmp.write_all(data)?;
    tmp.flush()?;
    tmp.persist(path)?;
    Ok(())
}

/// File-based exclusive lock guard. Released on drop.
pub struct LockGuard {
    _file: fs::File,
}

impl LockGuard {
    /// Block until the exclusive lock on `path` is held. Creates the file if needed.
    pub fn acquire(path: &Path) -> anyhow::Result<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = fs::OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(path)?;
        file.lock_exclusive()
            .map_err(|e| anyhow::anyhow!("failed to lock {}: {e}", path.display()))?;
        Ok(Self { _file: file })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_atomic_creates_parents_and_replaces() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("a/b/file.json");
        write_atomic(&path, b"one").unwrap();
        write_atomic(&path, b"two").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "two");
    }

    #[test]
    fn lock_is_reacquirable_after_drop() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("LOCK");
        {
            let _g = LockGuard::acquire(&path).unwrap();
            assert!(path.exists());
        }
        let _again = LockGuard::acquire(&path).unwrap();
    }
}
