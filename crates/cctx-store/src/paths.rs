use std::path::{Path, PathBuf};

/// All well-known paths of a cctx workspace.
#[derive(Debug, Clone)]
pub struct CctxPaths {
    pub root: PathBuf,
    pub cctx_dir: PathBuf,
    pub config_json: PathBuf,
    pub dataset_json: PathBuf,
    /// Last capture and per-session capture history.
    pub state_json: PathBuf,
    pub lock_file: PathBuf,
    /// Per-commit captured sessions: `.cc-snapshots/<sha>/`.
    pub snapshots_dir: PathBuf,
    pub snapshots_index: PathBuf,
}

impl CctxPaths {
    /// Derive all paths from a repo root. Pure computation, no I/O.
    pub fn discover(repo_root: impl Into<PathBuf>) -> Self {
        let root = repo_root.into();
        let cctx_dir = root.join(".cctx");
        let snapshots_dir = root.join(".cc-snapshots");
        Self {
            config_json: cctx_dir.join("config.json"),
            dataset_json: cctx_dir.join("dataset.json"),
            state_json: cctx_dir.join("state.json"),
            lock_file: cctx_dir.join("LOCK"),
            snapshots_index: snapshots_dir.join("index.json"),
            snapshots_dir,
            cctx_dir,
            root,
        }
    }

    /// Create all required directories. Idempotent.
    pub fn ensure_layout(&self) -> anyhow::Result<()> {
        for dir in [&self.cctx_dir, &self.snapshots_dir] {
            std::fs::create_dir_all(dir)?;
        }
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.cctx_dir.is_dir()
    }

    pub fn snapshot_dir(&self, commit_sha: &str) -> PathBuf {
        self.snapshots_dir.join(commit_sha)
    }

    /// Walk up from `start` looking for a directory containing `.cctx/`.
    pub fn find_root(start: &Path) -> Option<PathBuf> {
        let mut cur = start.to_path_buf();
        loop {
            if cur.join(".cctx").is_dir() {
                return Some(cur);
            }
            if !cur.pop() {
                return None;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn discover_builds_correct_paths() {
        let p = CctxPaths::discover("/tmp/repo");
        assert_eq!(p.cctx_dir, PathBuf::from("/tmp/repo/.cctx"));
        assert_eq!(p.config_json, PathBuf::from("/tmp/repo/.cctx/config.json"));
        assert_eq!(p.dataset_json, PathBuf::from("/tmp/repo/.cctx/dataset.json"));
        assert_eq!(p.state_json, PathBuf::from("/tmp/repo/.cctx/state.json"));
        assert_eq!(p.lock_file, PathBuf::from("/tmp/repo/.cctx/LOCK"));
        assert_eq!(
            p.snapshots_index,
            PathBuf::from("/tmp/repo/.cc-snapshots/index.json")
        );
        assert_eq!(
            p.snapshot_dir("abc"),
            PathBuf::from("/tmp/repo/.cc-snapshots/abc")
        );
    }

    #[test]
    fn ensure_layout_and_find_root() {
        let tmp = tempfile::tempdir().unwrap();
        let p = CctxPaths::discover(tmp.path());
        assert!(!p.is_initialized());
        p.ensure_layout().unwrap();
        assert!(p.is_initialized());
        assert!(p.snapshots_dir.is_dir());

        let nested = tmp.path().join("src/deep");
        std::fs::create_dir_all(&nested).unwrap();
        assert_eq!(
            CctxPaths::find_root(&nested).as_deref(),
            Some(tmp.path())
        );
    }
}
