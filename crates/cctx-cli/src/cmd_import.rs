use std::path::Path;

use cctx_capture::import_snapshots;
use cctx_store::{CctxPaths, Dataset, LockGuard};

pub fn execute(
    repo_root: &Path,
    repository: Option<&str>,
    created_by: Option<&str>,
) -> anyhow::Result<()> {
    let paths = CctxPaths::discover(repo_root);
    if !paths.is_initialized() {
        anyhow::bail!("No .cctx/ workspace found. Run `cctx init` first.");
    }
    let _lock = LockGuard::acquire(&paths.lock_file)?;
    let mut ds = Dataset::load(&paths)?;

    let repository_id = match repository {
        Some(id) => {
            if ds.repository_by_id(id).is_none() {
                tracing::warn!(id, "importing into a repository the dataset does not list");
            }
            id.to_string()
        }
        None => match ds.repositories.first() {
            Some(r) => r.id.clone(),
            None => anyhow::bail!("dataset has no repositories; pass --repository"),
        },
    };
    let created_by = match created_by {
        Some(id) => id.to_string(),
        None => ds
            .users
            .first()
            .map(|u| u.id.clone())
            .unwrap_or_else(|| "unknown".to_string()),
    };

    let n = import_snapshots(&paths, &mut ds, &repository_id, &created_by)?;
    ds.save(&paths)?;
    println!("Imported {n} snapshot(s) into {repository_id}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_dataset_needs_repository() {
        let tmp = tempfile::tempdir().unwrap();
        crate::cmd_init::execute(tmp.path(), true).unwrap();
        let err = execute(tmp.path(), None, None).unwrap_err();
        assert!(err.to_string().contains("--repository"));
        execute(tmp.path(), Some("repo-1"), Some("user-1")).unwrap();
    }

    #[test]
    fn no_snapshots_leaves_demo_intact() {
        let tmp = tempfile::tempdir().unwrap();
        crate::cmd_init::execute(tmp.path(), false).unwrap();
        execute(tmp.path(), None, None).unwrap();
        let ds = Dataset::load(&CctxPaths::discover(tmp.path())).unwrap();
        assert_eq!(ds, Dataset::demo());
    }
}
