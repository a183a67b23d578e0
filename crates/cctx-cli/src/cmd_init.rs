use std::path::Path;

use cctx_store::{CctxPaths, Dataset};

pub fn execute(repo_root: &Path, empty: bool) -> anyhow::Result<()> {
    let paths = CctxPaths::discover(repo_root);
    if paths.dataset_json.exists() {
        println!("Already initialized: {}", paths.cctx_dir.display());
        return Ok(());
    }
    paths.ensure_layout()?;

    let dataset = if empty {
        Dataset::default()
    } else {
        Dataset::demo()
    };
    dataset.save(&paths)?;

    println!("Initialized {}", paths.cctx_dir.display());
    println!(
        "  dataset: {} contexts, {} repositories",
        dataset.contexts.len(),
        dataset.repositories.len()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_is_idempotent() {
        let tmp = tempfile::tempdir().unwrap();
        execute(tmp.path(), false).unwrap();
        let paths = CctxPaths::discover(tmp.path());
        assert_eq!(Dataset::load(&paths).unwrap().contexts.len(), 7);

        // A second init must not clobber the dataset.
        let mut ds = Dataset::load(&paths).unwrap();
        ds.contexts.clear();
        ds.save(&paths).unwrap();
        execute(tmp.path(), false).unwrap();
        assert!(Dataset::load(&paths).unwrap().contexts.is_empty());
    }

    #[test]
    fn init_empty() {
        let tmp = tempfile::tempdir().unwrap();
        execute(tmp.path(), true).unwrap();
        let ds = Dataset::load(&CctxPaths::discover(tmp.path())).unwrap();
        assert_eq!(ds, Dataset::default());
    }
}
