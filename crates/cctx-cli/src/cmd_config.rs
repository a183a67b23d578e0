use clap::Subcommand;
use std::path::Path;

use cctx_store::config::{parse_value, read_config, write_config, KNOWN_KEYS};
use cctx_store::CctxPaths;

// ── CLI Schema ──

#[derive(Subcommand)]
pub enum ConfigCmd {
    /// Set a config value
    Set {
        /// Config key (e.g. layout.spacing, serve.port)
        key: String,
        /// Config value (true/false/number/string)
        value: String,
    },
    /// Get a config value
    Get {
        /// Config key
        key: String,
    },
    /// List all config values
    List,
}

// ── Dispatch ──

pub fn run(cmd: ConfigCmd, repo_root: &Path) -> anyhow::Result<()> {
    match cmd {
        ConfigCmd::Set { key, value } => set(repo_root, &key, &value),
        ConfigCmd::Get { key } => get(repo_root, &key),
        ConfigCmd::List => list(repo_root),
    }
}

fn initialized(repo_root: &Path) -> anyhow::Result<CctxPaths> {
    let paths = CctxPaths::discover(repo_root);
    if !paths.is_initialized() {
        anyhow::bail!("No .cctx/ workspace found. Run `cctx init` first.");
    }
    Ok(paths)
}

// ── Command Implementations ──

/// `cctx config set <key> <value>`
pub fn set(repo_root: &Path, key: &str, value: &str) -> anyhow::Result<()> {
    let paths = initialized(repo_root)?;
    if !KNOWN_KEYS.contains(&key) {
        tracing::warn!(key, "unknown config key; it will be stored but ignored");
    }
    let mut config = read_config(&paths.config_json)?;
    config.insert(key.to_string(), parse_value(value));
    write_config(&paths.config_json, &config)?;
    println!("{key} = {value}");
    Ok(())
}

/// `cctx config get <key>`
pub fn get(repo_root: &Path, key: &str) -> anyhow::Result<()> {
    let paths = initialized(repo_root)?;
    let config = read_config(&paths.config_json)?;
    match config.get(key) {
        Some(val) => println!("{val}"),
        None => println!("(not set)"),
    }
    Ok(())
}

/// `cctx config list`
pub fn list(repo_root: &Path) -> anyhow::Result<()> {
    let paths = initialized(repo_root)?;
    let config = read_config(&paths.config_json)?;
    if config.is_empty() {
        println!("(no config set)");
    } else {
        for (k, v) in &config {
            println!("{k} = {v}");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use cctx_store::CctxConfig;

    #[test]
    fn set_requires_init() {
        let tmp = tempfile::tempdir().unwrap();
        let err = set(tmp.path(), "serve.port", "9000").unwrap_err();
        assert!(err.to_string().contains("cctx init"));
    }

    #[test]
    fn set_feeds_typed_config() {
        let tmp = tempfile::tempdir().unwrap();
        crate::cmd_init::execute(tmp.path(), true).unwrap();
        set(tmp.path(), "layout.spacing", "120").unwrap();
        set(tmp.path(), "serve.bind", "0.0.0.0").unwrap();

        let paths = CctxPaths::discover(tmp.path());
        let map = read_config(&paths.config_json).unwrap();
        let cfg = CctxConfig::from_map(&map);
        assert_eq!(cfg.layout.spacing, 120.0);
        assert_eq!(cfg.bind, "0.0.0.0");
    }
}
