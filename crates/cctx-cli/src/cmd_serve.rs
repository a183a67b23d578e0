use std::path::Path;

use cctx_serve::ServeConfig;
use cctx_store::{CctxConfig, CctxPaths};

pub fn execute(repo_root: &Path, bind: Option<String>, port: Option<u16>) -> anyhow::Result<()> {
    let cfg = CctxConfig::load(&CctxPaths::discover(repo_root))?;
    let config = ServeConfig {
        bind: bind.unwrap_or(cfg.bind),
        port: port.unwrap_or(cfg.port),
    };
    tokio::runtime::Runtime::new()?.block_on(cctx_serve::serve(repo_root, config))
}
