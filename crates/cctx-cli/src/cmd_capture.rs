use std::path::Path;

use cctx_capture::{capture, CaptureOptions};
use cctx_store::{CctxConfig, CctxPaths};

pub fn execute(
    repo_root: &Path,
    commit: Option<String>,
    parent: Option<String>,
    author: Option<String>,
) -> anyhow::Result<()> {
    let cfg = CctxConfig::load(&CctxPaths::discover(repo_root))?;
    let opts = CaptureOptions {
        commit,
        parent,
        author,
        claude_home: cfg.claude_home,
        since: None,
    };
    let Some(meta) = capture(repo_root, &opts)? else {
        println!("Skipping context capture: merge commit detected");
        return Ok(());
    };

    println!(
        "Captured {} ({} sessions, {} messages, {} new)",
        cctx_core::short_sha(&meta.commit_sha),
        meta.sessions.len(),
        meta.total_messages,
        meta.new_messages_since_parent
    );
    let stats = &meta.message_stats;
    if stats.total > 0 {
        println!(
            "  {} user, {} assistant, {} system",
            stats.user, stats.assistant, stats.system
        );
    }
    if meta.starts_new_session() && !meta.sessions.is_empty() {
        println!("  starts a new session");
    }
    Ok(())
}
