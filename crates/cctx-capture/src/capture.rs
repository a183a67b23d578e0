use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use cctx_store::CctxPaths;

use crate::continuity::analyze_continuity;
use crate::merge::{merge_sessions, message_stats, CONTEXT_FILE};
use crate::metadata::{build_metadata, load_metadata, save_metadata, update_index, SnapshotMetadata};
use crate::session::{claude_project_dir, discover_sessions};
use crate::state::update_local_state;

// ── Git ──

fn git_output(repo: &Path, args: &[&str]) -> Option<String> {
    std::process::Command::new("git")
        .args(args)
        .current_dir(repo)
        .output()
        .ok()
        .filter(|o| o.status.success())
        .and_then(|o| String::from_utf8(o.stdout).ok())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// `git rev-parse HEAD`. `None` outside a repo or before the first commit.
pub fn git_head(repo: &Path) -> Option<String> {
    git_output(repo, &["rev-parse", "HEAD"])
}

/// `git rev-parse HEAD^`. `None` for a root commit.
pub fn git_parent(repo: &Path) -> Option<String> {
    git_output(repo, &["rev-parse", "--verify", "--quiet", "HEAD^"])
}

/// True when `rev` has a second parent.
pub fn git_is_merge(repo: &Path, rev: &str) -> bool {
    git_output(repo, &["rev-parse", "--verify", "--quiet", &format!("{rev}^2")]).is_some()
}

/// Committer time of `rev`, or `None` when git does not know it.
pub fn git_commit_time(repo: &Path, rev: &str) -> Option<SystemTime> {
    let secs: u64 = git_output(repo, &["log", "-1", "--format=%ct", rev])?
        .parse()
        .ok()?;
    Some(UNIX_EPOCH + Duration::from_secs(secs))
}

fn git_author(repo: &Path) -> Option<String> {
    git_output(repo, &["config", "user.email"])
}

// ── Capture ──

pub struct CaptureOptions {
    /// Commit to attach the snapshot to (defaults to HEAD).
    pub commit: Option<String>,
    /// Parent commit used for continuity (defaults to HEAD^).
    pub parent: Option<String>,
    pub author: Option<String>,
    pub claude_home: PathBuf,
    /// Only sessions modified after this instant are captured. Defaults to
    /// the parent commit's time when git knows it.
    pub since: Option<SystemTime>,
}

/// Snapshot the repo's Claude sessions for one commit.
///
/// Discovers session transcripts, compares them with the parent commit's
/// snapshot, writes `metadata.json`, the merged `context.jsonl` and the
/// transcript copies, then updates the snapshot index and `.cctx/state.json`.
///
/// Returns `None` without writing anything when the commit is a merge.
pub fn capture(
    repo_root: &Path,
    opts: &CaptureOptions,
) -> anyhow::Result<Option<SnapshotMetadata>> {
    let commit = match opts.commit.clone().or_else(|| git_head(repo_root)) {
        Some(c) => c,
        None => anyhow::bail!("no commit to capture (not a git repo, or no commits yet)"),
    };
    if git_is_merge(repo_root, &commit) {
        tracing::info!(commit = %commit, "merge commit, skipping context capture");
        return Ok(None);
    }

    let paths = CctxPaths::discover(repo_root);
    paths.ensure_layout()?;

    let parent = match &opts.parent {
        Some(p) => Some(p.clone()),
        None if opts.commit.is_none() => git_parent(repo_root),
        None => None,
    };
    let author = opts.author.clone().or_else(|| git_author(repo_root));
    let since = opts.since.or_else(|| {
        parent
            .as_deref()
            .and_then(|p| git_commit_time(repo_root, p))
    });

    let session_dir = claude_project_dir(&opts.claude_home, repo_root);
    let sessions = discover_sessions(&session_dir, since)?;
    if sessions.is_empty() {
        tracing::warn!(dir = %session_dir.display(), "no Claude sessions found");
    }

    let parent_meta = match parent.as_deref() {
        Some(p) => load_metadata(&paths, p)?,
        None => None,
    };
    let continuity = analyze_continuity(&sessions, parent_meta.as_ref());
    let merged = merge_sessions(&sessions)?;
    let meta = build_metadata(
        &commit,
        parent.as_deref(),
        author.as_deref(),
        &sessions,
        &continuity,
        message_stats(&merged),
    );

    save_metadata(&paths, &meta, &sessions)?;
    let jsonl = cctx_core::transcript::messages_to_jsonl(&merged)?;
    cctx_store::write_atomic(
        &paths.snapshot_dir(&meta.commit_sha).join(CONTEXT_FILE),
        jsonl.as_bytes(),
    )?;
    update_index(&paths, &meta)?;
    update_local_state(&paths, &meta)?;
    tracing::info!(
        commit = %meta.commit_sha,
        sessions = meta.sessions.len(),
        messages = meta.total_messages,
        "captured context"
    );
    Ok(Some(meta))
}
