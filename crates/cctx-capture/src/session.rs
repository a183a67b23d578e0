use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use sha2::{Digest, Sha256};

/// Claude Code's per-project directory name: the absolute repo path with
/// separators turned into `-`, leading `-` dropped.
pub fn encode_project_path(repo: &Path) -> String {
    let abs = std::path::absolute(repo).unwrap_or_else(|_| repo.to_path_buf());
    let encoded = abs
        .to_string_lossy()
        .replace(['/', '\\'], "-");
    encoded.trim_start_matches('-').to_string()
}

/// `<claude_home>/projects/<encoded>`. Newer Claude Code versions keep the
/// leading `-`; that spelling is used when it is the one present on disk.
pub fn claude_project_dir(claude_home: &Path, repo: &Path) -> PathBuf {
    let projects = claude_home.join("projects");
    let encoded = encode_project_path(repo);
    let primary = projects.join(&encoded);
    if primary.is_dir() {
        return primary;
    }
    let dashed = projects.join(format!("-{encoded}"));
    if dashed.is_dir() {
        return dashed;
    }
    primary
}

#[derive(Debug, Clone)]
pub struct SessionInfo {
    pub session_id: String,
    pub path: PathBuf,
    pub modified: SystemTime,
    pub file_hash: String,
    pub message_count: u32,
}

pub fn hash_file(path: &Path) -> anyhow::Result<String> {
    let bytes = fs::read(path)?;
    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    Ok(hex::encode(hasher.finalize()))
}

/// List `*.jsonl` session files in `dir`, oldest first.
///
/// With `after`, only files modified strictly later are returned. A missing
/// directory yields no sessions.
pub fn discover_sessions(
    dir: &Path,
    after: Option<SystemTime>,
) -> anyhow::Result<Vec<SessionInfo>> {
    if !dir.is_dir() {
        tracing::debug!(dir = %dir.display(), "no claude session directory");
        return Ok(Vec::new());
    }

    let mut sessions = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.extension().and_then(|e| e.to_str()) != Some("jsonl") {
            continue;
        }
        let Some(session_id) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        let modified = fs::metadata(&path)?.modified()?;
        if let Some(after) = after {
            if modified <= after {
                continue;
            }
        }
        let content = fs::read_to_string(&path)?;
        sessions.push(SessionInfo {
            session_id: session_id.to_string(),
            file_hash: hash_file(&path)?,
            message_count: cctx_core::transcript::count_messages(&content),
            modified,
            path,
        });
    }

    sessions.sort_by_key(|s| s.modified);
    Ok(sessions)
}
