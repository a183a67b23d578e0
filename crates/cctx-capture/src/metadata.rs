use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use anyhow::Context as _;
use serde::{Deserialize, Serialize};

use cctx_store::{CctxPaths, LockGuard};

use crate::continuity::SessionContinuity;
use crate::merge::MessageStats;
use crate::session::SessionInfo;

/// One captured session inside a commit snapshot.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionEntry {
    pub session_id: String,
    pub message_count: u32,
    pub new_messages: u32,
    pub continued_from_parent: bool,
    pub file_hash: String,
}

/// `.cc-snapshots/<sha>/metadata.json`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SnapshotMetadata {
    pub commit_sha: String,
    pub parent_commit: Option<String>,
    pub timestamp: String,
    pub author: String,
    pub context_id: String,
    pub sessions: Vec<SessionEntry>,
    pub total_messages: u32,
    pub new_messages_since_parent: u32,
    /// Counts over the merged transcript, boundary markers included.
    #[serde(default)]
    pub message_stats: MessageStats,
}

impl SnapshotMetadata {
    /// True when no captured session was already running at the parent commit.
    pub fn starts_new_session(&self) -> bool {
        !self.sessions.iter().any(|s| s.continued_from_parent)
    }
}

/// Summary row of `.cc-snapshots/index.json`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IndexEntry {
    pub has_context: bool,
    pub context_id: String,
    pub message_count: u32,
    pub session_count: usize,
    pub timestamp: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SnapshotIndex {
    #[serde(default)]
    pub commits: BTreeMap<String, IndexEntry>,
}

/// `ctx-` followed by eight lowercase ulid characters.
pub fn new_context_id() -> String {
    let id = ulid::Ulid::new().to_string().to_lowercase();
    format!("ctx-{}", &id[id.len() - 8..])
}

pub fn build_metadata(
    commit_sha: &str,
    parent_commit: Option<&str>,
    author: Option<&str>,
    sessions: &[SessionInfo],
    continuity: &[SessionContinuity],
    message_stats: MessageStats,
) -> SnapshotMetadata {
    let entries: Vec<SessionEntry> = sessions
        .iter()
        .zip(continuity)
        .map(|(s, c)| SessionEntry {
            session_id: s.session_id.clone(),
            message_count: c.message_count,
            new_messages: c.new_messages,
            continued_from_parent: c.continued_from_parent,
            file_hash: s.file_hash.clone(),
        })
        .collect();

    SnapshotMetadata {
        commit_sha: commit_sha.to_string(),
        parent_commit: parent_commit.map(str::to_string),
        timestamp: cctx_core::ts::now_rfc3339(),
        author: author.unwrap_or("unknown").to_string(),
        context_id: new_context_id(),
        total_messages: entries.iter().map(|e| e.message_count).sum(),
        new_messages_since_parent: entries.iter().map(|e| e.new_messages).sum(),
        sessions: entries,
        message_stats,
    }
}

/// Write `metadata.json` and copy each session transcript next to it.
pub fn save_metadata(
    paths: &CctxPaths,
    meta: &SnapshotMetadata,
    sessions: &[SessionInfo],
) -> anyhow::Result<PathBuf> {
    let dir = paths.snapshot_dir(&meta.commit_sha);
    fs::create_dir_all(&dir)?;
    for s in sessions {
        let dest = dir.join(format!("{}.jsonl", s.session_id));
        fs::copy(&s.path, &dest)
            .with_context(|| format!("copying transcript {}", s.path.display()))?;
    }
    let path = dir.join("metadata.json");
    let json = serde_json::to_string_pretty(meta)?;
    cctx_store::write_atomic(&path, json.as_bytes())?;
    Ok(path)
}

/// Load the snapshot for `commit_sha`, or `None` if it was never captured.
pub fn load_metadata(
    paths: &CctxPaths,
    commit_sha: &str,
) -> anyhow::Result<Option<SnapshotMetadata>> {
    let path = paths.snapshot_dir(commit_sha).join("metadata.json");
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&path)?;
    let meta = serde_json::from_str(&content)
        .with_context(|| format!("parsing {}", path.display()))?;
    Ok(Some(meta))
}

pub fn load_index(paths: &CctxPaths) -> anyhow::Result<SnapshotIndex> {
    if !paths.snapshots_index.exists() {
        return Ok(SnapshotIndex::default());
    }
    let content = fs::read_to_string(&paths.snapshots_index)?;
    Ok(serde_json::from_str(&content)?)
}

/// Record `meta` in `index.json` under the workspace lock.
pub fn update_index(paths: &CctxPaths, meta: &SnapshotMetadata) -> anyhow::Result<()> {
    let _lock = LockGuard::acquire(&paths.lock_file)?;
    let mut index = load_index(paths)?;
    index.commits.insert(
        meta.commit_sha.clone(),
        IndexEntry {
            has_context: meta.total_messages > 0,
            context_id: meta.context_id.clone(),
            message_count: meta.total_messages,
            session_count: meta.sessions.len(),
            timestamp: meta.timestamp.clone(),
        },
    );
    let json = serde_json::to_string_pretty(&index)?;
    cctx_store::write_atomic(&paths.snapshots_index, json.as_bytes())
}
