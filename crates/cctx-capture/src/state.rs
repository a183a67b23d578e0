use std::collections::BTreeMap;
use std::fs;

use anyhow::Context as _;
use serde::{Deserialize, Serialize};

use cctx_store::{CctxPaths, LockGuard};

use crate::metadata::SnapshotMetadata;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LastCapture {
    pub commit: String,
    pub context_id: String,
    pub timestamp: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionHistory {
    pub first_seen_commit: String,
    pub last_captured_commit: String,
    pub capture_count: u32,
}

/// `.cctx/state.json`
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct LocalState {
    #[serde(default)]
    pub last_capture: Option<LastCapture>,
    #[serde(default)]
    pub session_history: BTreeMap<String, SessionHistory>,
}

pub fn load_state(paths: &CctxPaths) -> anyhow::Result<LocalState> {
    if !paths.state_json.exists() {
        return Ok(LocalState::default());
    }
    let content = fs::read_to_string(&paths.state_json)?;
    serde_json::from_str(&content)
        .with_context(|| format!("parsing {}", paths.state_json.display()))
}

/// Record `meta` as the latest capture and bump the history of each of its sessions.
pub fn update_local_state(
    paths: &CctxPaths,
    meta: &SnapshotMetadata,
) -> anyhow::Result<LocalState> {
    let _lock = LockGuard::acquire(&paths.lock_file)?;
    let mut state = load_state(paths)?;

    state.last_capture = Some(LastCapture {
        commit: meta.commit_sha.clone(),
        context_id: meta.context_id.clone(),
        timestamp: meta.timestamp.clone(),
    });
    for s in &meta.sessions {
        state
            .session_history
            .entry(s.session_id.clone())
            .and_modify(|h| {
                h.last_captured_commit = meta.commit_sha.clone();
                h.capture_count += 1;
            })
            .or_insert_with(|| SessionHistory {
                first_seen_commit: meta.commit_sha.clone(),
                last_captured_commit: meta.commit_sha.clone(),
                capture_count: 1,
            });
    }

    let json = serde_json::to_string_pretty(&state)?;
    cctx_store::write_atomic(&paths.state_json, json.as_bytes())?;
    Ok(state)
}
