use std::fs;

use cctx_core::transcript::{messages_to_jsonl, parse_jsonl};
use cctx_core::Context;
use cctx_store::{CctxPaths, Dataset};

use crate::merge::{merge_transcripts, SessionTranscript, CONTEXT_FILE};
use crate::metadata::{load_metadata, SnapshotMetadata};

/// The snapshot's merged transcript. Older snapshots without `context.jsonl`
/// are merged from their per-session copies.
fn snapshot_transcripts(paths: &CctxPaths, meta: &SnapshotMetadata) -> anyhow::Result<String> {
    let dir = paths.snapshot_dir(&meta.commit_sha);
    let merged_path = dir.join(CONTEXT_FILE);
    if merged_path.is_file() {
        return Ok(fs::read_to_string(&merged_path)?);
    }

    let mut transcripts = Vec::new();
    for s in &meta.sessions {
        let path = dir.join(format!("{}.jsonl", s.session_id));
        if !path.exists() {
            tracing::warn!(path = %path.display(), "snapshot transcript missing");
            continue;
        }
        transcripts.push(SessionTranscript {
            session_id: s.session_id.clone(),
            modified: meta.timestamp.clone(),
            messages: parse_jsonl(&fs::read_to_string(&path)?),
        });
    }
    Ok(messages_to_jsonl(&merge_transcripts(transcripts))?)
}

fn to_context(
    meta: &SnapshotMetadata,
    jsonl_data: String,
    repository_id: &str,
    created_by: &str,
) -> Context {
    Context {
        session_id: meta.context_id.clone(),
        repository_id: repository_id.to_string(),
        commit_sha: meta.commit_sha.clone(),
        parent_commit_sha: meta.parent_commit.clone(),
        author_email: meta.author.clone(),
        total_messages: meta.total_messages,
        session_count: u32::try_from(meta.sessions.len()).unwrap_or(u32::MAX),
        new_messages_since_parent: meta.parent_commit.as_ref().map(|_| meta.new_messages_since_parent),
        new_session: meta.starts_new_session(),
        jsonl_data,
        created_by: created_by.to_string(),
        created_at: meta.timestamp.clone(),
        updated_at: meta.timestamp.clone(),
    }
}

/// Upsert every captured snapshot into `dataset`. Returns how many were imported.
pub fn import_snapshots(
    paths: &CctxPaths,
    dataset: &mut Dataset,
    repository_id: &str,
    created_by: &str,
) -> anyhow::Result<usize> {
    if !paths.snapshots_dir.is_dir() {
        return Ok(0);
    }

    let mut shas: Vec<String> = fs::read_dir(&paths.snapshots_dir)?
        .filter_map(|e| e.ok())
        .filter(|e| e.path().join("metadata.json").is_file())
        .filter_map(|e| e.file_name().to_str().map(str::to_string))
        .collect();
    shas.sort();

    let mut imported = 0;
    for sha in shas {
        let Some(meta) = load_metadata(paths, &sha)? else {
            continue;
        };
        let jsonl = snapshot_transcripts(paths, &meta)?;
        dataset.upsert_context(to_context(&meta, jsonl, repository_id, created_by));
        imported += 1;
    }
    tracing::info!(imported, "imported snapshots");
    Ok(imported)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::{capture, CaptureOptions};
    use crate::session::claude_project_dir;

    const LINE_U: &str = r#"{"type":"user","content":"hi","timestamp":"2025-01-08T09:15:00Z"}"#;
    const LINE_A: &str = r#"{"type":"assistant","content":"hello","timestamp":"2025-01-08T09:15:20Z"}"#;

    #[test]
    fn imports_captured_commits_as_contexts() {
        let repo = tempfile::tempdir().unwrap();
        let home = tempfile::tempdir().unwrap();
        let session_dir = claude_project_dir(home.path(), repo.path());
        fs::create_dir_all(&session_dir).unwrap();
        fs::write(session_dir.join("s1.jsonl"), LINE_U).unwrap();

        let opts = |commit: &str, parent: Option<&str>| CaptureOptions {
            commit: Some(commit.into()),
            parent: parent.map(str::to_string),
            author: Some("you@example.com".into()),
            claude_home: home.path().to_path_buf(),
            since: None,
        };
        capture(repo.path(), &opts("c1", None)).unwrap();
        fs::write(session_dir.join("s1.jsonl"), format!("{LINE_U}\n{LINE_A}")).unwrap();
        capture(repo.path(), &opts("c2", Some("c1"))).unwrap();

        let paths = CctxPaths::discover(repo.path());
        let mut ds = Dataset::default();
        let n = import_snapshots(&paths, &mut ds, "repo-1", "user-1").unwrap();
        assert_eq!(n, 2);

        let c1 = ds.context_by_commit_sha("c1").unwrap();
        assert!(c1.new_session);
        assert_eq!(c1.total_messages, 1);
        assert_eq!(c1.new_messages_since_parent, None);

        let c2 = ds.context_by_commit_sha("c2").unwrap();
        assert!(!c2.new_session);
        assert_eq!(c2.parent_commit_sha.as_deref(), Some("c1"));
        assert_eq!(c2.new_messages_since_parent, Some(1));
        assert_eq!(parse_jsonl(&c2.jsonl_data).len(), 2);

        // Importing again replaces rather than duplicates.
        import_snapshots(&paths, &mut ds, "repo-1", "user-1").unwrap();
        assert_eq!(ds.contexts.len(), 2);
    }

    #[test]
    fn snapshot_without_context_file_is_merged_from_copies() {
        let tmp = tempfile::tempdir().unwrap();
        let paths = CctxPaths::discover(tmp.path());
        let dir = paths.snapshot_dir("c1");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("s1.jsonl"), format!("{LINE_U}\n{LINE_A}")).unwrap();
        fs::write(dir.join("s2.jsonl"), LINE_U).unwrap();

        let entry = |id: &str, n: u32| crate::metadata::SessionEntry {
            session_id: id.into(),
            message_count: n,
            new_messages: n,
            continued_from_parent: false,
            file_hash: String::new(),
        };
        let meta = SnapshotMetadata {
            commit_sha: "c1".into(),
            parent_commit: None,
            timestamp: "2025-01-08T09:20:00Z".into(),
            author: "you@example.com".into(),
            context_id: "ctx-00000001".into(),
            sessions: vec![entry("s1", 2), entry("s2", 1)],
            total_messages: 3,
            new_messages_since_parent: 3,
            message_stats: Default::default(),
        };
        fs::write(dir.join("metadata.json"), serde_json::to_string(&meta).unwrap()).unwrap();

        let mut ds = Dataset::default();
        assert_eq!(import_snapshots(&paths, &mut ds, "repo-1", "user-1").unwrap(), 1);
        let messages = parse_jsonl(&ds.context_by_commit_sha("c1").unwrap().jsonl_data);
        let kinds: Vec<&str> = messages.iter().map(|m| m.kind.as_str()).collect();
        assert_eq!(kinds, vec!["user", "assistant", "system", "user"]);
        assert_eq!(messages[2].content, "--- USER STARTED NEW SESSION (s2) ---");
    }

    #[test]
    fn no_snapshot_dir_imports_nothing() {
        let tmp = tempfile::tempdir().unwrap();
        let mut ds = Dataset::default();
        let n = import_snapshots(&CctxPaths::discover(tmp.path()), &mut ds, "r", "u").unwrap();
        assert_eq!(n, 0);
    }
}
