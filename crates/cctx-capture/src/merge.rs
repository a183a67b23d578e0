//! Merge several session transcripts into one conversation chain.

use std::fs;

use serde::{Deserialize, Serialize};

use cctx_core::transcript::{parse_jsonl, Message};

use crate::session::SessionInfo;

/// Merged transcript stored next to a snapshot's `metadata.json`.
pub const CONTEXT_FILE: &str = "context.jsonl";

/// One session's messages plus the time used for its boundary marker when
/// the session is empty.
#[derive(Debug, Clone)]
pub struct SessionTranscript {
    pub session_id: String,
    pub modified: String,
    pub messages: Vec<Message>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageStats {
    pub total: u32,
    pub user: u32,
    pub assistant: u32,
    pub system: u32,
}

pub fn message_stats(messages: &[Message]) -> MessageStats {
    let count = |kind: &str| {
        let n = messages.iter().filter(|m| m.kind == kind).count();
        u32::try_from(n).unwrap_or(u32::MAX)
    };
    MessageStats {
        total: u32::try_from(messages.len()).unwrap_or(u32::MAX),
        user: count("user"),
        assistant: count("assistant"),
        system: count("system"),
    }
}

fn boundary(session_id: &str, timestamp: String, parent: Option<String>) -> Message {
    Message {
        kind: "system".to_string(),
        content: format!("--- USER STARTED NEW SESSION ({session_id}) ---"),
        timestamp,
        uuid: Some(format!("boundary-{session_id}")),
        parent_uuid: parent,
    }
}

/// Concatenate sessions in the given order (oldest first).
///
/// Every session after the first is preceded by a `system` boundary
/// message, and `parentUuid` is rewritten so the result is one chain.
pub fn merge_transcripts(transcripts: Vec<SessionTranscript>) -> Vec<Message> {
    let mut merged: Vec<Message> = Vec::new();
    let mut prev: Option<String> = None;

    for t in transcripts {
        if !merged.is_empty() {
            let ts = t
                .messages
                .first()
                .map(|m| m.timestamp.clone())
                .unwrap_or(t.modified);
            let marker = boundary(&t.session_id, ts, prev.take());
            prev = marker.uuid.clone();
            merged.push(marker);
        }
        for mut m in t.messages {
            // Line-number placeholders repeat across sessions.
            if let Some(u) = m.uuid.as_mut() {
                if u.starts_with("missing-") {
                    *u = format!("{}-{u}", t.session_id);
                }
            }
            m.parent_uuid = prev.take();
            prev = m.uuid.clone();
            merged.push(m);
        }
    }
    merged
}

/// Read and merge the transcripts of `sessions`, which are expected in
/// modification order as returned by `discover_sessions`.
pub fn merge_sessions(sessions: &[SessionInfo]) -> anyhow::Result<Vec<Message>> {
    let mut transcripts = Vec::with_capacity(sessions.len());
    for s in sessions {
        let data = fs::read_to_string(&s.path)?;
        transcripts.push(SessionTranscript {
            session_id: s.session_id.clone(),
            modified: cctx_core::ts::format_ts(s.modified.into()),
            messages: parse_jsonl(&data),
        });
    }
    Ok(merge_transcripts(transcripts))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::SystemTime;

    fn msg(kind: &str, uuid: &str, ts: &str) -> Message {
        Message {
            kind: kind.into(),
            content: format!("{kind} says hi"),
            timestamp: ts.into(),
            uuid: Some(uuid.into()),
            parent_uuid: Some("stale".into()),
        }
    }

    fn transcript(id: &str, messages: Vec<Message>) -> SessionTranscript {
        SessionTranscript {
            session_id: id.into(),
            modified: "2025-01-08T10:00:00Z".into(),
            messages,
        }
    }

    #[test]
    fn single_session_is_relinked_without_boundary() {
        let merged = merge_transcripts(vec![transcript(
            "s1",
            vec![msg("user", "u1", "t1"), msg("assistant", "a1", "t2")],
        )]);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].parent_uuid, None);
        assert_eq!(merged[1].parent_uuid.as_deref(), Some("u1"));
    }

    #[test]
    fn sessions_are_chained_through_boundary() {
        let merged = merge_transcripts(vec![
            transcript("s1", vec![msg("user", "u1", "t1"), msg("assistant", "a1", "t2")]),
            transcript("s2", vec![msg("user", "u2", "t3")]),
        ]);
        let kinds: Vec<&str> = merged.iter().map(|m| m.kind.as_str()).collect();
        assert_eq!(kinds, vec!["user", "assistant", "system", "user"]);

        let marker = &merged[2];
        assert_eq!(marker.content, "--- USER STARTED NEW SESSION (s2) ---");
        assert_eq!(marker.uuid.as_deref(), Some("boundary-s2"));
        assert_eq!(marker.parent_uuid.as_deref(), Some("a1"));
        assert_eq!(marker.timestamp, "t3");
        assert_eq!(merged[3].parent_uuid.as_deref(), Some("boundary-s2"));
    }

    #[test]
    fn empty_session_boundary_uses_modified_time() {
        let merged = merge_transcripts(vec![
            transcript("s1", vec![msg("user", "u1", "t1")]),
            transcript("s2", vec![]),
        ]);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[1].timestamp, "2025-01-08T10:00:00Z");
    }

    #[test]
    fn placeholder_uuids_stay_unique() {
        let a = parse_jsonl(r#"{"type":"user","content":"a","timestamp":"t1"}"#);
        let b = parse_jsonl(r#"{"type":"user","content":"b","timestamp":"t2"}"#);
        let merged = merge_transcripts(vec![transcript("s1", a), transcript("s2", b)]);
        assert!(cctx_core::transcript::validate_messages(&merged).is_ok());
        assert_eq!(merged[2].uuid.as_deref(), Some("s2-missing-1"));
    }

    #[test]
    fn stats_by_kind() {
        let merged = merge_transcripts(vec![
            transcript("s1", vec![msg("user", "u1", "t1"), msg("assistant", "a1", "t2")]),
            transcript("s2", vec![msg("user", "u2", "t3")]),
        ]);
        assert_eq!(
            message_stats(&merged),
            MessageStats {
                total: 4,
                user: 2,
                assistant: 1,
                system: 1,
            }
        );
    }

    #[test]
    fn merges_session_files() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("s1.jsonl");
        fs::write(
            &path,
            r#"{"type":"user","uuid":"u1","content":"hi","timestamp":"2025-01-08T09:15:00Z"}"#,
        )
        .unwrap();
        let sessions = vec![SessionInfo {
            session_id: "s1".into(),
            path,
            modified: SystemTime::now(),
            file_hash: String::new(),
            message_count: 1,
        }];
        let merged = merge_sessions(&sessions).unwrap();
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].content, "hi");
    }
}
