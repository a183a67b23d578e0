use std::collections::HashMap;

use crate::metadata::{SessionEntry, SnapshotMetadata};
use crate::session::SessionInfo;

/// How a session relates to what was captured at the parent commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionContinuity {
    pub session_id: String,
    pub continued_from_parent: bool,
    pub message_count: u32,
    /// Messages added since the parent snapshot (all of them for a fresh session).
    pub new_messages: u32,
    pub previous_hash: Option<String>,
}

/// Compare discovered sessions with the parent commit's snapshot.
///
/// A session continues from the parent when the parent captured the same
/// session id. If the transcript is byte-identical (same hash) nothing new
/// was said; otherwise the message delta is counted.
pub fn analyze_continuity(
    sessions: &[SessionInfo],
    parent: Option<&SnapshotMetadata>,
) -> Vec<SessionContinuity> {
    let parent_sessions: HashMap<&str, &SessionEntry> = parent
        .map(|p| {
            p.sessions
                .iter()
                .map(|s| (s.session_id.as_str(), s))
                .collect()
        })
        .unwrap_or_default();

    sessions
        .iter()
        .map(|s| match parent_sessions.get(s.session_id.as_str()) {
            Some(prev) => {
                let new_messages = if prev.file_hash == s.file_hash {
                    0
                } else {
                    s.message_count.saturating_sub(prev.message_count)
                };
                SessionContinuity {
                    session_id: s.session_id.clone(),
                    continued_from_parent: true,
                    message_count: s.message_count,
                    new_messages,
                    previous_hash: Some(prev.file_hash.clone()),
                }
            }
            None => SessionContinuity {
                session_id: s.session_id.clone(),
                continued_from_parent: false,
                message_count: s.message_count,
                new_messages: s.message_count,
                previous_hash: None,
            },
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::time::SystemTime;

    fn info(id: &str, hash: &str, count: u32) -> SessionInfo {
        SessionInfo {
            session_id: id.into(),
            path: PathBuf::from(format!("{id}.jsonl")),
            modified: SystemTime::now(),
            file_hash: hash.into(),
            message_count: count,
        }
    }

    fn parent(entries: Vec<SessionEntry>) -> SnapshotMetadata {
        SnapshotMetadata {
            commit_sha: "parent".into(),
            parent_commit: None,
            timestamp: "2025-01-08T09:20:00Z".into(),
            author: "you@example.com".into(),
            context_id: "ctx-00000000".into(),
            total_messages: entries.iter().map(|e| e.message_count).sum(),
            new_messages_since_parent: 0,
            sessions: entries,
            message_stats: Default::default(),
        }
    }

    fn entry(id: &str, hash: &str, count: u32) -> SessionEntry {
        SessionEntry {
            session_id: id.into(),
            message_count: count,
            new_messages: count,
            continued_from_parent: false,
            file_hash: hash.into(),
        }
    }

    #[test]
    fn without_parent_everything_is_new() {
        let out = analyze_continuity(&[info("s1", "h1", 5)], None);
        assert!(!out[0].continued_from_parent);
        assert_eq!(out[0].new_messages, 5);
        assert_eq!(out[0].previous_hash, None);
    }

    #[test]
    fn grown_session_counts_delta() {
        let p = parent(vec![entry("s1", "old", 10)]);
        let out = analyze_continuity(&[info("s1", "new", 18)], Some(&p));
        assert!(out[0].continued_from_parent);
        assert_eq!(out[0].new_messages, 8);
        assert_eq!(out[0].previous_hash.as_deref(), Some("old"));
    }

    #[test]
    fn unchanged_session_has_no_new_messages() {
        let p = parent(vec![entry("s1", "same", 10)]);
        let out = analyze_continuity(&[info("s1", "same", 10)], Some(&p));
        assert_eq!(out[0].new_messages, 0);
    }

    #[test]
    fn mixed_sessions() {
        let p = parent(vec![entry("s1", "a", 4)]);
        let out = analyze_continuity(&[info("s1", "b", 6), info("s2", "c", 3)], Some(&p));
        assert_eq!(out.len(), 2);
        assert!(out[0].continued_from_parent);
        assert!(!out[1].continued_from_parent);
        assert_eq!(out[1].new_messages, 3);
    }
}
