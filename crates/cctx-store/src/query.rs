//! Read-side helpers the dashboard and CLI use. All linear scans.

use serde::Serialize;

use cctx_core::{validate_records, CommitContextRecord, Context, CoreError, TeamMember, User};
use cctx_core::{ts::parse_ts, Repository};
use cctx_graph::{layout, GraphDescription, LayoutConfig};

use crate::Dataset;

/// Shortest sha prefix accepted by [`Dataset::context_by_commit_sha`].
pub const MIN_SHA_PREFIX: usize = 4;

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Stats {
    /// Commits that carry a conversation.
    pub total_contexts: usize,
    pub total_commits: usize,
    pub repositories: usize,
    pub team_members: usize,
    pub total_messages: u64,
    pub sessions: usize,
}

impl Dataset {
    pub fn contexts_with_conversation(&self) -> Vec<&Context> {
        self.contexts.iter().filter(|c| c.has_context()).collect()
    }

    pub fn contexts_without_conversation(&self) -> Vec<&Context> {
        self.contexts.iter().filter(|c| !c.has_context()).collect()
    }

    /// Exact sha, or a unique prefix of at least [`MIN_SHA_PREFIX`] chars.
    pub fn context_by_commit_sha(&self, sha: &str) -> Option<&Context> {
        if let Some(c) = self.contexts.iter().find(|c| c.commit_sha == sha) {
            return Some(c);
        }
        if sha.len() < MIN_SHA_PREFIX {
            return None;
        }
        let mut matches = self.contexts.iter().filter(|c| c.commit_sha.starts_with(sha));
        match (matches.next(), matches.next()) {
            (Some(c), None) => Some(c),
            _ => None,
        }
    }

    pub fn context_by_session_id(&self, session_id: &str) -> Option<&Context> {
        self.contexts.iter().find(|c| c.session_id == session_id)
    }

    pub fn contexts_by_repository(&self, repository_id: &str) -> Vec<&Context> {
        self.contexts
            .iter()
            .filter(|c| c.repository_id == repository_id)
            .collect()
    }

    pub fn contexts_by_author(&self, author_email: &str) -> Vec<&Context> {
        self.contexts
            .iter()
            .filter(|c| c.author_email == author_email)
            .collect()
    }

    pub fn user_by_email(&self, email: &str) -> Option<&User> {
        self.users.iter().find(|u| u.email == email)
    }

    pub fn user_by_id(&self, id: &str) -> Option<&User> {
        self.users.iter().find(|u| u.id == id)
    }

    pub fn repository_by_id(&self, id: &str) -> Option<&Repository> {
        self.repositories.iter().find(|r| r.id == id)
    }

    pub fn team_members(&self, team_id: &str) -> Vec<&TeamMember> {
        self.team_members
            .iter()
            .filter(|m| m.team_id == team_id)
            .collect()
    }

    /// Contexts oldest first (stable for equal timestamps).
    pub fn commit_timeline(&self) -> Result<Vec<&Context>, CoreError> {
        let mut keyed = self
            .contexts
            .iter()
            .map(|c| parse_ts(&c.commit_sha, &c.created_at).map(|t| (t, c)))
            .collect::<Result<Vec<_>, _>>()?;
        keyed.sort_by_key(|(t, _)| *t);
        Ok(keyed.into_iter().map(|(_, c)| c).collect())
    }

    /// Newest first, at most `limit` (0 = all).
    pub fn recent_contexts(&self, limit: usize) -> Result<Vec<&Context>, CoreError> {
        let mut timeline = self.commit_timeline()?;
        timeline.reverse();
        if limit > 0 {
            timeline.truncate(limit);
        }
        Ok(timeline)
    }

    pub fn records(&self) -> Result<Vec<CommitContextRecord>, CoreError> {
        validate_records(&self.contexts)
    }

    pub fn graph(&self, cfg: &LayoutConfig) -> Result<GraphDescription, CoreError> {
        Ok(layout(&self.records()?, cfg))
    }

    pub fn stats(&self) -> Result<Stats, CoreError> {
        let graph = self.graph(&LayoutConfig::default())?;
        Ok(Stats {
            total_contexts: graph.secondary_nodes.len(),
            total_commits: graph.primary_nodes.len(),
            repositories: self.repositories.len(),
            team_members: self.team_members.len(),
            total_messages: self
                .contexts
                .iter()
                .map(|c| u64::from(c.total_messages))
                .sum(),
            sessions: graph.sessions.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conversation_filters_partition_contexts() {
        let ds = Dataset::demo();
        assert_eq!(ds.contexts_with_conversation().len(), 6);
        assert_eq!(ds.contexts_without_conversation().len(), 1);
    }

    #[test]
    fn lookup_by_sha_and_prefix() {
        let ds = Dataset::demo();
        let full = "abc123def456789012345678901234567890ab01";
        assert_eq!(ds.context_by_commit_sha(full).unwrap().session_id, "ctx-setup-001");
        assert_eq!(ds.context_by_commit_sha("abc123").unwrap().commit_sha, full);
        assert!(ds.context_by_commit_sha("abc").is_none());
        assert!(ds.context_by_commit_sha("ffff").is_none());
    }

    #[test]
    fn ambiguous_prefix_is_none() {
        let mut ds = Dataset::demo();
        let mut twin = ds.contexts[0].clone();
        twin.commit_sha = "abc123ffff".into();
        ds.contexts.push(twin);
        assert!(ds.context_by_commit_sha("abc123").is_none());
    }

    #[test]
    fn lookup_by_session_author_repo_user() {
        let ds = Dataset::demo();
        assert_eq!(
            ds.context_by_session_id("ctx-docs-007").unwrap().total_messages,
            0
        );
        assert_eq!(ds.contexts_by_author("teammate1@example.com").len(), 1);
        assert_eq!(
            ds.contexts_by_repository("880fb700-h59e-74g7-d049-779988773001")
                .len(),
            7
        );
        let alice = ds.user_by_email("teammate1@example.com").unwrap();
        assert_eq!(alice.display_name.as_deref(), Some("Alice Chen"));
        assert_eq!(ds.user_by_id(&alice.id).unwrap().email, alice.email);
        assert_eq!(ds.team_members("660f9500-f39c-52e5-b827-557766551001").len(), 3);
    }

    #[test]
    fn timeline_is_chronological_and_recent_is_reversed() {
        let mut ds = Dataset::demo();
        ds.contexts.reverse();
        let timeline = ds.commit_timeline().unwrap();
        assert_eq!(timeline[0].session_id, "ctx-setup-001");
        assert_eq!(timeline[6].session_id, "ctx-docs-007");

        let recent = ds.recent_contexts(2).unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].session_id, "ctx-docs-007");
        assert_eq!(recent[1].session_id, "ctx-tests-006");
        assert_eq!(ds.recent_contexts(0).unwrap().len(), 7);
    }

    #[test]
    fn bad_timestamp_surfaces_from_timeline() {
        let mut ds = Dataset::demo();
        ds.contexts[2].created_at = "not a date".into();
        assert!(matches!(
            ds.commit_timeline(),
            Err(CoreError::InvalidTimestamp { .. })
        ));
        assert!(ds.graph(&LayoutConfig::default()).is_err());
    }

    #[test]
    fn demo_stats() {
        let stats = Dataset::demo().stats().unwrap();
        assert_eq!(
            stats,
            Stats {
                total_contexts: 6,
                total_commits: 7,
                repositories: 1,
                team_members: 3,
                total_messages: 37,
                sessions: 3,
            }
        );
    }

    #[test]
    fn demo_graph_connectors() {
        use cctx_graph::ConnectorKind::{Branch, Continuation, Merge};

        let g = Dataset::demo().graph(&LayoutConfig::default()).unwrap();
        let got: Vec<_> = g
            .connectors
            .iter()
            .map(|c| (c.kind, c.from_y, c.to_y))
            .collect();
        assert_eq!(
            got,
            vec![
                (Branch, 40.0, 40.0),
                (Continuation, 40.0, 120.0),
                (Continuation, 120.0, 200.0),
                (Merge, 200.0, 200.0),
                (Branch, 280.0, 280.0),
                (Continuation, 280.0, 360.0),
                (Merge, 360.0, 360.0),
                (Branch, 440.0, 440.0),
                (Merge, 440.0, 440.0),
            ]
        );
    }
}
