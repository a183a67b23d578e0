use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::ts::parse_ts;
use crate::CoreError;

/// Length of the abbreviated commit sha shown in listings and graph labels.
pub const SHORT_SHA_LEN: usize = 7;

pub fn short_sha(sha: &str) -> &str {
    match sha.char_indices().nth(SHORT_SHA_LEN) {
        Some((idx, _)) => &sha[..idx],
        None => sha,
    }
}

// ── Context ──

/// One commit plus the conversation captured at that commit, as stored.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Context {
    pub session_id: String,
    pub repository_id: String,
    pub commit_sha: String,
    #[serde(default)]
    pub parent_commit_sha: Option<String>,
    pub author_email: String,
    #[serde(default)]
    pub total_messages: u32,
    #[serde(default)]
    pub session_count: u32,
    #[serde(default)]
    pub new_messages_since_parent: Option<u32>,
    /// True if this starts a new conversation rather than continuing the previous one.
    #[serde(default)]
    pub new_session: bool,
    #[serde(default)]
    pub jsonl_data: String,
    pub created_by: String,
    pub created_at: String,
    pub updated_at: String,
}

impl Context {
    pub fn has_context(&self) -> bool {
        self.total_messages > 0
    }

    pub fn short_sha(&self) -> &str {
        short_sha(&self.commit_sha)
    }

    /// Two-letter avatar initials from the author's email local part.
    pub fn author_initials(&self) -> String {
        self.author_email
            .split('@')
            .next()
            .unwrap_or("")
            .chars()
            .take(2)
            .collect::<String>()
            .to_uppercase()
    }
}

// ── CommitContextRecord ──

/// Validated layout input. Built once at the input boundary; immutable afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitContextRecord {
    id: String,
    created_at: OffsetDateTime,
    author_email: String,
    total_messages: u32,
    is_new_session: bool,
}

impl CommitContextRecord {
    pub fn new(
        id: impl Into<String>,
        created_at: OffsetDateTime,
        author_email: impl Into<String>,
        total_messages: u32,
        is_new_session: bool,
    ) -> Self {
        Self {
            id: id.into(),
            created_at,
            author_email: author_email.into(),
            total_messages,
            is_new_session,
        }
    }

    /// Parse `created_at` as RFC3339 and build a record.
    pub fn parse(
        id: impl Into<String>,
        created_at: &str,
        author_email: impl Into<String>,
        total_messages: u32,
        is_new_session: bool,
    ) -> Result<Self, CoreError> {
        let id = id.into();
        let created_at = parse_ts(&id, created_at)?;
        Ok(Self::new(
            id,
            created_at,
            author_email,
            total_messages,
            is_new_session,
        ))
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn created_at(&self) -> OffsetDateTime {
        self.created_at
    }

    pub fn author_email(&self) -> &str {
        &self.author_email
    }

    pub fn total_messages(&self) -> u32 {
        self.total_messages
    }

    /// Meaningless when `total_messages == 0`; check [`has_context`](Self::has_context) first.
    pub fn is_new_session(&self) -> bool {
        self.is_new_session
    }

    pub fn has_context(&self) -> bool {
        self.total_messages > 0
    }
}

impl TryFrom<&Context> for CommitContextRecord {
    type Error = CoreError;

    fn try_from(ctx: &Context) -> Result<Self, Self::Error> {
        Self::parse(
            ctx.commit_sha.clone(),
            &ctx.created_at,
            ctx.author_email.clone(),
            ctx.total_messages,
            ctx.new_session,
        )
    }
}

/// Validate every context once. The first malformed record aborts the batch.
pub fn validate_records(contexts: &[Context]) -> Result<Vec<CommitContextRecord>, CoreError> {
    contexts.iter().map(CommitContextRecord::try_from).collect()
}

// ── Users, teams, repositories ──

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub display_name: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Team {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub created_by: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TeamRole {
    Owner,
    Admin,
    Member,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TeamMember {
    pub id: String,
    pub team_id: String,
    pub user_id: String,
    pub role: TeamRole,
    pub joined_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Repository {
    pub id: String,
    pub team_id: String,
    /// Remote path, e.g. `github.com/org/app`.
    pub path: String,
    pub name: String,
    pub created_by: String,
    pub created_at: String,
    pub updated_at: String,
}
