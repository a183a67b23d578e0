//! Conversation transcripts stored as JSONL, one message per line.
//!
//! Two line shapes are accepted:
//! ```json
//! {"type":"user","content":"...","timestamp":"...","uuid":"...","parentUuid":null}
//! {"type":"assistant","message":{"content":[{"type":"text","text":"..."}]},"timestamp":"..."}
//! ```
//! The first is the captured-context format, the second is what Claude Code
//! writes into its session files.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::CoreError;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Message {
    #[serde(rename = "type")]
    pub kind: String,
    pub content: String,
    pub timestamp: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,
    #[serde(
        rename = "parentUuid",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub parent_uuid: Option<String>,
}

impl Message {
    pub fn is_conversational(&self) -> bool {
        self.kind == "user" || self.kind == "assistant"
    }
}

/// Why a transcript failed [`validate_messages`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranscriptIssue {
    DuplicateUuid(String),
    NonMonotonicTimestamp { index: usize },
}

impl std::fmt::Display for TranscriptIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DuplicateUuid(u) => write!(f, "duplicate uuid: {u}"),
            Self::NonMonotonicTimestamp { index } => {
                write!(f, "timestamp at message {index} goes backwards")
            }
        }
    }
}

// ── Parsing ──

fn str_field<'a>(v: &'a serde_json::Value, key: &str) -> Option<&'a str> {
    v.get(key).and_then(|x| x.as_str())
}

/// Flatten string content or an array of `{"type":"text","text":...}` blocks.
fn content_text(v: &serde_json::Value) -> Option<String> {
    if let Some(s) = v.as_str() {
        return Some(s.to_string());
    }
    let blocks = v.as_array()?;
    let texts: Vec<&str> = blocks
        .iter()
        .filter(|b| str_field(b, "type") == Some("text"))
        .filter_map(|b| str_field(b, "text"))
        .collect();
    Some(texts.join("\n"))
}

fn message_from_value(v: &serde_json::Value, line_num: usize) -> Message {
    let content = v
        .get("content")
        .and_then(content_text)
        .or_else(|| {
            v.get("message")
                .and_then(|m| m.get("content"))
                .and_then(content_text)
        })
        .unwrap_or_default();

    Message {
        kind: str_field(v, "type").unwrap_or("unknown").to_string(),
        content,
        timestamp: str_field(v, "timestamp").unwrap_or("").to_string(),
        uuid: Some(
            str_field(v, "uuid")
                .map(str::to_string)
                .unwrap_or_else(|| format!("missing-{line_num}")),
        ),
        parent_uuid: str_field(v, "parentUuid").map(str::to_string),
    }
}

fn parse_line(line: &str, line_num: usize) -> Result<Message, CoreError> {
    let v: serde_json::Value =
        serde_json::from_str(line).map_err(|e| CoreError::MalformedTranscript {
            line: line_num,
            reason: e.to_string(),
        })?;
    if !v.is_object() {
        return Err(CoreError::MalformedTranscript {
            line: line_num,
            reason: "not a JSON object".into(),
        });
    }
    Ok(message_from_value(&v, line_num))
}

/// Lenient parse: blank lines are ignored, corrupted lines skipped with a warning.
pub fn parse_jsonl(data: &str) -> Vec<Message> {
    let mut out = Vec::new();
    for (idx, line) in data.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match parse_line(line, idx + 1) {
            Ok(m) => out.push(m),
            Err(e) => tracing::warn!("skipping transcript line: {e}"),
        }
    }
    out
}

/// Number of user/assistant messages in a transcript.
pub fn count_messages(data: &str) -> u32 {
    let n = parse_jsonl(data)
        .iter()
        .filter(|m| m.is_conversational())
        .count();
    u32::try_from(n).unwrap_or(u32::MAX)
}

/// Check uuids are unique and timestamps never go backwards.
pub fn validate_messages(messages: &[Message]) -> Result<(), TranscriptIssue> {
    let mut seen: HashSet<&str> = HashSet::new();
    for m in messages {
        if let Some(u) = m.uuid.as_deref() {
            if !seen.insert(u) {
                return Err(TranscriptIssue::DuplicateUuid(u.to_string()));
            }
        }
    }
    for (i, pair) in messages.windows(2).enumerate() {
        if pair[1].timestamp < pair[0].timestamp {
            return Err(TranscriptIssue::NonMonotonicTimestamp { index: i + 1 });
        }
    }
    Ok(())
}

pub fn messages_to_jsonl(messages: &[Message]) -> Result<String, CoreError> {
    let lines = messages
        .iter()
        .map(serde_json::to_string)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(lines.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{"type":"user","content":"Now I need JWT auth.","timestamp":"2025-01-10T14:30:00Z"}
{"type":"assistant","content":"Let's use jsonwebtoken.","timestamp":"2025-01-10T14:30:15Z"}"#;

    #[test]
    fn empty_and_blank_input_yield_nothing() {
        assert!(parse_jsonl("").is_empty());
        assert!(parse_jsonl("   \n\n  ").is_empty());
    }

    #[test]
    fn parses_captured_format() {
        let msgs = parse_jsonl(SAMPLE);
        assert_eq!(msgs.len(), 2);
        assert_eq!(msgs[0].kind, "user");
        assert_eq!(msgs[1].content, "Let's use jsonwebtoken.");
        assert_eq!(msgs[0].uuid.as_deref(), Some("missing-1"));
    }

    #[test]
    fn parses_claude_block_format() {
        let line = r#"{"type":"assistant","uuid":"u1","message":{"content":[{"type":"text","text":"a"},{"type":"tool_use","id":"t"},{"type":"text","text":"b"}]}}"#;
        let msgs = parse_jsonl(line);
        assert_eq!(msgs[0].content, "a\nb");
        assert_eq!(msgs[0].uuid.as_deref(), Some("u1"));
    }

    #[test]
    fn lenient_skips_corrupted_lines() {
        let data = format!("{SAMPLE}\nnot json\n[1,2]");
        assert_eq!(parse_jsonl(&data).len(), 2);
    }

    #[test]
    fn corrupted_line_reports_line_number() {
        match parse_line("not json", 4).unwrap_err() {
            CoreError::MalformedTranscript { line, .. } => assert_eq!(line, 4),
            other => panic!("unexpected error: {other}"),
        }
        assert!(matches!(
            parse_line("[1,2]", 2),
            Err(CoreError::MalformedTranscript { line: 2, .. })
        ));
    }

    #[test]
    fn missing_type_defaults_to_unknown() {
        let msgs = parse_jsonl(r#"{"content":"x"}"#);
        assert_eq!(msgs[0].kind, "unknown");
        assert_eq!(count_messages(r#"{"content":"x"}"#), 0);
    }

    #[test]
    fn count_only_user_and_assistant() {
        let data = format!("{SAMPLE}\n{{\"type\":\"summary\",\"content\":\"s\"}}");
        assert_eq!(count_messages(&data), 2);
    }

    #[test]
    fn validate_flags_duplicates_and_time_travel() {
        let mut msgs = parse_jsonl(SAMPLE);
        assert!(validate_messages(&msgs).is_ok());

        msgs[1].uuid = msgs[0].uuid.clone();
        assert_eq!(
            validate_messages(&msgs),
            Err(TranscriptIssue::DuplicateUuid("missing-1".into()))
        );

        msgs[1].uuid = Some("other".into());
        msgs[1].timestamp = "2025-01-01T00:00:00Z".into();
        assert_eq!(
            validate_messages(&msgs),
            Err(TranscriptIssue::NonMonotonicTimestamp { index: 1 })
        );
    }

    #[test]
    fn jsonl_output_uses_camel_case_parent() {
        let msgs = vec![Message {
            kind: "user".into(),
            content: "hi".into(),
            timestamp: "t".into(),
            uuid: Some("u2".into()),
            parent_uuid: Some("u1".into()),
        }];
        let out = messages_to_jsonl(&msgs).unwrap();
        assert!(out.contains("\"parentUuid\":\"u1\""));
        assert_eq!(parse_jsonl(&out), msgs);
    }
}
