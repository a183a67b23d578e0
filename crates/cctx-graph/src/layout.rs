use serde::{Deserialize, Serialize};

use cctx_core::{short_sha, CommitContextRecord};

// ── Config ──

/// Canvas geometry. Defaults match the dashboard's graph view.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayoutConfig {
    pub git_x: f64,
    pub claude_x: f64,
    pub spacing: f64,
    pub padding_top: f64,
    pub padding_bottom: f64,
    pub node_radius: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            git_x: 100.0,
            claude_x: 350.0,
            spacing: 80.0,
            padding_top: 40.0,
            padding_bottom: 40.0,
            node_radius: 8.0,
        }
    }
}

impl LayoutConfig {
    pub fn row_y(&self, index: usize) -> f64 {
        self.padding_top + index as f64 * self.spacing
    }

    fn mid_x(&self) -> f64 {
        (self.git_x + self.claude_x) / 2.0
    }
}

// ── Output ──

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrimaryNode {
    pub record_id: String,
    pub x: f64,
    pub y: f64,
    pub label: String,
    pub has_context: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SecondaryNode {
    pub record_id: String,
    pub x: f64,
    pub y: f64,
    pub total_messages: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectorKind {
    /// Primary → secondary: a conversation session starts.
    Branch,
    /// Secondary → secondary: the session carries on to a later commit.
    Continuation,
    /// Secondary → primary: the session rejoins the commit line.
    Merge,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Connector {
    pub kind: ConnectorKind,
    pub from_y: f64,
    pub to_y: f64,
}

impl Connector {
    /// SVG path data for this connector.
    pub fn path(&self, cfg: &LayoutConfig) -> String {
        let mid = cfg.mid_x();
        let (x1, x2) = match self.kind {
            ConnectorKind::Branch => (cfg.git_x, cfg.claude_x),
            ConnectorKind::Merge => (cfg.claude_x, cfg.git_x),
            ConnectorKind::Continuation => {
                return format!(
                    "M {x} {y1} L {x} {y2}",
                    x = cfg.claude_x,
                    y1 = self.from_y,
                    y2 = self.to_y
                );
            }
        };
        format!(
            "M {x1} {y1} C {mid} {y1}, {mid} {y2}, {x2} {y2}",
            y1 = self.from_y,
            y2 = self.to_y
        )
    }
}

/// The records making up one conversation session, in time order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSpan {
    pub record_ids: Vec<String>,
    pub start_y: f64,
    pub end_y: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphDescription {
    pub primary_nodes: Vec<PrimaryNode>,
    pub secondary_nodes: Vec<SecondaryNode>,
    pub connectors: Vec<Connector>,
    pub sessions: Vec<SessionSpan>,
    pub width: f64,
    pub height: f64,
}

impl GraphDescription {
    pub fn is_empty(&self) -> bool {
        self.primary_nodes.is_empty()
    }
}

// ── Layout pass ──

struct OpenSession {
    last_y: f64,
    span: SessionSpan,
}

/// Scratch state for one invocation of [`layout`].
struct LayoutPass<'a> {
    cfg: &'a LayoutConfig,
    out: GraphDescription,
    open: Option<OpenSession>,
}

impl<'a> LayoutPass<'a> {
    fn new(cfg: &'a LayoutConfig) -> Self {
        Self {
            cfg,
            out: GraphDescription::default(),
            open: None,
        }
    }

    fn emit(&mut self, kind: ConnectorKind, from_y: f64, to_y: f64) {
        self.out.connectors.push(Connector { kind, from_y, to_y });
    }

    /// Close the open session with a merge ending on row `to_y`.
    fn merge(&mut self, to_y: f64) {
        if let Some(open) = self.open.take() {
            self.emit(ConnectorKind::Merge, open.last_y, to_y);
            self.out.sessions.push(open.span);
        }
    }

    /// Place row `index`. `next` is the following record in time order, used
    /// to close a session on its last conversation row.
    fn step(
        &mut self,
        index: usize,
        record: &CommitContextRecord,
        next: Option<&CommitContextRecord>,
    ) {
        let y = self.cfg.row_y(index);
        self.out.primary_nodes.push(PrimaryNode {
            record_id: record.id().to_string(),
            x: self.cfg.git_x,
            y,
            label: short_sha(record.id()).to_string(),
            has_context: record.has_context(),
        });

        if !record.has_context() {
            return;
        }

        self.out.secondary_nodes.push(SecondaryNode {
            record_id: record.id().to_string(),
            x: self.cfg.claude_x,
            y,
            total_messages: record.total_messages(),
        });

        // A continuation with nothing to continue opens a session of its own.
        let should_branch = record.is_new_session() || self.open.is_none();
        let next_opens_session = next.is_some_and(|n| n.has_context() && n.is_new_session());
        let should_merge = self.open.is_some() && (next.is_none() || next_opens_session);

        if should_branch {
            // The previous session rejoins the commit line on this row.
            self.merge(y);
            self.emit(ConnectorKind::Branch, y, y);
            self.open = Some(OpenSession {
                last_y: y,
                span: SessionSpan {
                    record_ids: vec![record.id().to_string()],
                    start_y: y,
                    end_y: y,
                },
            });
            return;
        }

        if let Some(mut open) = self.open.take() {
            self.emit(ConnectorKind::Continuation, open.last_y, y);
            open.last_y = y;
            open.span.end_y = y;
            open.span.record_ids.push(record.id().to_string());
            self.open = Some(open);
        }
        if should_merge {
            self.merge(y);
        }
    }

    fn finish(mut self, rows: usize) -> GraphDescription {
        if let Some(last_y) = self.open.as_ref().map(|o| o.last_y) {
            self.merge(last_y);
        }
        if rows > 0 {
            self.out.width = self.cfg.claude_x + 200.0;
            self.out.height =
                rows as f64 * self.cfg.spacing + self.cfg.padding_top + self.cfg.padding_bottom;
        }
        self.out
    }
}

/// Lay out `records` on the two tracks.
///
/// Records are sorted by `created_at` first (stable, so ties keep input
/// order). Each session is drawn as one branch, zero or more continuations
/// and one merge. A continuation that is last, or directly followed by a
/// record starting a new session, merges back on its own row. Any session
/// still open when a new one branches merges into the branching row, and
/// one still open at the end of the stream merges in place.
pub fn layout(records: &[CommitContextRecord], cfg: &LayoutConfig) -> GraphDescription {
    let mut sorted: Vec<&CommitContextRecord> = records.iter().collect();
    sorted.sort_by_key(|r| r.created_at());

    let mut pass = LayoutPass::new(cfg);
    for (i, record) in sorted.iter().enumerate() {
        pass.step(i, record, sorted.get(i + 1).copied());
    }
    let graph = pass.finish(sorted.len());

    tracing::debug!(
        commits = graph.primary_nodes.len(),
        contexts = graph.secondary_nodes.len(),
        sessions = graph.sessions.len(),
        "laid out timeline"
    );
    graph
}

pub fn layout_default(records: &[CommitContextRecord]) -> GraphDescription {
    layout(records, &LayoutConfig::default())
}
