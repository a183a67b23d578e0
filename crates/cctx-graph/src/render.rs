use std::fmt::Write;

use crate::layout::{ConnectorKind, GraphDescription, LayoutConfig};

const GIT_STROKE: &str = "#3b82f6";
const GIT_NODE_STROKE: &str = "#2563eb";
const GIT_LABEL: &str = "#1e40af";
const CLAUDE_STROKE: &str = "#f97316";
const CLAUDE_NODE_STROKE: &str = "#ea580c";
const CLAUDE_LABEL: &str = "#9a3412";

fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(ch),
        }
    }
    out
}

fn lane_label(svg: &mut String, x: f64, width: f64, text: &str, fill: &str, stroke: &str) {
    let _ = writeln!(
        svg,
        r#"  <rect x="{}" y="10" width="{width}" height="24" rx="12" fill="{fill}" stroke="{stroke}" stroke-width="2"/>"#,
        x - width / 2.0
    );
    let _ = writeln!(
        svg,
        r#"  <text x="{x}" y="25" text-anchor="middle" fill="{stroke}" font-size="12" font-weight="bold">{text}</text>"#
    );
}

/// Render a standalone SVG document.
pub fn render_svg(graph: &GraphDescription, cfg: &LayoutConfig) -> String {
    let width = if graph.width > 0.0 {
        graph.width
    } else {
        cfg.claude_x + 200.0
    };
    let height = if graph.height > 0.0 {
        graph.height
    } else {
        cfg.padding_top + cfg.padding_bottom
    };

    let mut svg = String::new();
    let _ = writeln!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{width}" height="{height}" viewBox="0 0 {width} {height}">"#
    );

    // Commit timeline
    let _ = writeln!(
        svg,
        r#"  <line x1="{x}" y1="{y1}" x2="{x}" y2="{y2}" stroke="{GIT_STROKE}" stroke-width="3"/>"#,
        x = cfg.git_x,
        y1 = cfg.padding_top,
        y2 = height - cfg.padding_bottom,
    );
    lane_label(&mut svg, cfg.git_x, 70.0, "main", "#dbeafe", GIT_NODE_STROKE);
    lane_label(&mut svg, cfg.claude_x, 80.0, "claude", "#ffedd5", CLAUDE_STROKE);

    for c in &graph.connectors {
        let d = c.path(cfg);
        match c.kind {
            ConnectorKind::Continuation => {
                let _ = writeln!(
                    svg,
                    r#"  <path d="{d}" fill="none" stroke="{CLAUDE_STROKE}" stroke-width="3"/>"#
                );
            }
            ConnectorKind::Branch | ConnectorKind::Merge => {
                let _ = writeln!(
                    svg,
                    r#"  <path d="{d}" fill="none" stroke="{CLAUDE_STROKE}" stroke-width="3" opacity="0.8"/>"#
                );
            }
        }
    }

    let r = cfg.node_radius;
    for n in &graph.primary_nodes {
        let _ = writeln!(
            svg,
            r#"  <circle cx="{}" cy="{}" r="{r}" fill="{GIT_STROKE}" stroke="{GIT_NODE_STROKE}" stroke-width="2" data-record="{}"/>"#,
            n.x,
            n.y,
            escape_xml(&n.record_id)
        );
        let _ = writeln!(
            svg,
            r#"  <text x="{}" y="{}" fill="{GIT_LABEL}" font-size="14" font-family="monospace">{}</text>"#,
            n.x + r + 10.0,
            n.y + 4.0,
            escape_xml(&n.label)
        );
    }
    for n in &graph.secondary_nodes {
        let _ = writeln!(
            svg,
            r#"  <circle cx="{}" cy="{}" r="{r}" fill="{CLAUDE_STROKE}" stroke="{CLAUDE_NODE_STROKE}" stroke-width="2" data-record="{}"/>"#,
            n.x,
            n.y,
            escape_xml(&n.record_id)
        );
        let _ = writeln!(
            svg,
            r#"  <text x="{}" y="{}" fill="{CLAUDE_LABEL}" font-size="14" font-weight="bold">{} messages</text>"#,
            n.x + r + 10.0,
            n.y + 4.0,
            n.total_messages
        );
    }

    svg.push_str("</svg>\n");
    svg
}

/// Plain-text rendering for terminals, one row per commit:
///
/// ```text
/// ●  abc123d  -->  ● 10 messages
/// ●  def456a  <--  ● 8 messages
/// ●  901234d
/// ```
pub fn render_text(graph: &GraphDescription) -> String {
    let mut out = String::new();
    for n in &graph.primary_nodes {
        let branch = graph
            .connectors
            .iter()
            .any(|c| c.kind == ConnectorKind::Branch && c.to_y == n.y);
        let merge = graph
            .connectors
            .iter()
            .any(|c| c.kind == ConnectorKind::Merge && c.to_y == n.y);
        let link = match (merge, branch) {
            (true, true) => "<->",
            (false, true) => "-->",
            (true, false) => "<--",
            (false, false) => "   ",
        };

        let lane = match graph.secondary_nodes.iter().find(|s| s.y == n.y) {
            Some(s) => format!("● {} messages", s.total_messages),
            None if graph
                .sessions
                .iter()
                .any(|s| s.start_y < n.y && n.y < s.end_y) =>
            {
                "│".to_string()
            }
            None => String::new(),
        };

        let line = format!("●  {:<8} {link}  {lane}", n.label);
        let _ = writeln!(out, "{}", line.trim_end());
    }
    out
}
