use serde::{Deserialize, Serialize};

use crate::layout::GraphDescription;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Track {
    Primary,
    Secondary,
}

/// A node under the pointer, mapped back to its originating record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeHit {
    pub record_id: String,
    pub track: Track,
}

fn within(nx: f64, ny: f64, x: f64, y: f64, radius: f64) -> bool {
    let (dx, dy) = (nx - x, ny - y);
    dx * dx + dy * dy <= radius * radius
}

/// Find the node at `(x, y)`. Conversation nodes win when both tracks overlap.
pub fn hit_test(graph: &GraphDescription, x: f64, y: f64, radius: f64) -> Option<NodeHit> {
    if let Some(n) = graph
        .secondary_nodes
        .iter()
        .find(|n| within(n.x, n.y, x, y, radius))
    {
        return Some(NodeHit {
            record_id: n.record_id.clone(),
            track: Track::Secondary,
        });
    }
    graph
        .primary_nodes
        .iter()
        .find(|n| within(n.x, n.y, x, y, radius))
        .map(|n| NodeHit {
            record_id: n.record_id.clone(),
            track: Track::Primary,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{layout, LayoutConfig};
    use cctx_core::CommitContextRecord;
    use time::macros::datetime;
    use time::Duration;

    fn graph() -> GraphDescription {
        let base = datetime!(2025-01-08 09:00 UTC);
        layout(
            &[
                CommitContextRecord::new("c1", base, "a@b.c", 3, true),
                CommitContextRecord::new("c2", base + Duration::hours(1), "a@b.c", 0, false),
            ],
            &LayoutConfig::default(),
        )
    }

    #[test]
    fn hits_primary_and_secondary() {
        let g = graph();
        assert_eq!(
            hit_test(&g, 102.0, 41.0, 8.0),
            Some(NodeHit {
                record_id: "c1".into(),
                track: Track::Primary
            })
        );
        assert_eq!(
            hit_test(&g, 350.0, 40.0, 8.0).map(|h| h.track),
            Some(Track::Secondary)
        );
        assert_eq!(
            hit_test(&g, 100.0, 120.0, 8.0).map(|h| h.record_id),
            Some("c2".to_string())
        );
    }

    #[test]
    fn misses_between_nodes() {
        let g = graph();
        assert_eq!(hit_test(&g, 225.0, 40.0, 8.0), None);
        assert_eq!(hit_test(&g, 100.0, 80.0, 8.0), None);
    }

    #[test]
    fn secondary_wins_on_overlap() {
        let cfg = LayoutConfig {
            claude_x: 104.0,
            ..LayoutConfig::default()
        };
        let t = datetime!(2025-01-08 09:00 UTC);
        let g = layout(&[CommitContextRecord::new("c1", t, "a@b.c", 1, true)], &cfg);
        assert_eq!(
            hit_test(&g, 102.0, 40.0, 8.0).map(|h| h.track),
            Some(Track::Secondary)
        );
    }
}
