//! Two-track timeline graph: commits on the primary ("git") track,
//! conversation sessions on the secondary ("claude") track.

pub mod hit;
pub mod layout;
pub mod render;

pub use hit::{hit_test, NodeHit, Track};
pub use layout::{
    layout, layout_default, Connector, ConnectorKind, GraphDescription, LayoutConfig,
    PrimaryNode, SecondaryNode, SessionSpan,
};
pub use render::{render_svg, render_text};
