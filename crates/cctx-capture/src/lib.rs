//! Capture Claude Code session transcripts at commit time and turn the
//! resulting snapshots into dashboard contexts.
//!
//! Layout on disk:
//! ```text
//! .cc-snapshots/
//!   index.json                  commit sha -> summary
//!   <sha>/metadata.json         SnapshotMetadata
//!   <sha>/context.jsonl         all sessions merged into one chain
//!   <sha>/<session_id>.jsonl    transcript copy at capture time
//! .cctx/state.json              last capture and per-session history
//! ```

pub mod capture;
pub mod continuity;
pub mod import;
pub mod merge;
pub mod metadata;
pub mod session;
pub mod state;

pub use capture::{capture, git_commit_time, git_head, git_is_merge, git_parent, CaptureOptions};
pub use continuity::{analyze_continuity, SessionContinuity};
pub use import::import_snapshots;
pub use merge::{merge_sessions, merge_transcripts, message_stats, MessageStats, CONTEXT_FILE};
pub use metadata::{SessionEntry, SnapshotIndex, SnapshotMetadata};
pub use session::{claude_project_dir, discover_sessions, encode_project_path, SessionInfo};
pub use state::{load_state, update_local_state, LocalState};
