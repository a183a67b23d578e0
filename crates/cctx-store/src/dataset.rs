use anyhow::Context as _;
use serde::{Deserialize, Serialize};

use cctx_core::{Context, Repository, Team, TeamMember, User};

use crate::paths::CctxPaths;

const DEMO_JSON: &str = include_str!("../data/demo.json");

/// Everything the dashboard reads, kept as one JSON document in `.cctx/dataset.json`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Dataset {
    #[serde(default)]
    pub users: Vec<User>,
    #[serde(default)]
    pub teams: Vec<Team>,
    #[serde(default)]
    pub team_members: Vec<TeamMember>,
    #[serde(default)]
    pub repositories: Vec<Repository>,
    #[serde(default)]
    pub contexts: Vec<Context>,
}

impl Dataset {
    /// The sample team, repository and seven commits shipped with `cctx init`.
    pub fn demo() -> Self {
        serde_json::from_str(DEMO_JSON).expect("embedded demo dataset should parse")
    }

    pub fn load(paths: &CctxPaths) -> anyhow::Result<Self> {
        if !paths.dataset_json.exists() {
            anyhow::bail!(
                "no dataset at {} (run `cctx init` first)",
                paths.dataset_json.display()
            );
        }
        let content = std::fs::read_to_string(&paths.dataset_json)?;
        let ds: Dataset = serde_json::from_str(&content)
            .with_context(|| format!("parsing {}", paths.dataset_json.display()))?;
        tracing::debug!(contexts = ds.contexts.len(), "loaded dataset");
        Ok(ds)
    }

    pub fn save(&self, paths: &CctxPaths) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        crate::write_atomic(&paths.dataset_json, json.as_bytes())
    }

    /// Insert or replace the context for `ctx.commit_sha`. Returns true if it replaced one.
    pub fn upsert_context(&mut self, ctx: Context) -> bool {
        match self
            .contexts
            .iter_mut()
            .find(|c| c.commit_sha == ctx.commit_sha)
        {
            Some(existing) => {
                *existing = ctx;
                true
            }
            None => {
                self.contexts.push(ctx);
                false
            }
        }
    }
}
