use std::path::Path;

use cctx_core::ts::short_ts;
use cctx_core::Context;
use cctx_store::{CctxPaths, Dataset};

pub struct ListParams<'a> {
    pub repo_root: &'a Path,
    pub limit: usize,
    pub author: Option<&'a str>,
    pub all: bool,
    pub json: bool,
}

pub fn execute(params: &ListParams<'_>) -> anyhow::Result<()> {
    let ds = Dataset::load(&CctxPaths::discover(params.repo_root))?;
    let matched = select(&ds, params)?;

    if matched.is_empty() {
        println!("No contexts match the filter.");
        return Ok(());
    }

    if params.json {
        for c in &matched {
            println!("{}", serde_json::to_string(c)?);
        }
    } else {
        for c in &matched {
            println!("{}", format_line(c, &ds));
        }
        println!("\n({} contexts shown)", matched.len());
    }
    Ok(())
}

fn select<'a>(ds: &'a Dataset, params: &ListParams<'_>) -> anyhow::Result<Vec<&'a Context>> {
    let mut matched: Vec<&Context> = ds
        .recent_contexts(0)?
        .into_iter()
        .filter(|c| params.all || c.has_context())
        .filter(|c| params.author.is_none_or(|a| c.author_email == a))
        .collect();
    if params.limit > 0 {
        matched.truncate(params.limit);
    }
    Ok(matched)
}

fn format_line(c: &Context, ds: &Dataset) -> String {
    // Format: [2025-01-18 16:10] 678901a  my-awesome-app  you@example.com  4 msgs (new session)
    let repo = ds
        .repository_by_id(&c.repository_id)
        .map(|r| r.name.as_str())
        .unwrap_or("-");
    let conversation = if !c.has_context() {
        "no conversation".to_string()
    } else if c.new_session {
        format!("{} msgs (new session)", c.total_messages)
    } else {
        format!("{} msgs", c.total_messages)
    };
    format!(
        "[{}] {}  {}  {}  {}",
        short_ts(&c.created_at),
        c.short_sha(),
        repo,
        c.author_email,
        conversation
    )
}
