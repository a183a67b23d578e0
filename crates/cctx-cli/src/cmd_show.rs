use std::path::Path;

use cctx_core::transcript::{parse_jsonl, validate_messages};
use cctx_core::Context;
use cctx_store::{CctxPaths, Dataset};

pub fn execute(repo_root: &Path, id: &str, messages: bool) -> anyhow::Result<()> {
    let ds = Dataset::load(&CctxPaths::discover(repo_root))?;
    let Some(ctx) = find(&ds, id) else {
        anyhow::bail!("no context matches '{id}'");
    };
    print!("{}", describe(ctx, &ds));

    if messages {
        let msgs = parse_jsonl(&ctx.jsonl_data);
        if let Err(issue) = validate_messages(&msgs) {
            tracing::warn!(%issue, session = %ctx.session_id, "transcript looks inconsistent");
        }
        if msgs.is_empty() {
            println!("\n(no conversation)");
        }
        for m in &msgs {
            println!("\n[{}] {}:", m.timestamp, m.kind);
            for line in m.content.lines() {
                println!("  {line}");
            }
        }
    }
    Ok(())
}

/// Session id first, then commit sha (exact or unique prefix).
fn find<'a>(ds: &'a Dataset, id: &str) -> Option<&'a Context> {
    ds.context_by_session_id(id)
        .or_else(|| ds.context_by_commit_sha(id))
}

fn describe(ctx: &Context, ds: &Dataset) -> String {
    let repo = ds
        .repository_by_id(&ctx.repository_id)
        .map(|r| r.path.as_str())
        .unwrap_or(ctx.repository_id.as_str());
    let author = match ds
        .user_by_email(&ctx.author_email)
        .and_then(|u| u.display_name.as_deref())
    {
        Some(name) => format!("{name} <{}>", ctx.author_email),
        None => ctx.author_email.clone(),
    };
    let mut out = String::new();
    out.push_str(&format!("commit   {}\n", ctx.commit_sha));
    if let Some(parent) = &ctx.parent_commit_sha {
        out.push_str(&format!("parent   {parent}\n"));
    }
    out.push_str(&format!("session  {}\n", ctx.session_id));
    out.push_str(&format!("repo     {repo}\n"));
    out.push_str(&format!("author   {author} ({})\n", ctx.author_initials()));
    out.push_str(&format!("date     {}\n", ctx.created_at));
    if ctx.has_context() {
        let kind = if ctx.new_session {
            "new session"
        } else {
            "continued"
        };
        out.push_str(&format!(
            "messages {} across {} session(s), {kind}\n",
            ctx.total_messages, ctx.session_count
        ));
        if let Some(n) = ctx.new_messages_since_parent {
            out.push_str(&format!("new      {n} since parent\n"));
        }
    } else {
        out.push_str("messages none\n");
    }
    out
}
