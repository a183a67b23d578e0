use std::path::Path;

use cctx_store::query::Stats;
use cctx_store::{CctxPaths, Dataset};

pub fn execute(repo_root: &Path, json: bool) -> anyhow::Result<()> {
    let ds = Dataset::load(&CctxPaths::discover(repo_root))?;
    let stats = ds.stats()?;
    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
    } else {
        print!("{}", format_stats(&stats));
    }
    Ok(())
}

fn format_stats(s: &Stats) -> String {
    format!(
        "Contexts:      {}\n\
         Commits:       {}\n\
         Sessions:      {}\n\
         Messages:      {}\n\
         Repositories:  {}\n\
         Team members:  {}\n",
        s.total_contexts,
        s.total_commits,
        s.sessions,
        s.total_messages,
        s.repositories,
        s.team_members
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_stats_text() {
        let text = format_stats(&Dataset::demo().stats().unwrap());
        assert!(text.starts_with("Contexts:      6\n"));
        assert!(text.contains("Commits:       7\n"));
        assert!(text.contains("Messages:      37\n"));
    }
}
