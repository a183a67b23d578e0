use std::path::Path;

use cctx_graph::{render_svg, render_text};
use cctx_store::{CctxConfig, CctxPaths, Dataset};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Text,
    Json,
    Svg,
}

pub fn execute(repo_root: &Path, format: Format, out: Option<&Path>) -> anyhow::Result<()> {
    let paths = CctxPaths::discover(repo_root);
    let ds = Dataset::load(&paths)?;
    let cfg = CctxConfig::load(&paths)?;
    let rendered = render(&ds, &cfg, format)?;

    match out {
        Some(path) => {
            std::fs::write(path, &rendered)?;
            println!("Wrote {}", path.display());
        }
        None => print!("{rendered}"),
    }
    Ok(())
}

fn render(ds: &Dataset, cfg: &CctxConfig, format: Format) -> anyhow::Result<String> {
    let graph = ds.graph(&cfg.layout)?;
    tracing::debug!(
        commits = graph.primary_nodes.len(),
        connectors = graph.connectors.len(),
        "laid out graph"
    );
    Ok(match format {
        Format::Text if graph.is_empty() => "(no commits)\n".to_string(),
        Format::Text => render_text(&graph),
        Format::Json => {
            let mut s = serde_json::to_string_pretty(&graph)?;
            s.push('\n');
            s
        }
        Format::Svg => render_svg(&graph, &cfg.layout),
    })
}
