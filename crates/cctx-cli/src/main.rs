mod cmd_capture;
mod cmd_config;
mod cmd_graph;
mod cmd_import;
mod cmd_init;
mod cmd_list;
mod cmd_serve;
mod cmd_show;
mod cmd_stats;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "cctx",
    version,
    about = "Browse Git commits alongside captured Claude conversations"
)]
struct Cli {
    /// Verbose logging (overrides CCTX_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Initialize a .cctx/ workspace (seeded with the demo dataset)
    Init {
        /// Start with an empty dataset instead of the demo data
        #[arg(long)]
        empty: bool,
    },
    /// List recent contexts, newest first
    List {
        /// Maximum number of contexts to show (0 = unlimited)
        #[arg(long, default_value_t = 20)]
        limit: usize,
        /// Filter by author email
        #[arg(long)]
        author: Option<String>,
        /// Include commits without a conversation
        #[arg(long)]
        all: bool,
        /// Output as JSON lines (one context per line)
        #[arg(long)]
        json: bool,
    },
    /// Show one context by commit sha (or prefix) or session id
    Show {
        /// Commit sha, sha prefix, or session id
        id: String,
        /// Print the conversation transcript
        #[arg(long)]
        messages: bool,
    },
    /// Render the commit/conversation graph
    Graph {
        /// Output the layout as JSON
        #[arg(long, conflicts_with = "svg")]
        json: bool,
        /// Output an SVG document
        #[arg(long)]
        svg: bool,
        /// Write to a file instead of stdout
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// Snapshot Claude sessions for a commit (run from a post-commit hook)
    Capture {
        /// Commit sha (defaults to HEAD)
        #[arg(long)]
        commit: Option<String>,
        /// Parent commit sha (defaults to HEAD^)
        #[arg(long)]
        parent: Option<String>,
        /// Author email (defaults to git user.email)
        #[arg(long)]
        author: Option<String>,
    },
    /// Import captured snapshots into the dataset
    Import {
        /// Repository id to attach contexts to (defaults to the first repository)
        #[arg(long)]
        repository: Option<String>,
        /// User id recorded as creator (defaults to the first user)
        #[arg(long)]
        created_by: Option<String>,
    },
    /// Start the HTTP API server
    Serve {
        /// Bind address (defaults to serve.bind config)
        #[arg(long)]
        bind: Option<String>,
        /// Port (defaults to serve.port config)
        #[arg(long)]
        port: Option<u16>,
    },
    /// Dashboard totals
    Stats {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Get or set config values
    Config {
        #[command(subcommand)]
        cmd: cmd_config::ConfigCmd,
    },
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env("CCTX_LOG").unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let cwd = std::env::current_dir()?;
    let repo_root = cctx_store::CctxPaths::find_root(&cwd).unwrap_or(cwd);

    match cli.cmd {
        Command::Init { empty } => cmd_init::execute(&repo_root, empty),
        Command::List {
            limit,
            author,
            all,
            json,
        } => cmd_list::execute(&cmd_list::ListParams {
            repo_root: &repo_root,
            limit,
            author: author.as_deref(),
            all,
            json,
        }),
        Command::Show { id, messages } => cmd_show::execute(&repo_root, &id, messages),
        Command::Graph { json, svg, out } => {
            let format = if json {
                cmd_graph::Format::Json
            } else if svg {
                cmd_graph::Format::Svg
            } else {
                cmd_graph::Format::Text
            };
            cmd_graph::execute(&repo_root, format, out.as_deref())
        }
        Command::Capture {
            commit,
            parent,
            author,
        } => cmd_capture::execute(&repo_root, commit, parent, author),
        Command::Import {
            repository,
            created_by,
        } => cmd_import::execute(&repo_root, repository.as_deref(), created_by.as_deref()),
        Command::Serve { bind, port } => cmd_serve::execute(&repo_root, bind, port),
        Command::Stats { json } => cmd_stats::execute(&repo_root, json),
        Command::Config { cmd } => cmd_config::run(cmd, &repo_root),
    }
}
