//! grprune — cut a Graphviz digraph down to the neighbourhood of one node.
//!
//! Reads a digraph (file or stdin), keeps what lies within `--depth` hops of
//! `--root` in the chosen direction, and writes the result as DOT.

use std::fs::File;
use std::io::{self, BufReader, Cursor, Read};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use grvutils::{dot, export};
use grvutils::model::{EdgePolicy, Graph};
use grvutils::prune::{self, Mode, PruneOptions, DEFAULT_DEPTH};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Input file [default: stdin]
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Output file, created or truncated [default: stdout]
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Root node ID
    #[arg(short, long)]
    root: String,

    /// Prune mode, one of fwd, bwd, both
    #[arg(short, long, default_value = "both")]
    mode: Mode,

    /// Prune depth from root
    #[arg(short, long, default_value_t = DEFAULT_DEPTH)]
    depth: usize,

    /// Comma-separated node IDs to leave out
    #[arg(short = 'x', long)]
    exclude: Option<String>,

    /// Accept duplicate edges instead of rejecting them
    #[arg(long)]
    permissive: bool,

    /// Verbose trace output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(args.verbose);

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("grprune: {e:#}");
            ExitCode::FAILURE
        }
    }
}

/// Log to stderr; `RUST_LOG` overrides `-v`.
fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };
    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn run(args: &Args) -> Result<()> {
    let policy = if args.permissive { EdgePolicy::Permissive } else { EdgePolicy::Strict };
    let mut graph = Graph::with_policy(policy);

    match &args.input {
        Some(path) => {
            info!(path = %path.display(), "reading input");
            let file = File::open(path)
                .with_context(|| format!("opening {}", path.display()))?;
            dot::parse_into(BufReader::new(file), &mut graph)
                .with_context(|| format!("parsing {}", path.display()))?;
        }
        None => {
            // stdin cannot seek, and the parser reads its input twice
            let mut buf = Vec::new();
            io::stdin().read_to_end(&mut buf).context("reading stdin")?;
            dot::parse_into(Cursor::new(buf), &mut graph).context("parsing stdin")?;
        }
    }
    info!(nodes = graph.node_count(), edges = graph.edge_count(), "parsed graph");

    let mut opts = PruneOptions::new(args.root.as_str(), args.mode, args.depth);
    if let Some(list) = &args.exclude {
        opts = opts.with_exclude_list(list);
    }

    // resolve root and excludes before touching the output file
    let include = prune::pruned_set(&graph, &opts)?;

    match &args.output {
        Some(path) => {
            info!(path = %path.display(), "writing output");
            let mut file = File::create(path)
                .with_context(|| format!("creating {}", path.display()))?;
            export::write_dot(&graph, &mut file, Some(&include))?;
        }
        None => {
            let mut stdout = io::stdout().lock();
            export::write_dot(&graph, &mut stdout, Some(&include))?;
        }
    }

    Ok(())
}
