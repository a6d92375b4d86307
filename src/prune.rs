//! # Pruning
//!
//! Cut a graph down to the neighbourhood of one root node.
//!
//! A node is kept when it can be reached from the root (`fwd`), can reach the
//! root (`bwd`), or either (`both`), in at most `depth` hops, along a path
//! that never touches an excluded node. Excluded nodes are never kept, the
//! root included.

use std::fmt;
use std::io::Write;
use std::str::FromStr;

use hashbrown::HashSet;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

pub use crate::export::IncludeSet;
use crate::export::write_dot;
use crate::model::{Graph, NodeIdx};
use crate::{Error, Result};

/// Depth used when none is given.
pub const DEFAULT_DEPTH: usize = 4;

// ============================================================================
// Mode
// ============================================================================

/// Walk direction relative to the root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Mode {
    /// Successors of the root.
    #[serde(rename = "fwd")]
    Forward,
    /// Predecessors of the root (a forward walk over the transpose).
    #[serde(rename = "bwd")]
    Backward,
    /// Union of the two.
    #[default]
    #[serde(rename = "both")]
    Both,
}

impl Mode {
    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Forward => "fwd",
            Mode::Backward => "bwd",
            Mode::Both => "both",
        }
    }

    fn walks_forward(self) -> bool {
        matches!(self, Mode::Forward | Mode::Both)
    }

    fn walks_backward(self) -> bool {
        matches!(self, Mode::Backward | Mode::Both)
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "fwd" => Ok(Mode::Forward),
            "bwd" => Ok(Mode::Backward),
            "both" => Ok(Mode::Both),
            other => Err(Error::InvalidMode(other.to_string())),
        }
    }
}

// ============================================================================
// Options
// ============================================================================

/// Everything a prune needs besides the graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PruneOptions {
    /// Root node id, quoted or bare.
    pub root: String,
    #[serde(default)]
    pub mode: Mode,
    #[serde(default = "default_depth")]
    pub depth: usize,
    /// Node ids that are never kept and never walked through.
    #[serde(default)]
    pub exclude: Vec<String>,
}

fn default_depth() -> usize {
    DEFAULT_DEPTH
}

impl PruneOptions {
    pub fn new(root: impl Into<String>, mode: Mode, depth: usize) -> Self {
        Self { root: root.into(), mode, depth, exclude: Vec::new() }
    }

    pub fn with_exclude<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude.extend(ids.into_iter().map(Into::into));
        self
    }

    /// Add the ids of a comma-separated list such as `"a, b,c"`.
    pub fn with_exclude_list(self, list: &str) -> Self {
        self.with_exclude(split_id_list(list))
    }
}

/// Split a comma-separated id list, trimming items and dropping blanks.
pub fn split_id_list(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

// ============================================================================
// Pruning
// ============================================================================

/// Compute the indices of the nodes to keep.
///
/// The root and every excluded id are resolved before any walking starts;
/// an id that does not resolve is an error.
pub fn pruned_set(graph: &Graph, opts: &PruneOptions) -> Result<IncludeSet> {
    let root = graph
        .lookup_node(&opts.root)
        .ok_or_else(|| Error::RootNotFound(opts.root.clone()))?
        .idx();
    let exclude = resolve_excludes(graph, &opts.exclude)?;

    let mut include = IncludeSet::new();

    if opts.mode.walks_forward() {
        walk(graph, root, opts.depth, &exclude, &mut include);
    }

    if opts.mode.walks_backward() {
        let tg = graph.transpose();
        let troot = tg
            .lookup_node(&opts.root)
            .ok_or_else(|| Error::RootNotFound(opts.root.clone()))?
            .idx();
        walk(&tg, troot, opts.depth, &exclude, &mut include);
    }

    debug!(
        root = %opts.root,
        mode = %opts.mode,
        depth = opts.depth,
        excluded = exclude.len(),
        kept = include.len(),
        "pruned"
    );
    if tracing::enabled!(tracing::Level::TRACE) {
        let mut sorted: Vec<_> = include.iter().map(|idx| idx.0).collect();
        sorted.sort_unstable();
        trace!(include = ?sorted, "include set");
    }

    Ok(include)
}

/// Prune and write the kept subgraph as DOT.
pub fn prune_graph<W: Write>(graph: &Graph, opts: &PruneOptions, writer: &mut W) -> Result<()> {
    let include = pruned_set(graph, opts)?;
    write_dot(graph, writer, Some(&include))
}

fn resolve_excludes(graph: &Graph, ids: &[String]) -> Result<HashSet<NodeIdx>> {
    ids.iter()
        .map(|id| {
            graph
                .lookup_node(id)
                .map(|n| n.idx())
                .ok_or_else(|| Error::ExcludeNotFound(id.clone()))
        })
        .collect()
}

/// Level-by-level expansion from `root`, at most `cutoff` hops.
///
/// A node is expanded the first time it is reached, which is also at its
/// smallest depth, so cycles cost nothing extra.
fn walk(
    graph: &Graph,
    root: NodeIdx,
    cutoff: usize,
    exclude: &HashSet<NodeIdx>,
    include: &mut IncludeSet,
) {
    if exclude.contains(&root) {
        return;
    }
    include.insert(root);

    let mut seen = HashSet::new();
    seen.insert(root);
    let mut frontier = vec![root];

    for _ in 0..cutoff {
        let mut next = Vec::new();

        for &idx in &frontier {
            let Some(node) = graph.node(idx) else { continue };
            for &eidx in graph.out_edges(node) {
                let Some(edge) = graph.edge(eidx) else { continue };
                let (_, sink) = graph.endpoints(edge);

                if exclude.contains(&sink) || !seen.insert(sink) {
                    continue;
                }
                include.insert(sink);
                next.push(sink);
            }
        }

        frontier = next;
        if frontier.is_empty() {
            break;
        }
    }
}
