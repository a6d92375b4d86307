//! # grvutils — Graphviz digraph pruning
//!
//! Reads the `digraph NAME { ... }` subset of DOT emitted by compiler and
//! build-graph dumpers, builds an indexed in-memory graph, and cuts out the
//! neighbourhood of one node so that huge dumps become something a human (or
//! `dot`) can actually look at.
//!
//! ## Design Principles
//!
//! 1. **Two passes, one source**: the parser walks the input twice (nodes, then
//!    edges) so edges may name nodes defined further down
//! 2. **Stable indices**: `NodeIdx`/`EdgeIdx` never move once assigned
//! 3. **Interned attributes**: identical `key=value` pairs share one slot
//! 4. **Canonical ids**: node identifiers are stored without their quotes
//!
//! ## Quick Start
//!
//! ```rust
//! use grvutils::{dot, prune::{Mode, PruneOptions}};
//!
//! # fn example() -> grvutils::Result<()> {
//! let graph = dot::parse_str(r#"digraph Y {
//!     "a" [label="A"]
//!     "b" [label="B"]
//!     "a" -> "b" [shape=box]
//! }"#)?;
//!
//! let opts = PruneOptions::new("b", Mode::Backward, 1);
//! let mut out = Vec::new();
//! grvutils::prune::prune_graph(&graph, &opts, &mut out)?;
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Modules
// ============================================================================

pub mod model;
pub mod dot;
pub mod export;
pub mod prune;

// ============================================================================
// Re-exports
// ============================================================================

pub use model::{
    Attr, AttrIdx, Edge, EdgeIdx, EdgePolicy, Graph, Node, NodeIdx,
};
pub use prune::{IncludeSet, Mode, PruneOptions};

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("error at line {line}: unknown char: '{ch}'")]
    UnexpectedChar { line: u32, ch: char },

    #[error("error at line {line}: unterminated string")]
    UnterminatedString { line: u32 },

    #[error("error at line {line}: malformed edge operator, '-' followed by {found}")]
    MalformedEdgeOp { line: u32, found: String },

    #[error("error: line {line}: {message}")]
    Syntax { line: u32, message: String },

    #[error("collision on node id {0}")]
    DuplicateNode(String),

    #[error("unknown {role} node {id}")]
    UnknownNode { role: &'static str, id: String },

    #[error("duplicate edge \"{src}\" -> \"{sink}\"")]
    DuplicateEdge { src: String, sink: String },

    #[error("can't locate edge \"{src}\" -> \"{sink}\"")]
    EdgeNotFound { src: String, sink: String },

    #[error("unable to locate root node '{0}'")]
    RootNotFound(String),

    #[error("unable to locate excluded node '{0}'")]
    ExcludeNotFound(String),

    #[error("illegal mode '{0}', expected one of fwd, bwd, both")]
    InvalidMode(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
