//! # Graph Model
//!
//! Index-addressed digraph with interned attributes.
//! Nodes and edges are stored in flat, append-only vectors; everything else
//! refers to them by `NodeIdx` / `EdgeIdx`.
//!
//! Design rule: no I/O here. Parsing lives in `dot`, serialization in `export`.

pub mod attr;
pub mod node;
pub mod edge;
pub mod graph;

pub use attr::{Attr, AttrIdx, AttrList, AttrTable};
pub use node::{Node, NodeIdx};
pub use edge::{Edge, EdgeIdx, EdgeList};
pub use graph::{EdgePolicy, Graph};

/// Strip one pair of surrounding double quotes, if present.
///
/// This is the canonical form for node identifiers: `"0x1f"` and `0x1f`
/// name the same node everywhere in the graph API.
pub fn unquote(s: &str) -> &str {
    s.strip_prefix('"')
        .and_then(|inner| inner.strip_suffix('"'))
        .unwrap_or(s)
}
