//! Node in the digraph.

use serde::{Deserialize, Serialize};
use super::{AttrIdx, AttrList, EdgeIdx, EdgeList};

/// Dense node position, assigned in creation order and never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeIdx(pub u32);

impl NodeIdx {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for NodeIdx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A node. Identifier is stored unquoted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub(crate) id: String,
    pub(crate) label: String,
    pub(crate) attrs: AttrList,
    pub(crate) out_edges: EdgeList,
    pub(crate) in_edges: EdgeList,
    pub(crate) idx: NodeIdx,
}

impl Node {
    pub(crate) fn new(id: String, label: String, attrs: AttrList, idx: NodeIdx) -> Self {
        Self {
            id,
            label,
            attrs,
            out_edges: EdgeList::new(),
            in_edges: EdgeList::new(),
            idx,
        }
    }

    /// Same node, no adjacency. Used when rebuilding edges for a transpose.
    pub(crate) fn detached(&self) -> Self {
        Self::new(self.id.clone(), self.label.clone(), self.attrs.clone(), self.idx)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Value of the `label` attribute without quotes, or `""`.
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn idx(&self) -> NodeIdx {
        self.idx
    }

    pub fn attrs(&self) -> &[AttrIdx] {
        &self.attrs
    }

    pub fn out_edges(&self) -> &[EdgeIdx] {
        &self.out_edges
    }

    pub fn in_edges(&self) -> &[EdgeIdx] {
        &self.in_edges
    }
}
