//! Directed edge.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use super::{AttrIdx, AttrList, NodeIdx};

/// Position in the graph's flat edge vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EdgeIdx(pub u32);

impl EdgeIdx {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for EdgeIdx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Adjacency list: indices into the edge vector.
pub type EdgeList = SmallVec<[EdgeIdx; 4]>;

/// A directed edge `src -> sink`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub(crate) src: NodeIdx,
    pub(crate) sink: NodeIdx,
    pub(crate) attrs: AttrList,
}

impl Edge {
    pub(crate) fn new(src: NodeIdx, sink: NodeIdx, attrs: AttrList) -> Self {
        Self { src, sink, attrs }
    }

    /// The same edge pointing the other way.
    pub(crate) fn reversed(&self) -> Self {
        Self::new(self.sink, self.src, self.attrs.clone())
    }

    pub fn src(&self) -> NodeIdx {
        self.src
    }

    pub fn sink(&self) -> NodeIdx {
        self.sink
    }

    pub fn attrs(&self) -> &[AttrIdx] {
        &self.attrs
    }
}
