//! The graph: node and edge storage, adjacency, interning, transposition.
//!
//! ## Ownership
//!
//! The attribute table and the name map are held behind `Arc` and cloned on
//! write. A transpose therefore shares both with the graph it came from until
//! one of them is mutated, and the same identifiers resolve to the same
//! `NodeIdx` in either graph.

use std::io::Write;
use std::sync::Arc;

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{unquote, Attr, AttrIdx, AttrList, AttrTable, Edge, EdgeIdx, Node, NodeIdx};
use crate::export::{self, IncludeSet};
use crate::{Error, Result};

// ============================================================================
// Edge policy
// ============================================================================

/// What `add_edge` does with a second edge between the same two nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EdgePolicy {
    /// Reject it with `Error::DuplicateEdge`.
    #[default]
    Strict,
    /// Keep it. Parallel edges show up twice in adjacency and in output.
    Permissive,
}

// ============================================================================
// Graph
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct Graph {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    attrs: Arc<AttrTable>,
    names: Arc<HashMap<String, NodeIdx>>,
    /// (src, sink) → first edge between them
    pairs: HashMap<(NodeIdx, NodeIdx), EdgeIdx>,
    graph_attrs: AttrList,
    policy: EdgePolicy,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_policy(policy: EdgePolicy) -> Self {
        Self { policy, ..Self::default() }
    }

    pub fn policy(&self) -> EdgePolicy {
        self.policy
    }

    // ========================================================================
    // Construction
    // ========================================================================

    /// Create a node. Fails without touching the graph if `id` is taken.
    pub fn make_node<I, K, V>(&mut self, id: &str, attrs: I) -> Result<NodeIdx>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let id = unquote(id);
        if self.names.contains_key(id) {
            return Err(Error::DuplicateNode(id.to_string()));
        }

        let attrs = Arc::make_mut(&mut self.attrs).intern_all(attrs);
        let label = self.label_of(&attrs);
        let idx = NodeIdx(self.nodes.len() as u32);

        Arc::make_mut(&mut self.names).insert(id.to_string(), idx);
        self.nodes.push(Node::new(id.to_string(), label, attrs, idx));
        Ok(idx)
    }

    /// Connect two existing nodes. Fails without touching the graph if an
    /// endpoint is unknown or, under `EdgePolicy::Strict`, the pair is taken.
    pub fn add_edge<I, K, V>(&mut self, src: &str, sink: &str, attrs: I) -> Result<EdgeIdx>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let s = self.resolve("source", src)?;
        let t = self.resolve("sink", sink)?;
        if self.policy == EdgePolicy::Strict && self.pairs.contains_key(&(s, t)) {
            return Err(Error::DuplicateEdge {
                src: unquote(src).to_string(),
                sink: unquote(sink).to_string(),
            });
        }

        let attrs = Arc::make_mut(&mut self.attrs).intern_all(attrs);
        let idx = EdgeIdx(self.edges.len() as u32);

        self.pairs.entry((s, t)).or_insert(idx);
        self.edges.push(Edge::new(s, t, attrs));
        self.nodes[s.index()].out_edges.push(idx);
        self.nodes[t.index()].in_edges.push(idx);
        Ok(idx)
    }

    /// Replace the attributes of the existing `src -> sink` edge.
    pub fn set_edge_attrs<I, K, V>(&mut self, src: &str, sink: &str, attrs: I) -> Result<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let s = self.resolve("source", src)?;
        let t = self.resolve("sink", sink)?;
        let idx = self.pairs.get(&(s, t)).copied().ok_or_else(|| Error::EdgeNotFound {
            src: unquote(src).to_string(),
            sink: unquote(sink).to_string(),
        })?;

        let attrs = Arc::make_mut(&mut self.attrs).intern_all(attrs);
        self.edges[idx.index()].attrs = attrs;
        Ok(())
    }

    /// Set a graph-level attribute, replacing any earlier value for `key`.
    pub fn set_graph_attr(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let attr = Attr::new(key, value);
        let existing = self
            .graph_attrs
            .iter()
            .position(|&prev| self.attrs.get(prev).is_some_and(|a| a.key == attr.key));
        let idx = Arc::make_mut(&mut self.attrs).intern(attr);
        match existing {
            Some(pos) => self.graph_attrs[pos] = idx,
            None => self.graph_attrs.push(idx),
        }
    }

    fn resolve(&self, role: &'static str, id: &str) -> Result<NodeIdx> {
        let id = unquote(id);
        self.names
            .get(id)
            .copied()
            .ok_or_else(|| Error::UnknownNode { role, id: id.to_string() })
    }

    fn label_of(&self, attrs: &[AttrIdx]) -> String {
        attrs
            .iter()
            .filter_map(|&a| self.attrs.get(a))
            .find(|a| a.key == "label")
            .map(|a| unquote(&a.value).to_string())
            .unwrap_or_default()
    }

    // ========================================================================
    // Transposition
    // ========================================================================

    /// Same nodes, same attributes, every edge reversed.
    ///
    /// Edge `i` of the result is edge `i` of `self` with its endpoints
    /// swapped; adjacency is rebuilt from the swapped edges.
    pub fn transpose(&self) -> Graph {
        let mut nodes: Vec<Node> = self.nodes.iter().map(Node::detached).collect();
        let mut edges = Vec::with_capacity(self.edges.len());
        let mut pairs = HashMap::with_capacity(self.pairs.len());

        for (i, e) in self.edges.iter().enumerate() {
            let idx = EdgeIdx(i as u32);
            let te = e.reversed();
            nodes[te.src.index()].out_edges.push(idx);
            nodes[te.sink.index()].in_edges.push(idx);
            pairs.entry((te.src, te.sink)).or_insert(idx);
            edges.push(te);
        }

        debug!(nodes = nodes.len(), edges = edges.len(), "built transpose");

        Graph {
            nodes,
            edges,
            attrs: Arc::clone(&self.attrs),
            names: Arc::clone(&self.names),
            pairs,
            graph_attrs: self.graph_attrs.clone(),
            policy: self.policy,
        }
    }

    // ========================================================================
    // Read-only access
    // ========================================================================

    pub fn lookup_node(&self, id: &str) -> Option<&Node> {
        self.names.get(unquote(id)).map(|&idx| &self.nodes[idx.index()])
    }

    pub fn node(&self, idx: NodeIdx) -> Option<&Node> {
        self.nodes.get(idx.index())
    }

    pub fn edge(&self, idx: EdgeIdx) -> Option<&Edge> {
        self.edges.get(idx.index())
    }

    pub fn endpoints(&self, edge: &Edge) -> (NodeIdx, NodeIdx) {
        (edge.src, edge.sink)
    }

    /// Outgoing edges of `node`.
    pub fn out_edges<'a>(&self, node: &'a Node) -> &'a [EdgeIdx] {
        node.out_edges()
    }

    /// Incoming edges of `node`.
    pub fn in_edges<'a>(&self, node: &'a Node) -> &'a [EdgeIdx] {
        node.in_edges()
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn attr(&self, idx: AttrIdx) -> Option<&Attr> {
        self.attrs.get(idx)
    }

    /// Number of distinct interned attributes.
    pub fn attr_count(&self) -> usize {
        self.attrs.len()
    }

    pub fn node_attrs<'a>(&'a self, node: &'a Node) -> impl Iterator<Item = &'a Attr> + 'a {
        node.attrs.iter().filter_map(|&a| self.attrs.get(a))
    }

    pub fn edge_attrs<'a>(&'a self, edge: &'a Edge) -> impl Iterator<Item = &'a Attr> + 'a {
        edge.attrs.iter().filter_map(|&a| self.attrs.get(a))
    }

    pub fn graph_attrs(&self) -> impl Iterator<Item = &Attr> + '_ {
        self.graph_attrs.iter().filter_map(|&a| self.attrs.get(a))
    }

    // ========================================================================
    // Output
    // ========================================================================

    /// Serialize as DOT. `None` emits everything.
    pub fn write<W: Write>(&self, writer: &mut W, include: Option<&IncludeSet>) -> Result<()> {
        export::write_dot(self, writer, include)
    }

    /// One line per node: `N<idx>: '<label>' E: { <sink> ... }`.
    pub fn dump(&self) -> String {
        let mut out = String::new();
        for n in &self.nodes {
            out.push_str(&format!("N{}: '{}' E: {{", n.idx, n.label));
            for &e in &n.out_edges {
                out.push_str(&format!(" {}", self.edges[e.index()].sink));
            }
            out.push_str(" }\n");
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attrs(label: &str) -> Vec<(&'static str, String)> {
        vec![
            ("label", label.to_string()),
            ("prop1", "2".to_string()),
            ("prop2", "zilch".to_string()),
        ]
    }

    fn makeg() -> Graph {
        let mut g = Graph::new();
        g.make_node("1", attrs("a")).unwrap();
        g.make_node("2", attrs("b")).unwrap();
        g.make_node("3", attrs("c")).unwrap();
        g.add_edge("1", "2", [("weight", "1")]).unwrap();
        g.add_edge("2", "3", [("weight", "1")]).unwrap();
        g.add_edge("3", "1", [("weight", "1")]).unwrap();
        g.add_edge("3", "2", [("weight", "1")]).unwrap();
        g
    }

    #[test]
    fn test_basic_dump() {
        let g = makeg();
        assert_eq!(g.dump(), "N0: 'a' E: { 1 }\nN1: 'b' E: { 2 }\nN2: 'c' E: { 0 1 }\n");
        let n1 = g.node(NodeIdx(1)).unwrap();
        assert_eq!(g.in_edges(n1).len(), 2);
    }

    #[test]
    fn test_transpose() {
        let g = makeg();
        let tg = g.transpose();
        assert_eq!(tg.dump(), "N0: 'a' E: { 2 }\nN1: 'b' E: { 0 2 }\nN2: 'c' E: { 1 }\n");
        // ids resolve identically in both graphs
        assert_eq!(tg.lookup_node("3").unwrap().idx(), g.lookup_node("3").unwrap().idx());
        assert_eq!(tg.attr_count(), g.attr_count());
    }

    #[test]
    fn test_access() {
        let g = makeg();
        assert_eq!(g.node_count(), 3);
        assert_eq!(g.edge_count(), 4);

        let n0 = g.lookup_node("1").expect("node 1");
        let es = g.out_edges(n0);
        assert_eq!(es.len(), 1);
        let e0 = g.edge(es[0]).expect("edge 0");
        assert_eq!(g.endpoints(e0), (NodeIdx(0), NodeIdx(1)));

        assert!(g.lookup_node("nope").is_none());
        assert!(g.node(NodeIdx(3)).is_none());
        assert!(g.edge(EdgeIdx(4)).is_none());
    }

    #[test]
    fn test_quoted_and_bare_ids_are_the_same_node() {
        let g = makeg();
        assert_eq!(g.lookup_node("\"2\"").unwrap().idx(), NodeIdx(1));
        assert_eq!(g.lookup_node("2").unwrap().id(), "2");
    }

    #[test]
    fn test_attrs_are_interned_across_nodes() {
        let g = makeg();
        // label=a, label=b, label=c, prop1=2, prop2=zilch, weight=1
        assert_eq!(g.attr_count(), 6);
        let n0 = g.node(NodeIdx(0)).unwrap();
        let n1 = g.node(NodeIdx(1)).unwrap();
        assert_eq!(n0.attrs()[1], n1.attrs()[1]);
    }

    #[test]
    fn test_label_is_unquoted() {
        let mut g = Graph::new();
        g.make_node("\"x\"", [("label", "\" one \"")]).unwrap();
        g.make_node("\"y\"", [("shape", "box")]).unwrap();
        assert_eq!(g.lookup_node("x").unwrap().label(), " one ");
        assert_eq!(g.lookup_node("y").unwrap().label(), "");
    }

    #[test]
    fn test_duplicate_node_leaves_graph_unchanged() {
        let mut g = makeg();
        let before = g.attr_count();
        let err = g.make_node("2", [("label", "fresh")]).unwrap_err();
        assert!(matches!(err, Error::DuplicateNode(ref id) if id == "2"));
        assert_eq!(g.node_count(), 3);
        assert_eq!(g.attr_count(), before);
    }

    #[test]
    fn test_unknown_endpoint() {
        let mut g = makeg();
        let err = g.add_edge("1", "9", [("k", "v")]).unwrap_err();
        assert!(matches!(err, Error::UnknownNode { role: "sink", .. }));
        let err = g.add_edge("9", "1", [("k", "v")]).unwrap_err();
        assert!(matches!(err, Error::UnknownNode { role: "source", .. }));
        assert_eq!(g.edge_count(), 4);
    }

    #[test]
    fn test_duplicate_edge_strict() {
        let mut g = makeg();
        let err = g.add_edge("1", "2", [("fresh", "attr")]).unwrap_err();
        assert!(matches!(err, Error::DuplicateEdge { .. }));
        assert_eq!(g.edge_count(), 4);
        assert_eq!(g.lookup_node("1").unwrap().out_edges().len(), 1);
        assert_eq!(g.attr_count(), 6);
    }

    #[test]
    fn test_duplicate_edge_permissive() {
        let mut g = Graph::with_policy(EdgePolicy::Permissive);
        g.make_node("a", Vec::<(String, String)>::new()).unwrap();
        g.make_node("b", Vec::<(String, String)>::new()).unwrap();
        g.add_edge("a", "b", [("n", "1")]).unwrap();
        g.add_edge("a", "b", [("n", "2")]).unwrap();
        assert_eq!(g.dump(), "N0: '' E: { 1 1 }\nN1: '' E: { }\n");
        assert_eq!(g.lookup_node("b").unwrap().in_edges().len(), 2);
    }

    #[test]
    fn test_set_edge_attrs() {
        let mut g = makeg();
        g.set_edge_attrs("3", "1", [("color", "red")]).unwrap();
        let e = g.edge(EdgeIdx(2)).unwrap();
        let rendered: Vec<_> = g.edge_attrs(e).map(ToString::to_string).collect();
        assert_eq!(rendered, vec!["color=red"]);

        let err = g.set_edge_attrs("1", "3", [("color", "red")]).unwrap_err();
        assert!(matches!(err, Error::EdgeNotFound { .. }));
    }

    #[test]
    fn test_graph_attrs_replace_by_key() {
        let mut g = Graph::new();
        g.set_graph_attr("rankdir", "\"LR\"");
        g.set_graph_attr("splines", "polyline");
        g.set_graph_attr("rankdir", "TB");
        let rendered: Vec<_> = g.graph_attrs().map(ToString::to_string).collect();
        assert_eq!(rendered, vec!["rankdir=TB", "splines=polyline"]);
    }

    #[test]
    fn test_transpose_shares_until_written() {
        let g = makeg();
        let mut tg = g.transpose();
        assert!(Arc::ptr_eq(&g.attrs, &tg.attrs));
        tg.set_graph_attr("fresh", "1");
        assert!(!Arc::ptr_eq(&g.attrs, &tg.attrs));
        assert_eq!(g.attr_count(), 6);
    }
}
