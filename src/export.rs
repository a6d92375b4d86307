//! DOT export — serialize a graph, or the part of it selected by an
//! include set, back into the digraph subset the parser reads.
//!
//! ```text
//! digraph G {
//! "a" [label="A", shape=box]
//! "b" [label="B"]
//! "a" -> "b" [color=red style=dashed]
//! }
//! ```
//!
//! Node attributes are comma separated, edge attributes space separated,
//! matching what the parser requires for each. Graph-level attributes are
//! not written.

use std::io::{BufWriter, Write};

use hashbrown::HashSet;

use crate::model::{AttrIdx, Graph, NodeIdx};
use crate::Result;

/// Node indices selected for output.
pub type IncludeSet = HashSet<NodeIdx>;

/// Write `graph` as DOT. With `include == None` everything is written;
/// otherwise only included nodes, and only edges whose two endpoints are
/// both included.
pub fn write_dot<W: Write>(graph: &Graph, writer: &mut W, include: Option<&IncludeSet>) -> Result<()> {
    let mut w = BufWriter::new(writer);
    let emit = |idx: NodeIdx| include.is_none_or(|set| set.contains(&idx));

    writeln!(w, "digraph G {{")?;

    // Nodes
    for node in graph.nodes().iter().filter(|n| emit(n.idx())) {
        write!(w, "\"{}\"", node.id())?;
        write_attrs(&mut w, graph, node.attrs(), ", ")?;
        writeln!(w)?;
    }

    // Edges, grouped by source
    for node in graph.nodes().iter().filter(|n| emit(n.idx())) {
        for &eidx in node.out_edges() {
            let Some(edge) = graph.edge(eidx) else { continue };
            let (src, sink) = graph.endpoints(edge);
            if !emit(sink) {
                continue;
            }
            let (Some(src), Some(sink)) = (graph.node(src), graph.node(sink)) else { continue };
            write!(w, "\"{}\" -> \"{}\"", src.id(), sink.id())?;
            write_attrs(&mut w, graph, edge.attrs(), " ")?;
            writeln!(w)?;
        }
    }

    writeln!(w, "}}")?;
    w.flush()?;
    Ok(())
}

/// ` [k=v<sep>k=v]`, or nothing for an empty list.
fn write_attrs<W: Write>(w: &mut W, graph: &Graph, attrs: &[AttrIdx], sep: &str) -> Result<()> {
    if attrs.is_empty() {
        return Ok(());
    }
    let rendered: Vec<String> = attrs
        .iter()
        .filter_map(|&a| graph.attr(a))
        .map(ToString::to_string)
        .collect();
    write!(w, " [{}]", rendered.join(sep))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn makeg() -> Graph {
        let mut g = Graph::new();
        for (id, label) in [("1", "a"), ("2", "b"), ("3", "c")] {
            g.make_node(id, [("label", label), ("prop1", "2"), ("prop2", "zilch")]).unwrap();
        }
        let edge_attrs = [("label", "\"\""), ("prop1", "2"), ("prop2", "zilch")];
        g.add_edge("1", "2", edge_attrs).unwrap();
        g.add_edge("2", "3", edge_attrs).unwrap();
        g.add_edge("3", "1", edge_attrs).unwrap();
        g.add_edge("3", "2", edge_attrs).unwrap();
        g
    }

    fn render(g: &Graph, include: Option<&IncludeSet>) -> String {
        let mut buf = Vec::new();
        write_dot(g, &mut buf, include).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_write_filtered_skips_graph_attrs() {
        let mut g = makeg();
        g.set_graph_attr("splines", "polyline");
        let include: IncludeSet = [NodeIdx(0), NodeIdx(1)].into_iter().collect();
        let want = concat!(
            "digraph G {\n",
            "\"1\" [label=a, prop1=2, prop2=zilch]\n",
            "\"2\" [label=b, prop1=2, prop2=zilch]\n",
            "\"1\" -> \"2\" [label=\"\" prop1=2 prop2=zilch]\n",
            "}\n",
        );
        assert_eq!(render(&g, Some(&include)), want);
    }

    #[test]
    fn test_write_everything() {
        let g = makeg();
        let out = render(&g, None);
        assert_eq!(out.lines().filter(|l| l.contains("->")).count(), 4);
        assert_eq!(out.lines().count(), 2 + 3 + 4);
        // edges grouped by source node, in adjacency order
        let edges: Vec<_> = out.lines().filter(|l| l.contains("->")).map(|l| &l[..10]).collect();
        assert_eq!(edges, vec!["\"1\" -> \"2\"", "\"2\" -> \"3\"", "\"3\" -> \"1\"", "\"3\" -> \"2\""]);
    }

    #[test]
    fn test_write_empty_include() {
        let g = makeg();
        assert_eq!(render(&g, Some(&IncludeSet::new())), "digraph G {\n}\n");
    }

    #[test]
    fn test_write_no_attrs() {
        let mut g = Graph::new();
        g.make_node("x", Vec::<(String, String)>::new()).unwrap();
        g.make_node("y", Vec::<(String, String)>::new()).unwrap();
        g.add_edge("x", "y", Vec::<(String, String)>::new()).unwrap();
        assert_eq!(render(&g, None), "digraph G {\n\"x\"\n\"y\"\n\"x\" -> \"y\"\n}\n");
    }
}
