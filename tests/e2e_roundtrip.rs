//! End-to-end parse/write tests against files and in-memory sources.

use std::fs::{self, File};
use std::io::{BufReader, Cursor};
use std::path::PathBuf;

use grvutils::dot;
use grvutils::{EdgePolicy, Error, Graph};
use pretty_assertions::assert_eq;

const INPUT: &str = r#"digraph callgraph {
  rankdir="LR"
  node [shape=box, fontname="Courier"]
  edge [color=gray]
  "main" [label="main", color=red]
  "main" -> "parse" [weight=2 style=bold]
  "main" -> "run"
  "parse" [label="parse"]
  "run" [label="run"]
  "parse" -> "lex"
  "lex" [label="lex"]
}"#;

fn scratch(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("grvutils-{}-{name}", std::process::id()))
}

fn render(g: &Graph) -> String {
    let mut out = Vec::new();
    g.write(&mut out, None).unwrap();
    String::from_utf8(out).unwrap()
}

// ============================================================================
// 1. Parsing from a file
// ============================================================================

#[test]
fn test_parse_from_file() {
    let path = scratch("input.dot");
    fs::write(&path, INPUT).unwrap();
    let g = dot::parse(BufReader::new(File::open(&path).unwrap())).unwrap();
    fs::remove_file(&path).unwrap();

    assert_eq!(g.node_count(), 4);
    assert_eq!(g.edge_count(), 3);
    let want = "N0: 'main' E: { 1 2 }\nN1: 'parse' E: { 3 }\nN2: 'run' E: { }\nN3: 'lex' E: { }\n";
    assert_eq!(g.dump(), want);
}

#[test]
fn test_graph_attrs_survive() {
    let g = dot::parse_str(INPUT).unwrap();
    let attrs: Vec<String> = g.graph_attrs().map(ToString::to_string).collect();
    assert_eq!(attrs, vec!["rankdir=\"LR\""]);
}

// ============================================================================
// 2. Writing
// ============================================================================

#[test]
fn test_write_full_graph() {
    let g = dot::parse_str(INPUT).unwrap();
    let want = concat!(
        "digraph G {\n",
        "\"main\" [label=\"main\", color=red]\n",
        "\"parse\" [label=\"parse\"]\n",
        "\"run\" [label=\"run\"]\n",
        "\"lex\" [label=\"lex\"]\n",
        "\"main\" -> \"parse\" [weight=2 style=bold]\n",
        "\"main\" -> \"run\"\n",
        "\"parse\" -> \"lex\"\n",
        "}\n",
    );
    assert_eq!(render(&g), want);
}

#[test]
fn test_write_is_a_fixed_point() {
    let first = render(&dot::parse_str(INPUT).unwrap());
    let second = render(&dot::parse_str(&first).unwrap());
    assert_eq!(first, second);
}

#[test]
fn test_write_to_file_and_reparse() {
    let g = dot::parse_str(INPUT).unwrap();
    let path = scratch("output.dot");
    {
        let mut f = File::create(&path).unwrap();
        g.write(&mut f, None).unwrap();
    }
    let back = dot::parse(BufReader::new(File::open(&path).unwrap())).unwrap();
    fs::remove_file(&path).unwrap();
    assert_eq!(back.dump(), g.dump());
}

// ============================================================================
// 3. Edge policy and failures
// ============================================================================

#[test]
fn test_parallel_edges_need_permissive_policy() {
    let input = r#"digraph P { "a" "b" "a" -> "b" [n=1] "a" -> "b" [n=2] }"#;

    let err = dot::parse_str(input).unwrap_err();
    assert!(matches!(err, Error::DuplicateEdge { ref src, ref sink } if src == "a" && sink == "b"));

    let mut g = Graph::with_policy(EdgePolicy::Permissive);
    dot::parse_into(Cursor::new(input), &mut g).unwrap();
    assert_eq!(g.edge_count(), 2);
    assert_eq!(render(&g).matches("\"a\" -> \"b\"").count(), 2);
}

#[test]
fn test_syntax_error_reports_line() {
    let input = "digraph G {\n  \"a\" [label=\"A\"]\n  \"a\" -> [x=y]\n}";
    let err = dot::parse_str(input).unwrap_err();
    assert_eq!(err.to_string(), "error: line 3: expected str token, got '['");
}

#[test]
fn test_edge_to_undefined_node() {
    let err = dot::parse_str(r#"digraph G { "a" "a" -> "ghost" }"#).unwrap_err();
    assert_eq!(err.to_string(), "unknown sink node ghost");
}
