//! # DOT Language
//!
//! Lexer and two-pass parser for the `digraph` subset of Graphviz DOT.
//! Input comes from any rewindable source; output is a populated [`Graph`].

pub mod lexer;
pub mod parser;

use std::io::Cursor;

use crate::model::Graph;
use crate::Result;
use lexer::{Lexer, Source};

/// Parse a digraph from `src` with the default (strict) edge policy.
pub fn parse<R: Source>(src: R) -> Result<Graph> {
    let mut graph = Graph::new();
    parse_into(src, &mut graph)?;
    Ok(graph)
}

/// Parse into an existing graph, e.g. one built with
/// [`Graph::with_policy`](crate::model::Graph::with_policy).
pub fn parse_into<R: Source>(src: R, graph: &mut Graph) -> Result<()> {
    let mut lexer = Lexer::new(src);
    parser::parse_graph(&mut lexer, graph)
}

/// Parse a digraph held in memory.
pub fn parse_str(input: &str) -> Result<Graph> {
    parse(Cursor::new(input.as_bytes()))
}
