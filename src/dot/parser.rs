//! DOT recursive descent parser.
//!
//! Parses the digraph subset:
//! - `digraph NAME { ... }` preamble
//! - node definitions `"id" [k=v, ...]` and edges `"a" -> "b" [k=v ...]`
//! - `node [...]` / `edge [...]` default statements (validated, not stored)
//! - graph attributes `k=v`
//!
//! The same input is walked twice. Pass 1 creates nodes and records graph
//! attributes; pass 2 rewinds the lexer and adds edges, so an edge may name a
//! node defined anywhere in the file. Every pass validates the full grammar.

use tracing::debug;

use super::lexer::{Lexer, Source, Token, TokenKind};
use crate::model::Graph;
use crate::{Error, Result};

/// Which half of the graph a walk builds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pass {
    Nodes,
    Edges,
}

/// Separator rule for one attribute list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Separator {
    /// Entries must be separated by `,`.
    Comma,
    /// A `,` between entries may be left out.
    Optional,
}

/// Token kinds allowed as an attribute value.
const VALUE_CLASS: &[TokenKind] = &[
    TokenKind::Identifier,
    TokenKind::QuotedString,
    TokenKind::Number,
];

/// Token kinds that may start a statement (or close the body).
const STMT_CLASS: &[TokenKind] = &[
    TokenKind::QuotedString,
    TokenKind::Identifier,
    TokenKind::RBrace,
];

pub type AttrPairs = Vec<(String, String)>;

/// Run both passes of `lexer` into `graph`.
pub fn parse_graph<R: Source>(lexer: &mut Lexer<R>, graph: &mut Graph) -> Result<()> {
    for pass in [Pass::Nodes, Pass::Edges] {
        if pass == Pass::Edges {
            lexer.rewind()?;
        }
        debug!(?pass, "parse pass start");
        Parser { lexer: &mut *lexer, graph: &mut *graph, pass }.parse()?;
        debug!(
            ?pass,
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            "parse pass done"
        );
    }
    Ok(())
}

/// Parser state for one pass.
struct Parser<'a, R> {
    lexer: &'a mut Lexer<R>,
    graph: &'a mut Graph,
    pass: Pass,
}

impl<R: Source> Parser<'_, R> {
    fn error(&self, line: u32, message: String) -> Error {
        Error::Syntax { line, message }
    }

    fn expect(&mut self, kind: TokenKind) -> Result<Token> {
        let tok = self.lexer.next_token()?;
        if tok.kind == kind {
            Ok(tok)
        } else {
            Err(self.error(tok.line, format!("expected {kind} token, got '{}'", shown(&tok))))
        }
    }

    fn expect_keyword(&mut self, name: &str) -> Result<Token> {
        let tok = self.expect(TokenKind::Identifier)?;
        if tok.text == name {
            Ok(tok)
        } else {
            Err(self.error(
                tok.line,
                format!("expected token '{name}', got identifier '{}'", tok.text),
            ))
        }
    }

    fn expect_class(&mut self, class: &[TokenKind]) -> Result<Token> {
        let tok = self.lexer.next_token()?;
        if class.contains(&tok.kind) {
            Ok(tok)
        } else {
            Err(self.error(
                tok.line,
                format!("expected token [{}], got '{}'", class_to_str(class), shown(&tok)),
            ))
        }
    }

    // ========================================================================
    // Grammar
    // ========================================================================

    /// `'digraph' IDENT '{' stmt* '}'`
    fn parse(&mut self) -> Result<()> {
        self.expect_keyword("digraph")?;
        self.expect(TokenKind::Identifier)?;
        self.expect(TokenKind::LBrace)?;

        loop {
            let tok = self.lexer.next_token()?;
            match tok.kind {
                TokenKind::RBrace => return Ok(()),
                TokenKind::QuotedString => self.parse_node_or_edge(tok)?,
                TokenKind::Identifier if tok.text == "node" => {
                    self.parse_default(&tok, Separator::Comma)?
                }
                TokenKind::Identifier if tok.text == "edge" => {
                    self.parse_default(&tok, Separator::Optional)?
                }
                TokenKind::Identifier => self.parse_graph_attr(tok)?,
                _ => {
                    return Err(self.error(
                        tok.line,
                        format!(
                            "unexpected token '{}', expected one of [{}]",
                            shown(&tok),
                            class_to_str(STMT_CLASS)
                        ),
                    ));
                }
            }
        }
    }

    /// Leading string already consumed; the peeked follower decides between
    /// edge and node. A follower that is neither `->` nor `[` stays buffered
    /// for the statement loop.
    fn parse_node_or_edge(&mut self, first: Token) -> Result<()> {
        let (kind, line) = {
            let next = self.lexer.peek()?;
            (next.kind, next.line)
        };
        match kind {
            TokenKind::Arrow => {
                self.lexer.next_token()?;
                self.parse_edge_def(first)
            }
            TokenKind::UndirectedEdge => {
                Err(self.error(line, "undirected edge '--' in a digraph".to_string()))
            }
            TokenKind::LBracket => {
                let attrs = self.parse_attr_list(Separator::Comma)?;
                self.define_node(first, attrs)
            }
            _ => self.define_node(first, AttrPairs::new()),
        }
    }

    fn define_node(&mut self, id: Token, attrs: AttrPairs) -> Result<()> {
        if self.pass == Pass::Nodes {
            self.graph.make_node(&id.text, attrs).inspect_err(|e| {
                debug!(line = id.line, error = %e, "node definition rejected");
            })?;
        }
        Ok(())
    }

    /// `STRING '->' STRING attr_list?` — source and arrow are consumed.
    fn parse_edge_def(&mut self, src: Token) -> Result<()> {
        let sink = self.expect(TokenKind::QuotedString)?;
        let follower = self.lexer.peek()?.kind;
        let attrs = match follower {
            TokenKind::LBracket => self.parse_attr_list(Separator::Optional)?,
            _ => AttrPairs::new(),
        };
        if self.pass == Pass::Edges {
            self.graph.add_edge(&src.text, &sink.text, attrs).inspect_err(|e| {
                debug!(line = src.line, error = %e, "edge definition rejected");
            })?;
        }
        Ok(())
    }

    /// `'node' attr_list` / `'edge' attr_list`
    fn parse_default(&mut self, keyword: &Token, sep: Separator) -> Result<()> {
        let attrs = self.parse_attr_list(sep)?;
        if self.pass == Pass::Nodes {
            debug!(line = keyword.line, statement = %keyword.text, count = attrs.len(), "ignoring default attributes");
        }
        Ok(())
    }

    /// `IDENT '=' value`
    fn parse_graph_attr(&mut self, key: Token) -> Result<()> {
        self.expect(TokenKind::Equal)?;
        let value = self.expect_class(VALUE_CLASS)?;
        if self.pass == Pass::Nodes {
            self.graph.set_graph_attr(key.text, value.text);
        }
        Ok(())
    }

    /// `'[' ( IDENT '=' value ( sep? IDENT '=' value )* )? ']'`
    fn parse_attr_list(&mut self, sep: Separator) -> Result<AttrPairs> {
        self.expect(TokenKind::LBracket)?;
        let mut attrs = AttrPairs::new();
        let mut tok = self.lexer.next_token()?;
        loop {
            match tok.kind {
                TokenKind::RBracket if attrs.is_empty() => return Ok(attrs),
                TokenKind::Identifier => {}
                _ => {
                    return Err(self.error(
                        tok.line,
                        format!("parsing attr list: expected id or ']', got '{}'", shown(&tok)),
                    ));
                }
            }
            let key = tok.text;
            self.expect(TokenKind::Equal)?;
            let value = self.expect_class(VALUE_CLASS)?;
            attrs.push((key, value.text));

            tok = self.lexer.next_token()?;
            match (tok.kind, sep) {
                (TokenKind::RBracket, _) => return Ok(attrs),
                // a comma must be followed by another entry
                (TokenKind::Comma, _) => {
                    tok = self.lexer.next_token()?;
                    if tok.kind != TokenKind::Identifier {
                        return Err(self.error(
                            tok.line,
                            format!("parsing attr list: expected id after ',', got '{}'", shown(&tok)),
                        ));
                    }
                }
                (TokenKind::Identifier, Separator::Optional) => {}
                _ => {
                    return Err(self.error(
                        tok.line,
                        format!("parsing attr list: expected ',' or ']', got '{}'", shown(&tok)),
                    ));
                }
            }
        }
    }
}

/// Text of a token for diagnostics.
fn shown(tok: &Token) -> &str {
    match tok.kind {
        TokenKind::Eof => TokenKind::Eof.describe(),
        _ => &tok.text,
    }
}

fn class_to_str(class: &[TokenKind]) -> String {
    class.iter().map(|k| k.describe()).collect::<Vec<_>>().join(",")
}
