//! DOT lexer — tokenizes a rewindable byte source, one token per call.

use std::fmt;
use std::io::{self, BufRead, Cursor, Seek, SeekFrom};

use tracing::trace;

use crate::{Error, Result};

// ============================================================================
// Source
// ============================================================================

/// A byte source the lexer can scan more than once.
///
/// The parser makes two passes over its input, so anything it reads from has
/// to be able to go back to offset zero.
pub trait Source: BufRead {
    fn rewind_to_start(&mut self) -> io::Result<()>;
}

impl<T: BufRead + Seek> Source for T {
    fn rewind_to_start(&mut self) -> io::Result<()> {
        self.seek(SeekFrom::Start(0)).map(|_| ())
    }
}

// ============================================================================
// Tokens
// ============================================================================

/// A token from the lexer.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    /// Raw matched text; quoted strings keep their quotes.
    pub text: String,
    /// 1-based line the token started on.
    pub line: u32,
}

impl Token {
    fn new(kind: TokenKind, text: impl Into<String>, line: u32) -> Self {
        Self { kind, text: text.into(), line }
    }
}

/// Token kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Identifier,
    QuotedString,
    Number,
    Equal,
    Comma,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
    Arrow,          // ->
    UndirectedEdge, // --
    Eof,
}

impl TokenKind {
    /// Short name used in diagnostics.
    pub fn describe(self) -> &'static str {
        match self {
            TokenKind::Identifier => "id",
            TokenKind::QuotedString => "str",
            TokenKind::Number => "const",
            TokenKind::Equal => "=",
            TokenKind::Comma => ",",
            TokenKind::LBracket => "[",
            TokenKind::RBracket => "]",
            TokenKind::LBrace => "{",
            TokenKind::RBrace => "}",
            TokenKind::Arrow => "->",
            TokenKind::UndirectedEdge => "--",
            TokenKind::Eof => "<eof>",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.describe())
    }
}

// ============================================================================
// Lexer
// ============================================================================

pub struct Lexer<R> {
    src: R,
    line: u32,
    /// Lookahead buffer: empty, or holding exactly one token.
    lookahead: Option<Token>,
}

impl<R: Source> Lexer<R> {
    pub fn new(src: R) -> Self {
        Self { src, line: 1, lookahead: None }
    }

    /// Current line of the scan cursor.
    pub fn line(&self) -> u32 {
        self.line
    }

    /// Go back to the start of input. Clears the lookahead buffer.
    pub fn rewind(&mut self) -> Result<()> {
        self.src.rewind_to_start()?;
        self.line = 1;
        self.lookahead = None;
        Ok(())
    }

    pub fn into_inner(self) -> R {
        self.src
    }

    /// Look at the next token without consuming it.
    ///
    /// # Panics
    ///
    /// Only one token of lookahead exists. Peeking again before the held
    /// token is consumed with [`next_token`](Self::next_token) panics.
    pub fn peek(&mut self) -> Result<&Token> {
        assert!(
            self.lookahead.is_none(),
            "only single token lookahead supported"
        );
        let tok = self.scan()?;
        Ok(self.lookahead.insert(tok))
    }

    /// Consume the next token, handing back the peeked one if there is one.
    pub fn next_token(&mut self) -> Result<Token> {
        let tok = match self.lookahead.take() {
            Some(tok) => tok,
            None => self.scan()?,
        };
        trace!(kind = %tok.kind, text = %tok.text, line = tok.line, "token");
        Ok(tok)
    }

    fn peek_byte(&mut self) -> Result<Option<u8>> {
        Ok(self.src.fill_buf()?.first().copied())
    }

    fn bump(&mut self) {
        self.src.consume(1);
    }

    fn scan(&mut self) -> Result<Token> {
        loop {
            let line = self.line;
            let Some(b) = self.peek_byte()? else {
                return Ok(Token::new(TokenKind::Eof, "", line));
            };

            let (kind, text) = match b {
                b' ' | b'\t' | b'\r' => {
                    self.bump();
                    continue;
                }
                b'\n' => {
                    self.line += 1;
                    self.bump();
                    continue;
                }
                b if b.is_ascii_alphabetic() || b == b'_' => {
                    let text = self.take_while(|c| c.is_ascii_alphanumeric() || c == b'_')?;
                    return Ok(Token::new(TokenKind::Identifier, text, line));
                }
                b if b.is_ascii_digit() => {
                    let text = self.take_while(|c| c.is_ascii_digit() || c == b'.')?;
                    return Ok(Token::new(TokenKind::Number, text, line));
                }
                b'"' => return self.quoted(line),
                b'-' => return self.edge_op(line),
                b'=' => (TokenKind::Equal, "="),
                b',' => (TokenKind::Comma, ","),
                b'[' => (TokenKind::LBracket, "["),
                b']' => (TokenKind::RBracket, "]"),
                b'{' => (TokenKind::LBrace, "{"),
                b'}' => (TokenKind::RBrace, "}"),
                other => {
                    let ch = self.decode_char(other)?;
                    return Err(Error::UnexpectedChar { line, ch });
                }
            };
            self.bump();
            return Ok(Token::new(kind, text, line));
        }
    }

    /// The full character starting at `lead`, for diagnostics.
    fn decode_char(&mut self, lead: u8) -> Result<char> {
        let width = match lead {
            0xC0..=0xDF => 2,
            0xE0..=0xEF => 3,
            0xF0..=0xF7 => 4,
            _ => 1,
        };
        let mut bytes = Vec::with_capacity(width);
        while bytes.len() < width {
            let Some(b) = self.peek_byte()? else { break };
            bytes.push(b);
            self.bump();
        }
        Ok(std::str::from_utf8(&bytes)
            .ok()
            .and_then(|s| s.chars().next())
            .unwrap_or(char::REPLACEMENT_CHARACTER))
    }

    fn take_while(&mut self, pred: impl Fn(u8) -> bool) -> Result<String> {
        let mut buf = Vec::new();
        while let Some(b) = self.peek_byte()? {
            if !pred(b) {
                break;
            }
            buf.push(b);
            self.bump();
        }
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }

    /// `"` ... `"`, both quotes kept in the token text. A quote directly
    /// after a backslash does not end the string.
    fn quoted(&mut self, line: u32) -> Result<Token> {
        let mut buf = vec![b'"'];
        self.bump();

        let mut prev = b'"';
        loop {
            let Some(b) = self.peek_byte()? else {
                return Err(Error::UnterminatedString { line: self.line });
            };
            self.bump();
            buf.push(b);

            if b == b'\n' {
                self.line += 1;
            }
            if b == b'"' && prev != b'\\' {
                break;
            }
            prev = b;
        }

        let text = String::from_utf8_lossy(&buf).into_owned();
        Ok(Token::new(TokenKind::QuotedString, text, line))
    }

    fn edge_op(&mut self, line: u32) -> Result<Token> {
        self.bump(); // '-'
        match self.peek_byte()? {
            Some(b'>') => {
                self.bump();
                Ok(Token::new(TokenKind::Arrow, "->", line))
            }
            Some(b'-') => {
                self.bump();
                Ok(Token::new(TokenKind::UndirectedEdge, "--", line))
            }
            Some(other) => Err(Error::MalformedEdgeOp {
                line,
                found: format!("'{}'", char::from(other)),
            }),
            None => Err(Error::MalformedEdgeOp { line, found: "end of input".into() }),
        }
    }
}

/// Tokenize a whole string, `Eof` token included.
pub fn tokenize(input: &str) -> Result<Vec<Token>> {
    let mut lexer = Lexer::new(Cursor::new(input.as_bytes()));
    let mut tokens = Vec::new();
    loop {
        let tok = lexer.next_token()?;
        let done = tok.kind == TokenKind::Eof;
        tokens.push(tok);
        if done {
            return Ok(tokens);
        }
    }
}
