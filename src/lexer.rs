//! Lexer for mini-C
//!
//! The lexer converts source code into a stream of tokens with line and
//! column metadata. It uses the `logos` crate for the actual scanning.
//!
//! Lexing never fails: an unrecognized character becomes a single
//! [`TokenKind::Invalid`] token, and once the input is exhausted every
//! further call yields the distinguished EOF token.

use crate::span::{Position, Span};
use crate::token::{Token, TokenKind};
use logos::Logos;

/// The lexer for mini-C
pub struct Lexer<'src> {
    source: &'src str,
    inner: logos::Lexer<'src, TokenKind>,
    /// Byte offset the position cursor has been advanced to
    cursor: usize,
    line: u32,
    column: u32,
}

impl<'src> Lexer<'src> {
    /// Create a new lexer for the given source code
    pub fn new(source: &'src str) -> Self {
        Self {
            source,
            inner: TokenKind::lexer(source),
            cursor: 0,
            line: 1,
            column: 1,
        }
    }

    /// Get the source code
    pub fn source(&self) -> &'src str {
        self.source
    }

    /// Advance the line/column cursor up to `offset`.
    ///
    /// A newline increments the line and resets the column to 1.
    fn advance_to(&mut self, offset: usize) {
        for ch in self.source[self.cursor..offset].chars() {
            if ch == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
        self.cursor = offset;
    }

    /// Get the next token. Past the end of input this returns EOF, forever.
    pub fn next_token(&mut self) -> Token {
        match self.inner.next() {
            Some(Ok(kind)) => {
                let span = self.inner.span();
                self.advance_to(span.start);
                let pos = Position::new(self.line, self.column);
                Token::new(kind, Span::new(span.start, span.end), pos)
            }
            Some(Err(())) => {
                // Unrecognized character: fall back to a single-character
                // Invalid token rather than an error.
                let span = self.inner.span();
                self.advance_to(span.start);
                let pos = Position::new(self.line, self.column);
                Token::new(TokenKind::Invalid, Span::new(span.start, span.end), pos)
            }
            None => {
                let end = self.source.len();
                self.advance_to(end);
                let pos = Position::new(self.line, self.column);
                Token::new(TokenKind::Eof, Span::new(end, end), pos)
            }
        }
    }

    /// Collect all tokens into a vector, EOF token included
    pub fn tokenize(mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token();
            let done = token.kind == TokenKind::Eof;
            tokens.push(token);
            if done {
                break;
            }
        }
        tokens
    }
}

impl<'src> Iterator for Lexer<'src> {
    type Item = Token;

    fn next(&mut self) -> Option<Self::Item> {
        let token = self.next_token();
        if token.kind == TokenKind::Eof {
            None
        } else {
            Some(token)
        }
    }
}

/// Helper function to lex source code
pub fn lex(source: &str) -> Vec<Token> {
    Lexer::new(source).tokenize()
}
