//! Token stream wrapper for the hand-written parser.

use crate::lexer::{Spanned, Token};

/// Token stream with lookahead and position tracking.
pub struct TokenStream<'toks, 'src> {
    tokens: &'toks [Spanned<Token<'src>>],
    pos: usize,
}

impl<'toks, 'src> TokenStream<'toks, 'src> {
    /// Create a new token stream.
    pub fn new(tokens: &'toks [Spanned<Token<'src>>]) -> Self {
        Self { tokens, pos: 0 }
    }

    /// Peek at the current token without consuming it.
    pub fn peek(&self) -> Option<Token<'src>> {
        self.tokens.get(self.pos).map(|s| s.token)
    }

    /// Peek at the nth token ahead without consuming.
    pub fn peek_nth(&self, n: usize) -> Option<Token<'src>> {
        self.tokens.get(self.pos + n).map(|s| s.token)
    }

    /// Advance to the next token and return the consumed one.
    pub fn advance(&mut self) -> Option<Token<'src>> {
        let token = self.peek();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    /// Check whether the current token equals `expected`.
    pub fn check(&self, expected: Token<'src>) -> bool {
        self.peek() == Some(expected)
    }

    /// Consume the current token if it equals `expected`.
    pub fn eat(&mut self, expected: Token<'src>) -> bool {
        if self.check(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    /// Check whether the stream is exhausted.
    pub fn at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    /// Byte offset of the current token, for diagnostics.
    ///
    /// At end of input this is the end of the last token.
    pub fn offset(&self) -> usize {
        match self.tokens.get(self.pos) {
            Some(spanned) => spanned.span.start,
            None => self.tokens.last().map(|s| s.span.end).unwrap_or(0),
        }
    }
}
