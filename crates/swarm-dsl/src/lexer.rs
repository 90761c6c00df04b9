//! Lexer for swarm scripts.
//!
//! Uses Logos for fast, compile-time optimized tokenization.

use logos::{Logos, Span};

use crate::error::ParseError;

/// Token type for the script language
#[derive(Logos, Debug, Clone, Copy, PartialEq)]
#[logos(skip r"[ \t\r\n\f]+")]
pub enum Token<'src> {
    // === Comments ===
    /// A `//` comment terminated by a line break, skipped.
    #[regex(r"//[^\n]*\n", logos::skip)]
    Comment,

    /// A `//` comment that reaches end of input without a line break.
    #[regex(r"//[^\n]*")]
    UnterminatedComment,

    // === Section keywords ===
    #[token("GlobalScope")]
    GlobalScope,
    #[token("WorkScope")]
    WorkScope,
    #[token("LocalScope")]
    LocalScope,
    #[token("Worker")]
    Worker,

    // === Literals ===
    /// Unsigned integer literal (scope sizes and field offsets)
    #[regex(r"[0-9]+", |lex| lex.slice())]
    Int(&'src str),

    // === Identifiers ===
    /// Field, namespace, and operator names
    #[regex(r"[A-Za-z_][A-Za-z0-9_]*", |lex| lex.slice())]
    Ident(&'src str),

    // === Punctuation ===
    #[token("{")]
    BraceOpen,
    #[token("}")]
    BraceClose,
    #[token("(")]
    ParenOpen,
    #[token(")")]
    ParenClose,
    #[token("[")]
    BracketOpen,
    #[token("]")]
    BracketClose,

    #[token("::")]
    PathSep,
    #[token("->")]
    Arrow,
    #[token(";")]
    Semi,
    #[token(",")]
    Comma,
    #[token(".")]
    Dot,
    #[token("=")]
    Equals,

    // === Operators ===
    #[token("++")]
    PlusPlus,
    #[token("--")]
    MinusMinus,
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token(">")]
    Greater,
    #[token("<")]
    Less,
}

/// A token with its source span
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned<T> {
    pub token: T,
    pub span: Span,
}

impl<T> Spanned<T> {
    pub fn new(token: T, span: Span) -> Self {
        Self { token, span }
    }
}

/// Tokenize source code into a vector of spanned tokens
pub fn lex(source: &str) -> Result<Vec<Spanned<Token<'_>>>, ParseError> {
    let mut lexer = Token::lexer(source);
    let mut tokens = Vec::new();

    while let Some(result) = lexer.next() {
        match result {
            Ok(Token::Comment) => {}
            Ok(Token::UnterminatedComment) => {
                return Err(ParseError::UnterminatedComment {
                    at: lexer.span().start,
                });
            }
            Ok(token) => tokens.push(Spanned::new(token, lexer.span())),
            Err(()) => {
                return Err(ParseError::UnexpectedToken {
                    found: format!("`{}`", lexer.slice()),
                    context: "in script",
                    at: lexer.span().start,
                });
            }
        }
    }

    Ok(tokens)
}
