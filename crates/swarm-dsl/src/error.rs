//! Parse errors.

use thiserror::Error;

use crate::ast::ScopeKind;

/// Errors produced while lexing or parsing a script.
///
/// Compilation never partially succeeds: the first structural fault aborts
/// with the variant naming the scope, block, or token at fault.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("missing scope declaration: expected {expected}")]
    MissingScope { expected: ScopeKind },

    #[error("malformed size specifier for {scope}")]
    MalformedScopeSize { scope: ScopeKind },

    #[error("malformed field declaration in {scope}: {detail}")]
    MalformedScopeFields { scope: ScopeKind, detail: String },

    #[error("Worker block missing")]
    MissingWorkerBlock,

    #[error("missing `{delimiter}` in {block} block")]
    MissingBlockDelimiter {
        block: &'static str,
        delimiter: &'static str,
    },

    #[error("comment at byte {at} runs to end of input without a line break")]
    UnterminatedComment { at: usize },

    #[error("unexpected {found} {context} at byte {at}")]
    UnexpectedToken {
        found: String,
        context: &'static str,
        at: usize,
    },

    #[error("unexpected end of input {context}")]
    UnexpectedEof { context: &'static str },
}
