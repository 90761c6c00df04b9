//! Script front end for the swarm batched VM.
//!
//! A script declares three fixed memory scopes (`GlobalScope`, `WorkScope`,
//! `LocalScope`) and one `Worker` routine. This crate turns the text into a
//! [`Script`] AST; the back end lowers that AST to bytecode.

pub mod ast;
pub mod error;
pub mod lexer;
pub mod parser;

pub use ast::{FieldDecl, Reference, ScopeDecl, ScopeKind, Script, Statement};
pub use error::ParseError;
pub use parser::parse;
