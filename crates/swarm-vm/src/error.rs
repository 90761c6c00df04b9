//! Compile-time and runtime errors.

use thiserror::Error;

use crate::layout::ScopeId;

/// Errors raised while lowering a script to bytecode.
///
/// Parse-stage faults pass through unchanged so hosts can match on the
/// structural kind; the remaining variants are emission-stage faults.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    #[error(transparent)]
    Parse(#[from] swarm_dsl::ParseError),

    #[error("unresolved symbol: {name}")]
    UnresolvedSymbol { name: String },

    #[error("unknown statement: {namespace}::{operator}")]
    UnknownStatement { namespace: String, operator: String },

    #[error("{namespace}::{operator} takes {expected} operand(s), found {found}")]
    OperandCount {
        namespace: String,
        operator: String,
        expected: u8,
        found: usize,
    },

    #[error("{namespace}::{operator} requires an assignment target")]
    MissingAssignment { namespace: String, operator: String },

    #[error("{namespace}::{operator} does not assign to a target")]
    UnexpectedAssignment { namespace: String, operator: String },
}

/// Runtime faults.
///
/// Bad opcodes, bad scope ids, offsets past a region's end, and truncated
/// streams are all reported instead of dereferenced.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VmError {
    #[error("invalid opcode {opcode:#04x} at pc {pc}")]
    InvalidOpcode { opcode: u8, pc: usize },

    #[error("invalid scope id {scope}")]
    InvalidScopeId { scope: u8 },

    #[error("offset {offset}+{width} out of bounds for the {scope} region of {len} bytes")]
    OutOfBoundsOffset {
        scope: ScopeId,
        offset: u8,
        width: usize,
        len: usize,
    },

    #[error("program truncated at pc {pc}")]
    TruncatedProgram { pc: usize },

    #[error("work region of {len} bytes cannot hold {units} unit(s) of {stride} bytes")]
    WorkRegionTooSmall {
        len: usize,
        stride: usize,
        units: usize,
    },
}
