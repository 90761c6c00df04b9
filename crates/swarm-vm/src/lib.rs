//! Swarm VM - batched bytecode virtual machine for per-instance scripts
//!
//! Compiles a swarm script (three fixed memory scopes plus one worker
//! routine) to flat bytecode with memory offsets baked in, then executes it
//! against a shared global region, an array of per-instance work units, and
//! a VM-owned scratch region, one unit after another, until every unit has
//! halted for the current tick.

pub mod bytecode;
pub mod compiler;
pub mod error;
pub mod executor;
pub mod layout;
mod memory;

pub use bytecode::{rule_for, OpRule, Opcode, Program, OP_RULES};
pub use compiler::{compile, compile_with, CompileOptions, Strictness};
pub use error::{CompileError, VmError};
pub use executor::{run, run_with, RunOptions, LOCAL_SCOPE_SIZE};
pub use layout::{ScopeId, ScopeLayout, ScopeLayouts};
pub use swarm_dsl::ParseError;
