//! Bytecode compiler
//!
//! Drives the emission table and the symbol resolver over each worker
//! statement, appending an opcode byte plus (scope-id, offset) pairs to the
//! growing buffer. A trailing halt is always appended, so a compiled
//! program cannot run off the end of its buffer.

use tracing::{debug, warn};

use swarm_dsl::parse;

use crate::bytecode::{rule_for, Opcode, Program};
use crate::error::CompileError;
use crate::layout::ScopeLayouts;

/// How to treat a statement whose (namespace, operator) pair is not in the
/// emission table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Strictness {
    /// Fail compilation with [`CompileError::UnknownStatement`].
    #[default]
    Strict,
    /// Skip the statement, emitting nothing but a diagnostic.
    Lenient,
}

/// Compilation options.
#[derive(Debug, Clone, Copy, Default)]
pub struct CompileOptions {
    pub strictness: Strictness,
}

/// Compile a script with default options.
pub fn compile(source: &str) -> Result<Program, CompileError> {
    compile_with(source, CompileOptions::default())
}

/// Compile a script to a bytecode [`Program`].
///
/// Compilation is a pure function of the source text: identical text yields
/// byte-identical programs. It either fully succeeds or fails with the
/// first fault; no partial artifact is ever returned.
pub fn compile_with(source: &str, options: CompileOptions) -> Result<Program, CompileError> {
    let script = parse(source)?;
    let layouts = ScopeLayouts::from_script(&script);

    let mut code = Vec::new();
    for statement in &script.worker {
        let Some(rule) = rule_for(&statement.namespace, &statement.operator) else {
            match options.strictness {
                Strictness::Strict => {
                    return Err(CompileError::UnknownStatement {
                        namespace: statement.namespace.clone(),
                        operator: statement.operator.clone(),
                    });
                }
                Strictness::Lenient => {
                    warn!(
                        namespace = %statement.namespace,
                        operator = %statement.operator,
                        "skipping unknown statement"
                    );
                    continue;
                }
            }
        };

        if statement.operands.len() != rule.operand_count as usize {
            return Err(CompileError::OperandCount {
                namespace: statement.namespace.clone(),
                operator: statement.operator.clone(),
                expected: rule.operand_count,
                found: statement.operands.len(),
            });
        }

        code.push(rule.opcode as u8);
        match (&statement.target, rule.assigns) {
            (Some(target), true) => {
                let (scope, offset) = layouts.resolve(target)?;
                code.push(scope as u8);
                code.push(offset);
            }
            (None, true) => {
                return Err(CompileError::MissingAssignment {
                    namespace: statement.namespace.clone(),
                    operator: statement.operator.clone(),
                });
            }
            (Some(_), false) => {
                return Err(CompileError::UnexpectedAssignment {
                    namespace: statement.namespace.clone(),
                    operator: statement.operator.clone(),
                });
            }
            (None, false) => {}
        }
        for operand in &statement.operands {
            let (scope, offset) = layouts.resolve(operand)?;
            code.push(scope as u8);
            code.push(offset);
        }
    }
    code.push(Opcode::Halt as u8);

    debug!(
        statements = script.worker.len(),
        bytes = code.len(),
        "script compiled"
    );
    Ok(Program::from_bytes(code))
}
