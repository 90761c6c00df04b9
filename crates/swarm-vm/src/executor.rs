//! Bytecode executor
//!
//! Drives one compiled routine across a batch of work units. Each unit
//! restarts the program counter at zero and runs until its halt; the call
//! returns only after the final unit halts. Dispatch is a `match` over the
//! decoded opcode; every memory access goes through the bounds-checked
//! region accessors.

use tracing::{debug, trace};

use crate::bytecode::{Opcode, Program};
use crate::error::VmError;
use crate::memory::Regions;

/// Fixed capacity of the VM-owned local scratch region.
pub const LOCAL_SCOPE_SIZE: usize = 256;

/// Run options.
#[derive(Debug, Clone, Copy)]
pub struct RunOptions {
    /// Re-zero the local scratch before each work unit. When disabled,
    /// scratch contents carry over from one unit to the next within a run.
    pub zero_local: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self { zero_local: true }
    }
}

/// Run `program` over a batch of work units with default options.
///
/// `work` holds `unit_count` contiguous units of `stride` bytes each;
/// `global` is shared by every unit. See [`run_with`].
pub fn run(
    program: &Program,
    global: &mut [u8],
    work: &mut [u8],
    stride: usize,
    unit_count: usize,
) -> Result<(), VmError> {
    run_with(program, global, work, stride, unit_count, RunOptions::default())
}

/// Run `program` over a batch of work units.
///
/// Units execute strictly in increasing index order, each from program
/// counter zero to its halt. Returns immediately when `unit_count` is zero.
/// Any fault (bad opcode, bad scope id, out-of-range offset, truncated
/// stream, undersized work region) aborts the call with a [`VmError`].
pub fn run_with(
    program: &Program,
    global: &mut [u8],
    work: &mut [u8],
    stride: usize,
    unit_count: usize,
    options: RunOptions,
) -> Result<(), VmError> {
    if unit_count == 0 {
        return Ok(());
    }
    let needed = stride
        .checked_mul(unit_count)
        .ok_or(VmError::WorkRegionTooSmall {
            len: work.len(),
            stride,
            units: unit_count,
        })?;
    if work.len() < needed {
        return Err(VmError::WorkRegionTooSmall {
            len: work.len(),
            stride,
            units: unit_count,
        });
    }

    debug!(
        units = unit_count,
        stride,
        bytes = program.len(),
        "vm run start"
    );
    let code = program.bytes();
    let mut local = vec![0u8; LOCAL_SCOPE_SIZE];

    for unit in 0..unit_count {
        if options.zero_local && unit > 0 {
            local.fill(0);
        }
        let base = unit * stride;
        let mut regions = Regions {
            global: &mut *global,
            work: &mut work[base..base + stride],
            local: &mut local,
        };
        run_unit(code, &mut regions)?;
        trace!(unit, "work unit halted");
    }
    Ok(())
}

/// Execute the routine once, for the unit currently mapped into `regions`.
fn run_unit(code: &[u8], regions: &mut Regions<'_>) -> Result<(), VmError> {
    let mut pc = 0usize;
    loop {
        let byte = *code.get(pc).ok_or(VmError::TruncatedProgram { pc })?;
        let opcode =
            Opcode::from_byte(byte).ok_or(VmError::InvalidOpcode { opcode: byte, pc })?;

        match opcode {
            Opcode::Halt => return Ok(()),
            Opcode::HaltConditional => {
                if regions.read_bool(pair(code, pc, 0)?)? {
                    return Ok(());
                }
            }

            Opcode::IncFloat => {
                let target = pair(code, pc, 0)?;
                let value = regions.read_f32(target)?;
                regions.write_f32(target, value + 1.0)?;
            }
            Opcode::DecFloat => {
                let target = pair(code, pc, 0)?;
                let value = regions.read_f32(target)?;
                regions.write_f32(target, value - 1.0)?;
            }
            Opcode::AddFloat => {
                let target = pair(code, pc, 0)?;
                let lhs = regions.read_f32(pair(code, pc, 1)?)?;
                let rhs = regions.read_f32(pair(code, pc, 2)?)?;
                regions.write_f32(target, lhs + rhs)?;
            }
            Opcode::SubFloat => {
                let target = pair(code, pc, 0)?;
                let lhs = regions.read_f32(pair(code, pc, 1)?)?;
                let rhs = regions.read_f32(pair(code, pc, 2)?)?;
                regions.write_f32(target, lhs - rhs)?;
            }
            Opcode::MulFloat => {
                let target = pair(code, pc, 0)?;
                let lhs = regions.read_f32(pair(code, pc, 1)?)?;
                let rhs = regions.read_f32(pair(code, pc, 2)?)?;
                regions.write_f32(target, lhs * rhs)?;
            }
            Opcode::GreaterFloat => {
                let target = pair(code, pc, 0)?;
                let lhs = regions.read_f32(pair(code, pc, 1)?)?;
                let rhs = regions.read_f32(pair(code, pc, 2)?)?;
                regions.write_bool(target, lhs > rhs)?;
            }
            Opcode::LessFloat => {
                let target = pair(code, pc, 0)?;
                let lhs = regions.read_f32(pair(code, pc, 1)?)?;
                let rhs = regions.read_f32(pair(code, pc, 2)?)?;
                regions.write_bool(target, lhs < rhs)?;
            }

            Opcode::IncInt => {
                let target = pair(code, pc, 0)?;
                let value = regions.read_i32(target)?;
                regions.write_i32(target, value.wrapping_add(1))?;
            }
            Opcode::DecInt => {
                let target = pair(code, pc, 0)?;
                let value = regions.read_i32(target)?;
                regions.write_i32(target, value.wrapping_sub(1))?;
            }
            Opcode::IncUint => {
                let target = pair(code, pc, 0)?;
                let value = regions.read_u32(target)?;
                regions.write_u32(target, value.wrapping_add(1))?;
            }
            Opcode::DecUint => {
                let target = pair(code, pc, 0)?;
                let value = regions.read_u32(target)?;
                regions.write_u32(target, value.wrapping_sub(1))?;
            }
            Opcode::AddInt => {
                let target = pair(code, pc, 0)?;
                let lhs = regions.read_i32(pair(code, pc, 1)?)?;
                let rhs = regions.read_i32(pair(code, pc, 2)?)?;
                regions.write_i32(target, lhs.wrapping_add(rhs))?;
            }
            Opcode::SubInt => {
                let target = pair(code, pc, 0)?;
                let lhs = regions.read_i32(pair(code, pc, 1)?)?;
                let rhs = regions.read_i32(pair(code, pc, 2)?)?;
                regions.write_i32(target, lhs.wrapping_sub(rhs))?;
            }
            Opcode::MulInt => {
                let target = pair(code, pc, 0)?;
                let lhs = regions.read_i32(pair(code, pc, 1)?)?;
                let rhs = regions.read_i32(pair(code, pc, 2)?)?;
                regions.write_i32(target, lhs.wrapping_mul(rhs))?;
            }
        }

        pc += opcode.width();
    }
}

/// Fetch the `index`th (scope-id, offset) pair of the instruction at `pc`.
fn pair(code: &[u8], pc: usize, index: usize) -> Result<(u8, u8), VmError> {
    let at = pc + 1 + 2 * index;
    match (code.get(at), code.get(at + 1)) {
        (Some(&scope), Some(&offset)) => Ok((scope, offset)),
        _ => Err(VmError::TruncatedProgram { pc }),
    }
}
