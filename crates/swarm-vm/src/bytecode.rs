//! Bytecode instruction set
//!
//! Flat, fixed-width instruction encoding with memory offsets baked in at
//! compile time. Each instruction is an opcode byte followed by zero, one,
//! or three (scope-id, offset) operand pairs, giving total widths of 1, 3,
//! or 7 bytes.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Single-byte instruction identifiers.
///
/// Operand types are fixed per opcode: f32 for the `Float` group, i32/u32
/// for the integer groups, and a one-byte bool (non-zero = true) for
/// comparison results and the conditional halt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum Opcode {
    /// End the current work unit's pass.
    Halt = 0,
    /// operand += 1.0
    IncFloat = 1,
    /// operand -= 1.0
    DecFloat = 2,
    /// lhs = rhs0 + rhs1
    AddFloat = 3,
    /// lhs = rhs0 - rhs1
    SubFloat = 4,
    /// lhs = rhs0 * rhs1
    MulFloat = 5,
    /// operand += 1
    IncInt = 6,
    /// operand -= 1
    DecInt = 7,
    /// operand += 1 (unsigned). No surface syntax; decode-only.
    IncUint = 8,
    /// operand -= 1 (unsigned). No surface syntax; decode-only.
    DecUint = 9,
    /// lhs = rhs0 + rhs1
    AddInt = 10,
    /// lhs = rhs0 - rhs1
    SubInt = 11,
    /// lhs = rhs0 * rhs1
    MulInt = 12,
    /// Halt the current unit now if the bool at the operand is true.
    HaltConditional = 13,
    /// lhs = rhs0 > rhs1 (bool)
    GreaterFloat = 14,
    /// lhs = rhs0 < rhs1 (bool)
    LessFloat = 15,
}

impl Opcode {
    /// Decode an opcode byte.
    pub fn from_byte(byte: u8) -> Option<Opcode> {
        match byte {
            0 => Some(Opcode::Halt),
            1 => Some(Opcode::IncFloat),
            2 => Some(Opcode::DecFloat),
            3 => Some(Opcode::AddFloat),
            4 => Some(Opcode::SubFloat),
            5 => Some(Opcode::MulFloat),
            6 => Some(Opcode::IncInt),
            7 => Some(Opcode::DecInt),
            8 => Some(Opcode::IncUint),
            9 => Some(Opcode::DecUint),
            10 => Some(Opcode::AddInt),
            11 => Some(Opcode::SubInt),
            12 => Some(Opcode::MulInt),
            13 => Some(Opcode::HaltConditional),
            14 => Some(Opcode::GreaterFloat),
            15 => Some(Opcode::LessFloat),
            _ => None,
        }
    }

    /// Number of (scope-id, offset) pairs following the opcode byte.
    pub fn operand_pairs(self) -> usize {
        match self {
            Opcode::Halt => 0,
            Opcode::IncFloat
            | Opcode::DecFloat
            | Opcode::IncInt
            | Opcode::DecInt
            | Opcode::IncUint
            | Opcode::DecUint
            | Opcode::HaltConditional => 1,
            Opcode::AddFloat
            | Opcode::SubFloat
            | Opcode::MulFloat
            | Opcode::AddInt
            | Opcode::SubInt
            | Opcode::MulInt
            | Opcode::GreaterFloat
            | Opcode::LessFloat => 3,
        }
    }

    /// Total encoded instruction width in bytes.
    pub fn width(self) -> usize {
        1 + 2 * self.operand_pairs()
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mnemonic = match self {
            Opcode::Halt => "HALT",
            Opcode::IncFloat => "INC_FLOAT",
            Opcode::DecFloat => "DEC_FLOAT",
            Opcode::AddFloat => "ADD_FLOAT",
            Opcode::SubFloat => "SUB_FLOAT",
            Opcode::MulFloat => "MUL_FLOAT",
            Opcode::IncInt => "INC_INT",
            Opcode::DecInt => "DEC_INT",
            Opcode::IncUint => "INC_UINT",
            Opcode::DecUint => "DEC_UINT",
            Opcode::AddInt => "ADD_INT",
            Opcode::SubInt => "SUB_INT",
            Opcode::MulInt => "MUL_INT",
            Opcode::HaltConditional => "HALT_COND",
            Opcode::GreaterFloat => "GT_FLOAT",
            Opcode::LessFloat => "LT_FLOAT",
        };
        f.write_str(mnemonic)
    }
}

/// How one `Namespace::Operator` pair is emitted.
#[derive(Debug, Clone, Copy)]
pub struct OpRule {
    pub namespace: &'static str,
    pub operator: &'static str,
    pub opcode: Opcode,
    /// Whether the statement assigns into a `lhs =` target.
    pub assigns: bool,
    /// Number of right-hand operands the statement consumes.
    pub operand_count: u8,
}

/// The fixed emission table consulted by the compiler.
///
/// `IncUint`/`DecUint` are deliberately absent: the VM decodes them, but the
/// grammar has no namespace that emits them.
pub const OP_RULES: &[OpRule] = &[
    OpRule {
        namespace: "VM",
        operator: "Halt",
        opcode: Opcode::Halt,
        assigns: false,
        operand_count: 0,
    },
    OpRule {
        namespace: "VM",
        operator: "HaltConditional",
        opcode: Opcode::HaltConditional,
        assigns: false,
        operand_count: 1,
    },
    OpRule {
        namespace: "Float",
        operator: "++",
        opcode: Opcode::IncFloat,
        assigns: false,
        operand_count: 1,
    },
    OpRule {
        namespace: "Float",
        operator: "--",
        opcode: Opcode::DecFloat,
        assigns: false,
        operand_count: 1,
    },
    OpRule {
        namespace: "Float",
        operator: "+",
        opcode: Opcode::AddFloat,
        assigns: true,
        operand_count: 2,
    },
    OpRule {
        namespace: "Float",
        operator: "-",
        opcode: Opcode::SubFloat,
        assigns: true,
        operand_count: 2,
    },
    OpRule {
        namespace: "Float",
        operator: "*",
        opcode: Opcode::MulFloat,
        assigns: true,
        operand_count: 2,
    },
    OpRule {
        namespace: "Float",
        operator: ">",
        opcode: Opcode::GreaterFloat,
        assigns: true,
        operand_count: 2,
    },
    OpRule {
        namespace: "Float",
        operator: "<",
        opcode: Opcode::LessFloat,
        assigns: true,
        operand_count: 2,
    },
    OpRule {
        namespace: "Int",
        operator: "++",
        opcode: Opcode::IncInt,
        assigns: false,
        operand_count: 1,
    },
    OpRule {
        namespace: "Int",
        operator: "--",
        opcode: Opcode::DecInt,
        assigns: false,
        operand_count: 1,
    },
    OpRule {
        namespace: "Int",
        operator: "+",
        opcode: Opcode::AddInt,
        assigns: true,
        operand_count: 2,
    },
    OpRule {
        namespace: "Int",
        operator: "-",
        opcode: Opcode::SubInt,
        assigns: true,
        operand_count: 2,
    },
    OpRule {
        namespace: "Int",
        operator: "*",
        opcode: Opcode::MulInt,
        assigns: true,
        operand_count: 2,
    },
];

/// Look up the emission rule for a (namespace, operator) pair.
pub fn rule_for(namespace: &str, operator: &str) -> Option<&'static OpRule> {
    OP_RULES
        .iter()
        .find(|rule| rule.namespace == namespace && rule.operator == operator)
}

/// A compiled script: the immutable bytecode artifact.
///
/// The buffer never changes after compilation; execution state (the program
/// counter) lives in the executor, so one `Program` can drive any number of
/// runs. Always terminated by a halt opcode.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Program {
    code: Vec<u8>,
}

impl Program {
    /// Wrap raw bytecode, e.g. reloaded from a persisted artifact.
    ///
    /// The bytes are not validated here; a corrupt stream surfaces as a
    /// reported error at run time.
    pub fn from_bytes(code: Vec<u8>) -> Self {
        Self { code }
    }

    /// The raw bytecode.
    pub fn bytes(&self) -> &[u8] {
        &self.code
    }

    /// Bytecode length in bytes.
    pub fn len(&self) -> usize {
        self.code.len()
    }

    /// Whether the program holds no bytecode at all.
    pub fn is_empty(&self) -> bool {
        self.code.is_empty()
    }
}

impl fmt::Display for Program {
    /// One-instruction-per-line disassembly; undecodable bytes are dumped
    /// raw so corrupt tails stay visible.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let code = self.bytes();
        let mut pc = 0;
        while pc < code.len() {
            let decoded = Opcode::from_byte(code[pc]).filter(|op| pc + op.width() <= code.len());
            match decoded {
                Some(opcode) => {
                    write!(f, "{pc:04}  {opcode}")?;
                    for pair in 0..opcode.operand_pairs() {
                        let scope = match code[pc + 1 + 2 * pair] {
                            0 => "global",
                            1 => "work",
                            2 => "local",
                            _ => "?",
                        };
                        write!(f, " {scope}+{}", code[pc + 2 + 2 * pair])?;
                    }
                    writeln!(f)?;
                    pc += opcode.width();
                }
                None => {
                    writeln!(f, "{pc:04}  .byte {:#04x}", code[pc])?;
                    pc += 1;
                }
            }
        }
        Ok(())
    }
}
