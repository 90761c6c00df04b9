//! AST for swarm scripts.
//!
//! Plain data produced by the parser and consumed by the bytecode emitter.
//! Nothing here survives compilation; offsets are baked into the emitted
//! instruction stream.

use std::fmt;

/// The three fixed memory scopes, in resolution-priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScopeKind {
    Global,
    Work,
    Local,
}

impl ScopeKind {
    /// All scopes in resolution-priority order.
    pub const ALL: [ScopeKind; 3] = [ScopeKind::Global, ScopeKind::Work, ScopeKind::Local];

    /// The declaration keyword for this scope.
    pub fn keyword(self) -> &'static str {
        match self {
            ScopeKind::Global => "GlobalScope",
            ScopeKind::Work => "WorkScope",
            ScopeKind::Local => "LocalScope",
        }
    }
}

impl fmt::Display for ScopeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// A parsed script: three scope declarations plus the worker routine.
#[derive(Debug, Clone, PartialEq)]
pub struct Script {
    pub global: ScopeDecl,
    pub work: ScopeDecl,
    pub local: ScopeDecl,
    pub worker: Vec<Statement>,
}

impl Script {
    /// The scope declaration for `kind`.
    pub fn scope(&self, kind: ScopeKind) -> &ScopeDecl {
        match kind {
            ScopeKind::Global => &self.global,
            ScopeKind::Work => &self.work,
            ScopeKind::Local => &self.local,
        }
    }
}

/// One scope declaration: declared byte size plus its field list.
#[derive(Debug, Clone, PartialEq)]
pub struct ScopeDecl {
    pub kind: ScopeKind,
    pub size: u32,
    pub fields: Vec<FieldDecl>,
}

/// One field declaration inside a scope block.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldDecl {
    /// `[offset]->Name;`
    Simple { offset: u32, name: String },
    /// `[off0,off1,...]->Base[Sub0,Sub1,...];`
    ///
    /// Expands into one symbol per (offset, sub-name) pair, registered as
    /// `Base.SubN`. The parser guarantees equal list lengths.
    Composite {
        offsets: Vec<u32>,
        base: String,
        subs: Vec<String>,
    },
}

impl FieldDecl {
    /// The (symbol name, offset) entries this declaration expands to.
    pub fn entries(&self) -> Vec<(String, u32)> {
        match self {
            FieldDecl::Simple { offset, name } => vec![(name.clone(), *offset)],
            FieldDecl::Composite {
                offsets,
                base,
                subs,
            } => offsets
                .iter()
                .zip(subs)
                .map(|(offset, sub)| (format!("{base}.{sub}"), *offset))
                .collect(),
        }
    }
}

/// One worker statement: `[lhs =] Namespace::Op(operand, ...)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    /// Assignment target, when the statement has a `lhs =` prefix.
    pub target: Option<Reference>,
    pub namespace: String,
    /// Operator surface text: `++`, `--`, `+`, `-`, `*`, `>`, `<`, or a name.
    pub operator: String,
    pub operands: Vec<Reference>,
}

/// A variable reference, optionally qualified with a scope.
///
/// Unqualified references resolve by scope priority; qualified references
/// (`WorkScope::Life`) search only the named scope.
#[derive(Debug, Clone, PartialEq)]
pub struct Reference {
    pub scope: Option<ScopeKind>,
    /// Plain (`Counter`) or dotted (`Pos.X`) symbol name.
    pub name: String,
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.scope {
            Some(scope) => write!(f, "{scope}::{}", self.name),
            None => f.write_str(&self.name),
        }
    }
}
