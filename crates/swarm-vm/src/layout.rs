//! Scope layouts and symbol resolution.
//!
//! Lowered from the parsed scope declarations; alive only during
//! compilation. Once bytecode is emitted the tables are discarded; every
//! symbol has been baked down to a (scope-id, offset) pair.

use std::fmt;

use indexmap::IndexMap;
use swarm_dsl::{Reference, ScopeDecl, ScopeKind, Script};

use crate::error::CompileError;

/// Scope identifiers as encoded in operand pairs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ScopeId {
    Global = 0,
    Work = 1,
    Local = 2,
}

impl ScopeId {
    /// Decode a scope-id byte.
    pub fn from_byte(byte: u8) -> Option<ScopeId> {
        match byte {
            0 => Some(ScopeId::Global),
            1 => Some(ScopeId::Work),
            2 => Some(ScopeId::Local),
            _ => None,
        }
    }
}

impl From<ScopeKind> for ScopeId {
    fn from(kind: ScopeKind) -> Self {
        match kind {
            ScopeKind::Global => ScopeId::Global,
            ScopeKind::Work => ScopeId::Work,
            ScopeKind::Local => ScopeId::Local,
        }
    }
}

impl fmt::Display for ScopeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ScopeId::Global => "global",
            ScopeId::Work => "work",
            ScopeId::Local => "local",
        };
        f.write_str(name)
    }
}

/// Name→offset table for one scope.
#[derive(Debug, Default)]
pub struct ScopeLayout {
    /// Declared byte size from the scope header.
    pub size: u32,
    fields: IndexMap<String, u8>,
}

impl ScopeLayout {
    fn from_decl(decl: &ScopeDecl) -> Self {
        let mut fields = IndexMap::new();
        for field in &decl.fields {
            for (name, offset) in field.entries() {
                // Range and uniqueness were validated by the parser.
                fields.insert(name, offset as u8);
            }
        }
        Self {
            size: decl.size,
            fields,
        }
    }

    /// Offset of `name` in this scope, if declared.
    pub fn offset_of(&self, name: &str) -> Option<u8> {
        self.fields.get(name).copied()
    }

    /// Number of symbols in this scope.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the scope declares no symbols.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// The three scope tables, searched in priority order.
#[derive(Debug)]
pub struct ScopeLayouts {
    global: ScopeLayout,
    work: ScopeLayout,
    local: ScopeLayout,
}

impl ScopeLayouts {
    /// Lower the parsed scope declarations.
    pub fn from_script(script: &Script) -> Self {
        Self {
            global: ScopeLayout::from_decl(&script.global),
            work: ScopeLayout::from_decl(&script.work),
            local: ScopeLayout::from_decl(&script.local),
        }
    }

    /// The layout for one scope.
    pub fn layout(&self, id: ScopeId) -> &ScopeLayout {
        match id {
            ScopeId::Global => &self.global,
            ScopeId::Work => &self.work,
            ScopeId::Local => &self.local,
        }
    }

    /// Resolve a reference to its (scope-id, offset) pair.
    ///
    /// Unqualified names search Global, then Work, then Local; the first hit
    /// wins, so a lower-priority binding of the same name is reachable only
    /// through a scope qualifier.
    pub fn resolve(&self, reference: &Reference) -> Result<(ScopeId, u8), CompileError> {
        let candidates: &[ScopeId] = match reference.scope {
            Some(ScopeKind::Global) => &[ScopeId::Global],
            Some(ScopeKind::Work) => &[ScopeId::Work],
            Some(ScopeKind::Local) => &[ScopeId::Local],
            None => &[ScopeId::Global, ScopeId::Work, ScopeId::Local],
        };
        for &id in candidates {
            if let Some(offset) = self.layout(id).offset_of(&reference.name) {
                return Ok((id, offset));
            }
        }
        Err(CompileError::UnresolvedSymbol {
            name: reference.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use swarm_dsl::parse;

    fn layouts(source: &str) -> ScopeLayouts {
        ScopeLayouts::from_script(&parse(source).unwrap())
    }

    fn plain(name: &str) -> Reference {
        Reference {
            scope: None,
            name: name.into(),
        }
    }

    fn qualified(scope: ScopeKind, name: &str) -> Reference {
        Reference {
            scope: Some(scope),
            name: name.into(),
        }
    }

    #[test]
    fn test_global_shadows_work() {
        let layouts = layouts(
            "GlobalScope[8]{[4]->Life;};
             WorkScope[4]{[0]->Life;};
             LocalScope[1]{};
             Worker{};",
        );
        assert_eq!(
            layouts.resolve(&plain("Life")).unwrap(),
            (ScopeId::Global, 4)
        );
    }

    #[test]
    fn test_qualifier_reaches_shadowed_binding() {
        let layouts = layouts(
            "GlobalScope[8]{[4]->Life;};
             WorkScope[4]{[0]->Life;};
             LocalScope[1]{};
             Worker{};",
        );
        assert_eq!(
            layouts.resolve(&qualified(ScopeKind::Work, "Life")).unwrap(),
            (ScopeId::Work, 0)
        );
    }

    #[test]
    fn test_composite_offset_packing() {
        let layouts = layouts(
            "GlobalScope[1]{};
             WorkScope[8]{[0,4]->Pos[X,Y];};
             LocalScope[1]{};
             Worker{};",
        );
        assert_eq!(
            layouts.resolve(&plain("Pos.X")).unwrap(),
            (ScopeId::Work, 0)
        );
        assert_eq!(
            layouts.resolve(&plain("Pos.Y")).unwrap(),
            (ScopeId::Work, 4)
        );
        assert!(layouts.resolve(&plain("Pos")).is_err());
    }

    #[test]
    fn test_unresolved_symbol() {
        let layouts = layouts(
            "GlobalScope[1]{};
             WorkScope[1]{};
             LocalScope[1]{};
             Worker{};",
        );
        let err = layouts.resolve(&plain("Missing")).unwrap_err();
        assert_eq!(
            err,
            CompileError::UnresolvedSymbol {
                name: "Missing".into()
            }
        );
    }

    #[test]
    fn test_qualified_miss_does_not_fall_through() {
        let layouts = layouts(
            "GlobalScope[4]{[0]->Counter;};
             WorkScope[1]{};
             LocalScope[1]{};
             Worker{};",
        );
        let err = layouts
            .resolve(&qualified(ScopeKind::Work, "Counter"))
            .unwrap_err();
        assert_eq!(
            err,
            CompileError::UnresolvedSymbol {
                name: "WorkScope::Counter".into()
            }
        );
    }
}
