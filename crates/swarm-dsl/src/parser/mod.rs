//! Hand-written recursive descent parser for swarm scripts.
//!
//! The grammar is a fixed sequence of four blocks:
//!
//! ```text
//! GlobalScope[<size>]{ <field>; ... };
//! WorkScope[<size>]{ <field>; ... };
//! LocalScope[<size>]{ <field>; ... };
//! Worker{ <statement>; ... };
//! ```
//!
//! Field and statement shapes are documented on the AST types. Every
//! structural fault aborts with a [`ParseError`] naming the scope, block, or
//! token at fault.

mod stream;

use std::collections::HashSet;

use crate::ast::{FieldDecl, Reference, ScopeDecl, ScopeKind, Script, Statement};
use crate::error::ParseError;
use crate::lexer::{lex, Token};
use stream::TokenStream;

/// Parse a complete script.
pub fn parse(source: &str) -> Result<Script, ParseError> {
    let tokens = lex(source)?;
    let mut stream = TokenStream::new(&tokens);

    let global = scope_decl(&mut stream, ScopeKind::Global)?;
    let work = scope_decl(&mut stream, ScopeKind::Work)?;
    let local = scope_decl(&mut stream, ScopeKind::Local)?;
    let worker = worker_block(&mut stream)?;

    if let Some(found) = stream.peek() {
        return Err(ParseError::UnexpectedToken {
            found: format!("{found:?}"),
            context: "after the Worker block",
            at: stream.offset(),
        });
    }

    Ok(Script {
        global,
        work,
        local,
        worker,
    })
}

/// Parse `<Kw>[<size>]{ <field>; ... };` for the given scope.
fn scope_decl(stream: &mut TokenStream, kind: ScopeKind) -> Result<ScopeDecl, ParseError> {
    let keyword = match kind {
        ScopeKind::Global => Token::GlobalScope,
        ScopeKind::Work => Token::WorkScope,
        ScopeKind::Local => Token::LocalScope,
    };
    if !stream.eat(keyword) {
        return Err(ParseError::MissingScope { expected: kind });
    }

    if !stream.eat(Token::BracketOpen) {
        return Err(ParseError::MalformedScopeSize { scope: kind });
    }
    let size = match stream.advance() {
        Some(Token::Int(digits)) => digits
            .parse::<u32>()
            .map_err(|_| ParseError::MalformedScopeSize { scope: kind })?,
        _ => return Err(ParseError::MalformedScopeSize { scope: kind }),
    };
    if !stream.eat(Token::BracketClose) {
        return Err(ParseError::MalformedScopeSize { scope: kind });
    }

    if !stream.eat(Token::BraceOpen) {
        return Err(ParseError::MissingBlockDelimiter {
            block: kind.keyword(),
            delimiter: "{",
        });
    }

    let mut fields = Vec::new();
    let mut seen = HashSet::new();
    loop {
        if stream.eat(Token::BraceClose) {
            break;
        }
        if stream.at_end() {
            return Err(ParseError::MissingBlockDelimiter {
                block: kind.keyword(),
                delimiter: "}",
            });
        }
        fields.push(field_decl(stream, kind, size, &mut seen)?);
    }

    if !stream.eat(Token::Semi) {
        return Err(ParseError::MissingBlockDelimiter {
            block: kind.keyword(),
            delimiter: ";",
        });
    }

    Ok(ScopeDecl { kind, size, fields })
}

/// Parse one field declaration and validate its expanded entries.
fn field_decl(
    stream: &mut TokenStream,
    scope: ScopeKind,
    size: u32,
    seen: &mut HashSet<String>,
) -> Result<FieldDecl, ParseError> {
    let malformed = |detail: String| ParseError::MalformedScopeFields { scope, detail };

    if !stream.eat(Token::BracketOpen) {
        return Err(malformed("expected `[` opening an offset list".into()));
    }
    let mut offsets = vec![field_offset(stream, scope)?];
    while stream.eat(Token::Comma) {
        offsets.push(field_offset(stream, scope)?);
    }
    if !stream.eat(Token::BracketClose) {
        return Err(malformed("expected `]` closing the offset list".into()));
    }
    if !stream.eat(Token::Arrow) {
        return Err(malformed("expected `->` after the offset list".into()));
    }
    let base = match stream.advance() {
        Some(Token::Ident(name)) => name.to_string(),
        _ => return Err(malformed("expected a field name after `->`".into())),
    };

    let decl = if stream.eat(Token::BracketOpen) {
        let mut subs = Vec::new();
        loop {
            match stream.advance() {
                Some(Token::Ident(sub)) => subs.push(sub.to_string()),
                _ => return Err(malformed(format!("expected a sub-field name in `{base}`"))),
            }
            if !stream.eat(Token::Comma) {
                break;
            }
        }
        if !stream.eat(Token::BracketClose) {
            return Err(malformed(format!(
                "expected `]` closing the sub-field list of `{base}`"
            )));
        }
        if offsets.len() != subs.len() {
            return Err(malformed(format!(
                "`{base}` declares {} offsets for {} sub-fields",
                offsets.len(),
                subs.len()
            )));
        }
        FieldDecl::Composite {
            offsets,
            base,
            subs,
        }
    } else {
        if offsets.len() != 1 {
            return Err(malformed(format!(
                "`{base}` declares {} offsets but no sub-field list",
                offsets.len()
            )));
        }
        FieldDecl::Simple {
            offset: offsets[0],
            name: base,
        }
    };

    if !stream.eat(Token::Semi) {
        return Err(malformed("missing `;` after field declaration".into()));
    }

    for (name, offset) in decl.entries() {
        if offset > u8::MAX as u32 {
            return Err(malformed(format!(
                "offset {offset} of `{name}` exceeds the addressable byte range"
            )));
        }
        if offset >= size {
            return Err(malformed(format!(
                "offset {offset} of `{name}` lies outside the declared size {size}"
            )));
        }
        if !seen.insert(name.clone()) {
            return Err(malformed(format!("duplicate field `{name}`")));
        }
    }

    Ok(decl)
}

fn field_offset(stream: &mut TokenStream, scope: ScopeKind) -> Result<u32, ParseError> {
    match stream.advance() {
        Some(Token::Int(digits)) => {
            digits
                .parse::<u32>()
                .map_err(|_| ParseError::MalformedScopeFields {
                    scope,
                    detail: format!("offset `{digits}` is out of range"),
                })
        }
        _ => Err(ParseError::MalformedScopeFields {
            scope,
            detail: "expected an integer offset".into(),
        }),
    }
}

/// Parse `Worker{ <statement>; ... };`.
fn worker_block(stream: &mut TokenStream) -> Result<Vec<Statement>, ParseError> {
    if !stream.eat(Token::Worker) {
        return Err(ParseError::MissingWorkerBlock);
    }
    if !stream.eat(Token::BraceOpen) {
        return Err(ParseError::MissingBlockDelimiter {
            block: "Worker",
            delimiter: "{",
        });
    }

    let mut statements = Vec::new();
    loop {
        if stream.eat(Token::BraceClose) {
            break;
        }
        if stream.at_end() {
            return Err(ParseError::MissingBlockDelimiter {
                block: "Worker",
                delimiter: "}",
            });
        }
        statements.push(statement(stream)?);
    }

    if !stream.eat(Token::Semi) {
        return Err(ParseError::MissingBlockDelimiter {
            block: "Worker",
            delimiter: ";",
        });
    }

    Ok(statements)
}

/// Parse `[<lhs> =] <Namespace>::<Op>( <operand>, ... );`.
fn statement(stream: &mut TokenStream) -> Result<Statement, ParseError> {
    // An assignment target starts with a scope qualifier, or with a plain
    // name followed by `=` or `.`; a namespace is a plain name followed by
    // `::`.
    let has_target = match stream.peek() {
        Some(Token::GlobalScope | Token::WorkScope | Token::LocalScope) => true,
        Some(Token::Ident(_)) => matches!(
            stream.peek_nth(1),
            Some(Token::Equals) | Some(Token::Dot)
        ),
        _ => false,
    };

    let target = if has_target {
        let target = reference(stream)?;
        let at = stream.offset();
        if !stream.eat(Token::Equals) {
            return Err(unexpected(stream.peek(), "after assignment target", at));
        }
        Some(target)
    } else {
        None
    };

    let at = stream.offset();
    let namespace = match stream.advance() {
        Some(Token::Ident(name)) => name.to_string(),
        found => {
            return Err(unexpected(found, "as statement namespace", at));
        }
    };

    let at = stream.offset();
    if !stream.eat(Token::PathSep) {
        return Err(unexpected(stream.peek(), "after statement namespace", at));
    }

    let at = stream.offset();
    let operator = match stream.advance() {
        Some(Token::PlusPlus) => "++".to_string(),
        Some(Token::MinusMinus) => "--".to_string(),
        Some(Token::Plus) => "+".to_string(),
        Some(Token::Minus) => "-".to_string(),
        Some(Token::Star) => "*".to_string(),
        Some(Token::Greater) => ">".to_string(),
        Some(Token::Less) => "<".to_string(),
        Some(Token::Ident(name)) => name.to_string(),
        found => return Err(unexpected(found, "as statement operator", at)),
    };

    let at = stream.offset();
    if !stream.eat(Token::ParenOpen) {
        return Err(unexpected(stream.peek(), "after statement operator", at));
    }

    let mut operands = Vec::new();
    if !stream.check(Token::ParenClose) {
        operands.push(reference(stream)?);
        while stream.eat(Token::Comma) {
            operands.push(reference(stream)?);
        }
    }

    let at = stream.offset();
    if !stream.eat(Token::ParenClose) {
        return Err(unexpected(stream.peek(), "in operand list", at));
    }
    if !stream.eat(Token::Semi) {
        return Err(ParseError::MissingBlockDelimiter {
            block: "Worker",
            delimiter: ";",
        });
    }

    Ok(Statement {
        target,
        namespace,
        operator,
        operands,
    })
}

/// Parse `[<Scope>::]<name>[.<sub>...]`.
fn reference(stream: &mut TokenStream) -> Result<Reference, ParseError> {
    let scope = match stream.peek() {
        Some(Token::GlobalScope) => Some(ScopeKind::Global),
        Some(Token::WorkScope) => Some(ScopeKind::Work),
        Some(Token::LocalScope) => Some(ScopeKind::Local),
        _ => None,
    };
    if scope.is_some() {
        stream.advance();
        let at = stream.offset();
        if !stream.eat(Token::PathSep) {
            return Err(unexpected(stream.peek(), "after scope qualifier", at));
        }
    }

    let at = stream.offset();
    let mut name = match stream.advance() {
        Some(Token::Ident(name)) => name.to_string(),
        found => return Err(unexpected(found, "as variable reference", at)),
    };
    while stream.eat(Token::Dot) {
        let at = stream.offset();
        match stream.advance() {
            Some(Token::Ident(sub)) => {
                name.push('.');
                name.push_str(sub);
            }
            found => return Err(unexpected(found, "after `.` in reference", at)),
        }
    }

    Ok(Reference { scope, name })
}

fn unexpected(found: Option<Token<'_>>, context: &'static str, at: usize) -> ParseError {
    match found {
        Some(_) => ParseError::UnexpectedToken {
            found: found_text(found),
            context,
            at,
        },
        None => ParseError::UnexpectedEof { context },
    }
}

fn found_text(found: Option<Token<'_>>) -> String {
    match found {
        Some(token) => format!("{token:?}"),
        None => "end of input".into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = "\
GlobalScope[4]{[0]->Counter;};
WorkScope[4]{[0]->Life;};
LocalScope[1]{};
Worker{
Int::++(WorkScope::Life);
VM::HaltConditional(WorkScope::Life);
VM::Halt();
};
";

    #[test]
    fn test_parse_minimal_script() {
        let script = parse(MINIMAL).unwrap();
        assert_eq!(script.global.size, 4);
        assert_eq!(script.work.size, 4);
        assert_eq!(script.local.size, 1);
        assert!(script.local.fields.is_empty());
        assert_eq!(script.worker.len(), 3);

        let inc = &script.worker[0];
        assert_eq!(inc.namespace, "Int");
        assert_eq!(inc.operator, "++");
        assert_eq!(inc.target, None);
        assert_eq!(
            inc.operands,
            vec![Reference {
                scope: Some(ScopeKind::Work),
                name: "Life".into()
            }]
        );

        let halt = &script.worker[2];
        assert_eq!(halt.namespace, "VM");
        assert_eq!(halt.operator, "Halt");
        assert!(halt.operands.is_empty());
    }

    #[test]
    fn test_composite_field() {
        let script = parse(
            "GlobalScope[1]{};
             WorkScope[8]{[0,4]->Pos[X,Y];};
             LocalScope[1]{};
             Worker{};",
        )
        .unwrap();
        assert_eq!(
            script.work.fields[0].entries(),
            vec![("Pos.X".to_string(), 0), ("Pos.Y".to_string(), 4)]
        );
    }

    #[test]
    fn test_assignment_statement() {
        let script = parse(
            "GlobalScope[4]{[0]->Max;};
             WorkScope[8]{[0]->A;[4]->B;};
             LocalScope[4]{[0]->Out;};
             Worker{Out=Float::>(A,Max);};",
        )
        .unwrap();
        let stmt = &script.worker[0];
        assert_eq!(
            stmt.target,
            Some(Reference {
                scope: None,
                name: "Out".into()
            })
        );
        assert_eq!(stmt.operator, ">");
        assert_eq!(stmt.operands.len(), 2);
    }

    #[test]
    fn test_dotted_assignment_target() {
        let script = parse(
            "GlobalScope[1]{};
             WorkScope[8]{[0,4]->Pos[X,Y];};
             LocalScope[1]{};
             Worker{Pos.X=Float::+(Pos.X,Pos.Y);};",
        )
        .unwrap();
        assert_eq!(script.worker[0].target.as_ref().unwrap().name, "Pos.X");
    }

    #[test]
    fn test_missing_scope() {
        let err = parse("WorkScope[4]{};").unwrap_err();
        assert_eq!(
            err,
            ParseError::MissingScope {
                expected: ScopeKind::Global
            }
        );
    }

    #[test]
    fn test_scopes_out_of_order() {
        let err = parse(
            "GlobalScope[4]{};
             LocalScope[1]{};
             WorkScope[4]{};
             Worker{};",
        )
        .unwrap_err();
        assert_eq!(
            err,
            ParseError::MissingScope {
                expected: ScopeKind::Work
            }
        );
    }

    #[test]
    fn test_malformed_scope_size() {
        let err = parse("GlobalScope{};").unwrap_err();
        assert_eq!(
            err,
            ParseError::MalformedScopeSize {
                scope: ScopeKind::Global
            }
        );
    }

    #[test]
    fn test_missing_worker() {
        let err = parse(
            "GlobalScope[1]{};
             WorkScope[1]{};
             LocalScope[1]{};",
        )
        .unwrap_err();
        assert_eq!(err, ParseError::MissingWorkerBlock);
    }

    #[test]
    fn test_missing_worker_close() {
        let err = parse(
            "GlobalScope[1]{};
             WorkScope[4]{[0]->Life;};
             LocalScope[1]{};
             Worker{Int::++(Life);",
        )
        .unwrap_err();
        assert_eq!(
            err,
            ParseError::MissingBlockDelimiter {
                block: "Worker",
                delimiter: "}"
            }
        );
    }

    #[test]
    fn test_unterminated_statement() {
        let err = parse(
            "GlobalScope[1]{};
             WorkScope[4]{[0]->Life;};
             LocalScope[1]{};
             Worker{Int::++(Life)};",
        )
        .unwrap_err();
        assert_eq!(
            err,
            ParseError::MissingBlockDelimiter {
                block: "Worker",
                delimiter: ";"
            }
        );
    }

    #[test]
    fn test_mismatched_composite_lists() {
        let err = parse(
            "GlobalScope[1]{};
             WorkScope[12]{[0,4,8]->Pos[X,Y];};
             LocalScope[1]{};
             Worker{};",
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ParseError::MalformedScopeFields {
                scope: ScopeKind::Work,
                ..
            }
        ));
    }

    #[test]
    fn test_offset_outside_declared_size() {
        let err = parse(
            "GlobalScope[4]{[4]->Counter;};
             WorkScope[1]{};
             LocalScope[1]{};
             Worker{};",
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ParseError::MalformedScopeFields {
                scope: ScopeKind::Global,
                ..
            }
        ));
    }

    #[test]
    fn test_duplicate_field() {
        let err = parse(
            "GlobalScope[8]{[0]->Counter;[4]->Counter;};
             WorkScope[1]{};
             LocalScope[1]{};
             Worker{};",
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ParseError::MalformedScopeFields {
                scope: ScopeKind::Global,
                ..
            }
        ));
    }

    #[test]
    fn test_shadowed_name_across_scopes_is_legal() {
        let script = parse(
            "GlobalScope[4]{[0]->Life;};
             WorkScope[4]{[0]->Life;};
             LocalScope[1]{};
             Worker{};",
        )
        .unwrap();
        assert_eq!(script.global.fields.len(), 1);
        assert_eq!(script.work.fields.len(), 1);
    }

    #[test]
    fn test_trailing_input_rejected() {
        let err = parse(
            "GlobalScope[1]{};
             WorkScope[1]{};
             LocalScope[1]{};
             Worker{};
             Worker{};",
        )
        .unwrap_err();
        assert!(matches!(err, ParseError::UnexpectedToken { .. }));
    }
}
