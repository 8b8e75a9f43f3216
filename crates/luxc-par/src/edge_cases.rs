//! Cross-cutting parser tests.

use crate::ast::{ExprKind, Primary, Stmt};
use crate::scope::Namespace;
use crate::test_util::{parse, parse_with};
use luxc_util::{Handler, Symbol};

#[test]
fn scope_names_are_unique_per_kind() {
    let source = "
        word :: u64;
        a : u32;
        b : word;
        main : func (argc: u64) -> u64 {
            c : u8;
            {
                d : u16;
            }
            return 0;
        }
    ";
    let program = parse(source);

    for (_, scope) in program.scopes.scopes.iter_enumerated() {
        for ns in [Namespace::Variable, Namespace::Function, Namespace::Type] {
            let map = scope.namespace(ns);
            for (&name, &decl) in map {
                assert_eq!(program.scopes.decls[decl].name, name);
                assert_eq!(program.scopes.decls[decl].namespace(), ns);
            }

            // No duplicate of the same (kind, name) anywhere up the chain.
            for &name in map.keys() {
                let mut hits = 0;
                let mut walk = Some(scope.parent);
                if map.contains_key(&name) {
                    hits += 1;
                }
                while let Some(Some(parent)) = walk {
                    if program.scopes.scopes[parent].namespace(ns).contains_key(&name) {
                        hits += 1;
                    }
                    walk = Some(program.scopes.scopes[parent].parent);
                }
                assert_eq!(hits, 1, "{} declared more than once", name);
            }
        }
    }
}

#[test]
fn deeply_nested_parentheses() {
    let program = parse("main : func () -> u64 { return ((((((1)))))); }");
    drop(program);
}

#[test]
fn comments_between_declarations() {
    let source = "
        // the word size
        word :: u64;
        //( a block
            //( nested //)
        comment //)
        a : word;
    ";
    let program = parse(source);
    let unit = &program.code_units[0];
    let comments = unit
        .body
        .stmts
        .iter()
        .filter(|stmt| matches!(stmt, Stmt::Comment(_)))
        .count();
    assert_eq!(comments, 2);
}

#[test]
fn declaration_lookahead_sees_past_the_name() {
    // `a = 1;` must parse as a statement even though it starts with an
    // identifier.
    let program = parse("main : func () { a : u64; a = 1; }");
    drop(program);
}

#[test]
fn assembly_function_between_normal_functions() {
    let source = "
        before : func () -> u64 { return 1; }
        exit : asm (code: u64) {
            mov %rdi, %rax
            syscall
        }
        after : func () -> u64 { return 2; }
    ";
    let program = parse(source);
    let unit = &program.code_units[0];
    for name in ["before", "exit", "after"] {
        assert!(program
            .scopes
            .lookup(unit.global_scope, Symbol::intern(name), Namespace::Function)
            .is_some());
    }
}

#[test]
fn struct_of_typedef_members_parses() {
    let source = "
        word :: u64;
        pair :: struct { low: word; high: word; };
        p : pair;
    ";
    let program = parse(source);
    drop(program);
}

#[test]
fn call_inside_index_expression() {
    let program = parse("main : func () -> u64 { items : *u64; return items[next()] + 1; next : func () -> u64 { return 0; } }");
    drop(program);
}

#[test]
fn unbalanced_brace_is_fatal() {
    let handler = Handler::new();
    assert!(parse_with("main : func () { ", &handler).is_err());
}

#[test]
fn init_expression_references_use_the_declared_name() {
    let program = parse("main : func () { a : = 41; b : = a + 1; }");
    let unit = &program.code_units[0];
    let main = program
        .scopes
        .lookup(unit.global_scope, Symbol::intern("main"), Namespace::Function)
        .unwrap();
    let block = match &program.scopes.decls[main].kind {
        crate::scope::DeclKind::Function(function) => match &function.body {
            crate::scope::FnBody::Block(block) => block,
            _ => unreachable!(),
        },
        _ => unreachable!(),
    };

    assert_eq!(block.stmts.len(), 2);
    for (stmt, expected) in block.stmts.iter().zip(["a", "b"]) {
        match stmt {
            Stmt::Expression(expr) => match &expr.kind {
                ExprKind::Binary { left, .. } => match &left.kind {
                    ExprKind::Primary(Primary::Ident { name, .. }) => {
                        assert_eq!(name.as_str(), expected);
                    },
                    kind => panic!("expected an identifier, found {:?}", kind),
                },
                kind => panic!("expected an assignment, found {:?}", kind),
            },
            stmt => panic!("expected an expression statement, found {:?}", stmt),
        }
    }
}
