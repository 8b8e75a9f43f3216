//! Cross-cutting typer tests: forward references and convergence.

use crate::test_util::{typecheck, typecheck_with};
use luxc_par::scope::Namespace;
use luxc_util::{Handler, Symbol};

#[test]
fn typedef_used_before_its_definition() {
    let source = "
        p : point;
        point :: struct { x: u32; y: u32; };
        main : func () -> u32 { return p.x; }
    ";
    let program = typecheck(source);
    let unit = &program.code_units[0];
    let p = program
        .scopes
        .lookup(unit.global_scope, Symbol::intern("p"), Namespace::Variable)
        .unwrap();
    assert_eq!(program.types[program.scopes.decls[p].ty].size, 8);
}

#[test]
fn typedef_chain_of_three() {
    let source = "first :: second; second :: third; third :: u16;";
    let program = typecheck(source);
    let unit = &program.code_units[0];
    let first = program
        .scopes
        .lookup(unit.global_scope, Symbol::intern("first"), Namespace::Type)
        .unwrap();
    assert_eq!(
        program.scopes.decls[first].ty,
        program.types.basic(2, false)
    );
}

#[test]
fn pointer_arithmetic_through_forward_struct() {
    // The scaling rewrite needs the pointee's size, which only exists after
    // the struct behind the typedef is laid out on a later pass.
    let source = "
        main : func (items: *entry) -> u64 {
            return items[2].key;
        }
        entry :: struct { key: u64; value: u64; };
    ";
    let program = typecheck(source);
    drop(program);
}

#[test]
fn init_referencing_a_later_function() {
    let source = "
        main : func () {
            total : = base() + 1;
        }
        base : func () -> u64 { return 10; }
    ";
    let program = typecheck(source);
    drop(program);
}

#[test]
fn struct_with_array_member_of_typedef() {
    let source = "
        word :: u64;
        block :: struct { data: [4]word; tail: u8; };
    ";
    let program = typecheck(source);
    let unit = &program.code_units[0];
    let block = program
        .scopes
        .lookup(unit.global_scope, Symbol::intern("block"), Namespace::Type)
        .unwrap();
    let ty = program.scopes.decls[block].ty;
    assert_eq!(program.types[ty].size, 40);
    let data = program.types.as_struct(ty);
    assert_eq!(data.members[1].offset, 32);
}

#[test]
fn union_of_structs() {
    let source = "
        pair :: struct { a: u32; b: u32; };
        either :: union { as_pair: pair; as_word: u64; };
    ";
    let program = typecheck(source);
    let unit = &program.code_units[0];
    let either = program
        .scopes
        .lookup(unit.global_scope, Symbol::intern("either"), Namespace::Type)
        .unwrap();
    let ty = program.scopes.decls[either].ty;
    assert_eq!(program.types[ty].size, 8);
    assert_eq!(program.types[ty].alignment, 8);
}

#[test]
fn unresolvable_member_type_reports_failure() {
    let handler = Handler::new();
    let source = "broken :: struct { a: ghost; };";
    assert!(typecheck_with(source, &handler).is_err());
    assert!(handler.has_errors());
}

#[test]
fn mutually_recursive_structs_through_pointers() {
    let source = "
        node :: struct { edge: *link; value: u64; };
        link :: struct { from: *node; to: *node; };
    ";
    let program = typecheck(source);
    let unit = &program.code_units[0];
    for name in ["node", "link"] {
        let decl = program
            .scopes
            .lookup(unit.global_scope, Symbol::intern(name), Namespace::Type)
            .unwrap();
        assert_eq!(program.types[program.scopes.decls[decl].ty].size, 16);
    }
}

#[test]
fn function_return_type_through_typedef() {
    let source = "
        get : func () -> word { return 1; }
        word :: u64;
        main : func () -> u64 { v : = get(); return v; }
    ";
    let program = typecheck(source);
    let unit = &program.code_units[0];

    let get = program
        .scopes
        .lookup(unit.global_scope, Symbol::intern("get"), Namespace::Function)
        .unwrap();
    let return_type = match &program.scopes.decls[get].kind {
        luxc_par::scope::DeclKind::Function(function) => function.return_type.unwrap(),
        _ => unreachable!(),
    };
    assert_eq!(return_type, program.types.basic(8, false));
}

#[test]
fn nested_function_body_is_typed() {
    let source = "
        main : func () -> u64 {
            helper : func (n: u64) -> u64 { return n * 2; }
            v : = 21;
            return v;
        }
    ";
    let program = typecheck(source);
    drop(program);
}
