//! Parse-tree rendering.
//!
//! A line-per-node view of the program with `|-->` connectors, printed when
//! `LUXC_DUMP_TREE=1` is set. Handy for eyeballing what the parser and the
//! desugarings produced without reading assembly.

use luxc_par::ast::{BinaryOp, Block, CodeUnit, Expr, ExprKind, Primary, Program, Stmt, UnaryOp};
use luxc_par::scope::{DeclId, DeclKind, FnBody, ScopeId};
use luxc_par::ty::{TypeId, TypeKind};

/// Renders the whole program as an indented tree.
pub fn render_program(program: &Program) -> String {
    let mut printer = TreePrinter {
        program,
        out: String::new(),
        depth: 0,
    };

    for unit in &program.code_units {
        printer.code_unit(unit);
    }
    printer.out
}

struct TreePrinter<'a> {
    program: &'a Program,
    out: String,
    depth: usize,
}

impl<'a> TreePrinter<'a> {
    fn line(&mut self, text: &str) {
        if self.depth > 0 {
            for _ in 0..self.depth - 1 {
                self.out.push_str("|  ");
            }
            self.out.push_str("|-->");
        }
        self.out.push_str(text);
        self.out.push('\n');
    }

    fn nested(&mut self, render: impl FnOnce(&mut Self)) {
        self.depth += 1;
        render(self);
        self.depth -= 1;
    }

    fn code_unit(&mut self, unit: &CodeUnit) {
        self.line(&format!("Code unit: {}", unit.file_name));
        self.nested(|printer| printer.scope_declarations(unit.global_scope));
    }

    fn scope_declarations(&mut self, scope: ScopeId) {
        let scope = &self.program.scopes.scopes[scope];

        for &decl in scope.types.values() {
            self.declaration(decl);
        }
        for &decl in scope.variables.values() {
            self.declaration(decl);
        }
        for &decl in scope.functions.values() {
            self.declaration(decl);
        }
    }

    fn declaration(&mut self, decl: DeclId) {
        let declaration = &self.program.scopes.decls[decl];
        match &declaration.kind {
            DeclKind::Variable { is_global, .. } => {
                let marker = if *is_global { " (global)" } else { "" };
                let ty = self.type_name(declaration.ty);
                self.line(&format!("Variable: {} : {}{}", declaration.name, ty, marker));
            },
            DeclKind::Type => {
                let ty = self.type_name(declaration.ty);
                self.line(&format!("Type: {} :: {}", declaration.name, ty));
            },
            DeclKind::Function(function) => {
                let ret = function
                    .return_type
                    .map(|ty| self.type_name(ty))
                    .unwrap_or_else(|| "void".to_string());
                self.line(&format!("Function: {} -> {}", declaration.name, ret));
                self.nested(|printer| {
                    printer.scope_declarations(function.scope);
                    match &function.body {
                        FnBody::Block(block) => printer.block(block),
                        FnBody::Assembly(_) => printer.line("Assembly body"),
                    }
                });
            },
        }
    }

    fn block(&mut self, block: &Block) {
        self.line("Compound");
        self.nested(|printer| {
            printer.scope_declarations(block.scope);
            for stmt in &block.stmts {
                printer.statement(stmt);
            }
        });
    }

    fn statement(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Compound(block) => self.block(block),
            Stmt::Expression(expr) => {
                self.line("Expression");
                self.nested(|printer| printer.expression(expr));
            },
            Stmt::Comment(token) => {
                self.line(&format!("Comment: {}", token.text));
            },
            Stmt::Return(value) => {
                self.line("Return");
                if let Some(expr) = value {
                    self.nested(|printer| printer.expression(expr));
                }
            },
            Stmt::Conditional(cond) => {
                self.line("Conditional");
                self.nested(|printer| {
                    printer.expression(&cond.condition);
                    printer.statement(&cond.true_body);
                    if let Some(false_body) = &cond.false_body {
                        printer.statement(false_body);
                    }
                });
            },
            Stmt::Loop(looped) => {
                self.line("Loop");
                self.nested(|printer| {
                    if let Some(init) = &looped.init {
                        printer.statement(init);
                    }
                    printer.expression(&looped.condition);
                    if let Some(post) = &looped.post {
                        printer.statement(post);
                    }
                    printer.statement(&looped.body);
                });
            },
        }
    }

    fn expression(&mut self, expr: &Expr) {
        match &expr.kind {
            ExprKind::Primary(primary) => match primary {
                Primary::Number(value) => self.line(&format!("Number: {}", value)),
                Primary::Ident { name, .. } => self.line(&format!("Identifier: {}", name)),
                Primary::Str(text) => self.line(&format!("String: \"{}\"", text)),
            },
            ExprKind::Unary { op, operand } => {
                let symbol = match op {
                    UnaryOp::Deref => "@",
                    UnaryOp::AddressOf => "*",
                };
                self.line(&format!("Unary: {}", symbol));
                self.nested(|printer| printer.expression(operand));
            },
            ExprKind::Binary { op, left, right } => {
                self.line(&format!("Binary: {}", binary_symbol(*op)));
                self.nested(|printer| {
                    printer.expression(left);
                    printer.expression(right);
                });
            },
            ExprKind::Call { callee, arguments } => {
                self.line("Call");
                self.nested(|printer| {
                    printer.expression(callee);
                    for argument in arguments {
                        printer.expression(argument);
                    }
                });
            },
            ExprKind::Dot { base, member, offset } => {
                self.line(&format!("Dot: {} (offset {})", member.text, offset));
                self.nested(|printer| printer.expression(base));
            },
        }
    }

    fn type_name(&self, ty: TypeId) -> String {
        if ty == self.program.types.char_type() {
            return "char".to_string();
        }

        match &self.program.types[ty].kind {
            TypeKind::Basic { signed } => {
                let prefix = if *signed { "s" } else { "u" };
                format!("{}{}", prefix, self.program.types[ty].size * 8)
            },
            TypeKind::Pointer { pointee, count } => {
                if *count != 0 {
                    format!("[{}]{}", count, self.type_name(*pointee))
                } else {
                    format!("*{}", self.type_name(*pointee))
                }
            },
            TypeKind::Struct(data) => {
                if data.is_struct {
                    "struct".to_string()
                } else {
                    "union".to_string()
                }
            },
            TypeKind::Unknown { token } => format!("{}?", token.text),
            TypeKind::Inferred => "inferred".to_string(),
            TypeKind::Void => "void".to_string(),
        }
    }
}

fn binary_symbol(op: BinaryOp) -> &'static str {
    match op {
        BinaryOp::Add => "+",
        BinaryOp::Sub => "-",
        BinaryOp::Mul => "*",
        BinaryOp::Div => "/",
        BinaryOp::Eq => "==",
        BinaryOp::Ne => "!=",
        BinaryOp::Lt => "<",
        BinaryOp::Le => "<=",
        BinaryOp::Gt => ">",
        BinaryOp::Ge => ">=",
        BinaryOp::Assign => "=",
    }
}
