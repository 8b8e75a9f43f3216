//! luxc-gen - x86-64 assembly emission for the Lux language.
//!
//! The emitter walks the typed tree and writes AT&T-syntax assembly.
//! Expressions are evaluated as a one-value stack machine: the result of
//! every sub-expression lands in `%rax`, binary operators evaluate their
//! right side first, park it on the machine stack, evaluate the left side
//! and pop the right into `%rdi`. Pointer arithmetic arrives pre-scaled
//! from the typer, so `+` and `-` are plain integer operations here.
//!
//! String literals and global variables are staged in a [`DataBuffer`] and
//! flushed after every function, so `.text` and `.data` interleave.

mod data;

pub use data::DataBuffer;

use luxc_par::ast::{BinaryOp, Block, Expr, ExprKind, Primary, Program, Stmt, UnaryOp};
use luxc_par::scope::{DeclId, DeclKind, FnBody, ScopeId};
use luxc_par::ty::{TypeId, TypeKind};
use luxc_util::{CompileResult, FxHashMap, Handler, Symbol};

/// The System-V AMD64 integer argument registers, in order.
const ARGUMENT_REGISTERS: [&str; 6] = ["rdi", "rsi", "rdx", "rcx", "r8", "r9"];

/// Generates the assembly for a typed program.
///
/// Stack offsets are assigned to every local variable as a side effect.
pub fn generate_program(program: &mut Program, handler: &Handler) -> CompileResult<String> {
    let frames = layout_frames(program);

    let mut generator = Generator {
        handler,
        program,
        frames,
        out: String::new(),
        data: DataBuffer::new(),
        stack_level: 0,
        string_counter: 0,
        loop_counter: 0,
        if_counter: 0,
        current_function: None,
    };

    for index in 0..generator.program.code_units.len() {
        generator.generate_code_unit(index)?;
    }

    Ok(generator.out)
}

/// Rounds `number` up to the next multiple of `alignment`.
fn align(number: u32, alignment: u32) -> u32 {
    if alignment == 0 {
        return number;
    }
    let offset = number % alignment;
    if offset != 0 {
        number - offset + alignment
    } else {
        number
    }
}

/// Assigns stack offsets to every function's locals and returns the frame
/// size per function declaration.
///
/// Offsets grow downwards from the frame pointer; nested scopes are
/// assigned before their parents so argument slots end up closest to the
/// saved frame pointer. The final frame is 16-byte aligned.
fn layout_frames(program: &mut Program) -> FxHashMap<DeclId, u32> {
    let mut frames = FxHashMap::default();

    for decl in program.scopes.decls.indices().collect::<Vec<_>>() {
        let scope = match &program.scopes.decls[decl].kind {
            DeclKind::Function(function) => function.scope,
            _ => continue,
        };

        let offset = layout_scope(program, scope, 0);
        frames.insert(decl, align(offset, 16));
    }

    frames
}

fn layout_scope(program: &mut Program, scope: ScopeId, mut offset: u32) -> u32 {
    let children = program.scopes.scopes[scope].children.clone();
    for child in children {
        offset = layout_scope(program, child, offset);
    }

    let variables: Vec<DeclId> = program.scopes.scopes[scope].variables.values().copied().collect();
    for decl in variables {
        let ty = program.scopes.decls[decl].ty;
        let (size, alignment) = {
            let ty = &program.types[ty];
            (ty.size, ty.alignment)
        };

        offset += size;
        offset = align(offset, alignment);

        if let DeclKind::Variable {
            offset: slot,
            is_global: false,
        } = &mut program.scopes.decls[decl].kind
        {
            *slot = -(offset as i32);
        }
    }

    offset
}

struct Generator<'a> {
    handler: &'a Handler,
    program: &'a Program,
    frames: FxHashMap<DeclId, u32>,

    out: String,
    data: DataBuffer,

    /// Depth of values parked on the machine stack; zero between statements.
    stack_level: u32,
    string_counter: u32,
    loop_counter: u32,
    if_counter: u32,

    /// Name of the function being generated, for the epilogue label.
    current_function: Option<Symbol>,
}

impl<'a> Generator<'a> {
    fn emit(&mut self, text: impl AsRef<str>) {
        self.out.push_str(text.as_ref());
        self.out.push('\n');
    }

    fn push_rax(&mut self) {
        self.emit("    push %rax");
        self.stack_level += 1;
    }

    fn pop(&mut self, register: &str) {
        self.emit(format!("    pop %{}", register));
        self.stack_level -= 1;
    }

    /// Writes the staged data segment, if any.
    fn flush_data_segment(&mut self) {
        if self.data.is_empty() {
            return;
        }

        self.emit("");
        self.emit("    .data");
        let staged = self.data.take();
        self.out.push_str(&staged);
    }

    fn expr_type(&self, expr: &Expr) -> TypeId {
        expr.ty.expect("the typer leaves no expression untyped")
    }

    fn generate_code_unit(&mut self, index: usize) -> CompileResult<()> {
        let unit = &self.program.code_units[index];
        let file_name = unit.file_name;
        let global_scope = unit.global_scope;

        self.emit(format!("# Code unit : {}", file_name));
        self.emit("# ------------------------------------------------------\n");

        self.generate_scope(global_scope)
    }

    /// Emits the functions of a scope; the global scope also zero-fills its
    /// variables into the data segment.
    fn generate_scope(&mut self, scope: ScopeId) -> CompileResult<()> {
        let functions: Vec<DeclId> = self.program.scopes.scopes[scope]
            .functions
            .values()
            .copied()
            .collect();
        for decl in functions {
            self.generate_function(decl)?;
        }

        if self.program.scopes.scopes[scope].parent.is_none() {
            let variables: Vec<DeclId> = self.program.scopes.scopes[scope]
                .variables
                .values()
                .copied()
                .collect();
            for decl in variables {
                let declaration = &self.program.scopes.decls[decl];
                let size = self.program.types[declaration.ty].size;
                let name = declaration.name;
                self.data.push_fmt(format_args!("{}:", name));
                self.data.push_fmt(format_args!("    .zero {}", size));
            }
        }

        self.flush_data_segment();
        Ok(())
    }

    fn generate_function(&mut self, decl: DeclId) -> CompileResult<()> {
        let declaration = &self.program.scopes.decls[decl];
        let name = declaration.name;
        let name_token = declaration.token;
        let function = match &declaration.kind {
            DeclKind::Function(function) => function,
            _ => unreachable!("function list holds only function declarations"),
        };

        let frame_size = self.frames[&decl];
        self.current_function = Some(name);

        self.emit("");
        self.emit("    .text");
        self.emit(format!("    .globl {}", name));
        self.emit(format!("{}:", name));
        self.emit("    push %rbp");
        self.emit("    mov %rsp, %rbp");
        self.emit(format!("    sub ${}, %rsp", frame_size));

        // Spill the incoming argument registers into their frame slots.
        let arguments: Vec<DeclId> = self.program.scopes.scopes[function.scope]
            .variables
            .values()
            .copied()
            .collect();
        for (index, argument) in arguments.iter().enumerate() {
            if index >= ARGUMENT_REGISTERS.len() {
                return Err(self.handler.fatal(
                    "this function uses more than 6 arguments",
                    name_token.span,
                ));
            }

            let offset = match self.program.scopes.decls[*argument].kind {
                DeclKind::Variable { offset, .. } => offset,
                _ => unreachable!("argument scopes hold only variables"),
            };
            self.emit(format!(
                "    mov %{}, {}(%rbp)",
                ARGUMENT_REGISTERS[index], offset
            ));
        }

        match &function.body {
            FnBody::Block(block) => {
                self.generate_block(block)?;
                debug_assert_eq!(self.stack_level, 0);
            },
            FnBody::Assembly(text) => {
                for line in text.as_str().lines() {
                    self.emit(line);
                }
            },
        }

        self.emit(format!("end.{}:", name));
        self.emit("    mov %rbp, %rsp");
        self.emit("    pop %rbp");
        self.emit("    ret");

        self.current_function = None;
        self.flush_data_segment();
        Ok(())
    }

    fn generate_block(&mut self, block: &Block) -> CompileResult<()> {
        for stmt in &block.stmts {
            self.generate_statement(stmt)?;
        }
        Ok(())
    }

    fn generate_statement(&mut self, stmt: &Stmt) -> CompileResult<()> {
        match stmt {
            Stmt::Compound(block) => self.generate_block(block),
            Stmt::Expression(expr) => self.generate_expression(expr),
            Stmt::Return(value) => {
                if let Some(expr) = value {
                    self.generate_expression(expr)?;
                }
                let name = self
                    .current_function
                    .expect("return statements only appear inside functions");
                self.emit(format!("    jmp end.{}", name));
                Ok(())
            },
            Stmt::Loop(looped) => {
                let number = self.loop_counter;
                self.loop_counter += 1;

                if let Some(init) = &looped.init {
                    self.generate_statement(init)?;
                }
                self.emit(format!("loop.start.{}:", number));

                self.generate_expression(&looped.condition)?;
                self.emit("    cmp $0, %rax");
                self.emit(format!("    je loop.end.{}", number));

                self.generate_statement(&looped.body)?;

                if let Some(post) = &looped.post {
                    self.generate_statement(post)?;
                }
                self.emit(format!("    jmp loop.start.{}", number));
                self.emit(format!("loop.end.{}:", number));
                Ok(())
            },
            Stmt::Conditional(cond) => {
                let number = self.if_counter;
                self.if_counter += 1;

                self.generate_expression(&cond.condition)?;
                self.emit("    cmp $0, %rax");
                self.emit(format!("    je if.false.{}", number));
                self.generate_statement(&cond.true_body)?;
                self.emit(format!("    jmp if.end.{}", number));

                self.emit(format!("if.false.{}:", number));
                if let Some(false_body) = &cond.false_body {
                    self.generate_statement(false_body)?;
                }

                self.emit(format!("if.end.{}:", number));
                Ok(())
            },
            Stmt::Comment(token) => {
                self.emit(format!("\n    # {}", token.text));
                Ok(())
            },
        }
    }

    fn generate_expression(&mut self, expr: &Expr) -> CompileResult<()> {
        match &expr.kind {
            ExprKind::Primary(primary) => self.generate_primary_expression(expr, primary),
            ExprKind::Unary { op, operand } => match op {
                UnaryOp::Deref => {
                    self.generate_expression(operand)?;
                    self.load_from_rax(self.expr_type(expr));
                    Ok(())
                },
                UnaryOp::AddressOf => self.generate_address(operand),
            },
            ExprKind::Binary { .. } => self.generate_binary_expression(expr),
            ExprKind::Call { .. } => self.generate_call_expression(expr),
            ExprKind::Dot { .. } => {
                self.generate_address(expr)?;
                self.load_from_rax(self.expr_type(expr));
                Ok(())
            },
        }
    }

    fn generate_primary_expression(
        &mut self,
        expr: &Expr,
        primary: &Primary,
    ) -> CompileResult<()> {
        match primary {
            Primary::Number(value) => {
                self.emit(format!("    mov ${}, %rax", value));
                Ok(())
            },
            Primary::Ident { .. } => {
                self.generate_address(expr)?;
                self.load_from_rax(self.expr_type(expr));
                Ok(())
            },
            Primary::Str(text) => {
                let number = self.string_counter;
                self.string_counter += 1;

                self.data.push_fmt(format_args!("string.{}:", number));
                self.data
                    .push_fmt(format_args!("    .string \"{}\"", text));
                self.emit(format!("    lea string.{}, %rax", number));
                Ok(())
            },
        }
    }

    /// Leaves the address of an lvalue expression in `%rax`.
    fn generate_address(&mut self, expr: &Expr) -> CompileResult<()> {
        match &expr.kind {
            ExprKind::Primary(Primary::Ident { decl, .. }) => {
                let decl = decl.expect("the typer resolves every identifier");
                let declaration = &self.program.scopes.decls[decl];
                match declaration.kind {
                    DeclKind::Variable {
                        is_global: true, ..
                    } => {
                        let name = declaration.name;
                        self.emit(format!("    lea {}, %rax", name));
                    },
                    DeclKind::Variable { offset, .. } => {
                        self.emit(format!("    lea {}(%rbp), %rax", offset));
                    },
                    _ => unreachable!("identifiers resolve to variables"),
                }
                Ok(())
            },
            ExprKind::Unary {
                op: UnaryOp::Deref,
                operand,
            } => self.generate_expression(operand),
            ExprKind::Dot { base, offset, .. } => {
                self.generate_address(base)?;
                self.emit(format!("    add ${}, %rax", offset));
                Ok(())
            },
            _ => Err(self
                .handler
                .fatal("cannot take the address of this expression", expr.token.span)),
        }
    }

    /// Loads the value at the address in `%rax` into `%rax`.
    ///
    /// Fixed-size arrays decay to their address; aggregates stay as
    /// addresses too.
    fn load_from_rax(&mut self, ty: TypeId) {
        if let TypeKind::Pointer { count, .. } = self.program.types[ty].kind {
            if count != 0 {
                return;
            }
        }

        match self.program.types[ty].size {
            1 => self.emit("    movsbq (%rax), %rax"),
            2 => self.emit("    movswq (%rax), %rax"),
            4 => self.emit("    movslq (%rax), %rax"),
            8 => self.emit("    movq (%rax), %rax"),
            _ => {},
        }
    }

    /// Stores `%rdi` to the address in `%rax`, sized by the stored type.
    fn store_to_rax_address(&mut self, ty: TypeId) {
        match self.program.types[ty].size {
            1 => self.emit("    movb %dil, (%rax)"),
            2 => self.emit("    movw %di, (%rax)"),
            4 => self.emit("    movl %edi, (%rax)"),
            8 => self.emit("    movq %rdi, (%rax)"),
            _ => {},
        }
    }

    fn generate_binary_expression(&mut self, expr: &Expr) -> CompileResult<()> {
        let ExprKind::Binary { op, left, right } = &expr.kind else {
            unreachable!();
        };

        if *op == BinaryOp::Assign {
            self.generate_expression(right)?;
            self.push_rax();

            self.generate_address(left)?;
            self.pop("rdi");
            self.store_to_rax_address(self.expr_type(expr));
            return Ok(());
        }

        // Right first, parked on the stack; left ends up in %rax with the
        // right value popped into %rdi.
        self.generate_expression(right)?;
        self.push_rax();
        self.generate_expression(left)?;
        self.pop("rdi");

        match op {
            BinaryOp::Add => self.emit("    add %rdi, %rax"),
            BinaryOp::Sub => self.emit("    sub %rdi, %rax"),
            BinaryOp::Mul => self.emit("    imul %rdi, %rax"),
            BinaryOp::Div => {
                self.emit("    cdq");
                self.emit("    idiv %rdi");
            },
            BinaryOp::Eq => self.emit_comparison("sete"),
            BinaryOp::Ne => self.emit_comparison("setne"),
            BinaryOp::Lt => self.emit_comparison("setl"),
            BinaryOp::Le => self.emit_comparison("setle"),
            BinaryOp::Gt => self.emit_comparison("setg"),
            BinaryOp::Ge => self.emit_comparison("setge"),
            BinaryOp::Assign => unreachable!("handled above"),
        }
        Ok(())
    }

    fn emit_comparison(&mut self, set: &str) {
        self.emit("    cmp %rdi, %rax");
        self.emit(format!("    {} %al", set));
        self.emit("    movzb %al, %eax");
    }

    fn generate_call_expression(&mut self, expr: &Expr) -> CompileResult<()> {
        let ExprKind::Call { callee, arguments } = &expr.kind else {
            unreachable!();
        };

        if arguments.len() > ARGUMENT_REGISTERS.len() {
            return Err(self
                .handler
                .fatal("too many function arguments", expr.token.span));
        }

        for argument in arguments {
            self.generate_expression(argument)?;
            self.push_rax();
        }

        for index in (0..arguments.len()).rev() {
            self.pop(ARGUMENT_REGISTERS[index]);
        }

        let name = match &callee.kind {
            ExprKind::Primary(Primary::Ident { name, .. }) => *name,
            _ => unreachable!("the typer rejects computed callees"),
        };

        self.emit("    mov $0, %rax");
        self.emit(format!("    call {}", name));
        Ok(())
    }
}
