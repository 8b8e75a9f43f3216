//! luxc-drv - Compiler driver.
//!
//! The driver owns everything outside the core pipeline: command-line
//! handling, file I/O, orchestration of the phases and rendering of the
//! diagnostics a failed pipeline leaves behind.
//!
//! Pipeline: source text → lexer → parser → typer → emitter → output file.

pub mod dump;

use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use luxc_lex::Lexer;
use luxc_par::Parser;
use luxc_util::{Diagnostic, Handler, Symbol};

/// Compiler configuration: one input file, one output file.
#[derive(Clone, Debug)]
pub struct Config {
    pub input: PathBuf,
    pub output: PathBuf,
}

impl Config {
    /// Parses the command line. Exactly two operands are accepted.
    pub fn from_args(args: impl Iterator<Item = String>) -> Result<Self> {
        let args: Vec<String> = args.collect();
        if args.len() != 2 {
            bail!("usage: luxc <input-file> <output-file>");
        }

        Ok(Self {
            input: PathBuf::from(&args[0]),
            output: PathBuf::from(&args[1]),
        })
    }
}

/// The result of a successful compilation.
pub struct CompileOutput {
    /// The generated assembly text.
    pub assembly: String,
    /// The parse-tree rendering, when requested.
    pub tree: Option<String>,
}

/// Compiles one source buffer to assembly text.
///
/// On failure the diagnostics collected up to the fatal error are returned
/// for the caller to render.
pub fn compile_source(
    source: &str,
    file_name: &str,
    dump_tree: bool,
) -> Result<CompileOutput, Vec<Diagnostic>> {
    let handler = Handler::new();

    let result = (|| {
        let lexer = Lexer::new(source, Symbol::intern(file_name), &handler);
        let mut program = Parser::new(lexer, &handler)?.parse_program()?;

        let tree = dump_tree.then(|| dump::render_program(&program));

        luxc_sem::type_program(&mut program, &handler)?;
        let assembly = luxc_gen::generate_program(&mut program, &handler)?;

        Ok(CompileOutput { assembly, tree })
    })();

    result.map_err(|_: luxc_util::FatalError| handler.diagnostics())
}

/// Runs the compiler for the process command line.
pub fn run() -> Result<()> {
    let config = Config::from_args(std::env::args().skip(1))?;

    println!("Compiling : {}", config.input.display());
    println!("Output    : {}", config.output.display());

    let source = fs::read_to_string(&config.input)
        .with_context(|| format!("cannot read {}", config.input.display()))?;

    let dump_tree = std::env::var("LUXC_DUMP_TREE").map_or(false, |v| v == "1");
    let file_name = config.input.display().to_string();

    match compile_source(&source, &file_name, dump_tree) {
        Ok(output) => {
            if let Some(tree) = output.tree {
                print!("{}", tree);
            }
            fs::write(&config.output, output.assembly)
                .with_context(|| format!("cannot write {}", config.output.display()))?;
            Ok(())
        },
        Err(diagnostics) => {
            for diagnostic in &diagnostics {
                eprint!("{}", diagnostic.render(&source));
            }
            bail!("compilation failed");
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_needs_two_operands() {
        assert!(Config::from_args(std::iter::empty()).is_err());
        assert!(Config::from_args(["in.lux".to_string()].into_iter()).is_err());
        assert!(Config::from_args(
            ["a".to_string(), "b".to_string(), "c".to_string()].into_iter()
        )
        .is_err());

        let config =
            Config::from_args(["in.lux".to_string(), "out.s".to_string()].into_iter()).unwrap();
        assert_eq!(config.input, PathBuf::from("in.lux"));
        assert_eq!(config.output, PathBuf::from("out.s"));
    }

    #[test]
    fn test_compile_source_success() {
        let output = compile_source("main : func () -> u64 { return 0; }", "t.lux", false)
            .expect("compiles");
        assert!(output.assembly.contains(".globl main"));
        assert!(output.tree.is_none());
    }

    #[test]
    fn test_compile_source_reports_diagnostics() {
        let diagnostics = compile_source("x : u32; x : u64;", "t.lux", false)
            .err()
            .expect("duplicate declaration fails");
        assert!(!diagnostics.is_empty());
        assert!(diagnostics[0].message.contains("declaration is existing"));
    }

    #[test]
    fn test_tree_dump_is_produced_on_request() {
        let output = compile_source("main : func () -> u64 { return 1 + 2; }", "t.lux", true)
            .expect("compiles");
        let tree = output.tree.expect("tree requested");
        assert!(tree.contains("main"));
        assert!(tree.contains("Binary: +"));
    }
}
