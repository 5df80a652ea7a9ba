// The compilation pipeline behind the CLI: read the program, translate it
// into the selected backend, serialize the module, write it out. Nothing is
// written unless translation and serialization both succeed.

use crate::codegen::CodeGen;
use crate::error::CompileResult;
use crate::ir::{IrBuilder, OutputFormat};
use crate::mir::MirBuilder;
use crate::translator::translate;
use inkwell::context::Context;
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

/// Target triple used when none is given.
pub const DEFAULT_TARGET_TRIPLE: &str = "x86_64-pc-linux-gnu";

/// What to write out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum EmitKind {
    /// Textual LLVM IR
    LlvmIr,
    /// LLVM bitcode
    Bc,
    /// Native object file for the target triple
    Obj,
    /// The recorded builder calls, for debugging the translator
    Mir,
}

impl EmitKind {
    fn format(self) -> OutputFormat {
        match self {
            EmitKind::LlvmIr | EmitKind::Mir => OutputFormat::Text,
            EmitKind::Bc => OutputFormat::Bitcode,
            EmitKind::Obj => OutputFormat::Object,
        }
    }
}

/// Options for controlling the compilation process.
#[derive(Debug, Clone)]
pub struct CompileOptions {
    /// Source file; standard input when `None` or `-`
    pub input_path: Option<PathBuf>,
    /// Destination file; standard output when `None`
    pub output_path: Option<PathBuf>,
    pub target_triple: String,
    pub emit: EmitKind,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            input_path: None,
            output_path: None,
            target_triple: DEFAULT_TARGET_TRIPLE.to_string(),
            emit: EmitKind::LlvmIr,
        }
    }
}

/// Reads, translates and writes one program according to `opts`.
pub fn compile(opts: &CompileOptions) -> CompileResult<()> {
    let source = read_source(opts.input_path.as_deref())?;
    log::info!(
        "compiling {} ({} bytes) for {}",
        opts.input_path
            .as_deref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "<stdin>".to_string()),
        source.len(),
        opts.target_triple
    );

    let output = compile_source(&source, opts.emit, &opts.target_triple)?;
    write_output(opts.output_path.as_deref(), &output)?;
    log::info!("wrote {} bytes of {:?}", output.len(), opts.emit);
    Ok(())
}

/// Translates `source` and returns the serialized module.
pub fn compile_source(source: &str, emit: EmitKind, target_triple: &str) -> CompileResult<Vec<u8>> {
    match emit {
        EmitKind::Mir => {
            let mut builder = MirBuilder::new();
            build(&mut builder, source, target_triple, emit.format())
        }
        EmitKind::LlvmIr | EmitKind::Bc | EmitKind::Obj => {
            let context = Context::create();
            let mut codegen = CodeGen::new("bfc", &context);
            build(&mut codegen, source, target_triple, emit.format())
        }
    }
}

fn build<B: IrBuilder>(
    builder: &mut B,
    source: &str,
    target_triple: &str,
    format: OutputFormat,
) -> CompileResult<Vec<u8>> {
    translate(builder, source.chars())?;
    builder.set_target_triple(target_triple);
    builder.serialize(format)
}

/// Loads the program text. Invalid UTF-8 is replaced, which only ever
/// affects characters the lexer ignores anyway.
pub fn read_source(path: Option<&Path>) -> CompileResult<String> {
    let mut bytes = Vec::new();
    match source_file(path) {
        Some(path) => bytes = fs::read(path)?,
        None => {
            io::stdin().lock().read_to_end(&mut bytes)?;
        }
    }
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// The file to read, or `None` for standard input (no path, or `-`).
pub fn source_file(path: Option<&Path>) -> Option<&Path> {
    path.filter(|p| *p != Path::new("-"))
}

fn write_output(path: Option<&Path>, data: &[u8]) -> CompileResult<()> {
    match path {
        Some(path) => fs::write(path, data)?,
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(data)?;
            stdout.flush()?;
        }
    }
    Ok(())
}
