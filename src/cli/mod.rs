use crate::compiler::{compile, CompileOptions, EmitKind, DEFAULT_TARGET_TRIPLE};
use clap::Parser;
use std::path::PathBuf;

/// CLI definition for the bfc compiler.
#[derive(Parser, Debug)]
#[command(name = "bfc")]
#[command(about = "Compiler for Brainfuck targeting LLVM")]
#[command(version)]
pub struct Cli {
    /// Source file to compile; reads standard input when omitted or `-`
    pub input: Option<PathBuf>,

    /// Target triple written into the module
    #[arg(long, default_value = DEFAULT_TARGET_TRIPLE)]
    pub arch: String,

    /// Output file path; writes to standard output when omitted
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Output form
    #[arg(long, value_enum, default_value_t = EmitKind::LlvmIr)]
    pub emit: EmitKind,
}

impl Cli {
    pub fn options(&self) -> CompileOptions {
        CompileOptions {
            input_path: self.input.clone(),
            output_path: self.output.clone(),
            target_triple: self.arch.clone(),
            emit: self.emit,
        }
    }
}

/// Rewrites the single-dash `-arch` spelling into `--arch` so that
/// invocations written for the Go-flag style driver keep working.
pub fn normalize_args<I>(args: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    args.into_iter()
        .map(|arg| match arg.strip_prefix("-arch") {
            Some(rest) if rest.is_empty() || rest.starts_with('=') => format!("--arch{}", rest),
            _ => arg,
        })
        .collect()
}

/// Entrypoint for CLI logic.
/// Returns exit code (0 for success, nonzero for error).
pub fn run_cli(cli: Cli) -> i32 {
    match compile(&cli.options()) {
        Ok(()) => 0,
        Err(e) => {
            log::debug!("compilation aborted: {:?}", e);
            eprintln!("error: {}", e);
            1
        }
    }
}
