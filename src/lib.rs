// bfc compiler library
// Exports all compiler modules for testing and external use

pub mod cli;
pub mod codegen;
pub mod compiler;
pub mod error;
pub mod ir;
pub mod lexar;
pub mod mir;
pub mod tape;
pub mod translator;

// Re-export commonly used types
pub use codegen::CodeGen;
pub use compiler::{compile, compile_source, CompileOptions, EmitKind};
pub use error::{CompileError, CompileResult};
pub use ir::{Extern, IntWidth, IrBuilder, OutputFormat};
pub use lexar::lexer::lex;
pub use lexar::token::{Token, TokenType};
pub use mir::MirBuilder;
pub use translator::{translate, Translator};
