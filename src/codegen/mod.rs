//! LLVM backend built on inkwell.

use crate::error::CompileError;
use inkwell::builder::BuilderError;

pub mod builder;
pub mod core;
pub mod emit;

pub use self::core::CodeGen;

impl From<BuilderError> for CompileError {
    fn from(err: BuilderError) -> Self {
        CompileError::Backend {
            reason: err.to_string(),
        }
    }
}
