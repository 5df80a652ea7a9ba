//! Error types for the compiler.
//!
//! Bracket imbalance is the only error the translator itself raises; the
//! remaining variants come from I/O and the backends.

use thiserror::Error;

/// Main error type for a compilation run.
#[derive(Error, Debug)]
pub enum CompileError {
    #[error("unexpected closing bracket at {line}:{col}")]
    UnexpectedClose { line: usize, col: usize },

    #[error("unclosed '[' opened at {line}:{col}")]
    UnclosedOpen { line: usize, col: usize },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("backend failure: {reason}")]
    Backend { reason: String },

    #[error("module verification failed: {reason}")]
    Verify { reason: String },

    #[error("target setup failed: {reason}")]
    Target { reason: String },

    #[error("block '{block}' has no terminator")]
    UnterminatedBlock { block: String },

    #[error("block '{block}' is already terminated")]
    DuplicateTerminator { block: String },

    #[error("the {backend} backend cannot emit {format}")]
    UnsupportedFormat {
        backend: &'static str,
        format: &'static str,
    },
}

impl CompileError {
    /// True for the bracket balance errors raised by the translator.
    pub fn is_balance_error(&self) -> bool {
        matches!(
            self,
            CompileError::UnexpectedClose { .. } | CompileError::UnclosedOpen { .. }
        )
    }
}

/// Result type alias for compile operations.
pub type CompileResult<T> = Result<T, CompileError>;
