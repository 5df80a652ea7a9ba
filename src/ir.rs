//! The capability set the translator emits code through.
//!
//! Backends implement [`IrBuilder`]; the translator only ever holds opaque
//! block and value handles and never sees a backend's instruction encoding.

use crate::error::CompileResult;
use std::fmt;

/// Integer widths used by the generated program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntWidth {
    I8,
    I32,
    I64,
}

impl IntWidth {
    pub fn bits(self) -> u32 {
        match self {
            IntWidth::I8 => 8,
            IntWidth::I32 => 32,
            IntWidth::I64 => 64,
        }
    }

    pub fn bytes(self) -> usize {
        self.bits() as usize / 8
    }
}

impl fmt::Display for IntWidth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "i{}", self.bits())
    }
}

/// External routines the generated program links against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Extern {
    /// `i32 putchar(i8)`
    PutChar,
    /// `i8 safe_getchar()`: the byte read, or 0 at end of input or on error.
    GetChar,
    /// `void memset(ptr, i8, i64)`
    MemSet,
}

impl Extern {
    pub const ALL: [Extern; 3] = [Extern::PutChar, Extern::GetChar, Extern::MemSet];

    pub fn symbol(self) -> &'static str {
        match self {
            Extern::PutChar => "putchar",
            Extern::GetChar => "safe_getchar",
            Extern::MemSet => "memset",
        }
    }

    /// Whether a call to this routine yields a value.
    pub fn returns_value(self) -> bool {
        !matches!(self, Extern::MemSet)
    }
}

/// Serialized forms of a finished module.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Bitcode,
    Object,
}

impl OutputFormat {
    pub fn name(self) -> &'static str {
        match self {
            OutputFormat::Text => "text",
            OutputFormat::Bitcode => "bitcode",
            OutputFormat::Object => "object code",
        }
    }
}

/// A backend able to build one module holding a single entry function.
pub trait IrBuilder {
    type Block: Copy + PartialEq + fmt::Debug;
    type Value: Copy + fmt::Debug;

    /// Creates `i32 name()` with an entry block, declares every [`Extern`],
    /// and positions the builder at the end of the entry block.
    fn begin_function(&mut self, name: &str) -> CompileResult<Self::Block>;

    /// Appends a new empty block to the current function.
    fn append_block(&mut self, name: &str) -> CompileResult<Self::Block>;

    fn position_at_end(&mut self, block: Self::Block);

    /// Block new instructions are appended to, if positioned.
    fn current_block(&self) -> Option<Self::Block>;

    fn const_int(&mut self, width: IntWidth, value: i64) -> Self::Value;

    /// Stack slot holding one integer.
    fn alloca(&mut self, width: IntWidth, name: &str) -> CompileResult<Self::Value>;

    /// Stack slot holding `len` integers of `width`.
    fn alloca_array(&mut self, width: IntWidth, len: u64, name: &str)
        -> CompileResult<Self::Value>;

    /// Address of `array[index]` where `array` came from [`IrBuilder::alloca_array`].
    fn element_ptr(
        &mut self,
        array: Self::Value,
        width: IntWidth,
        len: u64,
        index: Self::Value,
    ) -> CompileResult<Self::Value>;

    fn load(&mut self, width: IntWidth, ptr: Self::Value) -> CompileResult<Self::Value>;

    fn store(&mut self, value: Self::Value, ptr: Self::Value) -> CompileResult<()>;

    /// Wrapping integer addition; both operands share a width.
    fn add(&mut self, lhs: Self::Value, rhs: Self::Value) -> CompileResult<Self::Value>;

    /// `lhs != rhs`, producing a boolean usable by [`IrBuilder::cond_br`].
    fn icmp_ne(&mut self, lhs: Self::Value, rhs: Self::Value) -> CompileResult<Self::Value>;

    /// Calls an external routine. Returns `None` for routines without a result.
    fn call(&mut self, callee: Extern, args: &[Self::Value])
        -> CompileResult<Option<Self::Value>>;

    fn br(&mut self, target: Self::Block) -> CompileResult<()>;

    fn cond_br(
        &mut self,
        cond: Self::Value,
        then_block: Self::Block,
        else_block: Self::Block,
    ) -> CompileResult<()>;

    fn ret(&mut self, value: Self::Value) -> CompileResult<()>;

    fn set_target_triple(&mut self, triple: &str);

    /// Checks the module is complete and serializes it.
    fn serialize(&self, format: OutputFormat) -> CompileResult<Vec<u8>>;
}
