use crate::codegen::core::CodeGen;
use crate::error::{CompileError, CompileResult};
use crate::ir::{Extern, IntWidth};
use inkwell::types::IntType;
use inkwell::values::{BasicValueEnum, FunctionValue, IntValue, PointerValue};

impl<'ctx> CodeGen<'ctx> {
    /// Returns the LLVM integer type for a width.
    pub fn int_type(&self, width: IntWidth) -> IntType<'ctx> {
        match width {
            IntWidth::I8 => self.context.i8_type(),
            IntWidth::I32 => self.context.i32_type(),
            IntWidth::I64 => self.context.i64_type(),
        }
    }

    pub fn expect_int(&self, value: BasicValueEnum<'ctx>) -> CompileResult<IntValue<'ctx>> {
        match value {
            BasicValueEnum::IntValue(v) => Ok(v),
            other => Err(CompileError::Backend {
                reason: format!("expected an integer value, found {:?}", other.get_type()),
            }),
        }
    }

    pub fn expect_ptr(&self, value: BasicValueEnum<'ctx>) -> CompileResult<PointerValue<'ctx>> {
        match value {
            BasicValueEnum::PointerValue(v) => Ok(v),
            other => Err(CompileError::Backend {
                reason: format!("expected a pointer value, found {:?}", other.get_type()),
            }),
        }
    }

    /// Looks up a declared runtime routine.
    pub fn extern_fn(&self, ext: Extern) -> CompileResult<FunctionValue<'ctx>> {
        self.externs
            .get(&ext)
            .copied()
            .ok_or_else(|| CompileError::Backend {
                reason: format!("@{} has not been declared", ext.symbol()),
            })
    }

    pub fn current_function(&self) -> CompileResult<FunctionValue<'ctx>> {
        self.function.ok_or_else(|| CompileError::Backend {
            reason: "no function has been started".to_string(),
        })
    }
}
