// Module checks and native object emission. The module is compiled exactly
// as built: no optimization passes run, the target machine uses
// OptimizationLevel::None.

use crate::codegen::core::CodeGen;
use crate::error::{CompileError, CompileResult};
use inkwell::targets::{
    CodeModel, FileType, InitializationConfig, RelocMode, Target, TargetMachine,
};
use inkwell::OptimizationLevel;

impl<'ctx> CodeGen<'ctx> {
    /// Rejects unterminated blocks, then runs the LLVM verifier.
    pub fn verify(&self) -> CompileResult<()> {
        if let Some(function) = self.function {
            for block in function.get_basic_blocks() {
                if block.get_terminator().is_none() {
                    return Err(CompileError::UnterminatedBlock {
                        block: block.get_name().to_string_lossy().into_owned(),
                    });
                }
            }
        }
        self.module.verify().map_err(|e| CompileError::Verify {
            reason: e.to_string(),
        })
    }

    /// Object code for the module's target triple, or the host triple when
    /// none was set.
    pub fn emit_object(&self) -> CompileResult<Vec<u8>> {
        Target::initialize_all(&InitializationConfig::default());

        let mut triple = self.module.get_triple();
        if triple.as_str().to_bytes().is_empty() {
            triple = TargetMachine::get_default_triple();
        }
        let triple_name = triple.as_str().to_string_lossy().into_owned();
        log::debug!("emitting object code for {}", triple_name);

        let target = Target::from_triple(&triple).map_err(|e| CompileError::Target {
            reason: e.to_string(),
        })?;
        let target_machine = target
            .create_target_machine(
                &triple,
                "generic",
                "",
                OptimizationLevel::None,
                RelocMode::PIC,
                CodeModel::Default,
            )
            .ok_or_else(|| CompileError::Target {
                reason: format!("no target machine for {}", triple_name),
            })?;

        let buffer = target_machine
            .write_to_memory_buffer(&self.module, FileType::Object)
            .map_err(|e| CompileError::Backend {
                reason: e.to_string(),
            })?;
        Ok(buffer.as_slice().to_vec())
    }
}
