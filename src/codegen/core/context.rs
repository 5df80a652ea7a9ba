use crate::ir::Extern;
use inkwell::{
    builder::Builder,
    context::Context,
    module::Module,
    values::FunctionValue,
    AddressSpace,
};
use std::collections::HashMap;

/// LLVM implementation of [`crate::ir::IrBuilder`].
/// Holds the module being built and the instruction builder positioned in it.
pub struct CodeGen<'ctx> {
    pub context: &'ctx Context,
    pub module: Module<'ctx>, // The container for the entry function and extern declarations
    pub builder: Builder<'ctx>, // The tool used to insert instructions into blocks
    pub function: Option<FunctionValue<'ctx>>, // Function currently being built
    pub externs: HashMap<Extern, FunctionValue<'ctx>>, // Declared runtime routines
}

impl<'ctx> CodeGen<'ctx> {
    /// Creates a new CodeGen instance, initializing LLVM structures.
    pub fn new(module_name: &str, context: &'ctx Context) -> Self {
        let module = context.create_module(module_name);
        let builder = context.create_builder();

        Self {
            context,
            module,
            builder,
            function: None,
            externs: HashMap::new(),
        }
    }

    /// Declares the runtime routines the generated program links against.
    /// Idempotent.
    pub fn declare_externs(&mut self) {
        let i8_type = self.context.i8_type();
        let i32_type = self.context.i32_type();
        let i64_type = self.context.i64_type();
        let ptr_type = self.context.ptr_type(AddressSpace::default());

        for ext in Extern::ALL {
            if self.externs.contains_key(&ext) {
                continue;
            }
            let fn_type = match ext {
                Extern::PutChar => i32_type.fn_type(&[i8_type.into()], false),
                Extern::GetChar => i8_type.fn_type(&[], false),
                Extern::MemSet => self.context.void_type().fn_type(
                    &[ptr_type.into(), i8_type.into(), i64_type.into()],
                    false,
                ),
            };
            let func = self
                .module
                .get_function(ext.symbol())
                .unwrap_or_else(|| self.module.add_function(ext.symbol(), fn_type, None));
            self.externs.insert(ext, func);
        }
    }
}
