use crate::codegen::core::CodeGen;
use crate::error::CompileResult;
use crate::ir::{Extern, IntWidth, IrBuilder, OutputFormat};
use inkwell::basic_block::BasicBlock;
use inkwell::targets::TargetTriple;
use inkwell::values::{BasicMetadataValueEnum, BasicValueEnum};
use inkwell::IntPredicate;

impl<'ctx> IrBuilder for CodeGen<'ctx> {
    type Block = BasicBlock<'ctx>;
    type Value = BasicValueEnum<'ctx>;

    fn begin_function(&mut self, name: &str) -> CompileResult<BasicBlock<'ctx>> {
        self.declare_externs();

        let fn_type = self.context.i32_type().fn_type(&[], false);
        let function = self.module.add_function(name, fn_type, None);
        self.function = Some(function);

        let entry = self.context.append_basic_block(function, "entry");
        self.builder.position_at_end(entry);
        Ok(entry)
    }

    fn append_block(&mut self, name: &str) -> CompileResult<BasicBlock<'ctx>> {
        let function = self.current_function()?;
        Ok(self.context.append_basic_block(function, name))
    }

    fn position_at_end(&mut self, block: BasicBlock<'ctx>) {
        self.builder.position_at_end(block);
    }

    fn current_block(&self) -> Option<BasicBlock<'ctx>> {
        self.builder.get_insert_block()
    }

    fn const_int(&mut self, width: IntWidth, value: i64) -> BasicValueEnum<'ctx> {
        self.int_type(width).const_int(value as u64, true).into()
    }

    fn alloca(&mut self, width: IntWidth, name: &str) -> CompileResult<BasicValueEnum<'ctx>> {
        let slot = self.builder.build_alloca(self.int_type(width), name)?;
        Ok(slot.into())
    }

    fn alloca_array(
        &mut self,
        width: IntWidth,
        len: u64,
        name: &str,
    ) -> CompileResult<BasicValueEnum<'ctx>> {
        let array_type = self.int_type(width).array_type(len as u32);
        let slot = self.builder.build_alloca(array_type, name)?;
        Ok(slot.into())
    }

    fn element_ptr(
        &mut self,
        array: BasicValueEnum<'ctx>,
        width: IntWidth,
        len: u64,
        index: BasicValueEnum<'ctx>,
    ) -> CompileResult<BasicValueEnum<'ctx>> {
        let array = self.expect_ptr(array)?;
        let index = self.expect_int(index)?;
        let array_type = self.int_type(width).array_type(len as u32);
        let zero = self.context.i64_type().const_zero();
        // No bounds check: the cell pointer is trusted.
        let ptr = unsafe {
            self.builder
                .build_gep(array_type, array, &[zero, index], "cell")?
        };
        Ok(ptr.into())
    }

    fn load(
        &mut self,
        width: IntWidth,
        ptr: BasicValueEnum<'ctx>,
    ) -> CompileResult<BasicValueEnum<'ctx>> {
        let ptr = self.expect_ptr(ptr)?;
        Ok(self.builder.build_load(self.int_type(width), ptr, "val")?)
    }

    fn store(
        &mut self,
        value: BasicValueEnum<'ctx>,
        ptr: BasicValueEnum<'ctx>,
    ) -> CompileResult<()> {
        let ptr = self.expect_ptr(ptr)?;
        self.builder.build_store(ptr, value)?;
        Ok(())
    }

    fn add(
        &mut self,
        lhs: BasicValueEnum<'ctx>,
        rhs: BasicValueEnum<'ctx>,
    ) -> CompileResult<BasicValueEnum<'ctx>> {
        let lhs = self.expect_int(lhs)?;
        let rhs = self.expect_int(rhs)?;
        Ok(self.builder.build_int_add(lhs, rhs, "sum")?.into())
    }

    fn icmp_ne(
        &mut self,
        lhs: BasicValueEnum<'ctx>,
        rhs: BasicValueEnum<'ctx>,
    ) -> CompileResult<BasicValueEnum<'ctx>> {
        let lhs = self.expect_int(lhs)?;
        let rhs = self.expect_int(rhs)?;
        Ok(self
            .builder
            .build_int_compare(IntPredicate::NE, lhs, rhs, "nonzero")?
            .into())
    }

    fn call(
        &mut self,
        callee: Extern,
        args: &[BasicValueEnum<'ctx>],
    ) -> CompileResult<Option<BasicValueEnum<'ctx>>> {
        let function = self.extern_fn(callee)?;
        let args: Vec<BasicMetadataValueEnum<'ctx>> = args.iter().map(|a| (*a).into()).collect();
        // void calls must stay unnamed
        let name = if callee.returns_value() { "call" } else { "" };
        let call = self.builder.build_call(function, &args, name)?;
        Ok(call.try_as_basic_value().left())
    }

    fn br(&mut self, target: BasicBlock<'ctx>) -> CompileResult<()> {
        self.builder.build_unconditional_branch(target)?;
        Ok(())
    }

    fn cond_br(
        &mut self,
        cond: BasicValueEnum<'ctx>,
        then_block: BasicBlock<'ctx>,
        else_block: BasicBlock<'ctx>,
    ) -> CompileResult<()> {
        let cond = self.expect_int(cond)?;
        self.builder
            .build_conditional_branch(cond, then_block, else_block)?;
        Ok(())
    }

    fn ret(&mut self, value: BasicValueEnum<'ctx>) -> CompileResult<()> {
        self.builder.build_return(Some(&value))?;
        Ok(())
    }

    fn set_target_triple(&mut self, triple: &str) {
        self.module.set_triple(&TargetTriple::create(triple));
    }

    fn serialize(&self, format: OutputFormat) -> CompileResult<Vec<u8>> {
        self.verify()?;
        match format {
            OutputFormat::Text => Ok(self.module.print_to_string().to_string().into_bytes()),
            OutputFormat::Bitcode => Ok(self.module.write_bitcode_to_memory().as_slice().to_vec()),
            OutputFormat::Object => self.emit_object(),
        }
    }
}
