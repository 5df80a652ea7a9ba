#[cfg(test)]
mod mir_tests {
    use crate::error::CompileError;
    use crate::ir::{Extern, IntWidth, IrBuilder, OutputFormat};
    use crate::mir::{
        run_program, BlockId, ExecError, MirBuilder, MirInstr, MirInterpreter, MirTerminator,
    };
    use crate::translator::translate;

    fn started() -> MirBuilder {
        let mut builder = MirBuilder::new();
        builder.begin_function("main").unwrap();
        builder
    }

    // =====================
    // Builder bookkeeping
    // =====================

    #[test]
    fn test_begin_function_positions_at_entry() {
        let mut builder = MirBuilder::new();
        let entry = builder.begin_function("main").unwrap();
        assert_eq!(builder.current_block(), Some(entry));
        assert_eq!(builder.program.functions[0].blocks[0].label, "entry");
    }

    #[test]
    fn test_instruction_before_function_fails() {
        let mut builder = MirBuilder::new();
        assert!(matches!(
            builder.alloca(IntWidth::I64, "p"),
            Err(CompileError::Backend { .. })
        ));
    }

    #[test]
    fn test_unconditional_branch() {
        let mut builder = started();
        let next = builder.append_block("next").unwrap();
        builder.br(next).unwrap();
        builder.position_at_end(next);
        let zero = builder.const_int(IntWidth::I32, 0);
        builder.ret(zero).unwrap();

        let program = builder.into_program();
        let main = program.function("main").unwrap();
        assert_eq!(main.blocks[0].terminator, Some(MirTerminator::Br(next)));
        assert_eq!(run_program(&program, b"").unwrap().exit_code, 0);
    }

    #[test]
    fn test_second_terminator_is_rejected() {
        let mut builder = started();
        let zero = builder.const_int(IntWidth::I32, 0);
        builder.ret(zero).unwrap();
        let err = builder.ret(zero).unwrap_err();
        assert!(matches!(err, CompileError::DuplicateTerminator { block } if block == "entry"));
    }

    #[test]
    fn test_instruction_after_terminator_is_rejected() {
        let mut builder = started();
        let zero = builder.const_int(IntWidth::I32, 0);
        builder.ret(zero).unwrap();
        assert!(builder.alloca(IntWidth::I8, "late").is_err());
    }

    #[test]
    fn test_unterminated_block_blocks_serialization() {
        let mut builder = started();
        builder.append_block("dangling").unwrap();
        let zero = builder.const_int(IntWidth::I32, 0);
        builder.ret(zero).unwrap();
        let err = builder.serialize(OutputFormat::Text).unwrap_err();
        assert!(matches!(err, CompileError::UnterminatedBlock { block } if block == "dangling"));
    }

    #[test]
    fn test_binary_formats_are_unsupported() {
        let mut builder = MirBuilder::new();
        translate(&mut builder, "+".chars()).unwrap();
        for format in [OutputFormat::Bitcode, OutputFormat::Object] {
            assert!(matches!(
                builder.serialize(format),
                Err(CompileError::UnsupportedFormat { backend: "mir", .. })
            ));
        }
    }

    // =====================
    // Operand checks
    // =====================

    #[test]
    fn test_add_width_mismatch() {
        let mut builder = started();
        let a = builder.const_int(IntWidth::I8, 1);
        let b = builder.const_int(IntWidth::I64, 1);
        assert!(builder.add(a, b).is_err());
    }

    #[test]
    fn test_load_requires_pointer() {
        let mut builder = started();
        let not_ptr = builder.const_int(IntWidth::I64, 0);
        assert!(builder.load(IntWidth::I8, not_ptr).is_err());
    }

    #[test]
    fn test_call_arity_and_types() {
        let mut builder = started();
        assert!(builder.call(Extern::PutChar, &[]).is_err());
        let wide = builder.const_int(IntWidth::I64, 65);
        assert!(builder.call(Extern::PutChar, &[wide]).is_err());
        let byte = builder.const_int(IntWidth::I8, 65);
        assert!(builder.call(Extern::PutChar, &[byte]).unwrap().is_some());
        assert!(builder.call(Extern::GetChar, &[]).unwrap().is_some());
    }

    #[test]
    fn test_cond_br_requires_comparison() {
        let mut builder = started();
        let body = builder.append_block("body").unwrap();
        let not_bool = builder.const_int(IntWidth::I8, 1);
        assert!(builder.cond_br(not_bool, body, body).is_err());
    }

    #[test]
    fn test_branch_to_unknown_block() {
        let mut builder = started();
        assert!(builder.br(BlockId(9)).is_err());
    }

    // =====================
    // Textual form
    // =====================

    #[test]
    fn test_text_output() {
        let mut builder = MirBuilder::new();
        translate(&mut builder, "[-].".chars()).unwrap();
        builder.set_target_triple("x86_64-pc-linux-gnu");
        let text = String::from_utf8(builder.serialize(OutputFormat::Text).unwrap()).unwrap();

        assert!(text.starts_with("target triple = \"x86_64-pc-linux-gnu\""));
        assert!(text.contains("declare i32 @putchar(i8)"));
        assert!(text.contains("declare i8 @safe_getchar()"));
        assert!(text.contains("declare void @memset(ptr, i8, i64)"));
        assert!(text.contains("define i32 @main() {"));
        assert!(text.contains("alloca [1048575 x i8]"));
        assert!(text.contains("label %loop.body.0, label %loop.exit.0"));
        assert!(text.contains("add i8 %"));
        assert!(text.contains("call @putchar("));
        assert!(text.trim_end().ends_with("ret i32 0\n}"));
    }

    // =====================
    // Interpreter
    // =====================

    #[test]
    fn test_infinite_loop_runs_out_of_fuel() {
        let mut builder = MirBuilder::new();
        translate(&mut builder, "+[]".chars()).unwrap();
        let program = builder.into_program();
        let result = MirInterpreter::new(&program, b"").with_fuel(1_000).run();
        assert_eq!(result, Err(ExecError::OutOfFuel(1_000)));
    }

    #[test]
    fn test_missing_main() {
        let program = crate::mir::MirProgram::default();
        assert_eq!(
            run_program(&program, b""),
            Err(ExecError::MissingFunction("main".to_string()))
        );
    }

    #[test]
    fn test_branch_to_missing_block_is_an_error() {
        let mut builder = MirBuilder::new();
        translate(&mut builder, "".chars()).unwrap();
        let mut program = builder.into_program();
        program.functions[0].blocks[0].terminator = Some(MirTerminator::Br(BlockId(7)));
        assert_eq!(
            run_program(&program, b""),
            Err(ExecError::UnknownBlock(BlockId(7)))
        );
    }

    #[test]
    fn test_call_with_wrong_argument_count_is_an_error() {
        let mut builder = MirBuilder::new();
        translate(&mut builder, "".chars()).unwrap();
        let mut program = builder.into_program();
        program.functions[0].blocks[0].instrs.push(MirInstr::Call {
            dest: None,
            callee: Extern::PutChar,
            args: vec![],
        });
        assert_eq!(
            run_program(&program, b""),
            Err(ExecError::ArgumentCount {
                callee: "putchar",
                expected: 1,
                found: 0,
            })
        );
    }

    #[test]
    fn test_input_past_end_reads_zero() {
        let mut builder = MirBuilder::new();
        translate(&mut builder, ",.,.,.".chars()).unwrap();
        let program = builder.into_program();
        assert_eq!(run_program(&program, b"A").unwrap().output, vec![b'A', 0, 0]);
    }
}
