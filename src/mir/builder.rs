use crate::error::{CompileError, CompileResult};
use crate::ir::{Extern, IntWidth, IrBuilder, OutputFormat};
use crate::mir::{
    BlockId, MirBlock, MirFunction, MirInstr, MirProgram, MirTerminator, Operand, ValueId,
};

/// What an instruction result holds, used to type-check operands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ValueKind {
    Int(IntWidth),
    Bool,
    Ptr,
}

/// Records every builder call as plain MIR data.
///
/// Used by the tests and by `--emit mir`; catches the structural mistakes
/// LLVM's verifier would (operand type mismatches, instructions after a
/// terminator, blocks left open).
pub struct MirBuilder {
    pub program: MirProgram,
    cursor: Option<BlockId>,
    kinds: Vec<ValueKind>, // indexed by ValueId
}

impl Default for MirBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl MirBuilder {
    pub fn new() -> Self {
        Self {
            program: MirProgram::default(),
            cursor: None,
            kinds: Vec::new(),
        }
    }

    pub fn into_program(self) -> MirProgram {
        self.program
    }

    fn function_mut(&mut self) -> CompileResult<&mut MirFunction> {
        self.program
            .functions
            .last_mut()
            .ok_or_else(|| CompileError::Backend {
                reason: "no function has been started".to_string(),
            })
    }

    fn block_mut(&mut self) -> CompileResult<&mut MirBlock> {
        let cursor = self.cursor.ok_or_else(|| CompileError::Backend {
            reason: "builder is not positioned in a block".to_string(),
        })?;
        let func = self.function_mut()?;
        func.blocks.get_mut(cursor.0).ok_or_else(|| CompileError::Backend {
            reason: format!("block #{} does not exist", cursor.0),
        })
    }

    fn next_value(&mut self, kind: ValueKind) -> ValueId {
        let id = ValueId(self.kinds.len() as u32);
        self.kinds.push(kind);
        id
    }

    fn kind_of(&self, operand: Operand) -> CompileResult<ValueKind> {
        match operand {
            Operand::Const { width, .. } => Ok(ValueKind::Int(width)),
            Operand::Value(id) => {
                self.kinds
                    .get(id.0 as usize)
                    .copied()
                    .ok_or_else(|| CompileError::Backend {
                        reason: format!("unknown value {}", id),
                    })
            }
        }
    }

    fn expect_kind(&self, operand: Operand, expected: ValueKind, what: &str) -> CompileResult<()> {
        let found = self.kind_of(operand)?;
        if found != expected {
            return Err(CompileError::Backend {
                reason: format!("{} expects {:?}, found {:?} ({})", what, expected, found, operand),
            });
        }
        Ok(())
    }

    fn push_instr(&mut self, instr: MirInstr) -> CompileResult<()> {
        let block = self.block_mut()?;
        if block.is_terminated() {
            return Err(CompileError::Backend {
                reason: format!("instruction appended after terminator in '{}'", block.label),
            });
        }
        block.instrs.push(instr);
        Ok(())
    }

    fn check_block(&mut self, target: BlockId) -> CompileResult<()> {
        let func = self.function_mut()?;
        if target.0 >= func.blocks.len() {
            return Err(CompileError::Backend {
                reason: format!("branch to unknown block #{}", target.0),
            });
        }
        Ok(())
    }

    fn terminate(&mut self, term: MirTerminator) -> CompileResult<()> {
        for succ in term.successors() {
            self.check_block(succ)?;
        }
        let block = self.block_mut()?;
        if block.is_terminated() {
            return Err(CompileError::DuplicateTerminator {
                block: block.label.clone(),
            });
        }
        block.terminator = Some(term);
        Ok(())
    }

    /// Fails on the first block without a terminator.
    pub fn check_terminated(&self) -> CompileResult<()> {
        for func in &self.program.functions {
            if let Some(open) = func.blocks.iter().find(|b| !b.is_terminated()) {
                return Err(CompileError::UnterminatedBlock {
                    block: open.label.clone(),
                });
            }
        }
        Ok(())
    }
}

impl IrBuilder for MirBuilder {
    type Block = BlockId;
    type Value = Operand;

    fn begin_function(&mut self, name: &str) -> CompileResult<BlockId> {
        if self.program.externs.is_empty() {
            self.program.externs.extend(Extern::ALL);
        }
        self.program.functions.push(MirFunction {
            name: name.to_string(),
            blocks: Vec::new(),
        });
        let entry = self.append_block("entry")?;
        self.position_at_end(entry);
        Ok(entry)
    }

    fn append_block(&mut self, name: &str) -> CompileResult<BlockId> {
        let func = self.function_mut()?;
        func.blocks.push(MirBlock {
            label: name.to_string(),
            instrs: Vec::new(),
            terminator: None,
        });
        Ok(BlockId(func.blocks.len() - 1))
    }

    fn position_at_end(&mut self, block: BlockId) {
        self.cursor = Some(block);
    }

    fn current_block(&self) -> Option<BlockId> {
        self.cursor
    }

    fn const_int(&mut self, width: IntWidth, value: i64) -> Operand {
        Operand::Const { width, value }
    }

    fn alloca(&mut self, width: IntWidth, _name: &str) -> CompileResult<Operand> {
        let dest = self.next_value(ValueKind::Ptr);
        self.push_instr(MirInstr::Alloca { dest, width })?;
        Ok(Operand::Value(dest))
    }

    fn alloca_array(&mut self, width: IntWidth, len: u64, _name: &str) -> CompileResult<Operand> {
        let dest = self.next_value(ValueKind::Ptr);
        self.push_instr(MirInstr::AllocaArray { dest, width, len })?;
        Ok(Operand::Value(dest))
    }

    fn element_ptr(
        &mut self,
        array: Operand,
        width: IntWidth,
        len: u64,
        index: Operand,
    ) -> CompileResult<Operand> {
        self.expect_kind(array, ValueKind::Ptr, "elementptr base")?;
        self.expect_kind(index, ValueKind::Int(IntWidth::I64), "elementptr index")?;
        let dest = self.next_value(ValueKind::Ptr);
        self.push_instr(MirInstr::ElementPtr {
            dest,
            array,
            width,
            len,
            index,
        })?;
        Ok(Operand::Value(dest))
    }

    fn load(&mut self, width: IntWidth, ptr: Operand) -> CompileResult<Operand> {
        self.expect_kind(ptr, ValueKind::Ptr, "load")?;
        let dest = self.next_value(ValueKind::Int(width));
        self.push_instr(MirInstr::Load { dest, width, ptr })?;
        Ok(Operand::Value(dest))
    }

    fn store(&mut self, value: Operand, ptr: Operand) -> CompileResult<()> {
        self.expect_kind(ptr, ValueKind::Ptr, "store")?;
        match self.kind_of(value)? {
            ValueKind::Int(_) => self.push_instr(MirInstr::Store { value, ptr }),
            other => Err(CompileError::Backend {
                reason: format!("store expects an integer, found {:?}", other),
            }),
        }
    }

    fn add(&mut self, lhs: Operand, rhs: Operand) -> CompileResult<Operand> {
        let width = match self.kind_of(lhs)? {
            ValueKind::Int(width) => width,
            other => {
                return Err(CompileError::Backend {
                    reason: format!("add expects an integer, found {:?}", other),
                })
            }
        };
        self.expect_kind(rhs, ValueKind::Int(width), "add")?;
        let dest = self.next_value(ValueKind::Int(width));
        self.push_instr(MirInstr::Add {
            dest,
            width,
            lhs,
            rhs,
        })?;
        Ok(Operand::Value(dest))
    }

    fn icmp_ne(&mut self, lhs: Operand, rhs: Operand) -> CompileResult<Operand> {
        let lhs_kind = self.kind_of(lhs)?;
        self.expect_kind(rhs, lhs_kind, "icmp")?;
        let dest = self.next_value(ValueKind::Bool);
        self.push_instr(MirInstr::ICmpNe { dest, lhs, rhs })?;
        Ok(Operand::Value(dest))
    }

    fn call(&mut self, callee: Extern, args: &[Operand]) -> CompileResult<Option<Operand>> {
        let params: &[ValueKind] = match callee {
            Extern::PutChar => &[ValueKind::Int(IntWidth::I8)],
            Extern::GetChar => &[],
            Extern::MemSet => &[
                ValueKind::Ptr,
                ValueKind::Int(IntWidth::I8),
                ValueKind::Int(IntWidth::I64),
            ],
        };
        if params.len() != args.len() {
            return Err(CompileError::Backend {
                reason: format!(
                    "@{} takes {} arguments, got {}",
                    callee.symbol(),
                    params.len(),
                    args.len()
                ),
            });
        }
        for (arg, param) in args.iter().zip(params) {
            self.expect_kind(*arg, *param, callee.symbol())?;
        }

        let dest = match callee {
            Extern::PutChar => Some(self.next_value(ValueKind::Int(IntWidth::I32))),
            Extern::GetChar => Some(self.next_value(ValueKind::Int(IntWidth::I8))),
            Extern::MemSet => None,
        };
        self.push_instr(MirInstr::Call {
            dest,
            callee,
            args: args.to_vec(),
        })?;
        Ok(dest.map(Operand::Value))
    }

    fn br(&mut self, target: BlockId) -> CompileResult<()> {
        self.terminate(MirTerminator::Br(target))
    }

    fn cond_br(
        &mut self,
        cond: Operand,
        then_block: BlockId,
        else_block: BlockId,
    ) -> CompileResult<()> {
        self.expect_kind(cond, ValueKind::Bool, "conditional branch")?;
        self.terminate(MirTerminator::CondBr {
            cond,
            then_block,
            else_block,
        })
    }

    fn ret(&mut self, value: Operand) -> CompileResult<()> {
        self.expect_kind(value, ValueKind::Int(IntWidth::I32), "ret")?;
        self.terminate(MirTerminator::Ret(value))
    }

    fn set_target_triple(&mut self, triple: &str) {
        self.program.target_triple = Some(triple.to_string());
    }

    fn serialize(&self, format: OutputFormat) -> CompileResult<Vec<u8>> {
        if format != OutputFormat::Text {
            return Err(CompileError::UnsupportedFormat {
                backend: "mir",
                format: format.name(),
            });
        }
        self.check_terminated()?;
        Ok(self.program.to_string().into_bytes())
    }
}
