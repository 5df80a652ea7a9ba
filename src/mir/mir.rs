//! Mid-level Intermediate Representation recorded by [`super::MirBuilder`].
//! Plain data: every emitted instruction and block as the translator asked
//! for it, with no backend behind it.

use crate::ir::{Extern, IntWidth};
use std::fmt;

/// A complete recorded module
#[derive(Debug, Clone, Default)]
pub struct MirProgram {
    pub target_triple: Option<String>,
    pub externs: Vec<Extern>,
    pub functions: Vec<MirFunction>,
}

/// A single function in MIR form. Always `i32 name()`.
#[derive(Debug, Clone)]
pub struct MirFunction {
    pub name: String,
    pub blocks: Vec<MirBlock>,
}

/// A basic block - sequence of instructions with single entry/exit
#[derive(Debug, Clone)]
pub struct MirBlock {
    pub label: String,
    pub instrs: Vec<MirInstr>,
    pub terminator: Option<MirTerminator>,
}

/// Index of a block inside its function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlockId(pub usize);

/// SSA-style name of an instruction result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ValueId(pub u32);

/// Instruction operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operand {
    Value(ValueId),
    Const { width: IntWidth, value: i64 },
}

#[derive(Debug, Clone, PartialEq)]
pub enum MirInstr {
    Alloca {
        dest: ValueId,
        width: IntWidth,
    },
    AllocaArray {
        dest: ValueId,
        width: IntWidth,
        len: u64,
    },
    ElementPtr {
        dest: ValueId,
        array: Operand,
        width: IntWidth,
        len: u64,
        index: Operand,
    },
    Load {
        dest: ValueId,
        width: IntWidth,
        ptr: Operand,
    },
    Store {
        value: Operand,
        ptr: Operand,
    },
    Add {
        dest: ValueId,
        width: IntWidth,
        lhs: Operand,
        rhs: Operand,
    },
    ICmpNe {
        dest: ValueId,
        lhs: Operand,
        rhs: Operand,
    },
    Call {
        dest: Option<ValueId>,
        callee: Extern,
        args: Vec<Operand>,
    },
}

/// Block terminators
#[derive(Debug, Clone, PartialEq)]
pub enum MirTerminator {
    Br(BlockId),
    CondBr {
        cond: Operand,
        then_block: BlockId,
        else_block: BlockId,
    },
    Ret(Operand),
}

impl MirTerminator {
    /// Blocks control may continue to.
    pub fn successors(&self) -> Vec<BlockId> {
        match self {
            MirTerminator::Br(target) => vec![*target],
            MirTerminator::CondBr {
                then_block,
                else_block,
                ..
            } => vec![*then_block, *else_block],
            MirTerminator::Ret(_) => vec![],
        }
    }
}

impl MirProgram {
    pub fn function(&self, name: &str) -> Option<&MirFunction> {
        self.functions.iter().find(|f| f.name == name)
    }
}

impl MirFunction {
    pub fn block(&self, id: BlockId) -> &MirBlock {
        &self.blocks[id.0]
    }

    pub fn get_block(&self, id: BlockId) -> Option<&MirBlock> {
        self.blocks.get(id.0)
    }

    pub fn block_by_label(&self, label: &str) -> Option<(BlockId, &MirBlock)> {
        self.blocks
            .iter()
            .enumerate()
            .find(|(_, b)| b.label == label)
            .map(|(i, b)| (BlockId(i), b))
    }

    /// All non-terminator instructions in block order.
    pub fn instrs(&self) -> impl Iterator<Item = &MirInstr> {
        self.blocks.iter().flat_map(|b| b.instrs.iter())
    }
}

impl MirBlock {
    pub fn is_terminated(&self) -> bool {
        self.terminator.is_some()
    }
}

// ---- Textual form ----

impl fmt::Display for ValueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "%{}", self.0)
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Value(id) => write!(f, "{}", id),
            Operand::Const { width, value } => write!(f, "{} {}", width, value),
        }
    }
}

fn extern_signature(ext: Extern) -> &'static str {
    match ext {
        Extern::PutChar => "i32 @putchar(i8)",
        Extern::GetChar => "i8 @safe_getchar()",
        Extern::MemSet => "void @memset(ptr, i8, i64)",
    }
}

fn join(args: &[Operand]) -> String {
    args.iter()
        .map(|a| a.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

impl MirFunction {
    fn label(&self, id: BlockId) -> &str {
        self.blocks
            .get(id.0)
            .map(|b| b.label.as_str())
            .unwrap_or("<invalid>")
    }

    fn fmt_instr(&self, f: &mut fmt::Formatter<'_>, instr: &MirInstr) -> fmt::Result {
        match instr {
            MirInstr::Alloca { dest, width } => writeln!(f, "  {} = alloca {}", dest, width),
            MirInstr::AllocaArray { dest, width, len } => {
                writeln!(f, "  {} = alloca [{} x {}]", dest, len, width)
            }
            MirInstr::ElementPtr {
                dest,
                array,
                width,
                len,
                index,
            } => writeln!(
                f,
                "  {} = elementptr [{} x {}], {}, {}",
                dest, len, width, array, index
            ),
            MirInstr::Load { dest, width, ptr } => {
                writeln!(f, "  {} = load {}, {}", dest, width, ptr)
            }
            MirInstr::Store { value, ptr } => writeln!(f, "  store {}, {}", value, ptr),
            MirInstr::Add {
                dest,
                width,
                lhs,
                rhs,
            } => writeln!(f, "  {} = add {} {}, {}", dest, width, lhs, rhs),
            MirInstr::ICmpNe { dest, lhs, rhs } => {
                writeln!(f, "  {} = icmp ne {}, {}", dest, lhs, rhs)
            }
            MirInstr::Call { dest, callee, args } => match dest {
                Some(dest) => writeln!(
                    f,
                    "  {} = call @{}({})",
                    dest,
                    callee.symbol(),
                    join(args)
                ),
                None => writeln!(f, "  call @{}({})", callee.symbol(), join(args)),
            },
        }
    }

    fn fmt_terminator(&self, f: &mut fmt::Formatter<'_>, term: &MirTerminator) -> fmt::Result {
        match term {
            MirTerminator::Br(target) => writeln!(f, "  br label %{}", self.label(*target)),
            MirTerminator::CondBr {
                cond,
                then_block,
                else_block,
            } => writeln!(
                f,
                "  br {}, label %{}, label %{}",
                cond,
                self.label(*then_block),
                self.label(*else_block)
            ),
            MirTerminator::Ret(value) => writeln!(f, "  ret {}", value),
        }
    }
}

impl fmt::Display for MirFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "define i32 @{}() {{", self.name)?;
        for (i, block) in self.blocks.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            writeln!(f, "{}:", block.label)?;
            for instr in &block.instrs {
                self.fmt_instr(f, instr)?;
            }
            if let Some(term) = &block.terminator {
                self.fmt_terminator(f, term)?;
            }
        }
        writeln!(f, "}}")
    }
}

impl fmt::Display for MirProgram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(triple) = &self.target_triple {
            writeln!(f, "target triple = \"{}\"", triple)?;
            writeln!(f)?;
        }
        for ext in &self.externs {
            writeln!(f, "declare {}", extern_signature(*ext))?;
        }
        for func in &self.functions {
            writeln!(f)?;
            write!(f, "{}", func)?;
        }
        Ok(())
    }
}
