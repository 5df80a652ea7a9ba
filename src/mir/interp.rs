//! Reference interpreter for recorded MIR.
//!
//! Runs the entry function of a [`MirProgram`] with `safe_getchar` fed from
//! an in-memory buffer and `putchar` collected into an output buffer. Memory
//! accesses are bounds-checked here even though the generated native code is
//! not.

use crate::ir::{Extern, IntWidth};
use crate::mir::{BlockId, MirInstr, MirProgram, MirTerminator, Operand, ValueId};
use std::collections::HashMap;
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum ExecError {
    #[error("function '{0}' not found")]
    MissingFunction(String),

    #[error("read of undefined value {0}")]
    UndefinedValue(ValueId),

    #[error("out of bounds access: offset {offset}, size {size}, region length {len}")]
    OutOfBounds { offset: i64, size: usize, len: usize },

    #[error("type mismatch: {0}")]
    TypeMismatch(String),

    #[error("block '{0}' has no terminator")]
    Unterminated(String),

    #[error("branch to unknown block {0:?}")]
    UnknownBlock(BlockId),

    #[error("{callee} takes {expected} argument(s), got {found}")]
    ArgumentCount {
        callee: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("step limit of {0} instructions exhausted")]
    OutOfFuel(u64),
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum RtValue {
    Int { width: IntWidth, bits: u64 },
    Bool(bool),
    Ptr { region: usize, offset: i64 },
}

fn mask(width: IntWidth) -> u64 {
    match width {
        IntWidth::I64 => u64::MAX,
        w => (1u64 << w.bits()) - 1,
    }
}

fn sign_extend(width: IntWidth, bits: u64) -> i64 {
    let shift = 64 - width.bits();
    ((bits << shift) as i64) >> shift
}

enum Flow {
    Jump(BlockId),
    Return(i64),
}

/// Result of running a program to its `ret`.
#[derive(Debug, Clone, PartialEq)]
pub struct Execution {
    pub exit_code: i64,
    pub output: Vec<u8>,
}

pub struct MirInterpreter<'p> {
    program: &'p MirProgram,
    regions: Vec<Vec<u8>>,
    values: HashMap<ValueId, RtValue>,
    input: std::vec::IntoIter<u8>,
    output: Vec<u8>,
    fuel: u64,
}

impl<'p> MirInterpreter<'p> {
    pub const DEFAULT_FUEL: u64 = 50_000_000;

    pub fn new(program: &'p MirProgram, input: &[u8]) -> Self {
        Self {
            program,
            regions: Vec::new(),
            values: HashMap::new(),
            input: input.to_vec().into_iter(),
            output: Vec::new(),
            fuel: Self::DEFAULT_FUEL,
        }
    }

    /// Caps the number of executed instructions and terminators.
    pub fn with_fuel(mut self, fuel: u64) -> Self {
        self.fuel = fuel;
        self
    }

    /// Runs `main` until it returns.
    pub fn run(mut self) -> Result<Execution, ExecError> {
        let program = self.program;
        let func = program
            .function("main")
            .ok_or_else(|| ExecError::MissingFunction("main".to_string()))?;
        let limit = self.fuel;
        let mut block = BlockId(0);

        loop {
            let current = func
                .get_block(block)
                .ok_or(ExecError::UnknownBlock(block))?;
            for instr in &current.instrs {
                self.burn(limit)?;
                self.exec(instr)?;
            }
            self.burn(limit)?;
            let term = current
                .terminator
                .as_ref()
                .ok_or_else(|| ExecError::Unterminated(current.label.clone()))?;
            match self.step(&current.label, term)? {
                Flow::Jump(next) => block = next,
                Flow::Return(exit_code) => {
                    return Ok(Execution {
                        exit_code,
                        output: self.output,
                    })
                }
            }
        }
    }

    fn burn(&mut self, limit: u64) -> Result<(), ExecError> {
        if self.fuel == 0 {
            return Err(ExecError::OutOfFuel(limit));
        }
        self.fuel -= 1;
        Ok(())
    }

    fn eval(&self, operand: Operand) -> Result<RtValue, ExecError> {
        match operand {
            Operand::Const { width, value } => Ok(RtValue::Int {
                width,
                bits: value as u64 & mask(width),
            }),
            Operand::Value(id) => self
                .values
                .get(&id)
                .copied()
                .ok_or(ExecError::UndefinedValue(id)),
        }
    }

    fn eval_int(&self, operand: Operand) -> Result<(IntWidth, u64), ExecError> {
        match self.eval(operand)? {
            RtValue::Int { width, bits } => Ok((width, bits)),
            other => Err(ExecError::TypeMismatch(format!("expected integer, found {:?}", other))),
        }
    }

    fn eval_ptr(&self, operand: Operand) -> Result<(usize, i64), ExecError> {
        match self.eval(operand)? {
            RtValue::Ptr { region, offset } => Ok((region, offset)),
            other => Err(ExecError::TypeMismatch(format!("expected pointer, found {:?}", other))),
        }
    }

    fn span(
        &self,
        region: usize,
        offset: i64,
        size: usize,
    ) -> Result<std::ops::Range<usize>, ExecError> {
        let len = self.regions[region].len();
        if offset < 0 || offset as usize + size > len {
            return Err(ExecError::OutOfBounds { offset, size, len });
        }
        let start = offset as usize;
        Ok(start..start + size)
    }

    fn exec(&mut self, instr: &MirInstr) -> Result<(), ExecError> {
        match instr {
            MirInstr::Alloca { dest, width } => {
                self.allocate(*dest, width.bytes());
            }
            MirInstr::AllocaArray { dest, width, len } => {
                self.allocate(*dest, width.bytes() * *len as usize);
            }
            MirInstr::ElementPtr {
                dest,
                array,
                width,
                index,
                ..
            } => {
                let (region, offset) = self.eval_ptr(*array)?;
                let (index_width, bits) = self.eval_int(*index)?;
                let index = sign_extend(index_width, bits);
                let offset = offset.wrapping_add(index.wrapping_mul(width.bytes() as i64));
                self.values.insert(*dest, RtValue::Ptr { region, offset });
            }
            MirInstr::Load { dest, width, ptr } => {
                let (region, offset) = self.eval_ptr(*ptr)?;
                let range = self.span(region, offset, width.bytes())?;
                let mut bits = 0u64;
                for (i, byte) in self.regions[region][range].iter().enumerate() {
                    bits |= (*byte as u64) << (8 * i);
                }
                self.values.insert(*dest, RtValue::Int { width: *width, bits });
            }
            MirInstr::Store { value, ptr } => {
                let (width, bits) = self.eval_int(*value)?;
                let (region, offset) = self.eval_ptr(*ptr)?;
                let range = self.span(region, offset, width.bytes())?;
                for (i, byte) in self.regions[region][range].iter_mut().enumerate() {
                    *byte = (bits >> (8 * i)) as u8;
                }
            }
            MirInstr::Add {
                dest,
                width,
                lhs,
                rhs,
            } => {
                let (_, a) = self.eval_int(*lhs)?;
                let (_, b) = self.eval_int(*rhs)?;
                let bits = a.wrapping_add(b) & mask(*width);
                self.values.insert(*dest, RtValue::Int { width: *width, bits });
            }
            MirInstr::ICmpNe { dest, lhs, rhs } => {
                let ne = self.eval(*lhs)? != self.eval(*rhs)?;
                self.values.insert(*dest, RtValue::Bool(ne));
            }
            MirInstr::Call { dest, callee, args } => {
                let result = self.call(*callee, args)?;
                if let (Some(dest), Some(value)) = (dest, result) {
                    self.values.insert(*dest, value);
                }
            }
        }
        Ok(())
    }

    fn allocate(&mut self, dest: ValueId, size: usize) {
        self.regions.push(vec![0xAA; size]);
        let region = self.regions.len() - 1;
        self.values.insert(dest, RtValue::Ptr { region, offset: 0 });
    }

    fn call(&mut self, callee: Extern, args: &[Operand]) -> Result<Option<RtValue>, ExecError> {
        let expected = match callee {
            Extern::PutChar => 1,
            Extern::GetChar => 0,
            Extern::MemSet => 3,
        };
        if args.len() != expected {
            return Err(ExecError::ArgumentCount {
                callee: callee.symbol(),
                expected,
                found: args.len(),
            });
        }
        match callee {
            Extern::PutChar => {
                let (_, bits) = self.eval_int(args[0])?;
                self.output.push(bits as u8);
                Ok(Some(RtValue::Int {
                    width: IntWidth::I32,
                    bits: bits & 0xFF,
                }))
            }
            Extern::GetChar => {
                // End of input reads as 0.
                let byte = self.input.next().unwrap_or(0);
                Ok(Some(RtValue::Int {
                    width: IntWidth::I8,
                    bits: byte as u64,
                }))
            }
            Extern::MemSet => {
                let (region, offset) = self.eval_ptr(args[0])?;
                let (_, fill) = self.eval_int(args[1])?;
                let (_, len) = self.eval_int(args[2])?;
                let range = self.span(region, offset, len as usize)?;
                self.regions[region][range].fill(fill as u8);
                Ok(None)
            }
        }
    }

    fn step(&mut self, label: &str, term: &MirTerminator) -> Result<Flow, ExecError> {
        match term {
            MirTerminator::Br(target) => Ok(Flow::Jump(*target)),
            MirTerminator::CondBr {
                cond,
                then_block,
                else_block,
            } => match self.eval(*cond)? {
                RtValue::Bool(true) => Ok(Flow::Jump(*then_block)),
                RtValue::Bool(false) => Ok(Flow::Jump(*else_block)),
                other => Err(ExecError::TypeMismatch(format!(
                    "branch on non-boolean {:?} in '{}'",
                    other, label
                ))),
            },
            MirTerminator::Ret(value) => {
                let (width, bits) = self.eval_int(*value)?;
                Ok(Flow::Return(sign_extend(width, bits)))
            }
        }
    }
}

/// Convenience wrapper: run `program` on `input` with the default step limit.
pub fn run_program(program: &MirProgram, input: &[u8]) -> Result<Execution, ExecError> {
    MirInterpreter::new(program, input).run()
}
