//! Storage of the generated program: a zero-filled byte tape and the cell
//! pointer indexing into it.

use crate::error::CompileResult;
use crate::ir::{Extern, IntWidth, IrBuilder};

/// Number of cells on the tape.
pub const TAPE_LEN: u64 = 0xFFFFF;

/// Handles to the tape and the cell pointer slot inside the entry function.
#[derive(Debug, Clone, Copy)]
pub struct Tape<V> {
    pub cells: V,
    pub cell_ptr: V,
}

impl<V: Copy> Tape<V> {
    /// Allocates the tape, zero-fills it with a single `memset` call, then
    /// allocates the cell pointer and stores 0 into it.
    pub fn allocate<B>(builder: &mut B) -> CompileResult<Self>
    where
        B: IrBuilder<Value = V>,
    {
        let cells = builder.alloca_array(IntWidth::I8, TAPE_LEN, "tape")?;
        let zero = builder.const_int(IntWidth::I64, 0);
        let base = builder.element_ptr(cells, IntWidth::I8, TAPE_LEN, zero)?;
        let fill = builder.const_int(IntWidth::I8, 0);
        let len = builder.const_int(IntWidth::I64, TAPE_LEN as i64);
        builder.call(Extern::MemSet, &[base, fill, len])?;

        let cell_ptr = builder.alloca(IntWidth::I64, "cell_ptr")?;
        let zero = builder.const_int(IntWidth::I64, 0);
        builder.store(zero, cell_ptr)?;

        Ok(Self { cells, cell_ptr })
    }

    /// Address of `tape[cell_ptr]`, reloading the cell pointer every time.
    pub fn current_cell<B>(&self, builder: &mut B) -> CompileResult<V>
    where
        B: IrBuilder<Value = V>,
    {
        let index = builder.load(IntWidth::I64, self.cell_ptr)?;
        builder.element_ptr(self.cells, IntWidth::I8, TAPE_LEN, index)
    }
}
