//! Single-pass translation of tape-language source into builder calls.
//!
//! Each recognized character is lowered in input order into the current
//! block. `[` ends the current block with a test branching into a fresh body
//! block or a fresh exit block; `]` re-tests the cell and branches back to
//! that same body block or on to the exit block, which becomes current.

pub mod loops;

use crate::error::{CompileError, CompileResult};
use crate::ir::{Extern, IntWidth, IrBuilder};
use crate::lexar::{Lexer, Token, TokenType};
use crate::tape::Tape;
use loops::{LoopFrame, LoopStack};

/// Name of the generated entry function.
pub const ENTRY_FUNCTION: &str = "main";

/// Drives an [`IrBuilder`] over one program.
pub struct Translator<'b, B: IrBuilder> {
    builder: &'b mut B,
    tape: Tape<B::Value>,
    loops: LoopStack<B::Block>,
    loop_count: usize,
}

impl<'b, B: IrBuilder> Translator<'b, B> {
    /// Starts the entry function and sets up the tape in its entry block.
    pub fn new(builder: &'b mut B) -> CompileResult<Self> {
        builder.begin_function(ENTRY_FUNCTION)?;
        let tape = Tape::allocate(builder)?;
        Ok(Self {
            builder,
            tape,
            loops: LoopStack::new(),
            loop_count: 0,
        })
    }

    /// Consumes the whole character stream and closes the function with
    /// `ret i32 0`. Fails on the first bracket imbalance.
    pub fn translate<I>(mut self, source: I) -> CompileResult<()>
    where
        I: IntoIterator<Item = char>,
    {
        for token in Lexer::new(source.into_iter()) {
            self.emit(token)?;
        }
        self.finish()
    }

    /// Block the next instruction lands in.
    pub fn current_block(&self) -> Option<B::Block> {
        self.builder.current_block()
    }

    /// Lowers a single instruction.
    pub fn emit(&mut self, token: Token) -> CompileResult<()> {
        log::trace!(
            "{}:{} '{}' into {:?}",
            token.line,
            token.col,
            token.kind.as_char(),
            self.builder.current_block()
        );
        match token.kind {
            TokenType::Inc => self.add_to_cell(1),
            TokenType::Dec => self.add_to_cell(-1),
            TokenType::Right => self.move_pointer(1),
            TokenType::Left => self.move_pointer(-1),
            TokenType::Output => {
                let addr = self.tape.current_cell(self.builder)?;
                let byte = self.builder.load(IntWidth::I8, addr)?;
                self.builder.call(Extern::PutChar, &[byte])?;
                Ok(())
            }
            TokenType::Input => {
                let byte = self
                    .builder
                    .call(Extern::GetChar, &[])?
                    .ok_or_else(|| CompileError::Backend {
                        reason: "safe_getchar produced no value".to_string(),
                    })?;
                let addr = self.tape.current_cell(self.builder)?;
                self.builder.store(byte, addr)
            }
            TokenType::LoopOpen => self.open_loop(token),
            TokenType::LoopClose => self.close_loop(token),
        }
    }

    /// Checks every loop was closed and terminates the final block.
    pub fn finish(self) -> CompileResult<()> {
        self.loops.finish()?;
        let zero = self.builder.const_int(IntWidth::I32, 0);
        self.builder.ret(zero)?;
        log::debug!("translated {} loop(s)", self.loop_count);
        Ok(())
    }

    fn add_to_cell(&mut self, delta: i64) -> CompileResult<()> {
        let addr = self.tape.current_cell(self.builder)?;
        let value = self.builder.load(IntWidth::I8, addr)?;
        let delta = self.builder.const_int(IntWidth::I8, delta);
        let sum = self.builder.add(value, delta)?;
        self.builder.store(sum, addr)
    }

    fn move_pointer(&mut self, delta: i64) -> CompileResult<()> {
        let index = self.builder.load(IntWidth::I64, self.tape.cell_ptr)?;
        let delta = self.builder.const_int(IntWidth::I64, delta);
        let moved = self.builder.add(index, delta)?;
        self.builder.store(moved, self.tape.cell_ptr)
    }

    /// `tape[cell_ptr] != 0`, evaluated fresh at every test site.
    fn cell_is_nonzero(&mut self) -> CompileResult<B::Value> {
        let addr = self.tape.current_cell(self.builder)?;
        let value = self.builder.load(IntWidth::I8, addr)?;
        let zero = self.builder.const_int(IntWidth::I8, 0);
        self.builder.icmp_ne(value, zero)
    }

    fn open_loop(&mut self, token: Token) -> CompileResult<()> {
        let cond = self.cell_is_nonzero()?;
        let n = self.loop_count;
        self.loop_count += 1;
        let body = self.builder.append_block(&format!("loop.body.{}", n))?;
        let exit = self.builder.append_block(&format!("loop.exit.{}", n))?;

        self.builder.cond_br(cond, body, exit)?;
        self.loops.push(LoopFrame {
            body,
            exit,
            line: token.line,
            col: token.col,
        });
        self.builder.position_at_end(body);
        Ok(())
    }

    fn close_loop(&mut self, token: Token) -> CompileResult<()> {
        let frame = self.loops.pop(token.line, token.col)?;
        let cond = self.cell_is_nonzero()?;
        // Back-edge goes straight to the body; no separate header block.
        self.builder.cond_br(cond, frame.body, frame.exit)?;
        self.builder.position_at_end(frame.exit);
        Ok(())
    }
}

/// Translates `source` into `builder`, leaving a complete module behind.
pub fn translate<B, I>(builder: &mut B, source: I) -> CompileResult<()>
where
    B: IrBuilder,
    I: IntoIterator<Item = char>,
{
    Translator::new(builder)?.translate(source)
}
