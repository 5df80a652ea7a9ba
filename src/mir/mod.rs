pub mod builder;
pub mod interp;
pub mod mir;

pub use builder::MirBuilder;
pub use interp::{run_program, ExecError, Execution, MirInterpreter};
pub use mir::{
    BlockId, MirBlock, MirFunction, MirInstr, MirProgram, MirTerminator, Operand, ValueId,
};

#[cfg(test)]
mod tests;
