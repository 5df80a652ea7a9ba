use crate::error::{CompileError, CompileResult};

/// The two blocks an open `[` branches between.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoopFrame<B> {
    pub body: B,
    pub exit: B,
    /// Position of the `[` that opened the loop.
    pub line: usize,
    pub col: usize,
}

/// Stack of currently open loops, innermost last.
#[derive(Debug)]
pub struct LoopStack<B> {
    frames: Vec<LoopFrame<B>>,
}

impl<B: Copy> Default for LoopStack<B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B: Copy> LoopStack<B> {
    pub fn new() -> Self {
        Self { frames: Vec::new() }
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Enter a new loop
    pub fn push(&mut self, frame: LoopFrame<B>) {
        self.frames.push(frame);
    }

    /// Pops the innermost loop for a `]` at `line:col`.
    pub fn pop(&mut self, line: usize, col: usize) -> CompileResult<LoopFrame<B>> {
        self.frames
            .pop()
            .ok_or(CompileError::UnexpectedClose { line, col })
    }

    /// Succeeds only when every loop has been closed. Reports the innermost
    /// unclosed `[`.
    pub fn finish(&self) -> CompileResult<()> {
        match self.frames.last() {
            Some(frame) => Err(CompileError::UnclosedOpen {
                line: frame.line,
                col: frame.col,
            }),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod loop_stack_tests {
    use super::*;

    fn frame(n: usize, line: usize, col: usize) -> LoopFrame<usize> {
        LoopFrame {
            body: 2 * n + 1,
            exit: 2 * n + 2,
            line,
            col,
        }
    }

    #[test]
    fn test_lifo_order() {
        let mut stack = LoopStack::new();
        stack.push(frame(0, 1, 1));
        stack.push(frame(1, 1, 2));
        assert_eq!(stack.depth(), 2);
        assert_eq!(stack.pop(1, 3).unwrap(), frame(1, 1, 2));
        assert_eq!(stack.pop(1, 4).unwrap(), frame(0, 1, 1));
        assert!(stack.is_empty());
        assert!(stack.finish().is_ok());
    }

    #[test]
    fn test_pop_empty() {
        let mut stack: LoopStack<usize> = LoopStack::new();
        assert!(matches!(
            stack.pop(3, 7),
            Err(CompileError::UnexpectedClose { line: 3, col: 7 })
        ));
    }

    #[test]
    fn test_finish_reports_innermost() {
        let mut stack = LoopStack::new();
        stack.push(frame(0, 1, 1));
        stack.push(frame(1, 2, 5));
        assert!(matches!(
            stack.finish(),
            Err(CompileError::UnclosedOpen { line: 2, col: 5 })
        ));
    }
}
