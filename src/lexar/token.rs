/// The eight instructions of the tape language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenType {
    Inc,       // +
    Dec,       // -
    Right,     // >
    Left,      // <
    Output,    // .
    Input,     // ,
    LoopOpen,  // [
    LoopClose, // ]
}

impl TokenType {
    /// Maps a source character to its instruction. Anything else is a comment.
    pub fn from_char(ch: char) -> Option<Self> {
        match ch {
            '+' => Some(TokenType::Inc),
            '-' => Some(TokenType::Dec),
            '>' => Some(TokenType::Right),
            '<' => Some(TokenType::Left),
            '.' => Some(TokenType::Output),
            ',' => Some(TokenType::Input),
            '[' => Some(TokenType::LoopOpen),
            ']' => Some(TokenType::LoopClose),
            _ => None,
        }
    }

    pub fn as_char(self) -> char {
        match self {
            TokenType::Inc => '+',
            TokenType::Dec => '-',
            TokenType::Right => '>',
            TokenType::Left => '<',
            TokenType::Output => '.',
            TokenType::Input => ',',
            TokenType::LoopOpen => '[',
            TokenType::LoopClose => ']',
        }
    }
}

/// A recognized instruction with its 1-based source position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenType,
    pub line: usize,
    pub col: usize,
}
