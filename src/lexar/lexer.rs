use crate::lexar::token::{Token, TokenType};

/// Streaming lexer over a character source.
///
/// Yields one [`Token`] per instruction character and silently drops
/// everything else. Positions count characters, with `\n` starting a new line.
pub struct Lexer<I> {
    chars: I,
    line: usize,
    col: usize,
}

impl<I: Iterator<Item = char>> Lexer<I> {
    pub fn new(chars: I) -> Self {
        Self {
            chars,
            line: 1,
            col: 0,
        }
    }
}

impl<I: Iterator<Item = char>> Iterator for Lexer<I> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        for ch in self.chars.by_ref() {
            if ch == '\n' {
                self.line += 1;
                self.col = 0;
                continue;
            }
            self.col += 1;
            if let Some(kind) = TokenType::from_char(ch) {
                return Some(Token {
                    kind,
                    line: self.line,
                    col: self.col,
                });
            }
        }
        None
    }
}

pub fn lex(input: &str) -> Vec<Token> {
    Lexer::new(input.chars()).collect()
}
