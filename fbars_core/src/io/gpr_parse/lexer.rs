//! Lex a GPR string into a series of tokens for later parsing

use std::iter::Peekable;
use std::str::CharIndices;

use thiserror::Error;

use crate::io::gpr_parse::token::Token;

pub struct Lexer<'src> {
    source: &'src str,
    chars: Peekable<CharIndices<'src>>,
}

impl<'src> Lexer<'src> {
    pub fn new(source: &'src str) -> Self {
        Lexer {
            source,
            chars: source.char_indices().peekable(),
        }
    }

    /// Convert the whole source into tokens, terminated by [`Token::Eof`]
    pub fn lex(&mut self) -> Result<Vec<Token>, LexerError> {
        let mut tokens = Vec::new();
        while let Some((start, c)) = self.chars.next() {
            match c {
                '(' => tokens.push(Token::LeftParen),
                ')' => tokens.push(Token::RightParen),
                c if c.is_whitespace() => {}
                c if Lexer::is_identifier_char(c) => tokens.push(self.read_word(start)),
                other => {
                    return Err(LexerError::InvalidCharacter {
                        character: other,
                        position: start,
                    })
                }
            }
        }
        tokens.push(Token::Eof);
        Ok(tokens)
    }

    /// Read the rest of a word starting at `start`, and classify it as an operator or gene id
    fn read_word(&mut self, start: usize) -> Token {
        let mut end = self.source.len();
        while let Some(&(idx, c)) = self.chars.peek() {
            if !Lexer::is_identifier_char(c) {
                end = idx;
                break;
            }
            self.chars.next();
        }
        Token::from_word(&self.source[start..end])
    }

    // Gene ids in published models contain dots (e.g. 10026.1), dashes and colons
    fn is_identifier_char(c: char) -> bool {
        c.is_alphanumeric() || matches!(c, '_' | '.' | '-' | ':')
    }
}

#[derive(Debug, Error, PartialEq, Clone)]
pub enum LexerError {
    #[error("Invalid character {character:?} at position {position}")]
    InvalidCharacter { character: char, position: usize },
}
