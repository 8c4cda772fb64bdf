//! Module providing the Token enum produced by the GPR lexer
use std::fmt::{Display, Formatter};

/// Tokens of a gene reaction rule
#[derive(Debug, PartialEq, Clone, Eq, Hash)]
pub enum Token {
    /// A gene id
    Identifier(String),
    And,
    Or,
    Not,
    LeftParen,
    RightParen,
    /// End of the rule
    Eof,
}

impl Token {
    /// Classify a word as an operator keyword or a gene id
    ///
    /// Keywords are recognized in lower, title, and upper case.
    pub fn from_word(word: &str) -> Token {
        match word {
            "and" | "And" | "AND" => Token::And,
            "or" | "Or" | "OR" => Token::Or,
            "not" | "Not" | "NOT" => Token::Not,
            gene => Token::Identifier(gene.to_string()),
        }
    }
}

impl Display for Token {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Token::Identifier(id) => write!(f, "{}", id),
            Token::And => write!(f, "and"),
            Token::Or => write!(f, "or"),
            Token::Not => write!(f, "not"),
            Token::LeftParen => write!(f, "("),
            Token::RightParen => write!(f, ")"),
            Token::Eof => write!(f, "end of rule"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keywords() {
        assert_eq!(Token::from_word("AND"), Token::And);
        assert_eq!(Token::from_word("Or"), Token::Or);
        assert_eq!(Token::from_word("b0114"), Token::Identifier("b0114".to_string()));
        // Mixed case words are gene ids
        assert_eq!(Token::from_word("aNd"), Token::Identifier("aNd".to_string()));
        assert_eq!(Token::Eof.to_string(), "end of rule");
    }
}
