//! Recursive descent parser turning GPR tokens into a [`Gpr`] tree
use indexmap::IndexMap;
use thiserror::Error;

use crate::io::gpr_parse::token::Token;
use crate::metabolic_model::gene::{Gene, Gpr, GprOperatorType};

/*
GPR Grammar (`and` binds tighter than `or`):
expression -> disjunction
disjunction -> conjunction ( "OR" conjunction )* ;
conjunction -> unary ( "AND" unary )* ;
unary -> "NOT" unary | primary ;
primary -> GENE | "(" expression ")" ;

e.g. ( Gene1 AND Gene2) OR (Gene3 AND NOT Gene4)
 */

/// GPR Parser
pub struct GprParser<'gm> {
    /// Vector of tokens from the GPR string, ending in [`Token::Eof`]
    tokens: Vec<Token>,
    /// Current token being processed
    current: usize,
    /// Map containing the Genes, genes first seen in the rule are added here
    gene_map: &'gm mut IndexMap<String, Gene>,
}

impl<'gm> GprParser<'gm> {
    /// Create a new GprParser
    pub fn new(mut tokens: Vec<Token>, gene_map: &'gm mut IndexMap<String, Gene>) -> GprParser<'gm> {
        if tokens.last() != Some(&Token::Eof) {
            tokens.push(Token::Eof);
        }
        GprParser {
            tokens,
            current: 0,
            gene_map,
        }
    }

    // region Parsing Functions

    /// Parse the token vector into a GPR AST
    pub fn parse(&mut self) -> Result<Gpr, ParseError> {
        let gpr = self.disjunction()?;
        if !self.is_at_end() {
            return Err(ParseError::EarlyTermination);
        }
        Ok(gpr)
    }

    fn disjunction(&mut self) -> Result<Gpr, ParseError> {
        let mut expr = self.conjunction()?;
        while self.match_token(&Token::Or) {
            let right = self.conjunction()?;
            expr = Gpr::new_binary_operation(expr, GprOperatorType::Or, right)
                .map_err(|_| ParseError::InvalidBinaryOperator)?;
        }
        Ok(expr)
    }

    fn conjunction(&mut self) -> Result<Gpr, ParseError> {
        let mut expr = self.unary()?;
        while self.match_token(&Token::And) {
            let right = self.unary()?;
            expr = Gpr::new_binary_operation(expr, GprOperatorType::And, right)
                .map_err(|_| ParseError::InvalidBinaryOperator)?;
        }
        Ok(expr)
    }

    fn unary(&mut self) -> Result<Gpr, ParseError> {
        if self.match_token(&Token::Not) {
            let operand = self.unary()?;
            return Gpr::new_unary_operation(GprOperatorType::Not, operand)
                .map_err(|_| ParseError::InvalidUnaryOperator);
        }
        self.primary()
    }

    fn primary(&mut self) -> Result<Gpr, ParseError> {
        if let Some(identifier) = self.match_identifier() {
            self.insert_if_needed(&identifier);
            return Ok(Gpr::GeneNode(identifier));
        }

        if self.match_token(&Token::LeftParen) {
            let expr = self.disjunction()?;
            if !self.match_token(&Token::RightParen) {
                return Err(ParseError::MissingToken(format!(
                    "expected ')' after expression, found {}",
                    self.peek()
                )));
            }
            return Ok(expr);
        }

        Err(ParseError::ExpectedExpression)
    }

    // endregion Parsing Functions

    // region parsing helper functions

    /// If the current token is `token`, advance past it and return true
    fn match_token(&mut self, token: &Token) -> bool {
        if self.peek() == token && !self.is_at_end() {
            self.current += 1;
            return true;
        }
        false
    }

    /// If the current token is an identifier, advance past it and return the gene id
    fn match_identifier(&mut self) -> Option<String> {
        if let Token::Identifier(id) = self.peek() {
            let id = id.clone();
            self.current += 1;
            return Some(id);
        }
        None
    }

    fn is_at_end(&self) -> bool {
        *self.peek() == Token::Eof
    }

    fn peek(&self) -> &Token {
        &self.tokens[self.current]
    }

    // endregion parsing helper functions

    /// Check if a gene_id exists as a key in gene_map, if it doesn't insert a new gene with that id
    fn insert_if_needed(&mut self, gene_id: &str) {
        if !self.gene_map.contains_key(gene_id) {
            self.gene_map
                .insert(gene_id.to_string(), Gene::new(gene_id));
        }
    }
}

/// Enum representing possible parse errors
#[derive(Debug, Error, PartialEq, Clone)]
pub enum ParseError {
    /// Token was expected to be a binary operator but was not
    #[error("Invalid binary operator encountered, expected only `and` and `or`")]
    InvalidBinaryOperator,
    /// Token was expected to be a unary operator but was not
    #[error("Invalid unary operator encountered, expected only `not`")]
    InvalidUnaryOperator,
    /// Missing expected token (e.g. a right parenthesis)
    #[error("Missing expected token: {0}")]
    MissingToken(String),
    /// No expression found when one was expected
    #[error("No expression found, check that the GPR string is not empty")]
    ExpectedExpression,
    /// Expression was not completed when parsing terminated
    #[error("Parsing terminated early, check for a `not` between two gene identifiers/grouped expressions")]
    EarlyTermination,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::gpr_parse::lexer::Lexer;
    use crate::metabolic_model::gene::GprOperation;

    fn parse(input: &str) -> (Result<Gpr, ParseError>, IndexMap<String, Gene>) {
        let tokens = Lexer::new(input).lex().unwrap();
        let mut gene_map = IndexMap::new();
        let gpr = GprParser::new(tokens, &mut gene_map).parse();
        (gpr, gene_map)
    }

    #[test]
    fn single_gene_parse() {
        let (gpr, genes) = parse("Rv1304");
        assert_eq!(gpr.unwrap(), Gpr::GeneNode("Rv1304".to_string()));
        assert!(genes.contains_key("Rv1304"));
    }

    #[test]
    fn and_binds_tighter_than_or() {
        let (gpr, genes) = parse("Rv0001 or Rv0002 and Rv0003");
        let gpr = gpr.unwrap();
        match gpr {
            Gpr::Operation(GprOperation::Or { left, right }) => {
                assert_eq!(*left, Gpr::GeneNode("Rv0001".to_string()));
                assert!(matches!(*right, Gpr::Operation(GprOperation::And { .. })));
            }
            other => panic!("Incorrect parse: {:?}", other),
        }
        assert_eq!(genes.len(), 3);
    }

    #[test]
    fn grouping_and_not_parse() {
        let (gpr, _) = parse("(Rv3141 or Rv0023) and not Rv0018");
        assert_eq!(
            gpr.unwrap().to_string(),
            "((Rv3141 or Rv0023) and (not Rv0018))"
        );
    }

    #[test]
    fn repeated_binary_is_left_associative() {
        let (gpr, _) = parse("Rv0001 and Rv0002 and Rv0003");
        assert_eq!(gpr.unwrap().to_string(), "((Rv0001 and Rv0002) and Rv0003)");
    }

    #[test]
    fn invalid_parse() {
        assert_eq!(parse("Rv0001 not Rv0023").0, Err(ParseError::EarlyTermination));
        assert_eq!(parse("(Rv0001 or Rv0023").0.unwrap_err(), ParseError::MissingToken("expected ')' after expression, found end of rule".to_string()));
        assert_eq!(parse("").0, Err(ParseError::ExpectedExpression));
    }
}
