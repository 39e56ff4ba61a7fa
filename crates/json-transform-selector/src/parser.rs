//! Recursive-descent selector parser.

use crate::lexer::{Lexer, Spanned, Token};
use crate::types::*;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ParseError {
    #[error("Empty selector")]
    EmptySelector,
    #[error("Unexpected character '{ch}' at {pos}")]
    UnexpectedChar { ch: char, pos: usize },
    #[error("Unexpected {found} at {pos}")]
    UnexpectedToken { found: String, pos: usize },
    #[error("Unexpected end of input")]
    UnexpectedEnd,
    #[error("Unclosed string starting at {pos}")]
    UnclosedString { pos: usize },
    #[error("Invalid escape sequence at {pos}")]
    InvalidEscape { pos: usize },
}

/// Selector parser.
pub struct SelectorParser {
    tokens: Vec<Spanned>,
    pos: usize,
}

impl SelectorParser {
    /// Parse a selector list.
    pub fn parse(input: &str) -> Result<SelectorList, ParseError> {
        let mut tokens = Lexer::tokenize(input)?;

        // Leading and trailing whitespace is not a combinator.
        while matches!(tokens.last(), Some(Spanned { token: Token::Whitespace, .. })) {
            tokens.pop();
        }
        let leading = tokens
            .iter()
            .take_while(|s| s.token == Token::Whitespace)
            .count();
        tokens.drain(..leading);

        if tokens.is_empty() {
            return Err(ParseError::EmptySelector);
        }

        let mut parser = Self { tokens, pos: 0 };
        parser.parse_list()
    }

    fn parse_list(&mut self) -> Result<SelectorList, ParseError> {
        let mut selectors = Vec::new();

        loop {
            selectors.push(self.parse_selector()?);
            self.skip_whitespace();

            match self.peek() {
                None => break,
                Some(Token::Comma) => {
                    self.advance();
                    self.skip_whitespace();
                    if self.is_at_end() {
                        return Err(ParseError::UnexpectedEnd);
                    }
                }
                Some(_) => return Err(self.unexpected()),
            }
        }

        Ok(SelectorList::new(selectors))
    }

    fn parse_selector(&mut self) -> Result<Selector, ParseError> {
        let mut selector = Selector::Compound(self.parse_compound()?);

        while let Some(combinator) = self.parse_combinator() {
            let right = self.parse_compound()?;
            selector = Selector::Combined {
                left: Box::new(selector),
                combinator,
                right,
            };
        }

        Ok(selector)
    }

    fn parse_combinator(&mut self) -> Option<Combinator> {
        let start = self.pos;
        let saw_whitespace = self.skip_whitespace();

        let explicit = match self.peek() {
            Some(Token::Greater) => Some(Combinator::Child),
            Some(Token::Plus) => Some(Combinator::NextSibling),
            Some(Token::Tilde) => Some(Combinator::SubsequentSibling),
            _ => None,
        };

        if let Some(combinator) = explicit {
            self.advance();
            self.skip_whitespace();
            return Some(combinator);
        }

        match self.peek() {
            Some(Token::Comma) | None => {
                self.pos = start;
                None
            }
            Some(_) if saw_whitespace => Some(Combinator::Descendant),
            Some(_) => None,
        }
    }

    fn parse_compound(&mut self) -> Result<CompoundSelector, ParseError> {
        let (element, explicit_element) = match self.peek() {
            Some(Token::Ident(name)) => {
                let name = name.clone();
                self.advance();
                (ElementSelector::Name(name), true)
            }
            Some(Token::Star) => {
                self.advance();
                (ElementSelector::Universal, true)
            }
            _ => (ElementSelector::Universal, false),
        };

        let mut conditions = Vec::new();

        loop {
            match self.peek() {
                Some(Token::Hash(id)) => {
                    conditions.push(Condition::Id(id.clone()));
                    self.advance();
                }
                Some(Token::Dot) => {
                    self.advance();
                    let class = self.expect_identifier()?;
                    conditions.push(Condition::Class(class));
                }
                Some(Token::LBracket) => {
                    self.advance();
                    let attribute = self.parse_attribute()?;
                    conditions.push(Condition::Attribute(attribute));
                }
                Some(Token::Colon) => {
                    self.advance();
                    let pseudo = self.expect_identifier()?;
                    conditions.push(Condition::PseudoClass(pseudo));
                }
                _ => break,
            }
        }

        if !explicit_element && conditions.is_empty() {
            return Err(self.unexpected());
        }

        Ok(CompoundSelector::new(element, conditions))
    }

    fn parse_attribute(&mut self) -> Result<AttributeSelector, ParseError> {
        self.skip_whitespace();
        let name = self.expect_identifier()?;
        self.skip_whitespace();

        let matcher = match self.peek() {
            Some(Token::Operator(operator)) => {
                let operator = *operator;
                self.advance();
                self.skip_whitespace();
                let value = match self.peek() {
                    Some(Token::Ident(value)) | Some(Token::Str(value)) => value.clone(),
                    _ => return Err(self.unexpected()),
                };
                self.advance();
                self.skip_whitespace();
                Some(AttributeMatcher { operator, value })
            }
            _ => None,
        };

        match self.peek() {
            Some(Token::RBracket) => {
                self.advance();
                Ok(AttributeSelector { name, matcher })
            }
            _ => Err(self.unexpected()),
        }
    }

    fn expect_identifier(&mut self) -> Result<String, ParseError> {
        match self.peek() {
            Some(Token::Ident(name)) => {
                let name = name.clone();
                self.advance();
                Ok(name)
            }
            _ => Err(self.unexpected()),
        }
    }

    /// Returns whether any whitespace was skipped.
    fn skip_whitespace(&mut self) -> bool {
        let mut skipped = false;
        while self.peek() == Some(&Token::Whitespace) {
            self.advance();
            skipped = true;
        }
        skipped
    }

    fn unexpected(&self) -> ParseError {
        match self.tokens.get(self.pos) {
            Some(spanned) => ParseError::UnexpectedToken {
                found: spanned.token.describe(),
                pos: spanned.pos,
            },
            None => ParseError::UnexpectedEnd,
        }
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|s| &s.token)
    }

    fn advance(&mut self) {
        if !self.is_at_end() {
            self.pos += 1;
        }
    }

    fn is_at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }
}
