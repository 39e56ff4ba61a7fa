//! Selector tokenizer.

use crate::parser::ParseError;
use crate::types::AttributeOperator;

/// Selector tokens.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Identifier: `name`, `castle-black`, `@version`
    Ident(String),
    /// Hash: `#id`
    Hash(String),
    /// Quoted string: `'a b'`, `"a b"`
    Str(String),
    Dot,
    Star,
    Colon,
    Comma,
    Greater,
    Plus,
    Tilde,
    LBracket,
    RBracket,
    /// Attribute operator: `=`, `^=`, `*=`, ...
    Operator(AttributeOperator),
    /// A run of whitespace.
    Whitespace,
}

impl Token {
    pub fn describe(&self) -> String {
        match self {
            Token::Ident(s) => format!("identifier '{s}'"),
            Token::Hash(s) => format!("'#{s}'"),
            Token::Str(s) => format!("string '{s}'"),
            Token::Dot => "'.'".to_string(),
            Token::Star => "'*'".to_string(),
            Token::Colon => "':'".to_string(),
            Token::Comma => "','".to_string(),
            Token::Greater => "'>'".to_string(),
            Token::Plus => "'+'".to_string(),
            Token::Tilde => "'~'".to_string(),
            Token::LBracket => "'['".to_string(),
            Token::RBracket => "']'".to_string(),
            Token::Operator(op) => format!("'{}'", op.as_str()),
            Token::Whitespace => "whitespace".to_string(),
        }
    }
}

/// A token together with the byte offset it starts at.
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned {
    pub token: Token,
    pub pos: usize,
}

/// Selector tokenizer.
pub struct Lexer<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Lexer<'a> {
    /// Split a selector string into tokens.
    pub fn tokenize(input: &'a str) -> Result<Vec<Spanned>, ParseError> {
        let mut lexer = Self { input, pos: 0 };
        let mut tokens = Vec::new();
        while let Some(token) = lexer.next_token()? {
            tokens.push(token);
        }
        Ok(tokens)
    }

    fn next_token(&mut self) -> Result<Option<Spanned>, ParseError> {
        let start = self.pos;
        let c = match self.peek() {
            Some(c) => c,
            None => return Ok(None),
        };

        let token = match c {
            c if c.is_whitespace() => {
                self.skip_whitespace();
                Token::Whitespace
            }
            '.' => self.single(Token::Dot),
            ',' => self.single(Token::Comma),
            ':' => self.single(Token::Colon),
            '>' => self.single(Token::Greater),
            '+' => self.single(Token::Plus),
            '[' => self.single(Token::LBracket),
            ']' => self.single(Token::RBracket),
            '=' => self.single(Token::Operator(AttributeOperator::Equals)),
            '*' if self.peek_at(1) == Some('=') => self.double(AttributeOperator::Substring),
            '*' => self.single(Token::Star),
            '~' if self.peek_at(1) == Some('=') => self.double(AttributeOperator::Includes),
            '~' => self.single(Token::Tilde),
            '^' if self.peek_at(1) == Some('=') => self.double(AttributeOperator::Prefix),
            '$' if self.peek_at(1) == Some('=') => self.double(AttributeOperator::Suffix),
            '|' if self.peek_at(1) == Some('=') => self.double(AttributeOperator::DashMatch),
            '\'' | '"' => Token::Str(self.read_string()?),
            '#' => {
                self.advance();
                let name = self.read_identifier()?;
                Token::Hash(name)
            }
            c if is_ident_char(c) || c == '\\' => Token::Ident(self.read_identifier()?),
            c => return Err(ParseError::UnexpectedChar { ch: c, pos: start }),
        };

        Ok(Some(Spanned { token, pos: start }))
    }

    fn single(&mut self, token: Token) -> Token {
        self.advance();
        token
    }

    fn double(&mut self, operator: AttributeOperator) -> Token {
        self.advance();
        self.advance();
        Token::Operator(operator)
    }

    fn read_identifier(&mut self) -> Result<String, ParseError> {
        let start = self.pos;
        let mut result = String::new();

        while let Some(c) = self.peek() {
            if c == '\\' {
                let escape_pos = self.pos;
                self.advance();
                match self.peek() {
                    Some(escaped) => {
                        result.push(escaped);
                        self.advance();
                    }
                    None => return Err(ParseError::InvalidEscape { pos: escape_pos }),
                }
            } else if c == '$' && self.peek_at(1) == Some('=') {
                break;
            } else if is_ident_char(c) {
                result.push(c);
                self.advance();
            } else {
                break;
            }
        }

        if result.is_empty() {
            return match self.peek() {
                Some(c) => Err(ParseError::UnexpectedChar { ch: c, pos: start }),
                None => Err(ParseError::UnexpectedEnd),
            };
        }

        Ok(result)
    }

    fn read_string(&mut self) -> Result<String, ParseError> {
        let start = self.pos;
        let quote = match self.peek() {
            Some(q) => q,
            None => return Err(ParseError::UnexpectedEnd),
        };
        self.advance();

        let mut result = String::new();

        loop {
            match self.peek() {
                None => return Err(ParseError::UnclosedString { pos: start }),
                Some(c) if c == quote => {
                    self.advance();
                    break;
                }
                Some('\\') => {
                    let escape_pos = self.pos;
                    self.advance();
                    match self.peek() {
                        Some('n') => result.push('\n'),
                        Some('t') => result.push('\t'),
                        Some('r') => result.push('\r'),
                        Some(c) => result.push(c),
                        None => return Err(ParseError::InvalidEscape { pos: escape_pos }),
                    }
                    self.advance();
                }
                Some(c) => {
                    result.push(c);
                    self.advance();
                }
            }
        }

        Ok(result)
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek() {
            if c.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.input[self.pos..].chars().nth(offset)
    }

    fn advance(&mut self) {
        if let Some(c) = self.peek() {
            self.pos += c.len_utf8();
        }
    }
}

/// Characters allowed in an unescaped identifier.
///
/// Wider than CSS: JSON member names such as `@version`, `$ref` or `2019`
/// are common and have to be selectable without escaping.
pub fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '-' || c == '_' || c == '@' || c == '$' || !c.is_ascii()
}
