use log::trace;

use crate::Real;
use crate::error::{ExprError, Result};
use crate::functions::{Function, FunctionTable};
use crate::operators::{Operator, OperatorTable};
use crate::types::{HString, TryIntoHeaplessString, VariableMap, is_ident_continue, is_ident_start};

/// Classified token produced by the lexer.
#[derive(Clone, Debug)]
pub enum TokenKind {
    /// A numeric literal. Signs are never part of the literal.
    Number(Real),
    /// A declared variable; `slot` is its index in the variable map.
    Variable { name: HString, slot: usize },
    /// A known function; the next token is always `LeftParen`.
    Function(Function),
    /// An operator. `prefix` is set for a unary operator read in operand position.
    Operator { operator: Operator, prefix: bool },
    LeftParen,
    RightParen,
    ArgSep,
}

/// A token produced by the lexer.
#[derive(Clone, Debug)]
pub struct Token {
    pub kind: TokenKind,
    /// Byte offset of the first character of the token.
    pub position: usize,
}

/// The lexer, which produces classified tokens from an input string.
///
/// Identifiers and operator characters are resolved against the symbol tables while
/// scanning, so every token is fully classified when it is returned.
pub struct Lexer<'a> {
    input: &'a str,
    pos: usize,
    variables: &'a VariableMap,
    functions: &'a FunctionTable,
    operators: &'a OperatorTable,
    /// True where an operand is expected: at the start, after `(`, `,`, a binary
    /// operator or a prefix operator.
    expect_operand: bool,
    failed: bool,
}

impl<'a> Lexer<'a> {
    pub fn new(
        input: &'a str,
        variables: &'a VariableMap,
        functions: &'a FunctionTable,
        operators: &'a OperatorTable,
    ) -> Self {
        Self {
            input,
            pos: 0,
            variables,
            functions,
            operators,
            expect_operand: true,
            failed: false,
        }
    }

    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.input.get(self.pos + offset..)?.chars().next()
    }

    fn advance(&mut self) {
        if let Some(c) = self.peek() {
            self.pos += c.len_utf8();
        }
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek() {
            if c.is_ascii_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn skip_digits(&mut self) -> bool {
        let start = self.pos;
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.advance();
        }
        self.pos > start
    }

    /// Scans `[0-9]+(\.[0-9]+)?([eE][+-]?[0-9]+)?` or `\.[0-9]+([eE][+-]?[0-9]+)?`.
    fn scan_number(&mut self, start: usize) -> Result<Real> {
        let leading_dot = self.peek() == Some('.');
        if !leading_dot {
            self.skip_digits();
        }
        if self.peek() == Some('.') {
            self.advance();
            if !self.skip_digits() {
                return Err(ExprError::unparsable(format!(
                    "malformed number '{}' at position {}",
                    &self.input[start..self.pos],
                    start
                )));
            }
        }
        if matches!(self.peek(), Some('e' | 'E')) {
            let signed = matches!(self.peek_at(1), Some('+' | '-'));
            let digit_at = if signed { 2 } else { 1 };
            if self.peek_at(digit_at).is_some_and(|c| c.is_ascii_digit()) {
                for _ in 0..digit_at {
                    self.advance();
                }
                self.skip_digits();
            } else if signed {
                return Err(ExprError::unparsable(format!(
                    "malformed number '{}' at position {}: exponent has no digits",
                    &self.input[start..self.pos + 2],
                    start
                )));
            }
        }
        let text = &self.input[start..self.pos];
        text.parse::<Real>().map_err(|_| {
            ExprError::unparsable(format!("malformed number '{}' at position {}", text, start))
        })
    }

    fn scan_identifier(&mut self, start: usize) -> Result<TokenKind> {
        while self.peek().is_some_and(is_ident_continue) {
            self.advance();
        }
        let name = &self.input[start..self.pos];
        let is_call = self.input[self.pos..]
            .chars()
            .find(|c| !c.is_ascii_whitespace())
            == Some('(');

        if is_call {
            return match self.functions.get(name) {
                Some(function) => Ok(TokenKind::Function(function.clone())),
                None => Err(ExprError::UnknownFunction {
                    name: name.to_string(),
                    position: start,
                }),
            };
        }

        let unknown = || {
            ExprError::unparsable(format!("unknown variable '{}' at position {}", name, start))
        };
        let key = name.try_into_heapless().map_err(|_| unknown())?;
        let slot = self
            .variables
            .keys()
            .position(|k| *k == key)
            .ok_or_else(unknown)?;
        Ok(TokenKind::Variable { name: key, slot })
    }

    fn scan(&mut self) -> Option<Result<Token>> {
        self.skip_whitespace();
        let start = self.pos;
        let c = self.peek()?;

        let kind = if c.is_ascii_digit()
            || (c == '.' && self.peek_at(1).is_some_and(|d| d.is_ascii_digit()))
        {
            match self.scan_number(start) {
                Ok(value) => TokenKind::Number(value),
                Err(err) => return Some(Err(err)),
            }
        } else if is_ident_start(c) {
            match self.scan_identifier(start) {
                Ok(kind) => kind,
                Err(err) => return Some(Err(err)),
            }
        } else {
            self.advance();
            match c {
                '(' => TokenKind::LeftParen,
                ')' => TokenKind::RightParen,
                ',' => TokenKind::ArgSep,
                _ => match self.operators.resolve(c, self.expect_operand) {
                    Some(operator) => TokenKind::Operator {
                        prefix: operator.is_unary() && self.expect_operand,
                        operator: operator.clone(),
                    },
                    None => {
                        return Some(Err(ExprError::unparsable(format!(
                            "unknown character '{}' at position {}",
                            c, start
                        ))));
                    }
                },
            }
        };

        self.expect_operand = match &kind {
            TokenKind::Number(_) | TokenKind::Variable { .. } | TokenKind::RightParen => false,
            TokenKind::Function(_) | TokenKind::LeftParen | TokenKind::ArgSep => true,
            TokenKind::Operator { operator, prefix } => !operator.is_unary() || *prefix,
        };

        trace!("token {:?} at {}", kind, start);
        Some(Ok(Token {
            kind,
            position: start,
        }))
    }
}

impl Iterator for Lexer<'_> {
    type Item = Result<Token>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        let item = self.scan();
        if matches!(item, Some(Err(_))) {
            self.failed = true;
        }
        item
    }
}

/// Tokenizes `input` against the given symbol tables.
pub fn tokenize(
    input: &str,
    variables: &VariableMap,
    functions: &FunctionTable,
    operators: &OperatorTable,
) -> Result<Vec<Token>> {
    Lexer::new(input, variables, functions, operators).collect()
}
