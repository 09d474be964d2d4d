//! Infix to postfix conversion (Dijkstra's shunting-yard algorithm).
//!
//! Besides reordering, the converter tracks the operand-stack depth the postfix
//! sequence will reach, rejects shapes that could never evaluate (an operator
//! without its operands, leftover values), and records how many arguments each
//! function call site passes.

use log::trace;

use crate::error::{ExprError, Result};
use crate::functions::Function;
use crate::lexer::{Token, TokenKind};
use crate::operators::Operator;
use crate::program::RpnToken;

/// Result of a conversion: postfix tokens plus the maximum operand-stack depth.
#[derive(Debug)]
pub struct Postfix {
    pub tokens: Vec<RpnToken>,
    pub max_depth: usize,
}

enum StackItem {
    Operator { operator: Operator, position: usize },
    Function { function: Function, position: usize },
    LeftParen { position: usize },
}

/// One open parenthesis and what has been seen inside it so far.
struct Frame {
    call: bool,
    separators: usize,
    empty: bool,
}

#[derive(Default)]
struct Converter {
    output: Vec<RpnToken>,
    stack: Vec<StackItem>,
    frames: Vec<Frame>,
    depth: usize,
    max_depth: usize,
}

impl Converter {
    fn push_operand(&mut self, token: RpnToken) {
        trace!("emit {}", token);
        self.output.push(token);
        self.depth += 1;
        self.max_depth = self.max_depth.max(self.depth);
    }

    /// Emits an instruction consuming `consumed` operands and producing one.
    fn push_reducer(&mut self, token: RpnToken, consumed: usize, position: usize) -> Result<()> {
        if self.depth < consumed {
            return Err(ExprError::unparsable(format!(
                "'{}' at position {} is missing an operand",
                token, position
            )));
        }
        trace!("emit {}", token);
        self.output.push(token);
        self.depth = self.depth - consumed + 1;
        self.max_depth = self.max_depth.max(self.depth);
        Ok(())
    }

    fn emit_operator(&mut self, operator: Operator, position: usize) -> Result<()> {
        let consumed = operator.operands();
        self.push_reducer(RpnToken::Operator(operator), consumed, position)
    }

    fn emit_function(&mut self, function: Function, argc: usize, position: usize) -> Result<()> {
        self.push_reducer(RpnToken::Function { function, argc }, argc, position)
    }

    /// Pops operators to the output until a `(` is on top. Returns false if the
    /// stack runs out first.
    fn pop_until_paren(&mut self) -> Result<bool> {
        loop {
            match self.stack.last() {
                Some(StackItem::LeftParen { .. }) => return Ok(true),
                None => return Ok(false),
                Some(_) => {}
            }
            match self.stack.pop() {
                Some(StackItem::Operator { operator, position }) => {
                    self.emit_operator(operator, position)?
                }
                Some(StackItem::Function { function, position }) => {
                    return Err(ExprError::unparsable(format!(
                        "function '{}' at position {} has no argument list",
                        function.name(),
                        position
                    )));
                }
                _ => return Ok(false),
            }
        }
    }

    fn push_operator(&mut self, operator: Operator, prefix: bool, position: usize) -> Result<()> {
        // a prefix operator has no left operand to compete for
        if !prefix {
            while let Some(StackItem::Operator { operator: top, .. }) = self.stack.last() {
                if !operator.yields_to(top) {
                    break;
                }
                if let Some(StackItem::Operator { operator: top, position }) = self.stack.pop() {
                    self.emit_operator(top, position)?;
                }
            }
        }
        self.stack.push(StackItem::Operator { operator, position });
        Ok(())
    }

    fn close_paren(&mut self, position: usize) -> Result<()> {
        let mismatched =
            || ExprError::unparsable(format!("mismatched ')' at position {}", position));
        if !self.pop_until_paren()? {
            return Err(mismatched());
        }
        self.stack.pop();
        let frame = self.frames.pop().ok_or_else(mismatched)?;
        if frame.call {
            if let Some(StackItem::Function { function, position }) = self.stack.pop() {
                let argc = if frame.empty { 0 } else { frame.separators + 1 };
                self.emit_function(function, argc, position)?;
            }
        }
        Ok(())
    }

    fn feed(&mut self, token: Token) -> Result<()> {
        let Token { kind, position } = token;
        if !matches!(kind, TokenKind::RightParen) {
            if let Some(frame) = self.frames.last_mut() {
                frame.empty = false;
            }
        }
        match kind {
            TokenKind::Number(value) => self.push_operand(RpnToken::Number(value)),
            TokenKind::Variable { name, slot } => {
                self.push_operand(RpnToken::Variable { name, slot })
            }
            TokenKind::Function(function) => {
                self.stack.push(StackItem::Function { function, position })
            }
            TokenKind::Operator { operator, prefix } => {
                self.push_operator(operator, prefix, position)?
            }
            TokenKind::LeftParen => {
                let call = matches!(self.stack.last(), Some(StackItem::Function { .. }));
                self.stack.push(StackItem::LeftParen { position });
                self.frames.push(Frame {
                    call,
                    separators: 0,
                    empty: true,
                });
            }
            TokenKind::RightParen => self.close_paren(position)?,
            TokenKind::ArgSep => {
                let misplaced = || {
                    ExprError::unparsable(format!(
                        "misplaced separator or mismatched parens at position {}",
                        position
                    ))
                };
                if !self.pop_until_paren()? {
                    return Err(misplaced());
                }
                let frame = self.frames.last_mut().ok_or_else(misplaced)?;
                frame.separators += 1;
            }
        }
        Ok(())
    }

    fn finish(mut self) -> Result<Postfix> {
        while let Some(item) = self.stack.pop() {
            match item {
                StackItem::Operator { operator, position } => {
                    self.emit_operator(operator, position)?
                }
                StackItem::LeftParen { position } => {
                    return Err(ExprError::unparsable(format!(
                        "mismatched '(' at position {}",
                        position
                    )));
                }
                StackItem::Function { function, position } => {
                    return Err(ExprError::unparsable(format!(
                        "function '{}' at position {} has no argument list",
                        function.name(),
                        position
                    )));
                }
            }
        }
        match self.depth {
            1 => Ok(Postfix {
                tokens: self.output,
                max_depth: self.max_depth,
            }),
            0 => Err(ExprError::unparsable("empty expression")),
            n => Err(ExprError::unparsable(format!(
                "expression leaves {} values without an operator to combine them",
                n
            ))),
        }
    }
}

/// Converts an infix token sequence into postfix order.
pub fn to_postfix<I>(tokens: I) -> Result<Postfix>
where
    I: IntoIterator<Item = Token>,
{
    let mut converter = Converter::default();
    for token in tokens {
        converter.feed(token)?;
    }
    converter.finish()
}
