//! Unary and binary operators.
//!
//! Operators are single characters with a precedence and associativity. The
//! [`OperatorTable`] keeps unary and binary registrations apart, so one symbol can
//! carry both meanings; the tokenizer decides which one applies from the
//! surrounding tokens.

use core::fmt;
use std::sync::Arc;

use libm::{fmod as libm_fmod, pow as libm_pow};

use crate::Real;
use crate::error::{ExprError, Result};
use crate::types::EXP_RPN_MAX_OPERATORS;

type Implementation = Arc<dyn Fn(&[Real]) -> Real + Send + Sync>;

/// Number of operands an operator consumes.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum OperatorArity {
    Unary,
    Binary,
}

impl OperatorArity {
    pub fn operands(self) -> usize {
        match self {
            OperatorArity::Unary => 1,
            OperatorArity::Binary => 2,
        }
    }
}

/// A single-character operator.
///
/// Binary operators receive `[left, right]`; unary operators receive `[operand]`.
///
/// # Example
///
/// ```
/// use exp_rpn::{ExpressionBuilder, Operator, OperatorArity};
///
/// let factorial = Operator::new('!', OperatorArity::Unary, 6, true, |args| {
///     (1..=args[0] as u64).product::<u64>() as f64
/// })
/// .unwrap();
/// let program = ExpressionBuilder::new("3! + 1")
///     .with_operator(factorial)
///     .build()
///     .unwrap();
/// assert_eq!(program.evaluate().unwrap(), 7.0);
/// ```
#[derive(Clone)]
pub struct Operator {
    symbol: char,
    arity: OperatorArity,
    precedence: u8,
    left_associative: bool,
    implementation: Implementation,
}

impl Operator {
    /// Creates an operator.
    ///
    /// Fails with `InvalidCustomOperator` when `symbol` already has a meaning to the
    /// tokenizer: ASCII digits and letters, `_`, `.`, whitespace, `(`, `)` and `,`.
    pub fn new<F>(
        symbol: char,
        arity: OperatorArity,
        precedence: u8,
        left_associative: bool,
        implementation: F,
    ) -> Result<Self>
    where
        F: Fn(&[Real]) -> Real + Send + Sync + 'static,
    {
        if symbol.is_ascii_alphanumeric()
            || symbol.is_whitespace()
            || matches!(symbol, '_' | '.' | '(' | ')' | ',')
        {
            return Err(ExprError::InvalidCustomOperator(format!(
                "'{}' cannot be used as an operator symbol",
                symbol
            )));
        }
        Ok(Self {
            symbol,
            arity,
            precedence,
            left_associative,
            implementation: Arc::new(implementation),
        })
    }

    /// Left-associative binary operator.
    pub fn binary<F>(symbol: char, precedence: u8, implementation: F) -> Result<Self>
    where
        F: Fn(Real, Real) -> Real + Send + Sync + 'static,
    {
        Self::new(symbol, OperatorArity::Binary, precedence, true, move |args| {
            implementation(args[0], args[1])
        })
    }

    /// Left-associative unary operator.
    pub fn unary<F>(symbol: char, precedence: u8, implementation: F) -> Result<Self>
    where
        F: Fn(Real) -> Real + Send + Sync + 'static,
    {
        Self::new(symbol, OperatorArity::Unary, precedence, true, move |args| {
            implementation(args[0])
        })
    }

    pub fn symbol(&self) -> char {
        self.symbol
    }

    pub fn arity(&self) -> OperatorArity {
        self.arity
    }

    pub fn operands(&self) -> usize {
        self.arity.operands()
    }

    pub fn precedence(&self) -> u8 {
        self.precedence
    }

    pub fn is_left_associative(&self) -> bool {
        self.left_associative
    }

    pub fn is_unary(&self) -> bool {
        self.arity == OperatorArity::Unary
    }

    /// Applies the operator. `args` must hold exactly `operands()` values.
    pub fn apply(&self, args: &[Real]) -> Real {
        (self.implementation)(args)
    }

    /// True if this operator, arriving on the input, pops `top` from the working stack.
    pub(crate) fn yields_to(&self, top: &Operator) -> bool {
        if self.left_associative {
            self.precedence <= top.precedence
        } else {
            self.precedence < top.precedence
        }
    }
}

impl fmt::Debug for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Operator")
            .field("symbol", &self.symbol)
            .field("arity", &self.arity)
            .field("precedence", &self.precedence)
            .field("left_associative", &self.left_associative)
            .finish_non_exhaustive()
    }
}

type OperatorMap = heapless::FnvIndexMap<char, Operator, EXP_RPN_MAX_OPERATORS>;

/// Operator table with separate unary and binary registrations per symbol.
#[derive(Clone, Debug)]
pub struct OperatorTable {
    unary: OperatorMap,
    binary: OperatorMap,
}

impl OperatorTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self {
            unary: OperatorMap::new(),
            binary: OperatorMap::new(),
        }
    }

    /// Creates a table holding the standard arithmetic operators.
    ///
    /// | symbol | arity | precedence | associativity |
    /// |---|---|---|---|
    /// | `+` `-` | 2 | 1 | left |
    /// | `*` `/` `%` | 2 | 2 | left |
    /// | `^` | 2 | 3 | right |
    /// | `-` (negation) | 1 | 5 | left |
    pub fn with_builtins() -> Self {
        let mut table = Self::new();
        table.register_builtins();
        table
    }

    fn register_builtins(&mut self) {
        let builtins = [
            Operator::binary('+', 1, |a, b| a + b),
            Operator::binary('-', 1, |a, b| a - b),
            Operator::binary('*', 2, |a, b| a * b),
            Operator::binary('/', 2, |a, b| a / b),
            Operator::binary('%', 2, libm_fmod),
            Operator::new('^', OperatorArity::Binary, 3, false, |args| {
                libm_pow(args[0], args[1])
            }),
            Operator::unary('-', 5, |a| -a),
        ];
        for op in builtins.into_iter().flatten() {
            let _ = self.insert(op);
        }
    }

    /// Adds or replaces the operator registered under its symbol and arity.
    pub fn insert(&mut self, operator: Operator) -> Result<()> {
        let map = match operator.arity {
            OperatorArity::Unary => &mut self.unary,
            OperatorArity::Binary => &mut self.binary,
        };
        map.insert(operator.symbol, operator)
            .map(|_| ())
            .map_err(|_| ExprError::CapacityExceeded("operators"))
    }

    pub fn unary(&self, symbol: char) -> Option<&Operator> {
        self.unary.get(&symbol)
    }

    pub fn binary(&self, symbol: char) -> Option<&Operator> {
        self.binary.get(&symbol)
    }

    /// Resolves `symbol` by position: in operand position the unary registration
    /// wins, elsewhere the binary one. Falls back to the other when only one exists.
    pub fn resolve(&self, symbol: char, operand_position: bool) -> Option<&Operator> {
        if operand_position {
            self.unary(symbol).or_else(|| self.binary(symbol))
        } else {
            self.binary(symbol).or_else(|| self.unary(symbol))
        }
    }

    pub fn contains(&self, symbol: char) -> bool {
        self.unary.contains_key(&symbol) || self.binary.contains_key(&symbol)
    }

    pub fn len(&self) -> usize {
        self.unary.len() + self.binary.len()
    }

    pub fn is_empty(&self) -> bool {
        self.unary.is_empty() && self.binary.is_empty()
    }
}

impl Default for OperatorTable {
    fn default() -> Self {
        Self::with_builtins()
    }
}
