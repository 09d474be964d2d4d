//! Compiled postfix programs and the stack evaluator.
//!
//! A [`Program`] is immutable once compiled: evaluation borrows it shared, keeps its
//! operand stack and variable slots local to the call, and can therefore run on
//! many threads at once. Only [`Program::set_variable`] mutates, and it needs an
//! exclusive borrow.

use core::fmt;

use crate::Real;
use crate::error::{ExprError, Result};
use crate::functions::Function;
use crate::operators::Operator;
use crate::types::{ArgBuffer, EXP_RPN_MAX_VARIABLES, HString, TryIntoHeaplessString, VariableMap};

/// Per-call variable values, indexed by declaration order.
type Slots = heapless::Vec<Option<Real>, EXP_RPN_MAX_VARIABLES>;

/// A postfix instruction.
#[derive(Clone, Debug)]
pub enum RpnToken {
    Number(Real),
    /// Variable reference resolved to its slot in the program's variable map.
    Variable { name: HString, slot: usize },
    /// Function call; `argc` is the argument count written at the call site.
    Function { function: Function, argc: usize },
    Operator(Operator),
}

impl fmt::Display for RpnToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RpnToken::Number(value) => write!(f, "{}", value),
            RpnToken::Variable { name, .. } => write!(f, "{}", name),
            RpnToken::Function { function, .. } => write!(f, "{}", function.name()),
            RpnToken::Operator(operator) => write!(f, "{}", operator.symbol()),
        }
    }
}

/// An expression compiled to postfix form, ready for repeated evaluation.
///
/// # Example
///
/// ```
/// use exp_rpn::ExpressionBuilder;
///
/// let program = ExpressionBuilder::new("x^2 + 2*x + 1")
///     .with_variable_names(&["x"])
///     .build()
///     .unwrap();
/// assert_eq!(program.to_string(), "x 2 ^ 2 x * + 1 +");
/// assert_eq!(program.evaluate_with([("x", 3.0)]).unwrap(), 16.0);
/// assert!(program.evaluate().is_err()); // x has no default value
/// ```
#[derive(Clone, Debug)]
pub struct Program {
    expression: String,
    tokens: Vec<RpnToken>,
    max_depth: usize,
    variables: VariableMap,
}

impl Program {
    pub(crate) fn new(
        expression: String,
        tokens: Vec<RpnToken>,
        max_depth: usize,
        variables: VariableMap,
    ) -> Self {
        Self {
            expression,
            tokens,
            max_depth,
            variables,
        }
    }

    /// Evaluates with the default variable values.
    pub fn evaluate(&self) -> Result<Real> {
        self.run(&self.default_slots())
    }

    /// Evaluates with `values` overriding the defaults for this call only.
    ///
    /// Every name must be a declared variable of the program.
    pub fn evaluate_with<I, K>(&self, values: I) -> Result<Real>
    where
        I: IntoIterator<Item = (K, Real)>,
        K: AsRef<str>,
    {
        let mut slots = self.default_slots();
        for (name, value) in values {
            let name = name.as_ref();
            let slot = self.slot_of(name)?;
            slots[slot] = Some(value);
        }
        self.run(&slots)
    }

    /// Evaluates with `values` bound to the declared variables in declaration order.
    pub fn evaluate_positional(&self, values: &[Real]) -> Result<Real> {
        if values.len() != self.variables.len() {
            return Err(ExprError::unparsable(format!(
                "expected {} variable value(s), got {}",
                self.variables.len(),
                values.len()
            )));
        }
        let slots: Slots = values.iter().map(|&v| Some(v)).collect();
        self.run(&slots)
    }

    /// Sets the default value of a declared variable.
    pub fn set_variable(&mut self, name: &str, value: Real) -> Result<()> {
        let key = name.try_into_heapless()?;
        match self.variables.get_mut(&key) {
            Some(slot) => {
                *slot = Some(value);
                Ok(())
            }
            None => Err(unknown_variable(name)),
        }
    }

    /// Declared variables and their default values, in declaration order.
    pub fn variables(&self) -> &VariableMap {
        &self.variables
    }

    /// Names of the declared variables, in declaration order.
    pub fn variable_names(&self) -> impl Iterator<Item = &str> {
        self.variables.keys().map(|k| k.as_str())
    }

    /// Largest operand-stack depth any evaluation needs.
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    pub fn tokens(&self) -> &[RpnToken] {
        &self.tokens
    }

    /// The infix body this program was compiled from, without any header.
    pub fn expression(&self) -> &str {
        &self.expression
    }

    fn default_slots(&self) -> Slots {
        self.variables.values().copied().collect()
    }

    fn slot_of(&self, name: &str) -> Result<usize> {
        self.variables
            .keys()
            .position(|k| k.as_str() == name)
            .ok_or_else(|| unknown_variable(name))
    }

    fn run(&self, slots: &[Option<Real>]) -> Result<Real> {
        let mut stack: Vec<Real> = Vec::with_capacity(self.max_depth);
        for token in &self.tokens {
            match token {
                RpnToken::Number(value) => stack.push(*value),
                RpnToken::Variable { name, slot } => {
                    let value = slots.get(*slot).copied().flatten().ok_or_else(|| {
                        ExprError::unparsable(format!("variable '{}' has no value", name))
                    })?;
                    stack.push(value);
                }
                RpnToken::Function { function, argc } => {
                    if *argc != function.arity() {
                        return Err(ExprError::unparsable(format!(
                            "function '{}' expects {} argument(s), got {}",
                            function.name(),
                            function.arity(),
                            argc
                        )));
                    }
                    let args = pop_args(&mut stack, function.arity(), function.name())?;
                    stack.push(function.apply(&args));
                }
                RpnToken::Operator(operator) => {
                    let mut symbol = [0u8; 4];
                    let symbol = operator.symbol().encode_utf8(&mut symbol);
                    let args = pop_args(&mut stack, operator.operands(), symbol)?;
                    stack.push(operator.apply(&args));
                }
            }
        }
        match stack.as_slice() {
            [value] => Ok(*value),
            _ => Err(ExprError::unparsable(format!(
                "evaluation left {} values on the stack, expected 1",
                stack.len()
            ))),
        }
    }
}

/// Pops `n` operands; the top of the stack becomes the last argument.
fn pop_args(stack: &mut Vec<Real>, n: usize, symbol: &str) -> Result<ArgBuffer> {
    if stack.len() < n {
        return Err(ExprError::unparsable(format!(
            "'{}' needs {} operand(s) but the stack holds {}",
            symbol,
            n,
            stack.len()
        )));
    }
    let split = stack.len() - n;
    let args = ArgBuffer::from_slice(&stack[split..])
        .map_err(|_| ExprError::CapacityExceeded("arguments"))?;
    stack.truncate(split);
    Ok(args)
}

fn unknown_variable(name: &str) -> ExprError {
    ExprError::unparsable(format!("unknown variable '{}'", name))
}

impl fmt::Display for Program {
    /// Renders the postfix form as space-separated tokens.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, token) in self.tokens.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{}", token)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operators::OperatorTable;
    use crate::types::bind_variable;

    fn sub_program(vars: &[(&str, Option<Real>)]) -> Program {
        // a b -
        let mut variables = VariableMap::new();
        for (name, value) in vars {
            bind_variable(&mut variables, name, *value).unwrap();
        }
        let ops = OperatorTable::default();
        let tokens = vec![
            RpnToken::Variable { name: "a".try_into_heapless().unwrap(), slot: 0 },
            RpnToken::Variable { name: "b".try_into_heapless().unwrap(), slot: 1 },
            RpnToken::Operator(ops.binary('-').unwrap().clone()),
        ];
        Program::new("a-b".to_string(), tokens, 2, variables)
    }

    #[test]
    fn test_operand_order() {
        let program = sub_program(&[("a", Some(10.0)), ("b", Some(4.0))]);
        assert_eq!(program.evaluate().unwrap(), 6.0);
        assert_eq!(program.to_string(), "a b -");
    }

    #[test]
    fn test_overrides_and_positional() {
        let program = sub_program(&[("a", Some(10.0)), ("b", None)]);
        assert!(program.evaluate().unwrap_err().is_unparsable());
        assert_eq!(program.evaluate_with([("b", 1.0)]).unwrap(), 9.0);
        assert_eq!(program.evaluate_with([("a", 1.0), ("b", 1.0)]).unwrap(), 0.0);
        assert_eq!(program.evaluate_positional(&[3.0, 5.0]).unwrap(), -2.0);
        assert!(program.evaluate_positional(&[3.0]).is_err());
        assert!(program.evaluate_with([("z", 1.0)]).unwrap_err().is_unparsable());
        // overrides never touch the defaults
        assert!(program.evaluate().is_err());
    }

    #[test]
    fn test_set_variable() {
        let mut program = sub_program(&[("a", None), ("b", None)]);
        program.set_variable("a", 2.0).unwrap();
        program.set_variable("b", 0.5).unwrap();
        assert_eq!(program.evaluate().unwrap(), 1.5);
        assert!(program.set_variable("c", 1.0).is_err());
        assert_eq!(program.variable_names().collect::<Vec<_>>(), ["a", "b"]);
    }

    #[test]
    fn test_underflow_and_residue() {
        let ops = OperatorTable::default();
        let underflow = Program::new(
            "+".to_string(),
            vec![RpnToken::Number(1.0), RpnToken::Operator(ops.binary('+').unwrap().clone())],
            1,
            VariableMap::new(),
        );
        assert!(underflow.evaluate().unwrap_err().is_unparsable());

        let residue = Program::new(
            "1 2".to_string(),
            vec![RpnToken::Number(1.0), RpnToken::Number(2.0)],
            2,
            VariableMap::new(),
        );
        let err = residue.evaluate().unwrap_err();
        assert!(err.to_string().contains("left 2 values"));

        let empty = Program::new(String::new(), Vec::new(), 0, VariableMap::new());
        assert!(empty.evaluate().is_err());
    }

    #[test]
    fn test_function_arity_checked() {
        let sin = Function::unary("sin", libm::sin).unwrap();
        let program = Program::new(
            "sin(1,2)".to_string(),
            vec![
                RpnToken::Number(1.0),
                RpnToken::Number(2.0),
                RpnToken::Function { function: sin, argc: 2 },
            ],
            2,
            VariableMap::new(),
        );
        let err = program.evaluate().unwrap_err();
        assert_eq!(
            err,
            ExprError::Unparsable("function 'sin' expects 1 argument(s), got 2".to_string())
        );
    }
}
