//! Fluent configuration of an expression and its symbol tables.

use crate::Real;
use crate::engine::compile;
use crate::error::{ExprError, Result};
use crate::functions::{Function, FunctionTable};
use crate::operators::{Operator, OperatorTable};
use crate::program::Program;
use crate::types::{VariableMap, bind_variable};

/// Accumulates an expression, its variables, functions and operators, then
/// compiles them with [`ExpressionBuilder::build`].
///
/// The function and operator tables start out holding the built-ins; adding an
/// item with the same name (or symbol and arity) replaces it. Builder methods never
/// fail: the first capacity or name-length problem is kept and returned by `build`.
///
/// # Examples
///
/// ```
/// use exp_rpn::{ExpressionBuilder, Function};
/// use std::collections::HashMap;
///
/// let program = ExpressionBuilder::new("a * twice(b) + c")
///     .with_variable("a", 2.0)
///     .with_variable_names(&["b"])
///     .with_variables(HashMap::from([("c", 1.0)]))
///     .with_function(Function::unary("twice", |x| 2.0 * x).unwrap())
///     .build()
///     .unwrap();
///
/// assert_eq!(program.evaluate_with([("b", 5.0)]).unwrap(), 21.0);
/// ```
#[derive(Clone, Debug)]
pub struct ExpressionBuilder {
    expression: String,
    variables: VariableMap,
    functions: FunctionTable,
    operators: OperatorTable,
    error: Option<ExprError>,
}

impl ExpressionBuilder {
    pub fn new(expression: &str) -> Self {
        Self {
            expression: expression.to_string(),
            variables: VariableMap::new(),
            functions: FunctionTable::with_builtins(),
            operators: OperatorTable::with_builtins(),
            error: None,
        }
    }

    /// Replaces the expression text.
    pub fn with_expression(mut self, expression: &str) -> Self {
        self.expression = expression.to_string();
        self
    }

    /// Declares a variable with a default value.
    pub fn with_variable(mut self, name: &str, value: Real) -> Self {
        let result = bind_variable(&mut self.variables, name, Some(value));
        self.record(result);
        self
    }

    /// Declares variables without values; each must be bound at evaluation time.
    pub fn with_variable_names(mut self, names: &[&str]) -> Self {
        for name in names {
            let result = bind_variable(&mut self.variables, name, None);
            self.record(result);
        }
        self
    }

    /// Declares variables from `(name, value)` pairs, where a value may be `None`.
    pub fn with_variables<I, K, V>(mut self, variables: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Option<Real>>,
    {
        for (name, value) in variables {
            let result = bind_variable(&mut self.variables, name.as_ref(), value.into());
            self.record(result);
        }
        self
    }

    pub fn with_function(mut self, function: Function) -> Self {
        let result = self.functions.insert(function);
        self.record(result);
        self
    }

    pub fn with_functions<I>(self, functions: I) -> Self
    where
        I: IntoIterator<Item = Function>,
    {
        functions.into_iter().fold(self, Self::with_function)
    }

    pub fn with_operator(mut self, operator: Operator) -> Self {
        let result = self.operators.insert(operator);
        self.record(result);
        self
    }

    pub fn with_operators<I>(self, operators: I) -> Self
    where
        I: IntoIterator<Item = Operator>,
    {
        operators.into_iter().fold(self, Self::with_operator)
    }

    fn record(&mut self, result: Result<()>) {
        if let Err(err) = result {
            self.error.get_or_insert(err);
        }
    }

    /// Compiles the expression against the accumulated tables.
    pub fn build(&self) -> Result<Program> {
        if let Some(err) = &self.error {
            return Err(err.clone());
        }
        compile(
            &self.expression,
            &self.variables,
            &self.functions,
            &self.operators,
        )
    }
}
