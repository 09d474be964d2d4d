use log::debug;

use crate::Real;
use crate::builder::ExpressionBuilder;
use crate::error::{ExprError, Result};
use crate::functions::FunctionTable;
use crate::header;
use crate::lexer::tokenize;
use crate::operators::OperatorTable;
use crate::program::Program;
use crate::shunting_yard::to_postfix;
use crate::types::VariableMap;

/// Compiles an infix expression into a postfix [`Program`].
///
/// A leading `name(args)=` header is stripped first and its arguments become the
/// first declared variables; entries of `variables` follow in their own order and
/// supply default values. A variable sharing its name with a function is rejected.
///
/// # Examples
///
/// ```
/// use exp_rpn::engine::compile;
/// use exp_rpn::{FunctionTable, OperatorTable, VariableMap};
///
/// let program = compile(
///     "f(a,b)=a*a+b*b",
///     &VariableMap::new(),
///     &FunctionTable::default(),
///     &OperatorTable::default(),
/// )
/// .unwrap();
/// assert_eq!(program.evaluate_positional(&[3.0, 4.0]).unwrap(), 25.0);
/// ```
pub fn compile(
    expression: &str,
    variables: &VariableMap,
    functions: &FunctionTable,
    operators: &OperatorTable,
) -> Result<Program> {
    let mut declared = VariableMap::new();
    let body = header::normalize(expression, &mut declared)?;
    for (name, value) in variables.iter() {
        declared
            .insert(name.clone(), *value)
            .map_err(|_| ExprError::CapacityExceeded("variables"))?;
    }

    if let Some(name) = declared.keys().find(|name| functions.contains(name.as_str())) {
        return Err(ExprError::unparsable(format!(
            "variable '{}' cannot share a function's name",
            name
        )));
    }

    let tokens = tokenize(body, &declared, functions, operators)?;
    let postfix = to_postfix(tokens)?;
    debug!(
        "compiled '{}' into {} postfix tokens, max depth {}",
        body,
        postfix.tokens.len(),
        postfix.max_depth
    );
    Ok(Program::new(
        body.to_string(),
        postfix.tokens,
        postfix.max_depth,
        declared,
    ))
}

/// Compiles `expression` with the default tables and evaluates it once.
///
/// # Examples
///
/// ```
/// use exp_rpn::engine::interp;
///
/// assert_eq!(interp("2 + 3 * 4").unwrap(), 14.0);
/// assert_eq!(interp("1/0").unwrap(), f64::INFINITY);
/// assert!(interp("foo(1)").is_err());
/// ```
pub fn interp(expression: &str) -> Result<Real> {
    ExpressionBuilder::new(expression).build()?.evaluate()
}

/// Like [`interp`], declaring and binding `values` as variables.
///
/// ```
/// use exp_rpn::engine::interp_with;
///
/// assert_eq!(interp_with("x^2 + 2*x + 1", &[("x", 3.0)]).unwrap(), 16.0);
/// ```
pub fn interp_with(expression: &str, values: &[(&str, Real)]) -> Result<Real> {
    ExpressionBuilder::new(expression)
        .with_variables(values.iter().copied())
        .build()?
        .evaluate()
}
