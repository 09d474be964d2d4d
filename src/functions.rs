//! Named n-ary functions and the built-in math function table.
//!
//! A [`Function`] pairs a validated name and arity with a pure implementation over a
//! fixed-size argument slice. The built-ins are thin adapters over `libm`, so results
//! match the host math library bit for bit.

use core::fmt;
use std::sync::Arc;

use libm::{
    acos as libm_acos, asin as libm_asin, atan as libm_atan, cbrt as libm_cbrt,
    ceil as libm_ceil, cos as libm_cos, cosh as libm_cosh, exp as libm_exp,
    expm1 as libm_expm1, fabs as libm_abs, floor as libm_floor, log as libm_ln,
    sin as libm_sin, sinh as libm_sinh, sqrt as libm_sqrt, tan as libm_tan, tanh as libm_tanh,
};

use crate::Real;
use crate::error::{ExprError, Result};
use crate::types::{
    EXP_RPN_MAX_ARITY, EXP_RPN_MAX_FUNCTIONS, HString, TryIntoHeaplessString, is_identifier,
};

type Implementation = Arc<dyn Fn(&[Real]) -> Real + Send + Sync>;

/// A named function callable from expressions as `name(arg1, ..., argN)`.
///
/// # Example
///
/// ```
/// use exp_rpn::{ExpressionBuilder, Function};
///
/// let hypot = Function::new("hypot", 2, |args| (args[0] * args[0] + args[1] * args[1]).sqrt())
///     .unwrap();
/// let program = ExpressionBuilder::new("hypot(3, 4)")
///     .with_function(hypot)
///     .build()
///     .unwrap();
/// assert_eq!(program.evaluate().unwrap(), 5.0);
/// ```
#[derive(Clone)]
pub struct Function {
    name: HString,
    arity: usize,
    implementation: Implementation,
}

impl Function {
    /// Creates a function taking exactly `arity` arguments.
    ///
    /// Fails with `InvalidCustomFunction` when the name is empty, is not an
    /// identifier, does not fit in `EXP_RPN_MAX_NAME_LEN` bytes, or when the arity is
    /// zero or above `EXP_RPN_MAX_ARITY`.
    pub fn new<F>(name: &str, arity: usize, implementation: F) -> Result<Self>
    where
        F: Fn(&[Real]) -> Real + Send + Sync + 'static,
    {
        if name.is_empty() {
            return Err(ExprError::InvalidCustomFunction(
                "function name must not be empty".to_string(),
            ));
        }
        if !is_identifier(name) {
            return Err(ExprError::InvalidCustomFunction(format!(
                "'{}' is not a valid function name",
                name
            )));
        }
        if arity == 0 || arity > EXP_RPN_MAX_ARITY {
            return Err(ExprError::InvalidCustomFunction(format!(
                "function '{}' has arity {}, expected 1..={}",
                name, arity, EXP_RPN_MAX_ARITY
            )));
        }
        let name = name.try_into_heapless().map_err(|_| {
            ExprError::InvalidCustomFunction(format!("function name '{}' is too long", name))
        })?;
        Ok(Self {
            name,
            arity,
            implementation: Arc::new(implementation),
        })
    }

    /// Creates a single-argument function.
    pub fn unary<F>(name: &str, implementation: F) -> Result<Self>
    where
        F: Fn(Real) -> Real + Send + Sync + 'static,
    {
        Self::new(name, 1, move |args| implementation(args[0]))
    }

    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    pub fn arity(&self) -> usize {
        self.arity
    }

    /// Applies the function. `args` must hold exactly `arity` values.
    pub fn apply(&self, args: &[Real]) -> Real {
        (self.implementation)(args)
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Function")
            .field("name", &self.name)
            .field("arity", &self.arity)
            .finish_non_exhaustive()
    }
}

/// Function table keyed by name, in registration order.
#[derive(Clone, Debug)]
pub struct FunctionTable {
    functions: heapless::FnvIndexMap<HString, Function, EXP_RPN_MAX_FUNCTIONS>,
}

impl FunctionTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self {
            functions: heapless::FnvIndexMap::new(),
        }
    }

    /// Creates a table holding the standard math functions.
    pub fn with_builtins() -> Self {
        let mut table = Self::new();
        table.register_builtins();
        table
    }

    fn register_builtins(&mut self) {
        let builtins: [(&str, fn(Real) -> Real); 17] = [
            ("abs", libm_abs),
            ("acos", libm_acos),
            ("asin", libm_asin),
            ("atan", libm_atan),
            ("cbrt", libm_cbrt),
            ("ceil", libm_ceil),
            ("cos", libm_cos),
            ("cosh", libm_cosh),
            ("exp", libm_exp),
            ("expm1", libm_expm1),
            ("floor", libm_floor),
            ("log", libm_ln),
            ("sin", libm_sin),
            ("sinh", libm_sinh),
            ("sqrt", libm_sqrt),
            ("tan", libm_tan),
            ("tanh", libm_tanh),
        ];
        for (name, f) in builtins {
            if let Ok(function) = Function::unary(name, f) {
                let _ = self.insert(function);
            }
        }
    }

    /// Adds or replaces a function by name.
    pub fn insert(&mut self, function: Function) -> Result<()> {
        self.functions
            .insert(function.name.clone(), function)
            .map(|_| ())
            .map_err(|_| ExprError::CapacityExceeded("functions"))
    }

    pub fn get(&self, name: &str) -> Option<&Function> {
        let key = name.try_into_heapless().ok()?;
        self.functions.get(&key)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.functions.keys().map(|k| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}

impl Default for FunctionTable {
    fn default() -> Self {
        Self::with_builtins()
    }
}
