#![doc = r#"
# exp-rpn

Compile infix math expressions once, evaluate them many times.

## Overview

exp-rpn turns an expression such as `x^2 + 2*x + 1` into a postfix (Reverse Polish)
program using Dijkstra's shunting-yard algorithm, then evaluates that program on an
operand stack under whatever variable values you supply.

Key features:
- IEEE-754 double arithmetic (`1/0` is `inf`, not an error)
- Named variables that may be left unset until evaluation
- Built-in math functions (`sin`, `cos`, `log`, `sqrt`, ...) backed by `libm`
- User-defined n-ary functions and single-character unary/binary operators
- A `name(a, b) = body` header form that declares the parameters as variables
- Compiled programs are immutable, `Send + Sync`, and can be evaluated concurrently
- Bounded, `heapless` symbol tables

## Quick Start

```rust
use exp_rpn::engine::interp;

let result = interp("2 + 3 * 4").unwrap();
assert_eq!(result, 14.0);

let result = interp("sin(0) + cos(0)").unwrap();
assert_eq!(result, 1.0);
```

## Compile Once, Evaluate Many Times

```rust
use exp_rpn::ExpressionBuilder;

let program = ExpressionBuilder::new("f(x, y) = x*y + 1").build().unwrap();

assert_eq!(program.evaluate_with([("x", 2.0), ("y", 3.0)]).unwrap(), 7.0);
// values can also be bound in declaration order
assert_eq!(program.evaluate_positional(&[4.0, 5.0]).unwrap(), 21.0);
```

## Custom Functions and Operators

```rust
use exp_rpn::{ExpressionBuilder, Function, Operator};

let avg = Function::new("avg", 3, |args| args.iter().sum::<f64>() / 3.0).unwrap();
let max = Operator::binary('|', 0, f64::max).unwrap();

let program = ExpressionBuilder::new("avg(1, 2, 3) | 1.5")
    .with_function(avg)
    .with_operator(max)
    .build()
    .unwrap();
assert_eq!(program.evaluate().unwrap(), 2.0);
```

## Error Handling

```rust
use exp_rpn::engine::interp;
use exp_rpn::error::ExprError;

match interp("foo(1)") {
    Err(ExprError::UnknownFunction { name, .. }) => assert_eq!(name, "foo"),
    other => panic!("unexpected {:?}", other),
}
assert!(matches!(interp("(1+2"), Err(ExprError::Unparsable(_))));
```

## Operator Precedence and Associativity

| Precedence | Operators | Associativity |
|------------|-----------|---------------|
| 1 | `+` `-` | Left |
| 2 | `*` `/` `%` | Left |
| 3 | `^` | Right |
| 5 | unary `-` | Left |

Unary minus binds tighter than `^`, so `-3^2` is `9`.
"#]

pub mod builder;
pub mod engine;
pub mod error;
pub mod functions;
pub mod header;
pub mod lexer;
pub mod operators;
pub mod program;
pub mod shunting_yard;
pub mod types;

pub use builder::ExpressionBuilder;
pub use error::{ExprError, Result};
pub use functions::{Function, FunctionTable};
pub use operators::{Operator, OperatorArity, OperatorTable};
pub use program::{Program, RpnToken};
pub use types::VariableMap;

/// Floating-point type used for all values.
pub type Real = f64;

pub mod constants {
    use super::Real;

    pub const PI: Real = core::f64::consts::PI;
    pub const E: Real = core::f64::consts::E;
    pub const TEST_PRECISION: Real = 1e-10;
}

/// Utility macro to check if two floating point values are approximately equal
/// within a specified epsilon. Supports optional format arguments like assert_eq!.
#[macro_export]
macro_rules! assert_approx_eq {
    ($left:expr, $right:expr $(,)?) => {
        $crate::assert_approx_eq!($left, $right, $crate::constants::TEST_PRECISION)
    };
    ($left:expr, $right:expr, $epsilon:expr $(,)?) => {{
        let left_val: $crate::Real = $left;
        let right_val: $crate::Real = $right;
        let eps: $crate::Real = $epsilon;
        $crate::assert_approx_eq!(
            left_val,
            right_val,
            eps,
            "assertion failed: `(left ≈ right)` (left: `{}`, right: `{}`, epsilon: `{}`)",
            left_val,
            right_val,
            eps
        );
    }};
    ($left:expr, $right:expr, $epsilon:expr, $fmt:expr $(, $($arg:tt)+)?) => {{
        let left_val: $crate::Real = $left;
        let right_val: $crate::Real = $right;
        let eps: $crate::Real = $epsilon;

        if left_val.is_nan() && right_val.is_nan() {
            // NaN == NaN for our purposes
        } else if left_val.is_infinite()
            && right_val.is_infinite()
            && left_val.signum() == right_val.signum()
        {
            // Same-signed infinities are equal
        } else {
            assert!((left_val - right_val).abs() < eps, $fmt $(, $($arg)+)?);
        }
    }};
}
