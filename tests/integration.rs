//! Integration tests for the exp-rpn library
//! These tests exercise the full pipeline from infix text to evaluated value

use exp_rpn::engine::{compile, interp, interp_with};
use exp_rpn::types::bind_variable;
use exp_rpn::{
    ExpressionBuilder, Function, FunctionTable, OperatorTable, Real, VariableMap,
    assert_approx_eq, constants,
};

/// Level 1: Literal arithmetic
#[test]
fn test_basic_expression_evaluation() {
    assert_eq!(interp("2+3*4").unwrap(), 14.0);
    assert_eq!(interp("(1+2)*(3+4)").unwrap(), 21.0);
    assert_eq!(interp("1+2*3").unwrap(), 7.0);
    assert_eq!(interp("1*2+3").unwrap(), 5.0);
    assert_eq!(interp("10 / 4 - 0.5").unwrap(), 2.0);
    assert_eq!(interp("  8 % 3 ").unwrap(), 2.0);
    assert_eq!(interp("1.5e2 + .25").unwrap(), 150.25);
}

/// Level 2: IEEE-754 semantics are preserved, not turned into errors
#[test]
fn test_ieee_semantics() {
    assert_eq!(interp("1/0").unwrap(), Real::INFINITY);
    assert_eq!(interp("-1/0").unwrap(), Real::NEG_INFINITY);
    assert!(interp("0/0").unwrap().is_nan());
    assert!(interp("5 % 0").unwrap().is_nan());
    assert!(interp("sqrt(-1)").unwrap().is_nan());
    assert_eq!(interp("2^1024").unwrap(), Real::INFINITY);
}

/// Level 3: Power and precedence rules
#[test]
fn test_power_associativity() {
    assert_eq!(interp("2^3^2").unwrap(), 512.0);
    assert_eq!(interp("2^2^3").unwrap(), 256.0);
    assert_eq!(interp("(2^2)^3").unwrap(), 64.0);
    assert_eq!(interp("2*3^2").unwrap(), 18.0);
    assert_eq!(interp("100/10/2").unwrap(), 5.0);
    assert_eq!(interp("10-4-3").unwrap(), 3.0);
}

/// Level 4: Built-in functions
#[test]
fn test_builtin_functions() {
    assert_eq!(interp("sin(0)").unwrap(), 0.0);
    assert_eq!(interp("cos(0)").unwrap(), 1.0);
    assert_approx_eq!(interp("log(exp(1))").unwrap(), 1.0, 1e-12);
    assert_eq!(interp("abs(-2.5)").unwrap(), 2.5);
    assert_eq!(interp("sin(0)+cos(0)").unwrap(), 1.0);
    assert_approx_eq!(interp("atan(1)*4").unwrap(), constants::PI);
    assert_approx_eq!(interp("cbrt(27) + sqrt(16)").unwrap(), 7.0);
    assert_eq!(interp("floor(2.7) + ceil(2.2)").unwrap(), 5.0);
    assert_approx_eq!(interp("cosh(0) + sinh(0) + tanh(0)").unwrap(), 1.0);
    assert_approx_eq!(interp("expm1(0) + exp(0)").unwrap(), 1.0);
    assert_approx_eq!(interp("asin(1) + acos(1)").unwrap(), constants::PI / 2.0);
    assert_approx_eq!(interp("tan(0)").unwrap(), 0.0);
    assert_approx_eq!(interp("sin(cos(0.5))").unwrap(), libm::sin(libm::cos(0.5)));
}

/// Level 5: Variables bound at evaluation time
#[test]
fn test_variables() {
    assert_eq!(interp_with("x^2+2*x+1", &[("x", 3.0)]).unwrap(), 16.0);

    let program = ExpressionBuilder::new("x^2+2*x+1")
        .with_variable("x", 0.0)
        .build()
        .unwrap();
    for (x, expected) in [(0.0, 1.0), (1.0, 4.0), (-1.0, 0.0), (3.0, 16.0)] {
        assert_eq!(program.evaluate_with([("x", x)]).unwrap(), expected);
    }
    assert_eq!(program.evaluate().unwrap(), 1.0);
}

/// Level 6: The header declaration form
#[test]
fn test_header_form() {
    let program = ExpressionBuilder::new("f(x,y)=x*y+1").build().unwrap();
    assert_eq!(program.evaluate_with([("x", 2.0), ("y", 3.0)]).unwrap(), 7.0);
    assert!(
        !program.to_string().split(' ').any(|t| t == "f"),
        "header name leaked into {}",
        program
    );

    let program = ExpressionBuilder::new("f(a,b)=a*a+b*b").build().unwrap();
    assert_eq!(program.evaluate_with([("a", 3.0), ("b", 4.0)]).unwrap(), 25.0);
    assert_eq!(program.evaluate_positional(&[3.0, 4.0]).unwrap(), 25.0);
    assert_eq!(program.expression(), "a*a+b*b");
}

/// Level 7: Custom functions with several arguments
#[test]
fn test_custom_functions() {
    let clamp = Function::new("clamp", 3, |a| a[0].max(a[1]).min(a[2])).unwrap();
    let avg = Function::new("avg", 2, |a| (a[0] + a[1]) / 2.0).unwrap();
    let program = ExpressionBuilder::new("clamp(avg(x, 10), 0, 8) - avg(1, 2)")
        .with_functions([clamp, avg])
        .with_variable_names(&["x"])
        .build()
        .unwrap();
    assert_eq!(program.evaluate_with([("x", 0.0)]).unwrap(), 3.5);
    assert_eq!(program.evaluate_with([("x", 20.0)]).unwrap(), 6.5);
    assert_eq!(program.to_string(), "x 10 avg 0 8 clamp 1 2 avg -");
}

/// Level 8: The compile entry point with explicit tables
#[test]
fn test_compile_entry_point() {
    let mut variables = VariableMap::new();
    bind_variable(&mut variables, "t", Some(0.5)).unwrap();
    let mut functions = FunctionTable::new();
    functions
        .insert(Function::unary("half", |x| x / 2.0).unwrap())
        .unwrap();
    let program = compile("half(t) * 4", &variables, &functions, &OperatorTable::default()).unwrap();
    assert_eq!(program.evaluate().unwrap(), 1.0);
    assert_eq!(program.max_depth(), 2);
}

/// Level 9: Re-evaluation is deterministic
#[test]
fn test_repeated_evaluation_is_stable() {
    let program = ExpressionBuilder::new("sin(x)^2 + cos(x)^2 + x % 0.7")
        .with_variable("x", 1.234)
        .build()
        .unwrap();
    let first = program.evaluate().unwrap();
    for _ in 0..100 {
        assert_eq!(program.evaluate().unwrap().to_bits(), first.to_bits());
    }
}
