use exp_rpn::engine::interp;
use exp_rpn::{ExpressionBuilder, Operator, Real, assert_approx_eq, constants};

#[test]
fn test_unary_minus_evaluation() {
    let test_cases = [
        // Simple unary
        ("-1", -1.0),
        ("--1", 1.0),
        ("---1", -1.0),
        ("-(-1)", 1.0),
        // Unary after binary operators
        ("1- -2", 3.0),
        ("2*-3", -6.0),
        ("2^-1", 0.5),
        ("(-3)+4", 1.0),
        // Functions with unary
        ("-sin(1)", -0.8414709848078965),
        ("sin(-1)", -0.8414709848078965),
        ("-sin(-cos(1))", 0.5143952585235492),
        // Unary minus binds tighter than power
        ("-3^2", 9.0),
        ("-2^2", 4.0),
        ("-(2^2)", -4.0),
        ("(-2)^2", 4.0),
    ];

    for &(expr, expected) in &test_cases {
        let result = interp(expr).unwrap();
        assert_approx_eq!(
            result,
            expected,
            constants::TEST_PRECISION,
            "Expression '{}' expected {}, got {}",
            expr,
            expected,
            result
        );
    }
}

#[test]
fn test_unary_in_argument_lists() {
    let program = ExpressionBuilder::new("atan2(-y, -x)")
        .with_function(exp_rpn::Function::new("atan2", 2, |a| libm::atan2(a[0], a[1])).unwrap())
        .with_variable_names(&["x", "y"])
        .build()
        .unwrap();
    let result = program.evaluate_with([("x", 1.0), ("y", 1.0)]).unwrap();
    assert_approx_eq!(result, -3.0 * constants::PI / 4.0);
}

#[test]
fn test_custom_unary_plus_chains() {
    let builder =
        ExpressionBuilder::new("").with_operator(Operator::unary('+', 5, |x| x).unwrap());

    let test_cases = [
        ("+1", 1.0),
        ("++1", 1.0),
        ("+-1", -1.0),
        ("-+1", -1.0),
        ("-+-1", 1.0),
        ("+-+1", -1.0),
        ("-+-+-1", -1.0),
        ("1 + +2", 3.0),
        ("1 - +2", -1.0),
    ];

    for &(expr, expected) in &test_cases {
        let result = builder
            .clone()
            .with_expression(expr)
            .build()
            .unwrap()
            .evaluate()
            .unwrap();
        assert_eq!(result, expected, "Expression '{}'", expr);
    }
}

#[test]
fn test_postfix_unary_operator() {
    let factorial = Operator::unary('!', 6, |x: Real| libm::tgamma(x + 1.0)).unwrap();
    let builder = ExpressionBuilder::new("").with_operator(factorial);

    let eval = |expr: &str| {
        builder
            .clone()
            .with_expression(expr)
            .build()
            .unwrap()
            .evaluate()
            .unwrap()
    };
    assert_approx_eq!(eval("3!"), 6.0, 1e-9);
    assert_approx_eq!(eval("3! + 1"), 7.0, 1e-9);
    assert_approx_eq!(eval("2 * 3!"), 12.0, 1e-9);
    assert_approx_eq!(eval("(1+2)!"), 6.0, 1e-9);

    let program = builder.with_expression("4! / 2").build().unwrap();
    assert_eq!(program.to_string(), "4 ! 2 /");
}

#[test]
fn test_unary_without_operand_fails() {
    for expr in ["-", "2*-", "-)", "(-)"] {
        assert!(
            interp(expr).unwrap_err().is_unparsable(),
            "Expression '{}' should not compile",
            expr
        );
    }
}
