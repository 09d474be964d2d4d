//! Compiles a few expressions and evaluates them, printing the postfix form.

use exp_rpn::engine::interp;
use exp_rpn::{ExpressionBuilder, Function, Operator};

fn main() -> exp_rpn::Result<()> {
    for expression in ["2 + 3 * 4", "2^3^2", "-3^2", "sin(0) + cos(0)", "1/0"] {
        println!("{:<18} = {}", expression, interp(expression)?);
    }

    let program = ExpressionBuilder::new("f(x, y) = x^2 + 2*x*y + y^2").build()?;
    println!("\n{} => {}", program.expression(), program);
    for (x, y) in [(1.0, 2.0), (0.5, -0.5), (3.0, 4.0)] {
        println!("  f({}, {}) = {}", x, y, program.evaluate_positional(&[x, y])?);
    }

    let program = ExpressionBuilder::new("lerp(a, b, t) | 0")
        .with_function(Function::new("lerp", 3, |v| v[0] + (v[1] - v[0]) * v[2])?)
        .with_operator(Operator::binary('|', 0, f64::max)?)
        .with_variables([("a", -10.0), ("b", 10.0)])
        .with_variable_names(&["t"])
        .build()?;
    println!("\n{} => {}", program.expression(), program);
    for t in [0.0, 0.25, 0.5, 0.75, 1.0] {
        println!("  t = {:<4} -> {}", t, program.evaluate_with([("t", t)])?);
    }

    match interp("foo(1) + 2") {
        Ok(value) => println!("unexpected value {}", value),
        Err(err) => println!("\nerror: {}", err),
    }
    Ok(())
}
