use std::f64::consts::PI;

use tangent_core::{
    derivative, hessian, jacobian, jacobian_strategies_agree, second_derivative, Dual,
    DualError, DualNumber, DualVector, JacobianStrategy, MultiDual, Primitive, ScalarFunction,
    Taylor, Tolerance, VectorFunction,
};

/// f(x, y) = (x^2 sin y, x y)
struct Warp;

impl VectorFunction for Warp {
    fn input_dim(&self) -> usize {
        2
    }

    fn output_dim(&self) -> usize {
        2
    }

    fn apply<T: DualNumber>(&self, x: &[T]) -> tangent_core::Result<Vec<T>> {
        let (a, b) = (&x[0], &x[1]);
        Ok(vec![a.powi(2)?.try_mul(&b.sin()?)?, a.try_mul(b)?])
    }
}

/// Rosenbrock: (1 - x)^2 + 100 (y - x^2)^2
struct Rosenbrock;

impl ScalarFunction for Rosenbrock {
    fn input_dim(&self) -> usize {
        2
    }

    fn apply<T: DualNumber>(&self, x: &[T]) -> tangent_core::Result<T> {
        let a = x[0].negate().add_scalar(1.0).powi(2)?;
        let b = x[1].try_sub(&x[0].powi(2)?)?.powi(2)?.mul_scalar(100.0);
        a.try_add(&b)
    }
}

fn assert_err_contains<T: std::fmt::Debug>(result: tangent_core::Result<T>, needle: &str) {
    let err = result.expect_err("expected error");
    let message = format!("{err}");
    assert!(
        message.contains(needle),
        "expected error to contain \"{needle}\", got \"{message}\""
    );
}

#[test]
fn square_at_three() -> anyhow::Result<()> {
    let y = derivative(|x| Ok(x * x), 3.0)?;
    assert_eq!(y, Dual::new(9.0, 6.0));
    Ok(())
}

#[test]
fn reciprocal_at_two() -> anyhow::Result<()> {
    let y = derivative(|x| x.recip(), 2.0)?;
    assert_eq!(y, Dual::new(0.5, -0.25));
    Ok(())
}

#[test]
fn chain_rule_through_composition() -> anyhow::Result<()> {
    let y = derivative(|x| (x * x).sin(), (PI / 2.0).sqrt())?;
    assert!((y.val - 1.0).abs() < 1e-12);
    assert!(y.eps.abs() < 1e-9);
    Ok(())
}

#[test]
fn derivative_is_linear() -> anyhow::Result<()> {
    let f = |x: Dual| -> tangent_core::Result<Dual> { Ok(x.exp()? * x) };
    let g = |x: Dual| x.ln();
    let c = 3.25;
    let x0 = 1.7;

    let scaled = derivative(|x| Ok(f(x)?.mul_scalar(c)), x0)?;
    let sum = derivative(|x| Ok(f(x)? + g(x)?), x0)?;
    let (df, dg) = (derivative(f, x0)?.eps, derivative(g, x0)?.eps);

    let tol = Tolerance::default();
    assert!(tol.close(scaled.eps, c * df));
    assert!(tol.close(sum.eps, df + dg));
    Ok(())
}

#[test]
fn jacobian_strategies_are_equivalent() -> anyhow::Result<()> {
    let x = [1.3, -0.7];
    let by_columns = jacobian(&Warp, &x, JacobianStrategy::ColumnByColumn)?;
    let simultaneous = jacobian(&Warp, &x, JacobianStrategy::Simultaneous)?;

    let tol = Tolerance::default();
    for (a, b) in by_columns.jacobian.iter().zip(&simultaneous.jacobian) {
        assert!(tol.close(*a, *b), "{a} vs {b}");
    }
    assert!(jacobian_strategies_agree(&Warp, &x, tol)?);
    Ok(())
}

#[test]
fn push_forward_agrees_with_explicit_jacobian() -> anyhow::Result<()> {
    let x = nalgebra::DVector::from_vec(vec![0.9, 2.1]);
    let sigma = nalgebra::DMatrix::from_row_slice(2, 2, &[0.5, 1.0, -2.0, 0.0]);
    let pushed = DualVector::seed(x.clone(), sigma.clone())?.push_forward(&Warp)?;
    let j = jacobian(&Warp, x.as_slice(), JacobianStrategy::ColumnByColumn)?.matrix();
    assert!((pushed.tangent - j * sigma).amax() < 1e-12);
    Ok(())
}

#[test]
fn domain_and_division_failures() {
    assert_err_contains(derivative(|x| x.sqrt(), -1.0), "sqrt");
    assert!(matches!(
        derivative(|x| x.sqrt(), -1.0),
        Err(DualError::DomainError { function: "sqrt", .. })
    ));
    assert_eq!(
        derivative(|x| Dual::constant(1.0).try_div(&(x - 2.0)), 2.0),
        Err(DualError::DivisionByZero)
    );
    assert_err_contains(
        jacobian(&Warp, &[1.0], JacobianStrategy::Simultaneous),
        "dimension mismatch",
    );
}

#[test]
fn failure_aborts_the_whole_evaluation() {
    struct LogBeyondZero;

    impl VectorFunction for LogBeyondZero {
        fn input_dim(&self) -> usize {
            1
        }

        fn output_dim(&self) -> usize {
            2
        }

        fn apply<T: DualNumber>(&self, x: &[T]) -> tangent_core::Result<Vec<T>> {
            Ok(vec![x[0].exp()?, x[0].ln()?])
        }
    }

    for strategy in [JacobianStrategy::ColumnByColumn, JacobianStrategy::Simultaneous] {
        assert!(matches!(
            jacobian(&LogBeyondZero, &[-1.0], strategy),
            Err(DualError::DomainError { function: "ln", .. })
        ));
    }
}

#[test]
fn cube_second_derivative_via_truncated_series() -> anyhow::Result<()> {
    let t = Taylor::variable(1.0, 2).powi(3)?;
    assert_eq!(t.coeffs().len(), 3);
    assert!((2.0 * t.coeffs()[2] - 6.0).abs() < 1e-12);
    assert!((second_derivative(|t| t.powi(3), 1.0)? - 6.0).abs() < 1e-12);
    Ok(())
}

#[test]
fn rosenbrock_hessian() -> anyhow::Result<()> {
    let (x, y) = (1.0, 1.0);
    let h = hessian(&Rosenbrock, &[x, y])?;
    let expected = nalgebra::DMatrix::from_row_slice(2, 2, &[802.0, -400.0, -400.0, 200.0]);
    assert!((h - expected).amax() < 1e-9);
    Ok(())
}

#[test]
fn every_registered_primitive_matches_its_rule() -> anyhow::Result<()> {
    let x0 = 0.25;
    for p in Primitive::ALL {
        let rule = p.rule();
        let d = Dual::variable(x0).apply(p)?;
        let m = MultiDual::seed(x0, &[1.0, -2.0]).apply(p)?;
        assert!(((rule.forward)(x0) - d.val).abs() < 1e-15);
        assert!(((rule.derivative)(x0) - d.eps).abs() < 1e-15);
        assert!((m.partials[1] + 2.0 * d.eps).abs() < 1e-12);
    }
    Ok(())
}

#[test]
fn evaluations_run_independently_across_threads() -> anyhow::Result<()> {
    let points: Vec<[f64; 2]> = (0..8).map(|i| [0.1 * i as f64, 1.0 + 0.2 * i as f64]).collect();
    let results = std::thread::scope(|s| {
        let handles: Vec<_> = points
            .iter()
            .map(|p| s.spawn(move || jacobian(&Warp, p, JacobianStrategy::Simultaneous)))
            .collect();
        handles
            .into_iter()
            .map(|h| h.join().expect("worker panicked"))
            .collect::<Vec<_>>()
    });

    for (p, result) in points.iter().zip(results) {
        let sequential = jacobian(&Warp, p, JacobianStrategy::ColumnByColumn)?;
        assert!(Tolerance::default().all_close(&result?.jacobian, &sequential.jacobian));
    }
    Ok(())
}
