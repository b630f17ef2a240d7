use crate::dual::Dual;
use crate::error::{ensure_dimension, Result};
use crate::multidual::MultiDual;
use crate::settings::{JacobianStrategy, Tolerance};
use crate::taylor::Taylor;
use crate::traits::{evaluate, AsVector, ScalarFunction, VectorFunction};
use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};

/// Value and Jacobian of `f: R^n -> R^m` at a point.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JacobianResult {
    /// `f(x)`, length m.
    pub value: Vec<f64>,
    /// Row-major m x n Jacobian.
    pub jacobian: Vec<f64>,
    pub rows: usize,
    pub cols: usize,
}

impl JacobianResult {
    pub fn entry(&self, row: usize, col: usize) -> f64 {
        self.jacobian[row * self.cols + col]
    }

    pub fn matrix(&self) -> DMatrix<f64> {
        DMatrix::from_row_slice(self.rows, self.cols, &self.jacobian)
    }
}

/// `f(x)` and `f'(x)` for a scalar function written against `Dual`.
pub fn derivative<F>(f: F, x: f64) -> Result<Dual>
where
    F: Fn(Dual) -> Result<Dual>,
{
    f(Dual::variable(x))
}

/// Jacobian-vector product: `(f(x), J(x) v)` from a single `Dual` pass.
pub fn jvp<F: VectorFunction>(
    f: &F,
    x: &[f64],
    direction: &[f64],
) -> Result<(Vec<f64>, Vec<f64>)> {
    ensure_dimension(x.len(), direction.len())?;
    let inputs: Vec<Dual> = x
        .iter()
        .zip(direction)
        .map(|(&xi, &vi)| Dual::seed(xi, vi))
        .collect();
    let out = evaluate(f, &inputs)?;
    Ok((
        out.iter().map(|d| d.val).collect(),
        out.iter().map(|d| d.eps).collect(),
    ))
}

pub fn jacobian<F: VectorFunction>(
    f: &F,
    x: &[f64],
    strategy: JacobianStrategy,
) -> Result<JacobianResult> {
    match strategy {
        JacobianStrategy::ColumnByColumn => jacobian_by_columns(f, x),
        JacobianStrategy::Simultaneous => jacobian_simultaneous(f, x),
    }
}

fn jacobian_by_columns<F: VectorFunction>(f: &F, x: &[f64]) -> Result<JacobianResult> {
    // The plain f64 pass gives f(x) even when n = 0.
    let value = evaluate(f, x)?;
    let rows = value.len();
    let cols = x.len();

    let mut jacobian = vec![0.0; rows * cols];
    let mut dual_x = vec![Dual::constant(0.0); cols];

    for j in 0..cols {
        for i in 0..cols {
            dual_x[i] = Dual::new(x[i], if i == j { 1.0 } else { 0.0 });
        }
        let dual_out = evaluate(f, &dual_x)?;
        for i in 0..rows {
            jacobian[i * cols + j] = dual_out[i].eps;
        }
    }

    Ok(JacobianResult {
        value,
        jacobian,
        rows,
        cols,
    })
}

fn jacobian_simultaneous<F: VectorFunction>(f: &F, x: &[f64]) -> Result<JacobianResult> {
    let cols = x.len();
    let out = evaluate(f, &MultiDual::seed_identity(x))?;
    let rows = out.len();

    let mut jacobian = Vec::with_capacity(rows * cols);
    for component in &out {
        // A component built from a bare `MultiDual::constant` may have any width.
        ensure_dimension(cols, component.width())?;
        jacobian.extend(component.partials.iter());
    }

    Ok(JacobianResult {
        value: out.iter().map(|c| c.value).collect(),
        jacobian,
        rows,
        cols,
    })
}

/// Assembles the Jacobian with both strategies and compares them entrywise.
pub fn jacobian_strategies_agree<F: VectorFunction>(
    f: &F,
    x: &[f64],
    tolerance: Tolerance,
) -> Result<bool> {
    let by_columns = jacobian(f, x, JacobianStrategy::ColumnByColumn)?;
    let simultaneous = jacobian(f, x, JacobianStrategy::Simultaneous)?;
    Ok(tolerance.all_close(&by_columns.value, &simultaneous.value)
        && tolerance.all_close(&by_columns.jacobian, &simultaneous.jacobian))
}

/// `(f(x), ∇f(x))` from one simultaneous pass.
pub fn gradient<F: ScalarFunction>(f: &F, x: &[f64]) -> Result<(f64, Vec<f64>)> {
    let result = jacobian_simultaneous(&AsVector(f), x)?;
    Ok((result.value[0], result.jacobian))
}

/// Taylor expansion of a one-variable function at `x`, truncated at `degree`.
pub fn taylor_coefficients<F>(f: F, x: f64, degree: usize) -> Result<Taylor>
where
    F: Fn(Taylor) -> Result<Taylor>,
{
    let out = f(Taylor::variable(x, degree))?;
    ensure_dimension(degree, out.degree())?;
    Ok(out)
}

pub fn second_derivative<F>(f: F, x: f64) -> Result<f64>
where
    F: Fn(Taylor) -> Result<Taylor>,
{
    let t = taylor_coefficients(f, x, 2)?;
    Ok(2.0 * t.coeffs()[2])
}

/// Second directional derivative `v^T H v` of `f` at `x`.
fn curvature<F: ScalarFunction>(f: &F, x: &[f64], direction: &[f64]) -> Result<f64> {
    let inputs: Vec<Taylor> = x
        .iter()
        .zip(direction)
        .map(|(&xi, &vi)| Taylor::seed(xi, vi, 2))
        .collect();
    let out = evaluate(&AsVector(f), &inputs)?;
    ensure_dimension(2, out[0].degree())?;
    Ok(2.0 * out[0].coeffs()[2])
}

/// Hessian of `f: R^n -> R` from degree-2 Taylor passes.
///
/// Diagonal entries come from seeding `e_i`; off-diagonal entries from seeding
/// `e_i + e_j` and polarizing: `H_ij = (D²(e_i + e_j) - H_ii - H_jj) / 2`.
pub fn hessian<F: ScalarFunction>(f: &F, x: &[f64]) -> Result<DMatrix<f64>> {
    let n = x.len();
    ensure_dimension(f.input_dim(), n)?;
    let mut h = DMatrix::zeros(n, n);
    let mut direction = vec![0.0; n];

    for i in 0..n {
        direction[i] = 1.0;
        h[(i, i)] = curvature(f, x, &direction)?;
        direction[i] = 0.0;
    }

    for i in 0..n {
        for j in (i + 1)..n {
            direction[i] = 1.0;
            direction[j] = 1.0;
            let d2 = curvature(f, x, &direction)?;
            direction[i] = 0.0;
            direction[j] = 0.0;
            let off = 0.5 * (d2 - h[(i, i)] - h[(j, j)]);
            h[(i, j)] = off;
            h[(j, i)] = off;
        }
    }
    Ok(h)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DualError;
    use crate::traits::DualNumber;

    /// f(x, y) = (x^2 sin y, x y)
    struct Warp;

    impl VectorFunction for Warp {
        fn input_dim(&self) -> usize {
            2
        }

        fn output_dim(&self) -> usize {
            2
        }

        fn apply<T: DualNumber>(&self, x: &[T]) -> Result<Vec<T>> {
            let (a, b) = (&x[0], &x[1]);
            Ok(vec![a.powi(2)?.try_mul(&b.sin()?)?, a.try_mul(b)?])
        }
    }

    /// f(x, y) = x^2 y + exp(x y)
    struct Bowl;

    impl ScalarFunction for Bowl {
        fn input_dim(&self) -> usize {
            2
        }

        fn apply<T: DualNumber>(&self, x: &[T]) -> Result<T> {
            let xy = x[0].try_mul(&x[1])?;
            x[0].powi(2)?.try_mul(&x[1])?.try_add(&xy.exp()?)
        }
    }

    /// Ignores its input; the output constant takes the input's width.
    struct Flat;

    impl VectorFunction for Flat {
        fn input_dim(&self) -> usize {
            2
        }

        fn output_dim(&self) -> usize {
            1
        }

        fn apply<T: DualNumber>(&self, x: &[T]) -> Result<Vec<T>> {
            Ok(vec![x[0].constant_like(3.0)])
        }
    }

    fn warp_jacobian(x: f64, y: f64) -> [f64; 4] {
        [2.0 * x * y.sin(), x * x * y.cos(), y, x]
    }

    #[test]
    fn column_by_column_matches_closed_form() {
        let result = jacobian(&Warp, &[1.5, 0.4], JacobianStrategy::ColumnByColumn)
            .expect("jacobian should compute");
        let expected = warp_jacobian(1.5, 0.4);
        assert_eq!((result.rows, result.cols), (2, 2));
        for (got, want) in result.jacobian.iter().zip(expected) {
            assert!((got - want).abs() < 1e-12);
        }
        assert!((result.entry(1, 0) - 0.4).abs() < 1e-15);
    }

    #[test]
    fn strategies_agree_on_warp() {
        let x = [1.5, 0.4];
        assert!(jacobian_strategies_agree(&Warp, &x, Tolerance::default()).expect("agree"));
        let a = jacobian(&Warp, &x, JacobianStrategy::ColumnByColumn).expect("columns");
        let b = jacobian(&Warp, &x, JacobianStrategy::Simultaneous).expect("simultaneous");
        assert!((a.matrix() - b.matrix()).amax() < 1e-12);
    }

    #[test]
    fn constant_outputs_keep_full_width() {
        let result = jacobian(&Flat, &[1.0, 2.0], JacobianStrategy::Simultaneous)
            .expect("constant_like keeps width");
        assert_eq!(result.jacobian, vec![0.0, 0.0]);
        assert_eq!(result.value, vec![3.0]);
    }

    #[test]
    fn jvp_matches_jacobian_times_direction() {
        let x = [0.8, -0.3];
        let v = [2.0, -1.0];
        let (value, tangent) = jvp(&Warp, &x, &v).expect("jvp");
        let j = warp_jacobian(x[0], x[1]);
        assert!((value[1] - x[0] * x[1]).abs() < 1e-15);
        assert!((tangent[0] - (j[0] * v[0] + j[1] * v[1])).abs() < 1e-12);
        assert!((tangent[1] - (j[2] * v[0] + j[3] * v[1])).abs() < 1e-12);

        assert_eq!(
            jvp(&Warp, &x, &[1.0]),
            Err(DualError::DimensionMismatch {
                expected: 2,
                found: 1
            })
        );
    }

    #[test]
    fn wrong_point_length_is_rejected() {
        for strategy in [JacobianStrategy::ColumnByColumn, JacobianStrategy::Simultaneous] {
            let err = jacobian(&Warp, &[1.0, 2.0, 3.0], strategy).expect_err("bad point");
            assert_eq!(
                err,
                DualError::DimensionMismatch {
                    expected: 2,
                    found: 3
                }
            );
        }
    }

    #[test]
    fn derivative_of_reciprocal() {
        let d = derivative(|x| x.recip(), 2.0).expect("nonzero");
        assert_eq!(d, Dual::new(0.5, -0.25));
        assert_eq!(
            derivative(|x| Dual::constant(1.0).try_div(&x), 0.0),
            Err(DualError::DivisionByZero)
        );
    }

    #[test]
    fn gradient_and_hessian_of_bowl() {
        let (x, y): (f64, f64) = (0.5, -1.5);
        let (value, grad) = gradient(&Bowl, &[x, y]).expect("gradient");
        let e = (x * y).exp();
        assert!((value - (x * x * y + e)).abs() < 1e-12);
        assert!((grad[0] - (2.0 * x * y + y * e)).abs() < 1e-12);
        assert!((grad[1] - (x * x + x * e)).abs() < 1e-12);

        let h = hessian(&Bowl, &[x, y]).expect("hessian");
        let expected = DMatrix::from_row_slice(
            2,
            2,
            &[
                2.0 * y + y * y * e,
                2.0 * x + e + x * y * e,
                2.0 * x + e + x * y * e,
                x * x * e,
            ],
        );
        assert!((h - expected).amax() < 1e-10);
    }

    #[test]
    fn second_derivative_of_cube() {
        let d2 = second_derivative(|t| t.powi(3), 1.0).expect("cube");
        assert!((d2 - 6.0).abs() < 1e-12);

        let t = taylor_coefficients(|t| t.exp(), 0.0, 3).expect("exp");
        assert_eq!(t.derivative(3), Some(1.0));
    }
}
