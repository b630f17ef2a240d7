use crate::error::{ensure_dimension, DualError, Result};
use crate::primitives::{powf_rule, powi_rule, Primitive};
use std::fmt::Debug;

/// A number that carries a value together with derivative information.
///
/// Implemented by `f64` (no derivative), `Dual`, `MultiDual` and `Taylor`, so a
/// function written once against this trait can be evaluated plainly or
/// differentiated. Operations that can fail (mismatched widths, zero
/// denominators, domain violations) return `Result`.
pub trait DualNumber: Clone + Debug + Sized {
    /// The primal value.
    fn value(&self) -> f64;

    /// A constant `c` with the same width (or degree) as `self`.
    fn constant_like(&self, c: f64) -> Self;

    fn try_add(&self, rhs: &Self) -> Result<Self>;
    fn try_sub(&self, rhs: &Self) -> Result<Self>;
    fn try_mul(&self, rhs: &Self) -> Result<Self>;
    fn try_div(&self, rhs: &Self) -> Result<Self>;

    fn negate(&self) -> Self;
    fn add_scalar(&self, c: f64) -> Self;
    fn mul_scalar(&self, c: f64) -> Self;

    /// Applies a registered primitive through its derivative rule.
    fn apply(&self, primitive: Primitive) -> Result<Self>;

    fn powi(&self, n: i32) -> Result<Self>;
    fn powf(&self, r: f64) -> Result<Self>;

    fn sub_scalar(&self, c: f64) -> Self {
        self.add_scalar(-c)
    }

    fn div_scalar(&self, c: f64) -> Result<Self> {
        if c == 0.0 {
            return Err(DualError::DivisionByZero);
        }
        Ok(self.mul_scalar(1.0 / c))
    }

    fn recip(&self) -> Result<Self> {
        self.constant_like(1.0).try_div(self)
    }

    fn sin(&self) -> Result<Self> {
        self.apply(Primitive::Sin)
    }

    fn cos(&self) -> Result<Self> {
        self.apply(Primitive::Cos)
    }

    fn tan(&self) -> Result<Self> {
        self.apply(Primitive::Tan)
    }

    fn exp(&self) -> Result<Self> {
        self.apply(Primitive::Exp)
    }

    fn ln(&self) -> Result<Self> {
        self.apply(Primitive::Ln)
    }

    fn log10(&self) -> Result<Self> {
        Ok(self.ln()?.mul_scalar(std::f64::consts::LOG10_E))
    }

    fn log2(&self) -> Result<Self> {
        Ok(self.ln()?.mul_scalar(std::f64::consts::LOG2_E))
    }

    fn sqrt(&self) -> Result<Self> {
        self.apply(Primitive::Sqrt)
    }

    fn sinh(&self) -> Result<Self> {
        self.apply(Primitive::Sinh)
    }

    fn cosh(&self) -> Result<Self> {
        self.apply(Primitive::Cosh)
    }

    fn tanh(&self) -> Result<Self> {
        self.apply(Primitive::Tanh)
    }

    fn asin(&self) -> Result<Self> {
        self.apply(Primitive::Asin)
    }

    fn acos(&self) -> Result<Self> {
        self.apply(Primitive::Acos)
    }

    fn atan(&self) -> Result<Self> {
        self.apply(Primitive::Atan)
    }

    /// `self^exponent = exp(exponent * ln(self))`; requires a positive base.
    fn pow(&self, exponent: &Self) -> Result<Self> {
        exponent.try_mul(&self.ln()?)?.exp()
    }
}

/// Plain reals evaluate with the same failure semantics as the dual types.
impl DualNumber for f64 {
    fn value(&self) -> f64 {
        *self
    }

    fn constant_like(&self, c: f64) -> Self {
        c
    }

    fn try_add(&self, rhs: &Self) -> Result<Self> {
        Ok(self + rhs)
    }

    fn try_sub(&self, rhs: &Self) -> Result<Self> {
        Ok(self - rhs)
    }

    fn try_mul(&self, rhs: &Self) -> Result<Self> {
        Ok(self * rhs)
    }

    fn try_div(&self, rhs: &Self) -> Result<Self> {
        if *rhs == 0.0 {
            return Err(DualError::DivisionByZero);
        }
        Ok(self / rhs)
    }

    fn negate(&self) -> Self {
        -*self
    }

    fn add_scalar(&self, c: f64) -> Self {
        self + c
    }

    fn mul_scalar(&self, c: f64) -> Self {
        self * c
    }

    fn apply(&self, primitive: Primitive) -> Result<Self> {
        primitive.check_domain(*self)?;
        Ok((primitive.rule().forward)(*self))
    }

    fn powi(&self, n: i32) -> Result<Self> {
        powi_rule(*self, n).map(|(v, _)| v)
    }

    fn powf(&self, r: f64) -> Result<Self> {
        powf_rule(*self, r).map(|(v, _)| v)
    }
}

/// A differentiable map R^n -> R^m.
///
/// `apply` is generic over the number type so the same definition can be
/// evaluated with `f64`, seeded one direction at a time with `Dual`, or with
/// all directions at once with `MultiDual`.
pub trait VectorFunction {
    /// Returns the dimension of the input space.
    fn input_dim(&self) -> usize;

    /// Returns the dimension of the output space.
    fn output_dim(&self) -> usize;

    fn apply<T: DualNumber>(&self, x: &[T]) -> Result<Vec<T>>;
}

/// A differentiable map R^n -> R.
pub trait ScalarFunction {
    fn input_dim(&self) -> usize;

    fn apply<T: DualNumber>(&self, x: &[T]) -> Result<T>;
}

/// Views a `ScalarFunction` as a one-output `VectorFunction`.
pub(crate) struct AsVector<'a, F>(pub &'a F);

impl<F: ScalarFunction> VectorFunction for AsVector<'_, F> {
    fn input_dim(&self) -> usize {
        self.0.input_dim()
    }

    fn output_dim(&self) -> usize {
        1
    }

    fn apply<T: DualNumber>(&self, x: &[T]) -> Result<Vec<T>> {
        Ok(vec![self.0.apply(x)?])
    }
}

/// Evaluates `f` after checking the point and output dimensions.
pub(crate) fn evaluate<F, T>(f: &F, x: &[T]) -> Result<Vec<T>>
where
    F: VectorFunction,
    T: DualNumber,
{
    ensure_dimension(f.input_dim(), x.len())?;
    let out = f.apply(x)?;
    ensure_dimension(f.output_dim(), out.len())?;
    Ok(out)
}
