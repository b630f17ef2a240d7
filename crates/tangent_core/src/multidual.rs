use crate::dual::Dual;
use crate::error::{ensure_dimension, DualError, Result};
use crate::primitives::{powf_rule, powi_rule, Primitive};
use crate::traits::DualNumber;
use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A value paired with `m` partials, one per simultaneous seed direction.
///
/// Directions are independent infinitesimals (`ε_i ε_j = 0`), so every rule
/// is the single-direction rule applied lane by lane. Combining values of
/// different widths fails with `DimensionMismatch`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultiDual {
    pub value: f64,
    pub partials: DVector<f64>,
}

impl MultiDual {
    pub fn new(value: f64, partials: DVector<f64>) -> Self {
        Self { value, partials }
    }

    pub fn constant(value: f64, width: usize) -> Self {
        Self::new(value, DVector::zeros(width))
    }

    /// Seeds `value` with an arbitrary direction vector.
    pub fn seed(value: f64, direction: &[f64]) -> Self {
        Self::new(value, DVector::from_column_slice(direction))
    }

    /// Seeds `value` with the basis direction `e_index` of a `width`-wide tangent.
    pub fn variable(value: f64, index: usize, width: usize) -> Result<Self> {
        if index >= width {
            return Err(DualError::DimensionMismatch {
                expected: width,
                found: index + 1,
            });
        }
        let mut partials = DVector::zeros(width);
        partials[index] = 1.0;
        Ok(Self::new(value, partials))
    }

    /// Seeds every coordinate of `point` from the matching row of `seeds` (n x m).
    pub fn seed_point(point: &[f64], seeds: &DMatrix<f64>) -> Result<Vec<Self>> {
        ensure_dimension(point.len(), seeds.nrows())?;
        Ok(point
            .iter()
            .enumerate()
            .map(|(i, &x)| Self::new(x, seeds.row(i).transpose()))
            .collect())
    }

    /// Seeds `point` with the identity, i.e. one direction per coordinate.
    pub fn seed_identity(point: &[f64]) -> Vec<Self> {
        let n = point.len();
        point
            .iter()
            .enumerate()
            .map(|(i, &x)| {
                let mut partials = DVector::zeros(n);
                partials[i] = 1.0;
                Self::new(x, partials)
            })
            .collect()
    }

    pub fn width(&self) -> usize {
        self.partials.len()
    }

    /// The single-direction view of lane `index`.
    pub fn lane(&self, index: usize) -> Result<Dual> {
        if index >= self.width() {
            return Err(DualError::DimensionMismatch {
                expected: self.width(),
                found: index + 1,
            });
        }
        Ok(Dual::new(self.value, self.partials[index]))
    }

    fn chain(&self, value: f64, deriv: f64) -> Self {
        Self::new(value, &self.partials * deriv)
    }

    fn check_width(&self, rhs: &Self) -> Result<()> {
        ensure_dimension(self.width(), rhs.width())
    }
}

impl fmt::Display for MultiDual {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)?;
        for (i, p) in self.partials.iter().enumerate() {
            write!(f, " + {}\u{03b5}{}", p, i)?;
        }
        Ok(())
    }
}

impl DualNumber for MultiDual {
    fn value(&self) -> f64 {
        self.value
    }

    fn constant_like(&self, c: f64) -> Self {
        Self::constant(c, self.width())
    }

    fn try_add(&self, rhs: &Self) -> Result<Self> {
        self.check_width(rhs)?;
        Ok(Self::new(self.value + rhs.value, &self.partials + &rhs.partials))
    }

    fn try_sub(&self, rhs: &Self) -> Result<Self> {
        self.check_width(rhs)?;
        Ok(Self::new(self.value - rhs.value, &self.partials - &rhs.partials))
    }

    fn try_mul(&self, rhs: &Self) -> Result<Self> {
        self.check_width(rhs)?;
        Ok(Self::new(
            self.value * rhs.value,
            &rhs.partials * self.value + &self.partials * rhs.value,
        ))
    }

    fn try_div(&self, rhs: &Self) -> Result<Self> {
        self.check_width(rhs)?;
        if rhs.value == 0.0 {
            return Err(DualError::DivisionByZero);
        }
        let denom = rhs.value * rhs.value;
        Ok(Self::new(
            self.value / rhs.value,
            (&self.partials * rhs.value - &rhs.partials * self.value) / denom,
        ))
    }

    fn negate(&self) -> Self {
        Self::new(-self.value, -&self.partials)
    }

    fn add_scalar(&self, c: f64) -> Self {
        Self::new(self.value + c, self.partials.clone())
    }

    fn mul_scalar(&self, c: f64) -> Self {
        Self::new(self.value * c, &self.partials * c)
    }

    fn apply(&self, primitive: Primitive) -> Result<Self> {
        let (value, deriv) = primitive.evaluate(self.value)?;
        Ok(self.chain(value, deriv))
    }

    fn powi(&self, n: i32) -> Result<Self> {
        let (value, deriv) = powi_rule(self.value, n)?;
        Ok(self.chain(value, deriv))
    }

    fn powf(&self, r: f64) -> Result<Self> {
        let (value, deriv) = powf_rule(self.value, r)?;
        Ok(self.chain(value, deriv))
    }
}
