use crate::error::{DualError, Result};
use crate::primitives::{powf_rule, powi_rule, Primitive};
use crate::traits::DualNumber;
use num_traits::{One, Zero};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Mul, MulAssign, Neg, Sub, SubAssign};

/// Simple Dual Number for Forward Mode AD
/// val: real part
/// eps: infinitesimal part (derivative along one seed direction)
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Dual {
    pub val: f64,
    pub eps: f64,
}

impl Dual {
    pub fn new(val: f64, eps: f64) -> Self {
        Self { val, eps }
    }

    /// A value with no sensitivity to the differentiation variable.
    pub fn constant(val: f64) -> Self {
        Self::new(val, 0.0)
    }

    /// The differentiation variable itself: `eps = 1`.
    pub fn variable(val: f64) -> Self {
        Self::new(val, 1.0)
    }

    /// Seeds `val` with an arbitrary tangent `direction`.
    pub fn seed(val: f64, direction: f64) -> Self {
        Self::new(val, direction)
    }

    fn chain(self, val: f64, deriv: f64) -> Self {
        Self::new(val, deriv * self.eps)
    }
}

impl Zero for Dual {
    fn zero() -> Self {
        Self::new(0.0, 0.0)
    }
    fn is_zero(&self) -> bool {
        self.val == 0.0 && self.eps == 0.0
    }
}

impl One for Dual {
    fn one() -> Self {
        Self::new(1.0, 0.0)
    }
}

impl Add for Dual {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self::new(self.val + rhs.val, self.eps + rhs.eps)
    }
}

impl Sub for Dual {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.val - rhs.val, self.eps - rhs.eps)
    }
}

impl Mul for Dual {
    type Output = Self;
    fn mul(self, rhs: Self) -> Self {
        Self::new(self.val * rhs.val, self.val * rhs.eps + self.eps * rhs.val)
    }
}

impl Neg for Dual {
    type Output = Self;
    fn neg(self) -> Self {
        Self::new(-self.val, -self.eps)
    }
}

// Mixed operands behave as combination with `Dual::constant(c)`.

impl Add<f64> for Dual {
    type Output = Self;
    fn add(self, rhs: f64) -> Self {
        self + Dual::constant(rhs)
    }
}

impl Add<Dual> for f64 {
    type Output = Dual;
    fn add(self, rhs: Dual) -> Dual {
        Dual::constant(self) + rhs
    }
}

impl Sub<f64> for Dual {
    type Output = Self;
    fn sub(self, rhs: f64) -> Self {
        self - Dual::constant(rhs)
    }
}

impl Sub<Dual> for f64 {
    type Output = Dual;
    fn sub(self, rhs: Dual) -> Dual {
        Dual::constant(self) - rhs
    }
}

impl Mul<f64> for Dual {
    type Output = Self;
    fn mul(self, rhs: f64) -> Self {
        self * Dual::constant(rhs)
    }
}

impl Mul<Dual> for f64 {
    type Output = Dual;
    fn mul(self, rhs: Dual) -> Dual {
        Dual::constant(self) * rhs
    }
}

impl AddAssign for Dual {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}
impl SubAssign for Dual {
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}
impl MulAssign for Dual {
    fn mul_assign(&mut self, rhs: Self) {
        *self = *self * rhs;
    }
}

impl fmt::Display for Dual {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} + {}\u{03b5}", self.val, self.eps)
    }
}

impl DualNumber for Dual {
    fn value(&self) -> f64 {
        self.val
    }

    fn constant_like(&self, c: f64) -> Self {
        Dual::constant(c)
    }

    fn try_add(&self, rhs: &Self) -> Result<Self> {
        Ok(*self + *rhs)
    }

    fn try_sub(&self, rhs: &Self) -> Result<Self> {
        Ok(*self - *rhs)
    }

    fn try_mul(&self, rhs: &Self) -> Result<Self> {
        Ok(*self * *rhs)
    }

    fn try_div(&self, rhs: &Self) -> Result<Self> {
        if rhs.val == 0.0 {
            return Err(DualError::DivisionByZero);
        }
        let denom = rhs.val * rhs.val;
        Ok(Self::new(
            self.val / rhs.val,
            (self.eps * rhs.val - self.val * rhs.eps) / denom,
        ))
    }

    fn negate(&self) -> Self {
        -*self
    }

    fn add_scalar(&self, c: f64) -> Self {
        *self + c
    }

    fn mul_scalar(&self, c: f64) -> Self {
        *self * c
    }

    fn apply(&self, primitive: Primitive) -> Result<Self> {
        let (val, deriv) = primitive.evaluate(self.val)?;
        Ok(self.chain(val, deriv))
    }

    fn powi(&self, n: i32) -> Result<Self> {
        let (val, deriv) = powi_rule(self.val, n)?;
        Ok(self.chain(val, deriv))
    }

    fn powf(&self, r: f64) -> Result<Self> {
        let (val, deriv) = powf_rule(self.val, r)?;
        Ok(self.chain(val, deriv))
    }
}
