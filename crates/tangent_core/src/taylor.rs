use crate::error::{ensure_dimension, DualError, Result};
use crate::primitives::{integer_exponent, powf_rule, Primitive};
use crate::traits::DualNumber;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A degree-k truncated Taylor polynomial in the infinitesimal ε.
///
/// `coeffs[j]` is the coefficient of ε^j, so `coeffs[j] * j!` is the j-th
/// derivative along the seed direction. Products are truncated at degree k;
/// higher coefficients are discarded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "Vec<f64>")]
pub struct Taylor {
    coeffs: Vec<f64>,
}

impl Taylor {
    /// Builds a polynomial from its coefficients; at least the constant term is required.
    pub fn new(coeffs: Vec<f64>) -> Result<Self> {
        if coeffs.is_empty() {
            return Err(DualError::DimensionMismatch {
                expected: 1,
                found: 0,
            });
        }
        Ok(Self { coeffs })
    }

    pub fn constant(value: f64, degree: usize) -> Self {
        let mut coeffs = vec![0.0; degree + 1];
        coeffs[0] = value;
        Self { coeffs }
    }

    pub fn variable(value: f64, degree: usize) -> Self {
        Self::seed(value, 1.0, degree)
    }

    /// `value + direction·ε`, truncated at `degree`.
    pub fn seed(value: f64, direction: f64, degree: usize) -> Self {
        let mut t = Self::constant(value, degree);
        if degree >= 1 {
            t.coeffs[1] = direction;
        }
        t
    }

    pub fn degree(&self) -> usize {
        self.coeffs.len() - 1
    }

    pub fn coeffs(&self) -> &[f64] {
        &self.coeffs
    }

    pub fn coefficient(&self, j: usize) -> Option<f64> {
        self.coeffs.get(j).copied()
    }

    /// The j-th derivative along the seed direction, `coeffs[j] * j!`.
    pub fn derivative(&self, j: usize) -> Option<f64> {
        let factorial: f64 = (1..=j).map(|i| i as f64).product();
        self.coefficient(j).map(|c| c * factorial)
    }

    fn check_degree(&self, rhs: &Self) -> Result<()> {
        ensure_dimension(self.coeffs.len(), rhs.coeffs.len())
    }

    fn map_coeffs(&self, f: impl Fn(f64) -> f64) -> Self {
        Self {
            coeffs: self.coeffs.iter().map(|&c| f(c)).collect(),
        }
    }
}

impl TryFrom<Vec<f64>> for Taylor {
    type Error = DualError;

    fn try_from(coeffs: Vec<f64>) -> Result<Self> {
        Taylor::new(coeffs)
    }
}

impl From<Taylor> for Vec<f64> {
    fn from(t: Taylor) -> Self {
        t.coeffs
    }
}

impl fmt::Display for Taylor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.coeffs[0])?;
        for (j, c) in self.coeffs.iter().enumerate().skip(1) {
            if j == 1 {
                write!(f, " + {}\u{03b5}", c)?;
            } else {
                write!(f, " + {}\u{03b5}^{}", c, j)?;
            }
        }
        Ok(())
    }
}

// --- Series kernels ---
// All slices passed to a kernel have the same length k + 1.

/// Cauchy product truncated to `a.len()` terms.
fn cauchy(a: &[f64], b: &[f64]) -> Vec<f64> {
    (0..a.len())
        .map(|n| (0..=n).map(|i| a[i] * b[n - i]).sum())
        .collect()
}

/// Series quotient `a / b`; requires `b[0] != 0`.
fn quotient(a: &[f64], b: &[f64]) -> Vec<f64> {
    let mut q = vec![0.0; a.len()];
    for k in 0..a.len() {
        let s: f64 = (1..=k).map(|i| b[i] * q[k - i]).sum();
        q[k] = (a[k] - s) / b[0];
    }
    q
}

/// `Σ_{j=1..k} j a_j g_{k-j}`, the degree-k coefficient of `a' g` times k.
fn weighted(a: &[f64], g: &[f64], k: usize) -> f64 {
    (1..=k).map(|j| j as f64 * a[j] * g[k - j]).sum()
}

/// Solves `h' = g · a'` for `h` with `h_0 = h0` when `g` is fully known.
fn integrate(a: &[f64], h0: f64, g: &[f64]) -> Vec<f64> {
    let mut h = vec![0.0; a.len()];
    h[0] = h0;
    for k in 1..a.len() {
        h[k] = weighted(a, g, k) / k as f64;
    }
    h
}

fn exp_series(a: &[f64]) -> Vec<f64> {
    let mut h = vec![0.0; a.len()];
    h[0] = a[0].exp();
    for k in 1..a.len() {
        h[k] = weighted(a, &h, k) / k as f64;
    }
    h
}

fn ln_series(a: &[f64]) -> Vec<f64> {
    let mut h = vec![0.0; a.len()];
    h[0] = a[0].ln();
    for k in 1..a.len() {
        let s: f64 = (1..k).map(|j| j as f64 * h[j] * a[k - j]).sum();
        h[k] = (a[k] - s / k as f64) / a[0];
    }
    h
}

fn sqrt_series(a: &[f64]) -> Vec<f64> {
    let mut h = vec![0.0; a.len()];
    h[0] = a[0].sqrt();
    for k in 1..a.len() {
        let s: f64 = (1..k).map(|i| h[i] * h[k - i]).sum();
        h[k] = (a[k] - s) / (2.0 * h[0]);
    }
    h
}

/// Coupled recurrences for (sin, cos) when `sign = -1`, (sinh, cosh) when `sign = 1`.
fn trig_pair(a: &[f64], s0: f64, c0: f64, sign: f64) -> (Vec<f64>, Vec<f64>) {
    let mut s = vec![0.0; a.len()];
    let mut c = vec![0.0; a.len()];
    s[0] = s0;
    c[0] = c0;
    for k in 1..a.len() {
        s[k] = weighted(a, &c, k) / k as f64;
        c[k] = sign * weighted(a, &s, k) / k as f64;
    }
    (s, c)
}

/// tan (`sign = 1`, g = 1 + h²) or tanh (`sign = -1`, g = 1 - h²).
fn tangent_series(a: &[f64], h0: f64, sign: f64) -> Vec<f64> {
    let n = a.len();
    let mut h = vec![0.0; n];
    let mut g = vec![0.0; n];
    h[0] = h0;
    g[0] = 1.0 + sign * h0 * h0;
    for k in 1..n {
        h[k] = weighted(a, &g, k) / k as f64;
        let sq: f64 = (0..=k).map(|i| h[i] * h[k - i]).sum();
        g[k] = sign * sq;
    }
    h
}

fn unit(len: usize) -> Vec<f64> {
    let mut one = vec![0.0; len];
    one[0] = 1.0;
    one
}

/// 1 / sqrt(1 - a²), the derivative series shared by asin and acos.
fn inverse_sine_slope(a: &[f64]) -> Vec<f64> {
    let mut u: Vec<f64> = cauchy(a, a).into_iter().map(|v| -v).collect();
    u[0] += 1.0;
    quotient(&unit(a.len()), &sqrt_series(&u))
}

impl DualNumber for Taylor {
    fn value(&self) -> f64 {
        self.coeffs[0]
    }

    fn constant_like(&self, c: f64) -> Self {
        Self::constant(c, self.degree())
    }

    fn try_add(&self, rhs: &Self) -> Result<Self> {
        self.check_degree(rhs)?;
        let coeffs = self.coeffs.iter().zip(&rhs.coeffs).map(|(a, b)| a + b);
        Ok(Self {
            coeffs: coeffs.collect(),
        })
    }

    fn try_sub(&self, rhs: &Self) -> Result<Self> {
        self.check_degree(rhs)?;
        let coeffs = self.coeffs.iter().zip(&rhs.coeffs).map(|(a, b)| a - b);
        Ok(Self {
            coeffs: coeffs.collect(),
        })
    }

    fn try_mul(&self, rhs: &Self) -> Result<Self> {
        self.check_degree(rhs)?;
        Ok(Self {
            coeffs: cauchy(&self.coeffs, &rhs.coeffs),
        })
    }

    fn try_div(&self, rhs: &Self) -> Result<Self> {
        self.check_degree(rhs)?;
        if rhs.coeffs[0] == 0.0 {
            return Err(DualError::DivisionByZero);
        }
        Ok(Self {
            coeffs: quotient(&self.coeffs, &rhs.coeffs),
        })
    }

    fn negate(&self) -> Self {
        self.map_coeffs(|c| -c)
    }

    fn add_scalar(&self, c: f64) -> Self {
        let mut t = self.clone();
        t.coeffs[0] += c;
        t
    }

    fn mul_scalar(&self, c: f64) -> Self {
        self.map_coeffs(|v| v * c)
    }

    fn apply(&self, primitive: Primitive) -> Result<Self> {
        let a = &self.coeffs;
        let a0 = a[0];
        primitive.check_domain(a0)?;
        let coeffs = match primitive {
            Primitive::Sin => trig_pair(a, a0.sin(), a0.cos(), -1.0).0,
            Primitive::Cos => trig_pair(a, a0.sin(), a0.cos(), -1.0).1,
            Primitive::Tan => tangent_series(a, a0.tan(), 1.0),
            Primitive::Exp => exp_series(a),
            Primitive::Ln => ln_series(a),
            Primitive::Sqrt => sqrt_series(a),
            Primitive::Sinh => trig_pair(a, a0.sinh(), a0.cosh(), 1.0).0,
            Primitive::Cosh => trig_pair(a, a0.sinh(), a0.cosh(), 1.0).1,
            Primitive::Tanh => tangent_series(a, a0.tanh(), -1.0),
            Primitive::Asin => integrate(a, a0.asin(), &inverse_sine_slope(a)),
            Primitive::Acos => {
                let slope: Vec<f64> = inverse_sine_slope(a).into_iter().map(|v| -v).collect();
                integrate(a, a0.acos(), &slope)
            }
            Primitive::Atan => {
                let mut u = cauchy(a, a);
                u[0] += 1.0;
                integrate(a, a0.atan(), &quotient(&unit(a.len()), &u))
            }
        };
        Ok(Self { coeffs })
    }

    fn powi(&self, n: i32) -> Result<Self> {
        if n == 0 {
            return Ok(self.constant_like(1.0));
        }
        let mut base = if n < 0 { self.recip()? } else { self.clone() };
        let mut exp = n.unsigned_abs();
        let mut acc = unit(self.coeffs.len());
        while exp > 0 {
            if exp & 1 == 1 {
                acc = cauchy(&acc, &base.coeffs);
            }
            exp >>= 1;
            if exp > 0 {
                base.coeffs = cauchy(&base.coeffs, &base.coeffs);
            }
        }
        Ok(Self { coeffs: acc })
    }

    /// Integer exponents go through `powi`; otherwise the base must be positive
    /// since `x^r` has no real series expansion at `x <= 0`.
    fn powf(&self, r: f64) -> Result<Self> {
        let a0 = self.coeffs[0];
        powf_rule(a0, r)?;
        if let Some(n) = integer_exponent(r) {
            return self.powi(n);
        }
        if a0 <= 0.0 {
            return Err(DualError::DomainError {
                function: "powf",
                value: a0,
            });
        }
        self.ln()?.mul_scalar(r).exp()
    }
}
