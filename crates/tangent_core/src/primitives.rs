use crate::error::{DualError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identity of every elementary function with a registered derivative rule.
///
/// The discriminant indexes into the static registry, so the order here must
/// match `REGISTRY`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Primitive {
    Sin,
    Cos,
    Tan,
    Exp,
    Ln,
    Sqrt,
    Sinh,
    Cosh,
    Tanh,
    Asin,
    Acos,
    Atan,
}

/// Real-valued domain on which a primitive and its derivative are finite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Domain {
    /// Every finite real.
    All,
    /// Finite `x > 0`.
    Positive,
    /// `-1 < x < 1`.
    OpenUnitInterval,
}

impl Domain {
    pub fn contains(self, x: f64) -> bool {
        match self {
            Domain::All => x.is_finite(),
            Domain::Positive => x > 0.0 && x.is_finite(),
            Domain::OpenUnitInterval => x > -1.0 && x < 1.0,
        }
    }
}

/// A `(forward, derivative)` function-pointer pair plus the domain it is valid on.
#[derive(Debug, Clone, Copy)]
pub struct PrimitiveRule {
    pub name: &'static str,
    pub forward: fn(f64) -> f64,
    pub derivative: fn(f64) -> f64,
    pub domain: Domain,
}

fn d_sin(x: f64) -> f64 {
    x.cos()
}

fn d_cos(x: f64) -> f64 {
    -x.sin()
}

fn d_tan(x: f64) -> f64 {
    let t = x.tan();
    1.0 + t * t
}

fn d_ln(x: f64) -> f64 {
    1.0 / x
}

fn d_sqrt(x: f64) -> f64 {
    1.0 / (2.0 * x.sqrt())
}

fn d_tanh(x: f64) -> f64 {
    let t = x.tanh();
    1.0 - t * t
}

fn d_asin(x: f64) -> f64 {
    1.0 / (1.0 - x * x).sqrt()
}

fn d_acos(x: f64) -> f64 {
    -1.0 / (1.0 - x * x).sqrt()
}

fn d_atan(x: f64) -> f64 {
    1.0 / (1.0 + x * x)
}

// Powers take a parameter and live outside the table, in `powi_rule` and `powf_rule`.
static REGISTRY: [PrimitiveRule; 12] = [
    PrimitiveRule {
        name: "sin",
        forward: f64::sin,
        derivative: d_sin,
        domain: Domain::All,
    },
    PrimitiveRule {
        name: "cos",
        forward: f64::cos,
        derivative: d_cos,
        domain: Domain::All,
    },
    PrimitiveRule {
        name: "tan",
        forward: f64::tan,
        derivative: d_tan,
        domain: Domain::All,
    },
    PrimitiveRule {
        name: "exp",
        forward: f64::exp,
        derivative: f64::exp,
        domain: Domain::All,
    },
    PrimitiveRule {
        name: "ln",
        forward: f64::ln,
        derivative: d_ln,
        domain: Domain::Positive,
    },
    PrimitiveRule {
        name: "sqrt",
        forward: f64::sqrt,
        derivative: d_sqrt,
        domain: Domain::Positive,
    },
    PrimitiveRule {
        name: "sinh",
        forward: f64::sinh,
        derivative: f64::cosh,
        domain: Domain::All,
    },
    PrimitiveRule {
        name: "cosh",
        forward: f64::cosh,
        derivative: f64::sinh,
        domain: Domain::All,
    },
    PrimitiveRule {
        name: "tanh",
        forward: f64::tanh,
        derivative: d_tanh,
        domain: Domain::All,
    },
    PrimitiveRule {
        name: "asin",
        forward: f64::asin,
        derivative: d_asin,
        domain: Domain::OpenUnitInterval,
    },
    PrimitiveRule {
        name: "acos",
        forward: f64::acos,
        derivative: d_acos,
        domain: Domain::OpenUnitInterval,
    },
    PrimitiveRule {
        name: "atan",
        forward: f64::atan,
        derivative: d_atan,
        domain: Domain::All,
    },
];

impl Primitive {
    /// Every registered primitive, in registry order.
    pub const ALL: [Primitive; 12] = [
        Primitive::Sin,
        Primitive::Cos,
        Primitive::Tan,
        Primitive::Exp,
        Primitive::Ln,
        Primitive::Sqrt,
        Primitive::Sinh,
        Primitive::Cosh,
        Primitive::Tanh,
        Primitive::Asin,
        Primitive::Acos,
        Primitive::Atan,
    ];

    pub fn rule(self) -> &'static PrimitiveRule {
        &REGISTRY[self as usize]
    }

    pub fn name(self) -> &'static str {
        self.rule().name
    }

    /// Resolves a registered primitive by its function name.
    pub fn lookup(name: &str) -> Option<Primitive> {
        Self::ALL.into_iter().find(|p| p.name() == name)
    }

    pub fn check_domain(self, x: f64) -> Result<()> {
        let rule = self.rule();
        if rule.domain.contains(x) {
            Ok(())
        } else {
            Err(DualError::DomainError {
                function: rule.name,
                value: x,
            })
        }
    }

    /// Returns `(h(x), h'(x))`, or a `DomainError` outside the primitive's domain.
    pub fn evaluate(self, x: f64) -> Result<(f64, f64)> {
        self.check_domain(x)?;
        let rule = self.rule();
        Ok(((rule.forward)(x), (rule.derivative)(x)))
    }
}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Primitive {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Primitive::lookup(s).ok_or_else(|| format!("Unknown primitive: {}", s))
    }
}

/// `(x^n, n x^(n-1))` for an integer exponent.
pub(crate) fn powi_rule(x: f64, n: i32) -> Result<(f64, f64)> {
    if !x.is_finite() {
        return Err(DualError::DomainError {
            function: "powi",
            value: x,
        });
    }
    if n < 0 && x == 0.0 {
        return Err(DualError::DivisionByZero);
    }
    if n == 0 {
        return Ok((1.0, 0.0));
    }
    let value = x.powi(n);
    // x^(n-1) overflows the exponent at i32::MIN; x != 0 there.
    let lowered = n.checked_sub(1).map_or(value / x, |m| x.powi(m));
    Ok((value, f64::from(n) * lowered))
}

/// `(x^r, r x^(r-1))` for a real exponent, restricted to where both are real and finite.
pub(crate) fn powf_rule(x: f64, r: f64) -> Result<(f64, f64)> {
    if !r.is_finite() || !x.is_finite() {
        return Err(DualError::DomainError {
            function: "powf",
            value: if r.is_finite() { x } else { r },
        });
    }
    if r == 0.0 {
        return Ok((1.0, 0.0));
    }
    if let Some(n) = integer_exponent(r) {
        return powi_rule(x, n);
    }
    if x < 0.0 || (x == 0.0 && r < 1.0) {
        return Err(DualError::DomainError {
            function: "powf",
            value: x,
        });
    }
    Ok((x.powf(r), r * x.powf(r - 1.0)))
}

/// `Some(n)` when `r` is an integer representable as `i32`.
pub(crate) fn integer_exponent(r: f64) -> Option<i32> {
    if r.fract() == 0.0 && r >= f64::from(i32::MIN) && r <= f64::from(i32::MAX) {
        Some(r as i32)
    } else {
        None
    }
}
