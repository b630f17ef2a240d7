use serde::{Deserialize, Serialize};

/// How a Jacobian is assembled from forward passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum JacobianStrategy {
    /// n single-direction `Dual` passes, one basis direction each.
    ColumnByColumn,
    /// One `MultiDual` pass carrying all n directions.
    #[default]
    Simultaneous,
}

/// Mixed absolute/relative tolerance for comparing derivatives.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tolerance {
    pub relative: f64,
    pub absolute: f64,
}

impl Default for Tolerance {
    fn default() -> Self {
        Self {
            relative: 1e-9,
            absolute: 1e-12,
        }
    }
}

impl Tolerance {
    /// `|a - b| <= absolute + relative * max(|a|, |b|)`.
    pub fn close(&self, a: f64, b: f64) -> bool {
        (a - b).abs() <= self.absolute + self.relative * a.abs().max(b.abs())
    }

    pub fn all_close(&self, a: &[f64], b: &[f64]) -> bool {
        a.len() == b.len() && a.iter().zip(b).all(|(&x, &y)| self.close(x, y))
    }
}
