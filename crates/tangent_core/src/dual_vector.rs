use crate::error::{ensure_dimension, Result};
use crate::multidual::MultiDual;
use crate::traits::{evaluate, VectorFunction};
use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

/// A point in R^n carrying an n x m tangent matrix Σ (one column per seed direction).
///
/// Pushing it through a differentiable `f` yields `(f(value), J(value) · Σ)`.
/// The product is formed by propagating each tangent row through `f` as a
/// `MultiDual`, so `J` itself is never materialized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DualVector {
    pub value: DVector<f64>,
    pub tangent: DMatrix<f64>,
}

impl DualVector {
    pub fn seed(value: DVector<f64>, tangent: DMatrix<f64>) -> Result<Self> {
        ensure_dimension(value.len(), tangent.nrows())?;
        Ok(Self { value, tangent })
    }

    /// Zero tangent with `directions` columns.
    pub fn constant(value: DVector<f64>, directions: usize) -> Self {
        let tangent = DMatrix::zeros(value.len(), directions);
        Self { value, tangent }
    }

    /// Σ = I, so a push-forward yields the full Jacobian.
    pub fn identity(value: DVector<f64>) -> Self {
        let n = value.len();
        Self {
            value,
            tangent: DMatrix::identity(n, n),
        }
    }

    pub fn dimension(&self) -> usize {
        self.value.len()
    }

    pub fn directions(&self) -> usize {
        self.tangent.ncols()
    }

    /// Row `i` becomes the partials of coordinate `i`.
    pub fn components(&self) -> Vec<MultiDual> {
        self.value
            .iter()
            .enumerate()
            .map(|(i, &x)| MultiDual::new(x, self.tangent.row(i).transpose()))
            .collect()
    }

    /// Reassembles coordinates that all carry `directions` partials.
    pub fn from_components(components: &[MultiDual], directions: usize) -> Result<Self> {
        let mut value = DVector::zeros(components.len());
        let mut tangent = DMatrix::zeros(components.len(), directions);
        for (i, c) in components.iter().enumerate() {
            ensure_dimension(directions, c.width())?;
            value[i] = c.value;
            tangent.set_row(i, &c.partials.transpose());
        }
        Ok(Self { value, tangent })
    }

    pub fn push_forward<F: VectorFunction>(&self, f: &F) -> Result<Self> {
        let out = evaluate(f, &self.components())?;
        Self::from_components(&out, self.directions())
    }
}
