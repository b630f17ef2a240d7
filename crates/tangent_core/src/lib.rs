pub mod dual;
pub mod dual_vector;
pub mod error;
pub mod jacobian;
pub mod multidual;
pub mod primitives;
pub mod settings;
pub mod taylor;
/// The `tangent_core` crate implements forward-mode automatic differentiation
/// with dual numbers.
///
/// Key components:
/// - **Traits**: `DualNumber` (common number interface for `f64`, `Dual`, `MultiDual`, `Taylor`),
///   `VectorFunction` / `ScalarFunction` (differentiable maps written once, generic over the number type).
/// - **Primitives**: a registry of `(forward, derivative)` rules for elementary functions.
/// - **Dual types**: `Dual` (one direction), `MultiDual` (m directions), `DualVector`
///   (point in R^n with an n x m tangent matrix), `Taylor` (truncated degree-k series).
/// - **Jacobian**: derivative, jvp, gradient, Jacobian (column-by-column or simultaneous) and Hessian assembly.
pub mod traits;

pub use dual::Dual;
pub use dual_vector::DualVector;
pub use error::{DualError, Result};
pub use jacobian::{
    derivative, gradient, hessian, jacobian, jacobian_strategies_agree, jvp, second_derivative,
    taylor_coefficients, JacobianResult,
};
pub use multidual::MultiDual;
pub use primitives::{Domain, Primitive, PrimitiveRule};
pub use settings::{JacobianStrategy, Tolerance};
pub use taylor::Taylor;
pub use traits::{DualNumber, ScalarFunction, VectorFunction};
