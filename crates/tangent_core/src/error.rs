use thiserror::Error;

/// Failures raised by dual-number arithmetic and derivative assembly.
///
/// Every variant marks a caller contract violation detected at the offending
/// operation. None of them are retryable.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum DualError {
    /// Division (or a reciprocal / negative integer power) with a zero denominator.
    #[error("division by zero")]
    DivisionByZero,

    /// A primitive was evaluated outside its real-valued domain.
    #[error("{function} is not defined for {value}")]
    DomainError { function: &'static str, value: f64 },

    /// Partial widths, Taylor degrees, seed directions or point lengths disagree.
    #[error("dimension mismatch: expected {expected}, found {found}")]
    DimensionMismatch { expected: usize, found: usize },
}

pub type Result<T> = std::result::Result<T, DualError>;

/// Returns `DimensionMismatch` unless `found == expected`.
pub(crate) fn ensure_dimension(expected: usize, found: usize) -> Result<()> {
    if expected != found {
        return Err(DualError::DimensionMismatch { expected, found });
    }
    Ok(())
}
