//! Unified error type for the domain layer.

use thiserror::Error;

/// Unified error type for domain operations.
///
/// Normalization never produces one of these: it is total and silently
/// substitutes defaults. `DomainError` covers the explicit entity-level
/// guards (empty titles, out-of-range indices) on mutation helpers.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Validation failed (e.g., invalid field values)
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Business rule violation
    #[error("Constraint violation: {0}")]
    Constraint(String),
}

impl DomainError {
    /// Creates a validation error for rejected field values.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a constraint violation error.
    pub fn constraint(msg: impl Into<String>) -> Self {
        Self::Constraint(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error() {
        let err = DomainError::validation("title cannot be empty");
        assert!(matches!(err, DomainError::Validation(_)));
        assert_eq!(err.to_string(), "Validation failed: title cannot be empty");
    }

    #[test]
    fn test_constraint_error() {
        let err = DomainError::constraint("inventory index out of range");
        assert!(matches!(err, DomainError::Constraint(_)));
        assert_eq!(
            err.to_string(),
            "Constraint violation: inventory index out of range"
        );
    }
}
