//! Error kinds shared by every layer of the engine.

/// Errors reported by the plane arithmetic, the transformation algebra,
/// coset enumeration and fundamental-domain reduction.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ModularError {
    /// Reciprocal (or division) of the zero complex value.
    #[error("Division by zero in extended complex arithmetic")]
    DivisionByZero,

    /// A matrix whose determinant is not 1.
    ///
    /// Inverses are computed as the adjugate, which is only valid for
    /// unit-determinant matrices, so these are rejected at construction.
    #[error("Transformation ({a}, {b}, {c}, {d}) has determinant {determinant}, expected 1")]
    InvalidTransformation {
        a: f64,
        b: f64,
        c: f64,
        d: f64,
        determinant: f64,
    },

    /// Fundamental-domain reduction ran out of iterations.
    ///
    /// Non-fatal: the domain membership of the point is undetermined.
    #[error("Reduction to the fundamental domain did not converge in {max_iterations} iterations")]
    NotConverged { max_iterations: usize },

    /// Coset enumeration hit its safety cap on breadth-first rounds.
    #[error("Coset enumeration exceeded {rounds} rounds")]
    RoundLimitExceeded { rounds: usize },

    /// A precondition on the inputs was violated.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl ModularError {
    /// True for the kinds that mean "no answer for this input" rather than misuse.
    #[inline]
    pub fn is_undetermined(&self) -> bool {
        matches!(self, Self::NotConverged { .. })
    }
}

pub type Result<T> = std::result::Result<T, ModularError>;

#[cfg(test)]
mod tests {
    use super::ModularError;

    #[test]
    fn messages_carry_context() {
        let err = ModularError::InvalidTransformation {
            a: 2.0,
            b: 0.0,
            c: 0.0,
            d: 1.0,
            determinant: 2.0,
        };
        assert!(format!("{err}").contains("determinant 2"));

        let err = ModularError::NotConverged { max_iterations: 7 };
        assert!(format!("{err}").contains("7 iterations"));
        assert!(err.is_undetermined());
        assert!(!ModularError::DivisionByZero.is_undetermined());
    }
}
