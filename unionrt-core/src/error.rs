use thiserror::Error;
use unionrt_value::{HasUnionKind, Union};

/// Crate-local result type.
pub type UnionResult<T> = Result<T, UnionError>;

/// Failures of strict union access.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UnionError {
    /// A union was read as a type it isn't tagged with.
    #[error("invalid cast: union holds `{actual}`, expected `{expected}`")]
    TypeMismatch {
        /// Type the union is actually tagged with.
        actual: &'static str,
        /// Type the caller asked for.
        expected: &'static str,
    },
    /// A registry was asked for a converter it doesn't have.
    #[error("no converter registered for `{type_name}`")]
    NotRegistered {
        type_name: &'static str,
    },
}

impl UnionError {
    /// The cast error for reading `union` as a `T`.
    pub fn mismatch<T: HasUnionKind>(union: &Union) -> Self {
        Self::TypeMismatch {
            actual: union.type_id().type_name(),
            expected: std::any::type_name::<T>(),
        }
    }
}
