//!
//! Typed access to tagged unions: wrappers that validate once, converters that mediate every conversion for a
//! type, and the registry that maps type ids to those converters.
//!

/// The standard converters for primitives and strings.
pub mod builtins;
/// Converters between unions and values of a single type.
pub mod converter;
/// Registration outcomes and their (optional) logging.
pub mod diagnostics;
/// Errors of strict union access.
pub mod error;
/// The process-wide registry.
pub mod global;
mod macros;
/// The registry mapping type ids to converters.
pub mod registry;
/// Typed wrappers over unions.
pub mod wrapper;

/// Re-export of the storage layer.
pub use unionrt_value as value;

pub use converter::{Converter, ManagedConverter, UnmanagedConverter};
pub use diagnostics::{RegistrationOutcome, RegistrationRecord, RegistrationReport};
pub use error::{UnionError, UnionResult};
pub use registry::{AnyConverter, ConverterRegistry, Registration, RegistrationTable};
pub use value::{HasUnionKind, TypedUnion, Union, UnionTypeId, UnionTypeKind, UnionValue};
pub use wrapper::{Managed, Unmanaged};
