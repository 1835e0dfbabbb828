//!
//! Storage layer of the union runtime: what a union value *is*, independently of how it gets converted.
//!

/// The closed set of storage kinds.
pub mod kind;
/// Process-stable type identifiers, and the table to resolve them back to type names.
pub mod type_id;
/// A `Union` bundled with the static type it's known to carry.
pub mod typed;
/// The union value itself: metadata plus an inline or shared payload.
pub mod union;

pub use kind::{HasUnionKind, UnionTypeKind, UnionValue};
pub use type_id::{TypeInfo, UnionTypeId};
pub use typed::TypedUnion;
pub use union::{Fits, Payload, SharedObject, Union, UnionData, UnionMeta};
