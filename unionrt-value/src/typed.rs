use std::fmt;
use std::marker::PhantomData;

use crate::kind::HasUnionKind;
use crate::union::Union;

/// Bundles a union with the type it carries.
///
/// Converting from a plain `Union` checks the tag and that a payload is present, so holders of a `TypedUnion<T>`
/// can read it as a `T` without further validation. Wrappers convert to and from this type freely.
#[repr(transparent)]
pub struct TypedUnion<T> {
    union: Union,
    _phantom: PhantomData<fn() -> T>,
}

impl<T: HasUnionKind> TypedUnion<T> {
    /// Returns whether `union` is tagged with `T` and holds a payload.
    #[inline(always)]
    pub fn is_valid(union: &Union) -> bool {
        union.is::<T>() && union.has_payload()
    }

    /// Wraps a union that's already known to hold a `T`.
    /// # Safety
    /// `union` must pass `is_valid`. Typed reads still check the tag, but holders of a `TypedUnion<T>` are allowed
    /// to treat a failed read as unreachable.
    #[inline(always)]
    pub unsafe fn from_validated(union: Union) -> Self {
        debug_assert!(Self::is_valid(&union), "{:?} does not hold a {}", union, std::any::type_name::<T>());
        Self {
            union,
            _phantom: PhantomData,
        }
    }
}

impl<T: HasUnionKind> TryFrom<Union> for TypedUnion<T> {
    /// The union is handed back untouched.
    type Error = Union;

    fn try_from(union: Union) -> Result<Self, Self::Error> {
        if Self::is_valid(&union) {
            // SAFETY: just checked.
            Ok(unsafe { Self::from_validated(union) })
        } else {
            Err(union)
        }
    }
}

impl<T> TypedUnion<T> {
    #[inline(always)]
    pub fn as_union(&self) -> &Union {
        &self.union
    }

    pub fn into_union(self) -> Union {
        self.union
    }
}

impl<T> From<TypedUnion<T>> for Union {
    fn from(typed: TypedUnion<T>) -> Self {
        typed.union
    }
}

impl<T> Clone for TypedUnion<T> {
    fn clone(&self) -> Self {
        Self {
            union: self.union.clone(),
            _phantom: PhantomData,
        }
    }
}

impl<T> fmt::Debug for TypedUnion<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TypedUnion").field(&self.union).finish()
    }
}
