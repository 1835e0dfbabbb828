use std::fmt;
use std::sync::Arc;

use unionrt_value::{Fits, HasUnionKind, TypedUnion, Union};

use crate::error::{UnionError, UnionResult};

/// Typed view of a union holding an inline `T`.
///
/// Validated once, on construction: reading `value` afterwards is a plain field read.
#[derive(Clone)]
pub struct Unmanaged<T> {
    union: TypedUnion<T>,
    value: T,
}

impl<T: HasUnionKind + Copy> Unmanaged<T> {
    /// Stores `value` in a fresh union. Types too large for inline storage are rejected at build time.
    pub fn new(value: T) -> Self {
        let union = Union::from_inline(value, Fits::<T>::ASSERT);
        Self {
            // SAFETY: freshly stored as a `T`.
            union: unsafe { TypedUnion::from_validated(union) },
            value,
        }
    }

    /// Validates that `union` holds a `T`.
    pub fn from_union(union: &Union) -> UnionResult<Self> {
        match union.read_inline::<T>() {
            Some(value) => Ok(Self {
                // SAFETY: the inline read above only succeeds on a `T` payload.
                union: unsafe { TypedUnion::from_validated(union.clone()) },
                value,
            }),
            None => Err(UnionError::mismatch::<T>(union)),
        }
    }

    #[inline(always)]
    pub fn value(&self) -> T {
        self.value
    }
}

impl<T> Unmanaged<T> {
    #[inline(always)]
    pub fn as_union(&self) -> &Union {
        self.union.as_union()
    }

    pub fn into_union(self) -> Union {
        self.union.into_union()
    }

    pub fn typed(&self) -> &TypedUnion<T> {
        &self.union
    }
}

impl<T: HasUnionKind + Copy> TryFrom<&Union> for Unmanaged<T> {
    type Error = UnionError;

    fn try_from(union: &Union) -> Result<Self, Self::Error> {
        Self::from_union(union)
    }
}

impl<T: HasUnionKind + Copy> TryFrom<Union> for Unmanaged<T> {
    type Error = UnionError;

    fn try_from(union: Union) -> Result<Self, Self::Error> {
        Self::from_union(&union)
    }
}

impl<T: HasUnionKind + Copy> From<TypedUnion<T>> for Unmanaged<T> {
    fn from(typed: TypedUnion<T>) -> Self {
        match typed.as_union().read_inline::<T>() {
            Some(value) => Self { union: typed, value },
            None => unreachable!("a typed union always holds its payload type"),
        }
    }
}

impl<T> From<Unmanaged<T>> for TypedUnion<T> {
    fn from(wrapper: Unmanaged<T>) -> Self {
        wrapper.union
    }
}

impl<T> From<Unmanaged<T>> for Union {
    fn from(wrapper: Unmanaged<T>) -> Self {
        wrapper.into_union()
    }
}

impl<T: PartialEq> PartialEq for Unmanaged<T> {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl<T: fmt::Debug> fmt::Debug for Unmanaged<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Unmanaged").field(&self.value).finish()
    }
}

/// Typed view of a union holding a shared reference to a `T`.
///
/// Construction is strict, `value` is not: it yields `None` for the null reference and for anything that
/// can't be downcast to `T`, and never fails.
pub struct Managed<T> {
    union: TypedUnion<T>,
}

impl<T> Clone for Managed<T> {
    fn clone(&self) -> Self {
        Self {
            union: self.union.clone(),
        }
    }
}

impl<T: HasUnionKind + Send + Sync> Managed<T> {
    pub fn new(value: Arc<T>) -> Self {
        Self::from_option(Some(value))
    }

    /// Wraps a null reference, still tagged as a `T`.
    pub fn null() -> Self {
        Self::from_option(None)
    }

    pub fn from_option(value: Option<Arc<T>>) -> Self {
        Self {
            // SAFETY: a shared payload, tagged as a `T`.
            union: unsafe { TypedUnion::from_validated(Union::from_shared(value)) },
        }
    }

    /// Validates that `union` is tagged as a `T`. A union with no payload yet wraps as the null reference.
    pub fn from_union(union: &Union) -> UnionResult<Self> {
        if !union.is::<T>() {
            return Err(UnionError::mismatch::<T>(union));
        }
        match TypedUnion::try_from(union.clone()) {
            Ok(typed) => Ok(Self { union: typed }),
            Err(_) => Ok(Self::null()),
        }
    }

    /// Returns the referenced `T`, or `None`.
    pub fn value(&self) -> Option<Arc<T>> {
        self.as_union().shared::<T>()
    }

    pub fn value_ref(&self) -> Option<&T> {
        self.as_union().downcast_ref::<T>()
    }

    pub fn is_null(&self) -> bool {
        self.as_union().is_null()
    }
}

impl<T> Managed<T> {
    #[inline(always)]
    pub fn as_union(&self) -> &Union {
        self.union.as_union()
    }

    pub fn into_union(self) -> Union {
        self.union.into_union()
    }

    pub fn typed(&self) -> &TypedUnion<T> {
        &self.union
    }
}

impl<T: HasUnionKind + Send + Sync> From<Arc<T>> for Managed<T> {
    fn from(value: Arc<T>) -> Self {
        Self::new(value)
    }
}

impl<T: HasUnionKind + Send + Sync> From<Option<Arc<T>>> for Managed<T> {
    fn from(value: Option<Arc<T>>) -> Self {
        Self::from_option(value)
    }
}

impl<T: HasUnionKind + Send + Sync> TryFrom<&Union> for Managed<T> {
    type Error = UnionError;

    fn try_from(union: &Union) -> Result<Self, Self::Error> {
        Self::from_union(union)
    }
}

impl<T: HasUnionKind + Send + Sync> TryFrom<Union> for Managed<T> {
    type Error = UnionError;

    fn try_from(union: Union) -> Result<Self, Self::Error> {
        Self::from_union(&union)
    }
}

impl<T> From<TypedUnion<T>> for Managed<T> {
    fn from(union: TypedUnion<T>) -> Self {
        Self { union }
    }
}

impl<T> From<Managed<T>> for TypedUnion<T> {
    fn from(wrapper: Managed<T>) -> Self {
        wrapper.union
    }
}

impl<T> From<Managed<T>> for Union {
    fn from(wrapper: Managed<T>) -> Self {
        wrapper.into_union()
    }
}

impl<T: HasUnionKind + Send + Sync + fmt::Debug> fmt::Debug for Managed<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Managed").field(&self.value_ref()).finish()
    }
}
