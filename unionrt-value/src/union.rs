use std::any::Any;
use std::fmt;
use std::marker::PhantomData;
use std::mem::{size_of, MaybeUninit};
use std::ptr;
use std::sync::Arc;

use crate::kind::{HasUnionKind, StorageCheck, UnionTypeKind};
use crate::type_id::UnionTypeId;

static_assertions::assert_eq_size!(UnionData, [u8; UnionData::BYTE_COUNT]);
static_assertions::const_assert!(UnionData::BYTE_COUNT >= size_of::<u64>());
static_assertions::const_assert!(UnionData::BYTE_COUNT >= size_of::<char>());

/// A reference payload. Cloning a union clones the reference, not the object.
pub type SharedObject = Arc<dyn Any + Send + Sync>;

/// Inline payload storage.
///
/// The bytes are kept as `MaybeUninit` since a stored value's padding bytes are never initialized:
/// nothing reads them other than `load`, as the type they were written as.
#[derive(Clone, Copy)]
pub struct UnionData {
    bytes: [MaybeUninit<u8>; UnionData::BYTE_COUNT],
}

impl UnionData {
    /// How many bytes a value may take to be stored inline.
    pub const BYTE_COUNT: usize = 16;

    pub const ZEROED: Self = Self {
        bytes: [MaybeUninit::new(0); Self::BYTE_COUNT],
    };

    /// Copies `value` into fresh storage. `Fits<T>` is the proof that it has room to.
    #[inline(always)]
    pub fn store<T: Copy>(value: T, _fits: Fits<T>) -> Self {
        let mut data = Self::ZEROED;
        // SAFETY: `Fits<T>` can only be obtained when `size_of::<T>() <= BYTE_COUNT`, and the write is unaligned.
        unsafe { ptr::write_unaligned(data.bytes.as_mut_ptr().cast::<T>(), value) };
        data
    }

    /// Reads the stored value back.
    /// # Safety
    /// This storage must have been produced by `store::<T>` for this exact `T`.
    #[inline(always)]
    pub unsafe fn load<T: Copy>(&self) -> T {
        debug_assert!(Fits::<T>::HOLDS);
        ptr::read_unaligned(self.bytes.as_ptr().cast::<T>())
    }
}

impl fmt::Debug for UnionData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UnionData").finish_non_exhaustive()
    }
}

/// Proof that `T` fits in `UnionData::BYTE_COUNT` bytes.
pub struct Fits<T>(PhantomData<fn() -> T>);

impl<T> Fits<T> {
    pub const HOLDS: bool = size_of::<T>() <= UnionData::BYTE_COUNT;

    /// Compile-time version of `check`: using it for a type that doesn't fit fails the build.
    pub const ASSERT: Self = {
        assert!(Self::HOLDS, "type is too large to be stored inline in a union");
        Self(PhantomData)
    };

    /// The runtime size gate: `None` for types too big to be stored inline.
    pub fn check() -> Option<Self> {
        Self::HOLDS.then_some(Self(PhantomData))
    }
}

impl<T> Clone for Fits<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Fits<T> {}

impl<T> fmt::Debug for Fits<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fits<{}>", std::any::type_name::<T>())
    }
}

/// Kind and type: everything a union knows about its payload.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UnionMeta {
    pub kind: UnionTypeKind,
    pub type_id: UnionTypeId,
}

impl UnionMeta {
    pub const UNDEFINED: Self = Self {
        kind: UnionTypeKind::Undefined,
        type_id: UnionTypeId::NONE,
    };

    pub fn of<T: HasUnionKind>() -> Self {
        Self {
            kind: T::KIND,
            type_id: UnionTypeId::of::<T>(),
        }
    }
}

#[derive(Debug, Clone)]
pub enum Payload {
    /// Metadata only, nothing stored yet.
    Empty,
    Inline(UnionData),
    /// A shared reference, `None` being the null reference.
    Object(Option<SharedObject>),
}

/// A tagged value: which type it holds, and the payload itself.
///
/// Fields are private so the type id and the payload can't disagree: inline bytes are only ever paired with
/// the id of the type they were written from, which is what makes `read_inline` sound. Likewise a type with a
/// managed kind only ever has a reference payload (or none).
#[derive(Clone)]
pub struct Union {
    meta: UnionMeta,
    payload: Payload,
}

impl Default for Union {
    fn default() -> Self {
        Self::UNDEFINED
    }
}

impl Union {
    /// The zero union.
    pub const UNDEFINED: Self = Self {
        meta: UnionMeta::UNDEFINED,
        payload: Payload::Empty,
    };

    /// A union with metadata but no payload. `kind` must be the kind `type_id`'s type was declared with.
    pub fn from_meta(kind: UnionTypeKind, type_id: UnionTypeId) -> Self {
        debug_assert!(
            type_id.info().map_or(kind == UnionTypeKind::Undefined || !type_id.is_none(), |info| info.kind == kind),
            "{} is not the kind of {}",
            kind,
            type_id.type_name()
        );
        Self {
            meta: UnionMeta { kind, type_id },
            payload: Payload::Empty,
        }
    }

    /// Stores `value` inline, tagged with `T`'s kind and id. No allocation.
    pub fn from_inline<T: HasUnionKind + Copy>(value: T, fits: Fits<T>) -> Self {
        #[allow(clippy::let_unit_value)]
        let () = StorageCheck::<T>::INLINE;
        Self {
            meta: UnionMeta::of::<T>(),
            payload: Payload::Inline(UnionData::store(value, fits)),
        }
    }

    /// Stores a shared reference (or the null reference) to a `T`.
    pub fn from_shared<T: HasUnionKind + Send + Sync>(value: Option<Arc<T>>) -> Self {
        #[allow(clippy::let_unit_value)]
        let () = StorageCheck::<T>::MANAGED;
        Self {
            meta: UnionMeta::of::<T>(),
            payload: Payload::Object(value.map(|obj| obj as SharedObject)),
        }
    }

    #[inline(always)]
    pub fn kind(&self) -> UnionTypeKind {
        self.meta.kind
    }

    #[inline(always)]
    pub fn type_id(&self) -> UnionTypeId {
        self.meta.type_id
    }

    #[inline(always)]
    pub fn meta(&self) -> UnionMeta {
        self.meta
    }

    #[inline(always)]
    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    /// Returns whether a payload was stored, the null reference included.
    #[inline(always)]
    pub fn has_payload(&self) -> bool {
        !matches!(self.payload, Payload::Empty)
    }

    #[inline(always)]
    pub fn is_undefined(&self) -> bool {
        self.meta.kind == UnionTypeKind::Undefined
    }

    /// Returns whether this union is tagged as holding a `T`.
    #[inline(always)]
    pub fn is<T: HasUnionKind>(&self) -> bool {
        self.meta.type_id == UnionTypeId::of::<T>()
    }

    /// Returns the inline value, if this union holds a `T` inline.
    pub fn read_inline<T: HasUnionKind + Copy>(&self) -> Option<T> {
        match &self.payload {
            // SAFETY: inline data is only ever paired with the id of the type it was stored as.
            Payload::Inline(data) if self.is::<T>() => Some(unsafe { data.load::<T>() }),
            _ => None,
        }
    }

    /// Returns the reference payload, if there is a non-null one.
    pub fn object(&self) -> Option<&SharedObject> {
        match &self.payload {
            Payload::Object(obj) => obj.as_ref(),
            _ => None,
        }
    }

    /// Returns whether this union holds the null reference.
    pub fn is_null(&self) -> bool {
        matches!(self.payload, Payload::Object(None))
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.object()?.downcast_ref::<T>()
    }

    /// Returns a new handle to the referenced `T`, if that's what this union references.
    pub fn shared<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        self.object()?.clone().downcast::<T>().ok()
    }
}

impl fmt::Debug for Union {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let payload = match &self.payload {
            Payload::Empty => "empty",
            Payload::Inline(_) => "inline",
            Payload::Object(None) => "null",
            Payload::Object(Some(_)) => "object",
        };
        f.debug_struct("Union")
            .field("kind", &self.meta.kind)
            .field("type", &self.meta.type_id.type_name())
            .field("payload", &payload)
            .finish()
    }
}
