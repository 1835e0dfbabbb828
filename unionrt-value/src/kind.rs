use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

static_assertions::assert_eq_size!(UnionTypeKind, u8);

/// Which storage strategy a union uses for its payload.
///
/// The discriminants are stable: `Undefined` is `0`, which is also what a zeroed union reports.
/// `String` and `Object` payloads are shared references, every other defined kind is stored inline.
#[repr(u8)]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum UnionTypeKind {
    /// No payload. Never the kind of a registered type.
    #[default]
    Undefined = 0,
    Bool = 1,
    Byte = 2,
    SByte = 3,
    Char = 4,
    Double = 5,
    Float = 6,
    Int = 7,
    UInt = 8,
    Long = 9,
    ULong = 10,
    Short = 11,
    UShort = 12,
    String = 13,
    Object = 14,
    /// Any other plain-data type small enough to fit in `UnionData::BYTE_COUNT` bytes.
    ValueType = 15,
}

impl UnionTypeKind {
    /// Every kind, in discriminant order.
    pub const ALL: [UnionTypeKind; 16] = [
        Self::Undefined,
        Self::Bool,
        Self::Byte,
        Self::SByte,
        Self::Char,
        Self::Double,
        Self::Float,
        Self::Int,
        Self::UInt,
        Self::Long,
        Self::ULong,
        Self::Short,
        Self::UShort,
        Self::String,
        Self::Object,
        Self::ValueType,
    ];

    #[inline(always)]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// Returns the kind with this discriminant, if there is one.
    pub fn from_u8(raw: u8) -> Option<Self> {
        Self::ALL.get(raw as usize).copied()
    }

    /// Returns whether this kind describes an actual payload.
    #[inline(always)]
    pub const fn is_defined(self) -> bool {
        !matches!(self, Self::Undefined)
    }

    /// Returns whether payloads of this kind are shared references rather than inline bytes.
    #[inline(always)]
    pub const fn is_managed(self) -> bool {
        matches!(self, Self::String | Self::Object)
    }

    /// Returns whether payloads of this kind live in the inline byte buffer.
    #[inline(always)]
    pub const fn is_inline(self) -> bool {
        self.is_defined() && !self.is_managed()
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Undefined => "Undefined",
            Self::Bool => "Bool",
            Self::Byte => "Byte",
            Self::SByte => "SByte",
            Self::Char => "Char",
            Self::Double => "Double",
            Self::Float => "Float",
            Self::Int => "Int",
            Self::UInt => "UInt",
            Self::Long => "Long",
            Self::ULong => "ULong",
            Self::Short => "Short",
            Self::UShort => "UShort",
            Self::String => "String",
            Self::Object => "Object",
            Self::ValueType => "ValueType",
        }
    }
}

impl fmt::Display for UnionTypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

/// Ties a payload type to the one kind its unions are tagged with.
pub trait HasUnionKind: 'static {
    const KIND: UnionTypeKind;
}

/// A value converters hand out: either a kinded type itself, or a shared reference to one.
///
/// `Tag` is the type its unions are tagged with, which is what registries key converters on.
pub trait UnionValue: 'static {
    type Tag: HasUnionKind;
}

impl<T: HasUnionKind> UnionValue for T {
    type Tag = T;
}

impl<T: HasUnionKind> UnionValue for Option<Arc<T>> {
    type Tag = T;
}

/// Build-time checks that a type is stored the way its kind says.
pub(crate) struct StorageCheck<T>(PhantomData<fn() -> T>);

impl<T: HasUnionKind> StorageCheck<T> {
    pub(crate) const INLINE: () = assert!(T::KIND.is_inline(), "kind is not stored inline");
    pub(crate) const MANAGED: () = assert!(T::KIND.is_managed(), "kind is not stored as a reference");
}

macro_rules! impl_primitive_kinds {
    ($($ty:ty => $kind:ident),* $(,)?) => {
        $(
            impl HasUnionKind for $ty {
                const KIND: UnionTypeKind = UnionTypeKind::$kind;
            }
        )*
    };
}

impl_primitive_kinds! {
    bool => Bool,
    u8 => Byte,
    i8 => SByte,
    char => Char,
    f64 => Double,
    f32 => Float,
    i32 => Int,
    u32 => UInt,
    i64 => Long,
    u64 => ULong,
    i16 => Short,
    u16 => UShort,
    String => String,
}
