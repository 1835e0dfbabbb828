use std::any::TypeId;
use std::fmt;
use std::mem::size_of;
use std::sync::{PoisonError, RwLock};

use indexmap::IndexMap;
use once_cell::sync::Lazy;

use crate::kind::{HasUnionKind, UnionTypeKind};

/// Process-stable identifier for a concrete payload type.
///
/// Ids are handed out on first use, starting at `1`, and never reused or reassigned for the lifetime of the
/// process: clearing a converter registry does not touch them. `0` is reserved for undefined unions.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct UnionTypeId(u32);

/// What the type table knows about a type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeInfo {
    pub id: UnionTypeId,
    /// Fully qualified Rust type name.
    pub name: &'static str,
    /// `size_of` the type, in bytes.
    pub size: usize,
    pub kind: UnionTypeKind,
}

/// Append-only: index `i` holds the type with id `i + 1`.
static TYPE_TABLE: Lazy<RwLock<IndexMap<TypeId, TypeInfo>>> = Lazy::new(|| RwLock::new(IndexMap::new()));

impl UnionTypeId {
    /// The id carried by undefined unions. Never assigned to a type.
    pub const NONE: Self = Self(0);

    /// Returns the id of `T`, assigning one if `T` has never been seen before.
    pub fn of<T: HasUnionKind>() -> Self {
        let key = TypeId::of::<T>();

        if let Some(info) = TYPE_TABLE.read().unwrap_or_else(PoisonError::into_inner).get(&key) {
            return info.id;
        }

        let mut table = TYPE_TABLE.write().unwrap_or_else(PoisonError::into_inner);
        let next = UnionTypeId(table.len() as u32 + 1);
        table
            .entry(key)
            .or_insert_with(|| TypeInfo {
                id: next,
                name: std::any::type_name::<T>(),
                size: size_of::<T>(),
                kind: T::KIND,
            })
            .id
    }

    /// Rebuilds an id from its raw value. The id may not correspond to any known type.
    #[inline(always)]
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    #[inline(always)]
    pub const fn as_u32(self) -> u32 {
        self.0
    }

    #[inline(always)]
    pub const fn is_none(self) -> bool {
        self.0 == 0
    }

    /// Reverse lookup into the type table.
    pub fn info(self) -> Option<TypeInfo> {
        let idx = (self.0 as usize).checked_sub(1)?;
        TYPE_TABLE
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get_index(idx)
            .map(|(_, info)| *info)
    }

    /// Name of the type behind this id, for messages. Never fails.
    pub fn type_name(self) -> &'static str {
        if self.is_none() {
            return "<undefined>";
        }
        self.info().map_or("<unknown type>", |info| info.name)
    }

    /// Every type seen so far, in id order.
    pub fn known_types() -> Vec<TypeInfo> {
        TYPE_TABLE
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .copied()
            .collect()
    }
}

impl fmt::Display for UnionTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}
