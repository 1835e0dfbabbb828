use std::fmt;
use std::sync::Arc;

use unionrt_value::{Fits, HasUnionKind, Union, UnionTypeId, UnionTypeKind, UnionValue};

use crate::error::{UnionError, UnionResult};

/// Mediates every conversion between unions and values of type `T`.
///
/// Converters are stateless, and meant to be registered once per type in a `ConverterRegistry`. Which type that
/// is follows from `T` alone: registries key on `T::Tag`.
pub trait Converter<T: UnionValue>: Send + Sync + 'static {
    /// The kind of every union this converter produces.
    fn kind(&self) -> UnionTypeKind {
        <T::Tag as HasUnionKind>::KIND
    }

    /// The id every union this converter produces is tagged with.
    fn type_id(&self) -> UnionTypeId {
        UnionTypeId::of::<T::Tag>()
    }

    /// Name of the converted type, for diagnostics.
    fn type_name(&self) -> &'static str {
        std::any::type_name::<T::Tag>()
    }

    /// Never fails.
    fn to_union(&self, value: T) -> Union;

    /// Strict read: fails if `union` doesn't hold a `T`.
    fn get_value(&self, union: &Union) -> UnionResult<T>;

    /// Lenient read.
    fn try_get_value(&self, union: &Union) -> Option<T> {
        self.get_value(union).ok()
    }

    /// Overwrites `dst` only if `union` holds a `T`. Returns whether it did.
    fn try_set_value_to(&self, union: &Union, dst: &mut T) -> bool {
        match self.try_get_value(union) {
            Some(value) => {
                *dst = value;
                true
            }
            None => false,
        }
    }

    /// Formats the held value, or the name of whatever the union holds instead. Never fails.
    fn to_string(&self, union: &Union) -> String;
}

/// What gets printed for a union a converter can't read.
pub(crate) fn foreign_display(union: &Union) -> String {
    union.type_id().type_name().to_owned()
}

/// Converter for types stored inline.
pub struct UnmanagedConverter<T> {
    fits: Fits<T>,
    format: fn(&T) -> String,
}

impl<T: HasUnionKind + Copy> UnmanagedConverter<T> {
    /// Returns `None` if `T` is too large to be stored inline: such types never get a converter.
    pub fn try_with_formatter(format: fn(&T) -> String) -> Option<Self> {
        Fits::<T>::check().map(|fits| Self { fits, format })
    }

    /// Formats values with `Debug`.
    pub fn try_new() -> Option<Self>
    where
        T: fmt::Debug,
    {
        Self::try_with_formatter(|value| format!("{:?}", value))
    }

    /// Formats values with `Display`.
    pub fn try_with_display() -> Option<Self>
    where
        T: fmt::Display,
    {
        Self::try_with_formatter(|value| value.to_string())
    }
}

impl<T: HasUnionKind + Copy> Converter<T> for UnmanagedConverter<T> {
    fn to_union(&self, value: T) -> Union {
        Union::from_inline(value, self.fits)
    }

    fn get_value(&self, union: &Union) -> UnionResult<T> {
        union.read_inline::<T>().ok_or_else(|| UnionError::mismatch::<T>(union))
    }

    fn try_get_value(&self, union: &Union) -> Option<T> {
        union.read_inline::<T>()
    }

    fn to_string(&self, union: &Union) -> String {
        match union.read_inline::<T>() {
            Some(value) => (self.format)(&value),
            None => foreign_display(union),
        }
    }
}

impl<T> fmt::Debug for UnmanagedConverter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UnmanagedConverter<{}>", std::any::type_name::<T>())
    }
}

/// Converter for types stored as shared references. Values are `Option<Arc<T>>`, `None` being null.
pub struct ManagedConverter<T> {
    format: fn(&T) -> String,
}

impl<T: HasUnionKind + Send + Sync> ManagedConverter<T> {
    pub fn with_formatter(format: fn(&T) -> String) -> Self {
        Self { format }
    }

    /// Formats values with `Debug`.
    pub fn new() -> Self
    where
        T: fmt::Debug,
    {
        Self::with_formatter(|value| format!("{:?}", value))
    }

    /// Formats values with `Display`.
    pub fn with_display() -> Self
    where
        T: fmt::Display,
    {
        Self::with_formatter(|value| value.to_string())
    }
}

impl<T: HasUnionKind + Send + Sync + fmt::Debug> Default for ManagedConverter<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: HasUnionKind + Send + Sync> Converter<Option<Arc<T>>> for ManagedConverter<T> {
    fn to_union(&self, value: Option<Arc<T>>) -> Union {
        Union::from_shared(value)
    }

    fn get_value(&self, union: &Union) -> UnionResult<Option<Arc<T>>> {
        if union.is::<T>() {
            Ok(union.shared::<T>())
        } else {
            Err(UnionError::mismatch::<T>(union))
        }
    }

    fn try_get_value(&self, union: &Union) -> Option<Option<Arc<T>>> {
        union.is::<T>().then(|| union.shared::<T>())
    }

    fn to_string(&self, union: &Union) -> String {
        if !union.is::<T>() {
            return foreign_display(union);
        }
        match union.downcast_ref::<T>() {
            Some(value) => (self.format)(value),
            None => String::from("null"),
        }
    }
}

impl<T> fmt::Debug for ManagedConverter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ManagedConverter<{}>", std::any::type_name::<T>())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq)]
    struct Point {
        x: f32,
        y: f32,
    }

    crate::union_kind!(Point => ValueType);

    #[derive(Debug, Clone, Copy)]
    struct Oversized([u64; 4]);

    crate::union_kind!(Oversized => ValueType);

    #[derive(Debug)]
    struct Animal {
        name: String,
    }

    crate::union_kind!(Animal => Object);

    #[test]
    fn unmanaged_round_trip() {
        let converter = UnmanagedConverter::<Point>::try_new().unwrap();
        let union = converter.to_union(Point { x: 1.0, y: 2.0 });

        assert_eq!(union.kind(), UnionTypeKind::ValueType);
        assert_eq!(converter.kind(), UnionTypeKind::ValueType);
        assert_eq!(converter.get_value(&union), Ok(Point { x: 1.0, y: 2.0 }));
        assert_eq!(converter.try_get_value(&union), Some(Point { x: 1.0, y: 2.0 }));
    }

    #[test]
    fn oversized_types_get_no_converter() {
        assert!(UnmanagedConverter::<Oversized>::try_new().is_none());
    }

    #[test]
    fn strict_and_lenient_reads_disagree_on_mismatch() {
        let ints = UnmanagedConverter::<i32>::try_with_display().unwrap();
        let points = UnmanagedConverter::<Point>::try_new().unwrap();
        let union = points.to_union(Point { x: 1.0, y: 2.0 });

        assert!(matches!(ints.get_value(&union), Err(UnionError::TypeMismatch { expected: "i32", .. })));
        assert_eq!(ints.try_get_value(&union), None);
    }

    #[test]
    fn try_set_value_to_only_writes_on_match() {
        let converter = UnmanagedConverter::<u32>::try_with_display().unwrap();
        let mut slot = 5u32;

        assert!(converter.try_set_value_to(&converter.to_union(12), &mut slot));
        assert_eq!(slot, 12);

        let other = UnmanagedConverter::<i32>::try_with_display().unwrap().to_union(99);
        assert!(!converter.try_set_value_to(&other, &mut slot));
        assert_eq!(slot, 12);
    }

    #[test]
    fn to_string_falls_back_to_the_actual_type() {
        let floats = UnmanagedConverter::<f32>::try_with_display().unwrap();
        let points = UnmanagedConverter::<Point>::try_new().unwrap();

        assert_eq!(floats.to_string(&floats.to_union(2.5)), "2.5");
        assert_eq!(points.to_string(&points.to_union(Point { x: 1.0, y: 2.0 })), "Point { x: 1.0, y: 2.0 }");
        assert_eq!(floats.to_string(&points.to_union(Point { x: 1.0, y: 2.0 })), std::any::type_name::<Point>());
        assert_eq!(floats.to_string(&Union::default()), "<undefined>");
    }

    #[test]
    fn managed_round_trip_keeps_identity() {
        let converter = ManagedConverter::<Animal>::new();
        let cat = Arc::new(Animal { name: String::from("cat") });
        let union = converter.to_union(Some(cat.clone()));

        let back = converter.get_value(&union).unwrap().unwrap();
        assert!(Arc::ptr_eq(&back, &cat));
        assert_eq!(back.name, "cat");
        assert_eq!(converter.to_string(&union), "Animal { name: \"cat\" }");
    }

    #[test]
    fn managed_null() {
        let converter = ManagedConverter::<Animal>::default();
        let union = converter.to_union(None);

        assert_eq!(union.kind(), UnionTypeKind::Object);
        assert!(matches!(converter.get_value(&union), Ok(None)));
        assert_eq!(converter.to_string(&union), "null");
    }

    #[test]
    fn managed_mismatch() {
        let converter = ManagedConverter::<Animal>::new();
        let union = UnmanagedConverter::<bool>::try_with_display().unwrap().to_union(true);

        assert!(converter.get_value(&union).is_err());
        assert!(converter.try_get_value(&union).is_none());
        assert_eq!(converter.to_string(&union), "bool");

        let mut slot = Some(Arc::new(Animal { name: String::from("dog") }));
        assert!(!converter.try_set_value_to(&union, &mut slot));
        assert!(slot.is_some());
    }
}
