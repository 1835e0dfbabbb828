//! Converters for the primitive kinds and `String`, all formatting with `Display`.

use once_cell::sync::Lazy;

use crate::converter::{ManagedConverter, UnmanagedConverter};
use crate::diagnostics::RegistrationReport;
use crate::registry::{ConverterRegistry, RegistrationTable};

macro_rules! primitive_table {
    ($($ty:ty),* $(,)?) => {
        RegistrationTable::new()
        $(
            .with(stringify!($ty), |registry| registry.register_inline(UnmanagedConverter::<$ty>::try_with_display()))
        )*
    };
}

/// Every builtin registration, in kind order.
pub static TABLE: Lazy<RegistrationTable> = Lazy::new(|| {
    primitive_table!(bool, u8, i8, char, f64, f32, i32, u32, i64, u64, i16, u16)
        .with("String", |registry| registry.register(ManagedConverter::<String>::with_display()))
});

/// Installs the builtin converters into `registry`. Types that already have a converter keep it.
pub fn install(registry: &mut ConverterRegistry) -> RegistrationReport {
    TABLE.install(registry)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use unionrt_value::{UnionTypeId, UnionTypeKind};

    use super::*;

    #[test]
    fn installs_every_primitive_kind() {
        let mut registry = ConverterRegistry::new();
        let report = install(&mut registry);

        assert_eq!(report.registered(), 13);
        assert_eq!(registry.len(), 13);

        let kinds: Vec<UnionTypeKind> = registry.iter().map(|conv| conv.kind()).collect();
        let expected: Vec<UnionTypeKind> = UnionTypeKind::ALL
            .into_iter()
            .filter(|kind| kind.is_defined() && *kind != UnionTypeKind::Object && *kind != UnionTypeKind::ValueType)
            .collect();
        assert_eq!(kinds, expected);
    }

    #[test]
    fn builtins_display_plainly() {
        let mut registry = ConverterRegistry::new();
        install(&mut registry);

        let chars = registry.get::<char>().unwrap();
        assert_eq!(registry.to_display_string(&chars.to_union('q')), "q");

        let strings = registry.get::<Option<Arc<String>>>().unwrap();
        let union = strings.to_union(Some(Arc::new(String::from("hello"))));
        assert_eq!(registry.to_display_string(&union), "hello");
        assert_eq!(registry.lookup(UnionTypeId::of::<String>()).unwrap().kind(), UnionTypeKind::String);
    }

    #[test]
    fn installing_twice_changes_nothing() {
        let mut registry = ConverterRegistry::new();
        install(&mut registry);
        let report = install(&mut registry);

        assert_eq!(report.registered(), 0);
        assert_eq!(report.rejected().count(), 0);
        assert_eq!(registry.len(), 13);
    }
}
