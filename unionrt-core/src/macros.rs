/// Assigns union kinds to types, so they can be stored in unions and get converters.
///
/// ```
/// #[derive(Debug, Clone, Copy)]
/// struct Point {
///     x: f32,
///     y: f32,
/// }
///
/// unionrt_core::union_kind!(Point => ValueType);
///
/// let point = unionrt_core::Unmanaged::new(Point { x: 1.0, y: 2.0 });
/// assert_eq!(point.as_union().kind(), unionrt_core::value::UnionTypeKind::ValueType);
/// ```
#[macro_export]
macro_rules! union_kind {
    ($($ty:ty => $kind:ident),* $(,)?) => {
        $(
            impl $crate::value::HasUnionKind for $ty {
                const KIND: $crate::value::UnionTypeKind = $crate::value::UnionTypeKind::$kind;
            }
        )*
    };
}
