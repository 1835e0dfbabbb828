use rstest::{fixture, rstest};
use std::sync::Arc;
use unionrt_core::value::Fits;
use unionrt_core::{
    builtins, Converter, ConverterRegistry, Managed, RegistrationOutcome, Union, UnionError, UnionResult, UnionTypeId,
    UnionTypeKind, Unmanaged, UnmanagedConverter,
};

#[derive(Debug, Clone, Copy, PartialEq)]
struct Point {
    x: f32,
    y: f32,
}

#[derive(Debug, PartialEq)]
struct Animal {
    name: String,
}

#[derive(Debug, Clone, Copy)]
struct Transform {
    matrix: [f64; 6],
}

/// Fits inline, but never registered.
#[derive(Debug, Clone, Copy)]
struct Tag(u16);

unionrt_core::union_kind! {
    Point => ValueType,
    Animal => Object,
    Transform => ValueType,
    Tag => ValueType,
}

#[fixture]
fn registry() -> ConverterRegistry {
    let mut registry = ConverterRegistry::new();
    builtins::install(&mut registry);
    registry.register_unmanaged::<Point>();
    registry.register_managed::<Animal>();
    registry
}

/// One registered type: a union holding a value of it, and type-erased readers for it.
struct Sample {
    name: &'static str,
    union: Union,
    strict: fn(&ConverterRegistry, &Union) -> UnionResult<()>,
    lenient: fn(&ConverterRegistry, &Union) -> bool,
}

macro_rules! sample {
    ($registry:expr, $ty:ty, $value:expr) => {
        Sample {
            name: stringify!($ty),
            union: $registry.get::<$ty>().expect(stringify!($ty)).to_union($value),
            strict: |registry, union| registry.get_value::<$ty>(union).map(drop),
            lenient: |registry, union| registry.try_get_value::<$ty>(union).is_some(),
        }
    };
}

fn samples(registry: &ConverterRegistry) -> Vec<Sample> {
    vec![
        sample!(registry, bool, true),
        sample!(registry, u8, 200),
        sample!(registry, i8, -100),
        sample!(registry, char, 'λ'),
        sample!(registry, f64, 0.1),
        sample!(registry, f32, 1.5),
        sample!(registry, i32, -42),
        sample!(registry, u32, 42),
        sample!(registry, i64, i64::MIN),
        sample!(registry, u64, u64::MAX),
        sample!(registry, i16, -3),
        sample!(registry, u16, 3),
        sample!(registry, Option<Arc<String>>, Some(Arc::new(String::from("text")))),
        sample!(registry, Point, Point { x: 1.0, y: 2.0 }),
        sample!(registry, Option<Arc<Animal>>, Some(Arc::new(Animal { name: String::from("cat") }))),
    ]
}

#[rstest]
fn every_type_reads_its_own_unions(registry: ConverterRegistry) {
    for sample in samples(&registry) {
        assert_eq!((sample.strict)(&registry, &sample.union), Ok(()), "{}", sample.name);
        assert!((sample.lenient)(&registry, &sample.union), "{}", sample.name);
    }
}

#[rstest]
fn strict_reads_of_other_types_always_fail(registry: ConverterRegistry) {
    let samples = samples(&registry);

    for held in &samples {
        for reader in samples.iter().filter(|reader| reader.name != held.name) {
            let result = (reader.strict)(&registry, &held.union);
            assert!(
                matches!(result, Err(UnionError::TypeMismatch { .. })),
                "reading {} as {} gave {:?}",
                held.name,
                reader.name,
                result
            );
            assert!(!(reader.lenient)(&registry, &held.union), "{} as {}", held.name, reader.name);
        }
    }
}

#[rstest]
fn produced_unions_carry_the_registered_kind(registry: ConverterRegistry) {
    for sample in samples(&registry) {
        let converter = registry.lookup(sample.union.type_id()).expect(sample.name);
        assert_eq!(sample.union.kind(), converter.kind(), "{}", sample.name);
        assert!(sample.union.kind().is_defined());
    }
}

#[rstest]
#[case::int(Unmanaged::new(-7i32).into_union(), "-7")]
#[case::double(Unmanaged::new(0.25f64).into_union(), "0.25")]
#[case::boolean(Unmanaged::new(false).into_union(), "false")]
#[case::point(Unmanaged::new(Point { x: 1.0, y: 2.0 }).into_union(), "Point { x: 1.0, y: 2.0 }")]
#[case::string(Managed::new(Arc::new(String::from("abc"))).into_union(), "abc")]
#[case::null_animal(Managed::<Animal>::null().into_union(), "null")]
#[case::unregistered(Unmanaged::new(Tag(1)).into_union(), std::any::type_name::<Tag>())]
#[case::undefined(Union::default(), "<undefined>")]
fn display_through_the_registry(registry: ConverterRegistry, #[case] union: Union, #[case] expected: &str) {
    assert_eq!(registry.to_display_string(&union), expected);
}

#[rstest]
fn point_is_not_an_int(registry: ConverterRegistry) {
    let ints = registry.get::<i32>().unwrap();
    let union: Union = Unmanaged::new(Point { x: 1.0, y: 2.0 }).into();

    let err = ints.get_value(&union).unwrap_err();
    assert_eq!(
        err,
        UnionError::TypeMismatch {
            actual: std::any::type_name::<Point>(),
            expected: "i32",
        }
    );
    assert_eq!(ints.try_get_value(&union), None);
    assert_eq!(ints.to_string(&union), std::any::type_name::<Point>());
    assert!(Unmanaged::<i32>::try_from(&union).is_err());

    let mut slot = 11;
    assert!(!ints.try_set_value_to(&union, &mut slot));
    assert_eq!(slot, 11);
}

#[rstest]
fn null_animal_reads_as_none(registry: ConverterRegistry) {
    let animals = registry.get::<Option<Arc<Animal>>>().unwrap();
    let union = animals.to_union(None);

    assert_eq!(union.kind(), UnionTypeKind::Object);
    assert_eq!(Managed::<Animal>::try_from(&union).unwrap().value(), None);
    assert_eq!(animals.get_value(&union), Ok(None));

    let mut slot = Some(Arc::new(Animal { name: String::from("dog") }));
    assert!(animals.try_set_value_to(&union, &mut slot));
    assert_eq!(slot, None);
}

#[rstest]
fn metadata_only_animal_agrees_on_both_strict_paths(registry: ConverterRegistry) {
    let union = Union::from_meta(UnionTypeKind::Object, UnionTypeId::of::<Animal>());

    let wrapper = Managed::<Animal>::try_from(&union).unwrap();
    assert_eq!(wrapper.value(), None);
    assert_eq!(registry.get_value::<Option<Arc<Animal>>>(&union), Ok(None));
    assert_eq!(registry.to_display_string(wrapper.as_union()), "null");
}

#[rstest]
fn reference_round_trip_keeps_identity(registry: ConverterRegistry) {
    let animals = registry.get::<Option<Arc<Animal>>>().unwrap();
    let cat = Arc::new(Animal { name: String::from("cat") });

    let union = animals.to_union(Some(cat.clone()));
    let back = animals.get_value(&union).unwrap().unwrap();

    assert!(Arc::ptr_eq(&back, &cat));
}

#[rstest]
fn first_registration_stays_active(mut registry: ConverterRegistry) {
    let loud = UnmanagedConverter::<Point>::try_with_formatter(|p| format!("({}, {})", p.x, p.y)).unwrap();
    assert!(!registry.try_register(loud));

    let union: Union = Unmanaged::new(Point { x: 3.0, y: 4.0 }).into();
    assert_eq!(registry.to_display_string(&union), "Point { x: 3.0, y: 4.0 }");

    let mut fresh = ConverterRegistry::new();
    let loud = UnmanagedConverter::<Point>::try_with_formatter(|p| format!("({}, {})", p.x, p.y)).unwrap();
    assert!(fresh.try_register(loud));
    assert!(!fresh.try_register(UnmanagedConverter::<Point>::try_new().unwrap()));
    assert_eq!(fresh.to_display_string(&union), "(3, 4)");
}

#[rstest]
fn oversized_value_types_stay_out(mut registry: ConverterRegistry) {
    assert!(!Fits::<Transform>::HOLDS);
    assert_eq!(registry.register_unmanaged::<Transform>(), RegistrationOutcome::Oversized);
    assert!(!registry.contains(UnionTypeId::of::<Transform>()));
    assert!(matches!(
        registry.get_value::<Transform>(&Union::default()),
        Err(UnionError::NotRegistered { .. })
    ));
}

#[rstest]
fn reload_restores_the_same_entries(mut registry: ConverterRegistry) {
    let before: Vec<_> = registry.type_ids().collect();
    let point_id = UnionTypeId::of::<Point>();

    registry.clear();
    assert!(registry.is_empty());
    assert_eq!(UnionTypeId::of::<Point>(), point_id);

    let report = builtins::TABLE.reload(&mut registry);
    assert_eq!(report.registered(), 13);
    registry.register_unmanaged::<Point>();
    registry.register_managed::<Animal>();

    assert_eq!(registry.type_ids().collect::<Vec<_>>(), before);
}
