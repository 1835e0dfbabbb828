use std::fmt;
use std::sync::Arc;

use indexmap::map::Entry;
use indexmap::IndexMap;
use log::debug;
use unionrt_value::{HasUnionKind, Union, UnionTypeId, UnionTypeKind, UnionValue};

use crate::converter::{foreign_display, Converter, ManagedConverter, UnmanagedConverter};
use crate::diagnostics::{log_registration, RegistrationOutcome, RegistrationReport};
use crate::error::{UnionError, UnionResult};

/// A registered converter, without its value type.
///
/// This is what code that holds a union but not its static type gets to work with.
pub trait AnyConverter: Send + Sync {
    fn type_id(&self) -> UnionTypeId;
    fn kind(&self) -> UnionTypeKind;
    fn type_name(&self) -> &'static str;
    /// See `Converter::to_string`.
    fn to_string(&self, union: &Union) -> String;
    fn as_any(&self) -> &dyn std::any::Any;
}

struct Registered<V: UnionValue> {
    converter: Arc<dyn Converter<V>>,
}

impl<V: UnionValue> AnyConverter for Registered<V> {
    fn type_id(&self) -> UnionTypeId {
        UnionTypeId::of::<V::Tag>()
    }

    fn kind(&self) -> UnionTypeKind {
        <V::Tag as HasUnionKind>::KIND
    }

    fn type_name(&self) -> &'static str {
        std::any::type_name::<V::Tag>()
    }

    fn to_string(&self, union: &Union) -> String {
        self.converter.to_string(union)
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

/// Maps type ids to the one converter for that type.
///
/// Registration takes `&mut self` and lookups `&self`, so an owned registry is necessarily done registering
/// before anyone reads from it; once shared, it's read-only. The first converter registered for a type stays
/// active until `clear`.
///
/// Converters are keyed by the tag of their value type (`V::Tag`), never by what they report about themselves,
/// so a converter can't claim another type's slot.
#[derive(Default)]
pub struct ConverterRegistry {
    converters: IndexMap<UnionTypeId, Box<dyn AnyConverter>>,
}

impl ConverterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `converter` unless its type already has one. Never overwrites.
    pub fn register<V: UnionValue, C: Converter<V>>(&mut self, converter: C) -> RegistrationOutcome {
        let kind = <V::Tag as HasUnionKind>::KIND;
        let type_name = std::any::type_name::<V::Tag>();

        let outcome = if !kind.is_defined() {
            RegistrationOutcome::Undefined
        } else {
            match self.converters.entry(UnionTypeId::of::<V::Tag>()) {
                Entry::Occupied(_) => RegistrationOutcome::AlreadyRegistered,
                Entry::Vacant(slot) => {
                    let converter: Arc<dyn Converter<V>> = Arc::new(converter);
                    slot.insert(Box::new(Registered { converter }));
                    RegistrationOutcome::Registered
                }
            }
        };

        log_registration(type_name, kind, outcome);
        outcome
    }

    /// Returns `true` for a first registration, `false` if the type already had a converter or can't have one.
    pub fn try_register<V: UnionValue, C: Converter<V>>(&mut self, converter: C) -> bool {
        self.register(converter).is_registered()
    }

    /// Registers the `Debug`-formatting inline converter for `T`, if `T` fits.
    pub fn register_unmanaged<T: HasUnionKind + Copy + fmt::Debug>(&mut self) -> RegistrationOutcome {
        self.register_inline(UnmanagedConverter::<T>::try_new())
    }

    /// Registers an inline converter built with one of the fallible `UnmanagedConverter` constructors.
    pub fn register_inline<T: HasUnionKind + Copy>(&mut self, converter: Option<UnmanagedConverter<T>>) -> RegistrationOutcome {
        match converter {
            Some(converter) => self.register(converter),
            None => {
                let outcome = RegistrationOutcome::Oversized;
                log_registration(std::any::type_name::<T>(), T::KIND, outcome);
                outcome
            }
        }
    }

    /// Registers the `Debug`-formatting reference converter for `T`.
    pub fn register_managed<T: HasUnionKind + Send + Sync + fmt::Debug>(&mut self) -> RegistrationOutcome {
        self.register(ManagedConverter::<T>::new())
    }

    /// The converter for values of type `V`.
    pub fn get<V: UnionValue>(&self) -> Option<Arc<dyn Converter<V>>> {
        self.converters
            .get(&UnionTypeId::of::<V::Tag>())?
            .as_any()
            .downcast_ref::<Registered<V>>()
            .map(|entry| entry.converter.clone())
    }

    /// Like `get`, but failing with `UnionError::NotRegistered`.
    pub fn converter<V: UnionValue>(&self) -> UnionResult<Arc<dyn Converter<V>>> {
        self.get::<V>().ok_or(UnionError::NotRegistered {
            type_name: std::any::type_name::<V>(),
        })
    }

    /// Strict read of `union` as a `V`, through the registered converter.
    pub fn get_value<V: UnionValue>(&self, union: &Union) -> UnionResult<V> {
        self.converter::<V>()?.get_value(union)
    }

    /// Lenient read of `union` as a `V`: `None` if there's no converter or the union holds something else.
    pub fn try_get_value<V: UnionValue>(&self, union: &Union) -> Option<V> {
        self.get::<V>()?.try_get_value(union)
    }

    pub fn lookup(&self, type_id: UnionTypeId) -> Option<&dyn AnyConverter> {
        self.converters.get(&type_id).map(|entry| entry.as_ref())
    }

    pub fn contains(&self, type_id: UnionTypeId) -> bool {
        self.converters.contains_key(&type_id)
    }

    pub fn len(&self) -> usize {
        self.converters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.converters.is_empty()
    }

    /// Registered type ids, in registration order.
    pub fn type_ids(&self) -> impl Iterator<Item = UnionTypeId> + '_ {
        self.converters.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn AnyConverter> {
        self.converters.values().map(|entry| entry.as_ref())
    }

    /// Formats any union through its type's converter, whatever that type is. Never fails.
    pub fn to_display_string(&self, union: &Union) -> String {
        match self.lookup(union.type_id()) {
            Some(converter) => converter.to_string(union),
            None => foreign_display(union),
        }
    }

    /// Drops every converter. Type ids are untouched, so re-registering yields the same ids.
    pub fn clear(&mut self) {
        debug!("clearing {} registered converters", self.converters.len());
        self.converters.clear();
    }
}

impl fmt::Debug for ConverterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.converters.iter().map(|(id, entry)| (id, entry.type_name())))
            .finish()
    }
}

/// A registration stub: installs one converter.
pub type Registration = fn(&mut ConverterRegistry) -> RegistrationOutcome;

/// An ordered list of registrations, installed together.
///
/// This is how a registry gets populated, and re-populated after a reset.
#[derive(Clone, Default)]
pub struct RegistrationTable {
    entries: Vec<(&'static str, Registration)>,
}

impl RegistrationTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, name: &'static str, registration: Registration) {
        self.entries.push((name, registration));
    }

    pub fn with(mut self, name: &'static str, registration: Registration) -> Self {
        self.push(name, registration);
        self
    }

    /// Appends every registration from `other`.
    pub fn extend(&mut self, other: &RegistrationTable) {
        self.entries.extend(other.entries.iter().copied());
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|(name, _)| *name)
    }

    /// Runs every registration, in order.
    pub fn install(&self, registry: &mut ConverterRegistry) -> RegistrationReport {
        let mut report = RegistrationReport::default();
        for (name, registration) in &self.entries {
            report.push(name, registration(registry));
        }
        report
    }

    /// Clears `registry` and installs this table into it.
    pub fn reload(&self, registry: &mut ConverterRegistry) -> RegistrationReport {
        registry.clear();
        let report = self.install(registry);
        debug!("reloaded converter registry: {}", report);
        report
    }
}

impl fmt::Debug for RegistrationTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}
