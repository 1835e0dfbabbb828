//! The process-wide converter registry.
//!
//! A thin wrapper around one `ConverterRegistry`: lookups take the read lock, so once registration is done any
//! number of threads can read concurrently. Starts out empty; install `builtins::TABLE` or your own table.

use std::sync::{PoisonError, RwLock, RwLockReadGuard};

use log::debug;
use once_cell::sync::Lazy;
use unionrt_value::UnionValue;

use crate::converter::Converter;
use crate::diagnostics::{RegistrationOutcome, RegistrationReport};
use crate::registry::{ConverterRegistry, RegistrationTable};

static GLOBAL: Lazy<RwLock<ConverterRegistry>> = Lazy::new(|| RwLock::new(ConverterRegistry::new()));

/// Read access to the global registry. Don't register anything while holding this.
pub fn registry() -> RwLockReadGuard<'static, ConverterRegistry> {
    // a panic mid-registration leaves the registry consistent: entries are inserted whole.
    GLOBAL.read().unwrap_or_else(PoisonError::into_inner)
}

/// Runs `f` with exclusive access to the global registry.
pub fn with_mut<R>(f: impl FnOnce(&mut ConverterRegistry) -> R) -> R {
    let mut registry = GLOBAL.write().unwrap_or_else(PoisonError::into_inner);
    f(&mut registry)
}

pub fn register<V: UnionValue, C: Converter<V>>(converter: C) -> RegistrationOutcome {
    with_mut(|registry| registry.register(converter))
}

pub fn try_register<V: UnionValue, C: Converter<V>>(converter: C) -> bool {
    register(converter).is_registered()
}

/// Drops every globally registered converter.
pub fn reset() {
    debug!("resetting the global converter registry");
    with_mut(ConverterRegistry::clear)
}

/// Resets the global registry and installs `table` into it.
pub fn reload(table: &RegistrationTable) -> RegistrationReport {
    with_mut(|registry| table.reload(registry))
}
