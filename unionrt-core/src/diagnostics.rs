//! Registration outcomes, and the optional logging of them.
//!
//! Logging only happens when the crate is built with the `registration-log` feature. Either way it is a side
//! channel: nothing here feeds back into the registry.

use std::fmt;

use unionrt_value::UnionTypeKind;

/// What a registration attempt did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegistrationOutcome {
    /// First converter for its type: now active.
    Registered,
    /// The type already had a converter, which was kept.
    AlreadyRegistered,
    /// The type is too large to be stored inline and got no converter.
    Oversized,
    /// The type is declared with the `Undefined` kind.
    Undefined,
}

impl RegistrationOutcome {
    #[inline(always)]
    pub fn is_registered(self) -> bool {
        self == Self::Registered
    }

    /// Returns whether the registry now has a converter for the type, whoever installed it.
    pub fn is_available(self) -> bool {
        matches!(self, Self::Registered | Self::AlreadyRegistered)
    }
}

impl fmt::Display for RegistrationOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            Self::Registered => "registered",
            Self::AlreadyRegistered => "already registered",
            Self::Oversized => "too large for inline storage",
            Self::Undefined => "undefined kind",
        };
        f.write_str(msg)
    }
}

/// One line of a `RegistrationReport`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationRecord {
    /// Name the registration was listed under.
    pub name: &'static str,
    pub outcome: RegistrationOutcome,
}

/// Outcomes of installing a whole registration table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistrationReport {
    pub records: Vec<RegistrationRecord>,
}

impl RegistrationReport {
    pub fn push(&mut self, name: &'static str, outcome: RegistrationOutcome) {
        self.records.push(RegistrationRecord { name, outcome });
    }

    /// How many converters this install actually added.
    pub fn registered(&self) -> usize {
        self.records.iter().filter(|rec| rec.outcome.is_registered()).count()
    }

    /// Records for everything that didn't end up with a converter.
    pub fn rejected(&self) -> impl Iterator<Item = &RegistrationRecord> {
        self.records.iter().filter(|rec| !rec.outcome.is_available())
    }
}

impl fmt::Display for RegistrationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let duplicates = self
            .records
            .iter()
            .filter(|rec| rec.outcome == RegistrationOutcome::AlreadyRegistered)
            .count();
        write!(
            f,
            "{} registered, {} already present, {} rejected",
            self.registered(),
            duplicates,
            self.rejected().count()
        )
    }
}

/// Logs a registration attempt. A no-op without the `registration-log` feature.
#[cfg(feature = "registration-log")]
pub(crate) fn log_registration(type_name: &str, kind: UnionTypeKind, outcome: RegistrationOutcome) {
    match outcome {
        RegistrationOutcome::Registered | RegistrationOutcome::AlreadyRegistered => {
            log::debug!("converter for `{}` ({}): {}", type_name, kind, outcome)
        }
        RegistrationOutcome::Oversized | RegistrationOutcome::Undefined => {
            log::warn!("converter for `{}` ({}) refused: {}", type_name, kind, outcome)
        }
    }
}

#[cfg(not(feature = "registration-log"))]
#[inline(always)]
pub(crate) fn log_registration(_type_name: &str, _kind: UnionTypeKind, _outcome: RegistrationOutcome) {}
