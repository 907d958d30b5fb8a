//! Canonical record identifiers.

use crate::{IdError, IdResult};
use std::path::{Path, PathBuf};
use std::{fmt, str::FromStr};
use uuid::Uuid;

/// A UUID guaranteed to be in canonical form (32 lowercase hex characters, no hyphens).
///
/// # Construction
/// - [`RecordId::new`] generates a fresh identifier.
/// - [`RecordId::parse`] validates an externally supplied identifier.
///
/// # Display format
/// Always the canonical 32-character form.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecordId(Uuid);

impl Default for RecordId {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordId {
    /// Generates a new random (v4) identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Validates and parses an identifier that must already be canonical.
    ///
    /// Hyphenated or uppercase spellings are rejected, not normalised.
    ///
    /// # Errors
    ///
    /// Returns [`IdError::InvalidInput`] if `input` is not in canonical form.
    pub fn parse(input: &str) -> IdResult<Self> {
        if !Self::is_canonical(input) {
            return Err(IdError::InvalidInput(format!(
                "identifier must be 32 lowercase hex characters without hyphens, got: '{}'",
                input
            )));
        }
        Uuid::parse_str(input)
            .map(Self)
            .map_err(|e| IdError::InvalidInput(e.to_string()))
    }

    /// Returns true if `input` is canonical: exactly 32 bytes of `0-9a-f`.
    pub fn is_canonical(input: &str) -> bool {
        input.len() == 32
            && input
                .bytes()
                .all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
    }

    pub fn uuid(&self) -> Uuid {
        self.0
    }

    /// Returns `parent_dir/<s1>/<s2>/<id>/`, where `s1`/`s2` are the first two pairs of hex
    /// characters.
    pub fn sharded_dir(&self, parent_dir: &Path) -> PathBuf {
        let canonical = self.0.simple().to_string();
        let s1 = &canonical[0..2];
        let s2 = &canonical[2..4];
        parent_dir.join(s1).join(s2).join(&canonical)
    }
}

impl From<Uuid> for RecordId {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.simple())
    }
}

impl FromStr for RecordId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RecordId::parse(s)
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for RecordId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for RecordId {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        RecordId::parse(&s).map_err(serde::de::Error::custom)
    }
}

/// Declares a typed wrapper over [`RecordId`] so case and organisation identifiers cannot be
/// swapped at a call site.
macro_rules! typed_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        #[cfg_attr(feature = "serde", serde(transparent))]
        pub struct $name(RecordId);

        impl $name {
            pub fn new() -> Self {
                Self(RecordId::new())
            }

            /// Parses a canonical identifier.
            ///
            /// # Errors
            ///
            /// Returns [`IdError::InvalidInput`] if `input` is not canonical.
            pub fn parse(input: &str) -> IdResult<Self> {
                RecordId::parse(input).map(Self)
            }

            pub fn record_id(&self) -> RecordId {
                self.0
            }

            pub fn sharded_dir(&self, parent_dir: &Path) -> PathBuf {
                self.0.sharded_dir(parent_dir)
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl FromStr for $name {
            type Err = IdError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::parse(s)
            }
        }
    };
}

typed_id!(
    /// Identifier of a case (matter) record.
    CaseId
);

typed_id!(
    /// Identifier of an organisation (tenant) record.
    OrganisationId
);
