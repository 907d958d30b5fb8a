//! Shared value types for the Casedesk letter engine.
//!
//! These types sit below `casedesk-core` so that the API crates and the CLI can speak the same
//! vocabulary without pulling in the renderer:
//! - [`NonEmptyText`] for user-supplied text that must carry content (template names, signer
//!   names).
//! - [`FieldValue`], the "available / not available" sentinel every placeholder resolves to.
//! - [`LetterDateFormat`], the date style selected in the branding configuration.

use std::fmt;
use std::str::FromStr;

/// Errors that can occur when creating validated value types.
#[derive(Debug, thiserror::Error)]
pub enum TextError {
    /// The input text was empty or contained only whitespace
    #[error("Text cannot be empty")]
    Empty,

    /// The input did not name a known date format
    #[error("unknown date format '{0}' (expected full, short or iso)")]
    UnknownDateFormat(String),
}

/// A string type that guarantees non-empty content.
///
/// The input is trimmed of leading and trailing whitespace during construction; construction
/// fails when nothing remains.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NonEmptyText(String);

impl NonEmptyText {
    /// Creates a new `NonEmptyText` from the given input.
    ///
    /// # Errors
    ///
    /// Returns [`TextError::Empty`] if the trimmed input is empty.
    pub fn new(input: impl AsRef<str>) -> Result<Self, TextError> {
        let trimmed = input.as_ref().trim();
        if trimmed.is_empty() {
            return Err(TextError::Empty);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the inner string as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the wrapper and returns the owned string.
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for NonEmptyText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for NonEmptyText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for NonEmptyText {
    type Err = TextError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl serde::Serialize for NonEmptyText {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> serde::Deserialize<'de> for NonEmptyText {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        NonEmptyText::new(&s).map_err(serde::de::Error::custom)
    }
}

/// The resolved value of a single placeholder field.
///
/// A field whose source record is missing, or whose column is empty, is `NotAvailable`. This is
/// distinct from an *unknown* field, which is rejected by the field catalog before a
/// `FieldValue` is ever produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum FieldValue {
    Available(String),
    #[default]
    NotAvailable,
}

impl FieldValue {
    /// Builds a value from an optional source column.
    ///
    /// Whitespace-only strings count as missing.
    pub fn from_option(value: Option<impl Into<String>>) -> Self {
        match value.map(Into::into) {
            Some(v) if !v.trim().is_empty() => FieldValue::Available(v.trim().to_owned()),
            _ => FieldValue::NotAvailable,
        }
    }

    pub fn available(value: impl Into<String>) -> Self {
        Self::from_option(Some(value))
    }

    pub fn is_available(&self) -> bool {
        matches!(self, FieldValue::Available(_))
    }

    pub fn as_deref(&self) -> Option<&str> {
        match self {
            FieldValue::Available(v) => Some(v.as_str()),
            FieldValue::NotAvailable => None,
        }
    }
}

/// Date style used for the letter date block.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LetterDateFormat {
    /// `January 6, 2026`
    #[default]
    Full,
    /// `01/06/2026`
    Short,
    /// `2026-01-06`
    Iso,
}

impl LetterDateFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            LetterDateFormat::Full => "full",
            LetterDateFormat::Short => "short",
            LetterDateFormat::Iso => "iso",
        }
    }
}

impl fmt::Display for LetterDateFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LetterDateFormat {
    type Err = TextError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "full" | "long" => Ok(LetterDateFormat::Full),
            "short" => Ok(LetterDateFormat::Short),
            "iso" => Ok(LetterDateFormat::Iso),
            other => Err(TextError::UnknownDateFormat(other.to_owned())),
        }
    }
}
