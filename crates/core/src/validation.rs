//! Input validation utilities.
//!
//! Checks applied to values that end up embedded in rendered markup or CSS, before they are
//! used.

use crate::{LetterError, LetterResult};

/// Validates that a logo URL is safe to embed in an `<img src="...">` attribute.
///
/// - Rejects empty or whitespace-only strings
/// - Bounds the length
/// - Requires an `http://` or `https://` scheme
/// - Rejects whitespace, quotes, angle brackets and backslashes, which could break out of the
///   attribute
///
/// # Errors
///
/// Returns `LetterError::InvalidInput` if the URL is unsafe.
pub fn validate_logo_url(url: &str) -> LetterResult<()> {
    const MAX_URL_LEN: usize = 2048;

    if url.trim().is_empty() {
        return Err(LetterError::InvalidInput("logo URL cannot be empty".into()));
    }

    if url.len() > MAX_URL_LEN {
        return Err(LetterError::InvalidInput(format!(
            "logo URL exceeds maximum length of {} characters",
            MAX_URL_LEN
        )));
    }

    let lower = url.to_ascii_lowercase();
    if !(lower.starts_with("https://") || lower.starts_with("http://")) {
        return Err(LetterError::InvalidInput(
            "logo URL must use http or https".into(),
        ));
    }

    if !url.is_ascii() {
        return Err(LetterError::InvalidInput(
            "logo URL must contain only ASCII characters".into(),
        ));
    }

    let unsafe_char = url
        .bytes()
        .any(|b| b.is_ascii_whitespace() || b.is_ascii_control() || b"\"'<>\\`".contains(&b));
    if unsafe_char {
        return Err(LetterError::InvalidInput(
            "logo URL contains characters that are not allowed in markup".into(),
        ));
    }

    Ok(())
}

/// Validates a CSS font-family list supplied by a user.
///
/// Only letters, digits, spaces, commas, hyphens and quotes are allowed so the value cannot
/// terminate the declaration it is written into.
///
/// # Errors
///
/// Returns `LetterError::InvalidInput` if the value is empty, too long, or contains other
/// characters.
pub fn validate_font_family(font_family: &str) -> LetterResult<()> {
    const MAX_FONT_FAMILY_LEN: usize = 200;

    if font_family.trim().is_empty() {
        return Err(LetterError::InvalidInput(
            "font family cannot be empty".into(),
        ));
    }

    if font_family.len() > MAX_FONT_FAMILY_LEN {
        return Err(LetterError::InvalidInput(format!(
            "font family exceeds maximum length of {} characters",
            MAX_FONT_FAMILY_LEN
        )));
    }

    let ok = font_family
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, ' ' | ',' | '-' | '\'' | '"'));
    if !ok {
        return Err(LetterError::InvalidInput(
            "font family contains invalid characters".into(),
        ));
    }

    Ok(())
}
