//! Constants used throughout the Casedesk core crate.
//!
//! Path and filename constants for the file-backed case store, and the fixed thresholds used by
//! the renderer and the structural validator.

/// Default directory for case data when no explicit directory is configured.
pub const DEFAULT_CASE_DATA_DIR: &str = "case_data";

/// Directory name for case records.
pub const CASES_DIR_NAME: &str = "cases";

/// Directory name for organisation records.
pub const ORGANISATIONS_DIR_NAME: &str = "organisations";

/// Directory name for letter templates under the case data directory.
pub const TEMPLATES_DIR_NAME: &str = "templates";

pub const CASE_FILENAME: &str = "case.yaml";
pub const CLIENT_FILENAME: &str = "client.yaml";
pub const CONTACT_FILENAME: &str = "contact.yaml";
pub const SUBJECT_FILENAME: &str = "subject.yaml";
pub const FINANCE_FILENAME: &str = "finance.yaml";
pub const UPDATES_FILENAME: &str = "updates.yaml";
pub const ORGANISATION_PROFILE_FILENAME: &str = "profile.yaml";
pub const STAFF_FILENAME: &str = "staff.yaml";

/// Number of recent case updates exposed to templates by default.
pub const DEFAULT_RECENT_UPDATES: usize = 3;

/// Upper bound for the configurable number of recent updates.
pub const MAX_RECENT_UPDATES: usize = 20;

/// Minimum trimmed character count for a letter to be finalised.
pub const MIN_LETTER_LENGTH: usize = 50;

/// Characters assumed to fit on one printed page when estimating page count.
///
/// Independent of page size, margins and font size.
pub const CHARS_PER_PAGE: usize = 3000;

/// Footer text used when the branding configuration enables the confidentiality footer.
pub const DEFAULT_CONFIDENTIALITY_TEXT: &str = "CONFIDENTIAL: This letter and any attachments \
are intended solely for the addressee and may contain privileged information. If you have \
received it in error, please notify the sender and destroy all copies.";
