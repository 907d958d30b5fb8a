//! Record identifiers and sharded-path utilities.
//!
//! Cases and organisations are addressed by UUIDs in a *canonical* form: **32 lowercase
//! hexadecimal characters** without hyphens (`Uuid::new_v4().simple()`). Identifiers arriving
//! from the CLI or an API request must already be canonical; other spellings are rejected
//! rather than normalised so that one record can never be reached through two paths.
//!
//! ## Sharded directory layout
//! For a canonical UUID `u`, records live under:
//! `parent_dir/<u[0..2]>/<u[2..4]>/<u>/`
//!
//! Example:
//! `case_data/cases/55/0e/550e8400e29b41d4a716446655440000/`

mod ids;

pub use ids::{CaseId, OrganisationId, RecordId};
pub use uuid::Uuid;

/// Error type for identifier parsing.
#[derive(Debug, thiserror::Error)]
pub enum IdError {
    /// Invalid input provided
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type for identifier operations.
pub type IdResult<T> = Result<T, IdError>;
