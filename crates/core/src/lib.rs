//! # Casedesk Core
//!
//! Core logic for generating branded letters from case data.
//!
//! This crate contains pure data operations and the local file-backed data source:
//! - Placeholder resolution for a case ([`variables`]) and substitution into template bodies
//!   ([`placeholders`])
//! - Branding toggles and letterhead rules ([`branding`])
//! - Layout rendering to HTML with one shared stylesheet ([`layout`])
//! - Heuristic structural checks before export ([`structure`])
//! - The preview/finalise pipeline ([`letters`])
//!
//! **No API concerns**: Authentication, HTTP/gRPC servers, or service interfaces belong in
//! `api-grpc`, `api-rest`, or `api-shared`.

pub mod branding;
pub mod config;
pub mod constants;
pub mod dates;
pub mod error;
pub mod layout;
pub mod letters;
pub mod placeholders;
pub mod store;
pub mod structure;
pub mod templates;
pub mod validation;
pub mod variables;

pub use branding::{
    default_letter_branding_config, effective_header_display, usable_logo_url,
    validate_header_config, BrandingConfig, HeaderDisplay, HeaderValidation,
};
pub use config::CoreConfig;
pub use dates::format_letter_date;
pub use error::{LetterError, LetterResult};
pub use layout::{
    estimate_page_count, letter_css, render_letter, LetterContext, Margins, PageMetadata,
    PageSettings, PageSize, RenderedLetter,
};
pub use letters::{ExportPayload, LetterPreview, LetterRequest, LetterService};
pub use placeholders::{extract_placeholders, substitute_placeholders, Substitution};
pub use store::FileCaseStore;
pub use structure::{validate_letter_structure, validate_rendered_letter, StructureReport};
pub use templates::{LetterTemplate, TemplateLibrary};
pub use variables::{
    variable_catalog, CaseDataSource, Namespace, PlaceholderKey, Resolution, ResolvedVariables,
    VariableDescriptor, VariableResolver,
};

pub use casedesk_ids::{CaseId, OrganisationId, RecordId};
pub use casedesk_types::{FieldValue, LetterDateFormat, NonEmptyText};
