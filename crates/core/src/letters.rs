//! Letter preview and finalisation.
//!
//! [`LetterService`] runs the whole pipeline for one letter: resolve the case's placeholder
//! values, substitute them into the body, render the branded layout and check the structure.
//! Preview always succeeds for well-formed input so the editor can show problems inline;
//! finalisation refuses to produce an export payload while the structure check has errors.

use crate::branding::{usable_logo_url, validate_header_config, BrandingConfig, HeaderValidation};
use crate::config::CoreConfig;
use crate::layout::{render_letter, LetterContext, PageMetadata, PageSettings, RenderedLetter};
use crate::placeholders::{substitute_placeholders, Substitution};
use crate::store::FileCaseStore;
use crate::structure::{validate_letter_structure, StructureReport, MISSING_DATE_WARNING};
use crate::templates::TemplateLibrary;
use crate::variables::{CaseDataSource, Resolution, VariableResolver};
use crate::{LetterError, LetterResult};
use casedesk_ids::{CaseId, OrganisationId};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// A request to preview or finalise a letter.
///
/// The body is either given inline or taken from a named template; an inline body wins.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LetterRequest {
    pub case_id: CaseId,
    pub organisation_id: OrganisationId,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub template: Option<String>,
    #[serde(default)]
    pub branding: BrandingConfig,
    /// Defaults to the configured page size with standard margins and typography.
    #[serde(default)]
    pub page: Option<PageSettings>,
    /// Defaults to today's local date.
    #[serde(default)]
    pub letter_date: Option<NaiveDate>,
}

/// Everything the editor needs to show a letter and its problems.
#[derive(Debug, Clone, Serialize)]
pub struct LetterPreview {
    pub rendered: RenderedLetter,
    pub substitution: Substitution,
    pub structure: StructureReport,
    pub header: HeaderValidation,
}

/// The document handed to the exporter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportPayload {
    pub document: String,
    pub css: String,
    pub page: PageMetadata,
    pub estimated_pages: usize,
    /// Hex-encoded SHA-256 of `document`.
    pub fingerprint: String,
}

pub struct LetterService<S: CaseDataSource> {
    cfg: Arc<CoreConfig>,
    source: S,
    templates: TemplateLibrary,
}

impl LetterService<FileCaseStore> {
    /// A service over the file-backed store, with templates loaded from the configured
    /// template directory.
    ///
    /// # Errors
    ///
    /// Returns any [`TemplateLibrary::load`] error.
    pub fn open(cfg: Arc<CoreConfig>) -> LetterResult<Self> {
        let templates = TemplateLibrary::load(cfg.template_dir())?;
        let store = FileCaseStore::new(cfg.clone());
        Ok(Self::new(cfg, store, templates))
    }
}

impl<S: CaseDataSource> LetterService<S> {
    pub fn new(cfg: Arc<CoreConfig>, source: S, templates: TemplateLibrary) -> Self {
        Self {
            cfg,
            source,
            templates,
        }
    }

    pub fn config(&self) -> &CoreConfig {
        &self.cfg
    }

    pub fn templates(&self) -> &TemplateLibrary {
        &self.templates
    }

    /// Resolves the placeholder values for a case.
    pub fn resolve(
        &self,
        case_id: &CaseId,
        organisation_id: &OrganisationId,
        today: NaiveDate,
    ) -> Resolution {
        VariableResolver::new(&self.source)
            .with_recent_updates_limit(self.cfg.recent_updates_limit())
            .resolve_all(case_id, organisation_id, today)
    }

    /// Builds a preview.
    ///
    /// # Errors
    ///
    /// - `LetterError::InvalidInput` if neither a body nor a template is given, or the page
    ///   settings are invalid.
    /// - `LetterError::TemplateNotFound` if the named template does not exist.
    pub fn preview(&self, request: &LetterRequest) -> LetterResult<LetterPreview> {
        let body = self.body_for(request)?;
        let letter_date = request
            .letter_date
            .unwrap_or_else(|| chrono::Local::now().date_naive());
        let page = request
            .page
            .clone()
            .unwrap_or_else(|| PageSettings::with_page_size(self.cfg.default_page_size()));

        let resolution = self.resolve(&request.case_id, &request.organisation_id, letter_date);
        let substitution = substitute_placeholders(body, &resolution.variables);

        let rendered = render_letter(&LetterContext {
            body: &substitution.text,
            branding: &request.branding,
            organisation: resolution.organisation.as_ref(),
            page: &page,
            letter_date,
        })?;

        let has_logo = usable_logo_url(
            resolution
                .organisation
                .as_ref()
                .and_then(|org| org.logo_url.as_deref()),
        )
        .is_some();
        let header = validate_header_config(&request.branding, has_logo);

        let mut structure = validate_letter_structure(&substitution.text);
        if request.branding.show_date {
            // The rendered date block supplies the date.
            structure.warnings.retain(|w| w != MISSING_DATE_WARNING);
        }

        tracing::debug!(
            "previewed letter for case {}: {} error(s), {} warning(s), {} unresolved token(s)",
            request.case_id,
            structure.errors.len(),
            structure.warnings.len(),
            substitution.unavailable.len() + substitution.unknown.len()
        );

        Ok(LetterPreview {
            rendered,
            substitution,
            structure,
            header,
        })
    }

    /// Produces the export payload for a letter that passes the structure check.
    ///
    /// # Errors
    ///
    /// - Any error from [`preview`](Self::preview).
    /// - `LetterError::NotFinalisable` carrying the report if the structure check has errors.
    pub fn finalise(&self, request: &LetterRequest) -> LetterResult<ExportPayload> {
        let preview = self.preview(request)?;
        if !preview.structure.is_valid {
            tracing::info!(
                "refusing to finalise letter for case {}: {} structural error(s)",
                request.case_id,
                preview.structure.errors.len()
            );
            return Err(LetterError::NotFinalisable(preview.structure));
        }

        let rendered = preview.rendered;
        let document = rendered.to_html_document();
        let fingerprint = rendered.fingerprint();
        tracing::info!(
            "finalised letter for case {} ({})",
            request.case_id,
            fingerprint
        );

        Ok(ExportPayload {
            document,
            css: rendered.css,
            page: rendered.page,
            estimated_pages: rendered.estimated_pages,
            fingerprint,
        })
    }

    fn body_for<'r>(&'r self, request: &'r LetterRequest) -> LetterResult<&'r str> {
        if let Some(body) = request.body.as_deref() {
            return Ok(body);
        }
        match request.template.as_deref() {
            Some(name) => Ok(self.templates.get(name)?.body.as_str()),
            None => Err(LetterError::InvalidInput(
                "either a letter body or a template name is required".into(),
            )),
        }
    }
}
