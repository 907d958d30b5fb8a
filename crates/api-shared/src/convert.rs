//! Conversions between protobuf messages and `casedesk-core` types.
//!
//! Proto3 has no presence for scalar fields, so empty strings and zero numbers in requests mean
//! "use the default".

use crate::pb;
use casedesk_core::{
    default_letter_branding_config, BrandingConfig, CaseId, ExportPayload, HeaderDisplay,
    HeaderValidation, LetterDateFormat, LetterError, LetterPreview, LetterRequest, LetterResult,
    Margins, OrganisationId, PageSettings, PageSize, StructureReport, TemplateLibrary,
    VariableDescriptor,
};
use chrono::NaiveDate;

fn non_empty(value: String) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}

/// Converts a branding message; `None`, and any unset field, takes the default configuration.
///
/// # Errors
///
/// Returns `LetterError::InvalidText` if the date format is not recognised.
pub fn branding_from_pb(branding: Option<pb::BrandingConfig>) -> LetterResult<BrandingConfig> {
    let defaults = default_letter_branding_config();
    let Some(b) = branding else {
        return Ok(defaults);
    };

    let date_format = match non_empty(b.date_format) {
        Some(f) => f.parse::<LetterDateFormat>()?,
        None => defaults.date_format,
    };

    Ok(BrandingConfig {
        show_logo: b.show_logo.unwrap_or(defaults.show_logo),
        show_org_name: b.show_org_name.unwrap_or(defaults.show_org_name),
        show_address: b.show_address.unwrap_or(defaults.show_address),
        show_contact_info: b.show_contact_info.unwrap_or(defaults.show_contact_info),
        show_date: b.show_date.unwrap_or(defaults.show_date),
        date_format,
        show_signature: b.show_signature.unwrap_or(defaults.show_signature),
        signature_name: non_empty(b.signature_name),
        signature_title: non_empty(b.signature_title),
        show_confidentiality_footer: b
            .show_confidentiality_footer
            .unwrap_or(defaults.show_confidentiality_footer),
        confidentiality_text: non_empty(b.confidentiality_text)
            .unwrap_or(defaults.confidentiality_text),
    })
}

pub fn branding_to_pb(branding: &BrandingConfig) -> pb::BrandingConfig {
    pb::BrandingConfig {
        show_logo: Some(branding.show_logo),
        show_org_name: Some(branding.show_org_name),
        show_address: Some(branding.show_address),
        show_contact_info: Some(branding.show_contact_info),
        show_date: Some(branding.show_date),
        date_format: branding.date_format.to_string(),
        show_signature: Some(branding.show_signature),
        signature_name: branding.signature_name.clone().unwrap_or_default(),
        signature_title: branding.signature_title.clone().unwrap_or_default(),
        show_confidentiality_footer: Some(branding.show_confidentiality_footer),
        confidentiality_text: branding.confidentiality_text.clone(),
    }
}

/// Converts page settings; zero or empty fields take the standard values.
///
/// # Errors
///
/// Returns `LetterError::InvalidInput` if the page size is not recognised.
pub fn page_from_pb(page: pb::PageSettings) -> LetterResult<PageSettings> {
    let defaults = PageSettings::default();

    let page_size = match non_empty(page.page_size) {
        Some(size) => size.parse::<PageSize>()?,
        None => PageSize::default(),
    };
    let margins = [
        page.margin_top_in,
        page.margin_right_in,
        page.margin_bottom_in,
        page.margin_left_in,
    ];
    let margins = if margins.iter().all(|m| *m == 0.0) {
        Margins::default()
    } else {
        Margins {
            top: page.margin_top_in,
            right: page.margin_right_in,
            bottom: page.margin_bottom_in,
            left: page.margin_left_in,
        }
    };

    Ok(PageSettings {
        page_size,
        margins,
        font_family: non_empty(page.font_family).unwrap_or(defaults.font_family),
        font_size_pt: if page.font_size_pt > 0.0 {
            page.font_size_pt
        } else {
            defaults.font_size_pt
        },
        line_height: if page.line_height > 0.0 {
            page.line_height
        } else {
            defaults.line_height
        },
    })
}

/// Converts a letter request.
///
/// # Errors
///
/// - `LetterError::InvalidId` if either identifier is not canonical.
/// - `LetterError::InvalidInput` if the letter date is not `YYYY-MM-DD`, or the page size is
///   unknown.
/// - `LetterError::InvalidText` if the branding date format is unknown.
pub fn letter_request_from_pb(req: pb::LetterReq) -> LetterResult<LetterRequest> {
    let case_id = CaseId::parse(req.case_id.trim())?;
    let organisation_id = OrganisationId::parse(req.organisation_id.trim())?;

    let letter_date = non_empty(req.letter_date)
        .map(|d| {
            NaiveDate::parse_from_str(d.trim(), "%Y-%m-%d").map_err(|_| {
                LetterError::InvalidInput(format!("letter_date '{}' is not YYYY-MM-DD", d))
            })
        })
        .transpose()?;

    Ok(LetterRequest {
        case_id,
        organisation_id,
        body: non_empty(req.body),
        template: non_empty(req.template).map(|t| t.trim().to_owned()),
        branding: branding_from_pb(req.branding)?,
        page: req.page.map(page_from_pb).transpose()?,
        letter_date,
    })
}

pub fn structure_to_pb(report: &StructureReport) -> pb::StructureReport {
    pb::StructureReport {
        is_valid: report.is_valid,
        errors: report.errors.clone(),
        warnings: report.warnings.clone(),
    }
}

pub fn header_display_to_pb(display: HeaderDisplay) -> pb::HeaderDisplay {
    pb::HeaderDisplay {
        show_logo: display.show_logo,
        show_org_name: display.show_org_name,
    }
}

pub fn header_validation_to_pb(validation: &HeaderValidation) -> pb::HeaderValidation {
    pb::HeaderValidation {
        is_valid: validation.is_valid,
        warning: validation.warning.clone().unwrap_or_default(),
    }
}

pub fn preview_to_pb(preview: &LetterPreview) -> pb::PreviewLetterRes {
    pb::PreviewLetterRes {
        html: preview.rendered.html.clone(),
        css: preview.rendered.css.clone(),
        estimated_pages: u32::try_from(preview.rendered.estimated_pages).unwrap_or(u32::MAX),
        header: Some(header_display_to_pb(preview.rendered.header)),
        header_validation: Some(header_validation_to_pb(&preview.header)),
        structure: Some(structure_to_pb(&preview.structure)),
        unavailable_placeholders: preview.substitution.unavailable.clone(),
        unknown_placeholders: preview.substitution.unknown.clone(),
    }
}

pub fn export_to_pb(payload: ExportPayload) -> pb::FinaliseLetterRes {
    pb::FinaliseLetterRes {
        document: payload.document,
        css: payload.css,
        page_size: payload.page.page_size.to_string(),
        width_in: payload.page.width_in,
        height_in: payload.page.height_in,
        estimated_pages: u32::try_from(payload.estimated_pages).unwrap_or(u32::MAX),
        fingerprint: payload.fingerprint,
    }
}

pub fn variables_to_pb(catalog: Vec<VariableDescriptor>) -> pb::ListVariablesRes {
    pb::ListVariablesRes {
        variables: catalog
            .into_iter()
            .map(|v| pb::Variable {
                key: v.key,
                description: v.description.to_owned(),
            })
            .collect(),
    }
}

pub fn templates_to_pb(library: &TemplateLibrary) -> pb::ListTemplatesRes {
    pb::ListTemplatesRes {
        templates: library
            .list()
            .into_iter()
            .map(|t| pb::LetterTemplate {
                name: t.name.to_string(),
                category: t.category.clone().unwrap_or_default(),
                description: t.description.clone().unwrap_or_default(),
                body: t.body.clone(),
            })
            .collect(),
    }
}
