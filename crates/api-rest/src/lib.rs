//! # API REST
//!
//! REST API for the Casedesk letter engine.
//!
//! Handles:
//! - HTTP endpoints with axum
//! - OpenAPI/Swagger documentation
//! - REST-specific concerns (JSON serialization, CORS)
//!
//! Request and response bodies are the protobuf messages from `api-shared`, so both APIs speak
//! the same shapes.

#![warn(rust_2018_idioms)]

use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use api_shared::{convert, pb, HealthService};
use casedesk_core::{
    default_letter_branding_config, effective_header_display, usable_logo_url,
    validate_header_config, validate_letter_structure, validate_rendered_letter, variable_catalog,
    FileCaseStore, LetterError, LetterService,
};

/// Application state shared by the REST handlers.
#[derive(Clone)]
pub struct AppState {
    pub letters: Arc<LetterService<FileCaseStore>>,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health,
        list_variables,
        list_templates,
        default_branding,
        validate_branding,
        preview_letter,
        validate_letter,
        finalise_letter,
    ),
    components(schemas(
        pb::HealthRes,
        pb::Variable,
        pb::ListVariablesRes,
        pb::LetterTemplate,
        pb::ListTemplatesRes,
        pb::BrandingConfig,
        pb::PageSettings,
        pb::LetterReq,
        pb::StructureReport,
        pb::HeaderDisplay,
        pb::HeaderValidation,
        pb::PreviewLetterRes,
        pb::FinaliseLetterRes,
        pb::ValidateLetterReq,
        pb::ValidateBrandingReq,
        pb::ValidateBrandingRes,
    ))
)]
pub struct ApiDoc;

/// Builds the REST router, including Swagger UI at `/swagger-ui`.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/variables", get(list_variables))
        .route("/templates", get(list_templates))
        .route("/branding/default", get(default_branding))
        .route("/branding/validate", post(validate_branding))
        .route("/letters/preview", post(preview_letter))
        .route("/letters/validate", post(validate_letter))
        .route("/letters/finalise", post(finalise_letter))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

fn error_response(context: &str, e: LetterError) -> (StatusCode, &'static str) {
    tracing::error!("{} error: {:?}", context, e);
    match e {
        LetterError::InvalidInput(_)
        | LetterError::InvalidId(_)
        | LetterError::InvalidText(_)
        | LetterError::MalformedPlaceholder(_)
        | LetterError::UnknownNamespace(_)
        | LetterError::UnknownField { .. } => (StatusCode::BAD_REQUEST, "Bad request"),
        LetterError::TemplateNotFound(_) => (StatusCode::NOT_FOUND, "Template not found"),
        LetterError::NotFinalisable(_) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            "Letter has unresolved structural errors",
        ),
        _ => (StatusCode::INTERNAL_SERVER_ERROR, "Internal error"),
    }
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = pb::HealthRes)
    )
)]
#[axum::debug_handler]
async fn health(State(_state): State<AppState>) -> Json<pb::HealthRes> {
    Json(HealthService::check_health())
}

#[utoipa::path(
    get,
    path = "/variables",
    responses(
        (status = 200, description = "Every placeholder a letter may use", body = pb::ListVariablesRes)
    )
)]
#[axum::debug_handler]
async fn list_variables(State(_state): State<AppState>) -> Json<pb::ListVariablesRes> {
    Json(convert::variables_to_pb(variable_catalog()))
}

#[utoipa::path(
    get,
    path = "/templates",
    responses(
        (status = 200, description = "Loaded letter templates, sorted by name", body = pb::ListTemplatesRes)
    )
)]
#[axum::debug_handler]
async fn list_templates(State(state): State<AppState>) -> Json<pb::ListTemplatesRes> {
    Json(convert::templates_to_pb(state.letters.templates()))
}

#[utoipa::path(
    get,
    path = "/branding/default",
    responses(
        (status = 200, description = "Default letter branding", body = pb::BrandingConfig)
    )
)]
#[axum::debug_handler]
async fn default_branding(State(_state): State<AppState>) -> Json<pb::BrandingConfig> {
    Json(convert::branding_to_pb(&default_letter_branding_config()))
}

#[utoipa::path(
    post,
    path = "/branding/validate",
    request_body = pb::ValidateBrandingReq,
    responses(
        (status = 200, description = "Header validation and the header that will be drawn", body = pb::ValidateBrandingRes),
        (status = 400, description = "Bad request")
    )
)]
/// Checks a branding configuration against the logo that would be used.
///
/// Enabling both the logo and the organisation name is reported as invalid, but the effective
/// display still resolves (the logo wins when one exists).
#[axum::debug_handler]
async fn validate_branding(
    State(_state): State<AppState>,
    Json(req): Json<pb::ValidateBrandingReq>,
) -> Result<Json<pb::ValidateBrandingRes>, (StatusCode, &'static str)> {
    let branding = convert::branding_from_pb(req.branding)
        .map_err(|e| error_response("Validate branding", e))?;
    let logo_url = usable_logo_url(Some(req.logo_url.as_str()));

    let validation = validate_header_config(&branding, logo_url.is_some());
    let display = effective_header_display(&branding, logo_url);
    Ok(Json(pb::ValidateBrandingRes {
        validation: Some(convert::header_validation_to_pb(&validation)),
        display: Some(convert::header_display_to_pb(display)),
    }))
}

#[utoipa::path(
    post,
    path = "/letters/preview",
    request_body = pb::LetterReq,
    responses(
        (status = 200, description = "Rendered letter with its validation report", body = pb::PreviewLetterRes),
        (status = 400, description = "Bad request"),
        (status = 404, description = "Template not found"),
        (status = 500, description = "Internal server error")
    )
)]
/// Renders a letter for a case.
///
/// Placeholders with no data are left in the output and listed in the response, so the author
/// can see what still needs filling in.
#[axum::debug_handler]
async fn preview_letter(
    State(state): State<AppState>,
    Json(req): Json<pb::LetterReq>,
) -> Result<Json<pb::PreviewLetterRes>, (StatusCode, &'static str)> {
    let request =
        convert::letter_request_from_pb(req).map_err(|e| error_response("Preview letter", e))?;
    match state.letters.preview(&request) {
        Ok(preview) => Ok(Json(convert::preview_to_pb(&preview))),
        Err(e) => Err(error_response("Preview letter", e)),
    }
}

#[utoipa::path(
    post,
    path = "/letters/validate",
    request_body = pb::ValidateLetterReq,
    responses(
        (status = 200, description = "Structural validation report", body = pb::StructureReport)
    )
)]
#[axum::debug_handler]
async fn validate_letter(
    State(_state): State<AppState>,
    Json(req): Json<pb::ValidateLetterReq>,
) -> Json<pb::StructureReport> {
    let report = if req.is_html {
        validate_rendered_letter(&req.text)
    } else {
        validate_letter_structure(&req.text)
    };
    Json(convert::structure_to_pb(&report))
}

#[utoipa::path(
    post,
    path = "/letters/finalise",
    request_body = pb::LetterReq,
    responses(
        (status = 200, description = "Print-ready document", body = pb::FinaliseLetterRes),
        (status = 400, description = "Bad request"),
        (status = 404, description = "Template not found"),
        (status = 422, description = "Letter has unresolved structural errors"),
        (status = 500, description = "Internal server error")
    )
)]
/// Produces the export payload for a letter.
///
/// # Errors
/// Returns `422 Unprocessable Entity` if the letter still has structural errors; the preview
/// endpoint reports what they are.
#[axum::debug_handler]
async fn finalise_letter(
    State(state): State<AppState>,
    Json(req): Json<pb::LetterReq>,
) -> Result<Json<pb::FinaliseLetterRes>, (StatusCode, &'static str)> {
    let request =
        convert::letter_request_from_pb(req).map_err(|e| error_response("Finalise letter", e))?;
    match state.letters.finalise(&request) {
        Ok(payload) => Ok(Json(convert::export_to_pb(payload))),
        Err(e) => Err(error_response("Finalise letter", e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Request};
    use casedesk_core::{
        CaseId, CoreConfig, LetterTemplate, NonEmptyText, OrganisationId, PageSize,
        TemplateLibrary,
    };
    use serde::de::DeserializeOwned;
    use tempfile::TempDir;
    use tower::ServiceExt;

    const READY_LETTER: &str = "Dear Marge,\n\nThank you for meeting with us about the renovation \
        schedule. The revised plans are enclosed.\n\nSincerely,\nSam Reyes";

    fn app(temp: &TempDir) -> Router {
        let cfg = Arc::new(
            CoreConfig::new(
                temp.path().to_path_buf(),
                temp.path().join("templates"),
                PageSize::Letter,
                3,
            )
            .unwrap(),
        );
        let mut templates = TemplateLibrary::default();
        templates
            .insert(LetterTemplate {
                name: NonEmptyText::new("Status update").unwrap(),
                category: Some("client".into()),
                description: None,
                body: "Dear {{Contact.name}},".into(),
            })
            .unwrap();
        let store = FileCaseStore::new(cfg.clone());
        router(AppState {
            letters: Arc::new(LetterService::new(cfg, store, templates)),
        })
    }

    fn post_json(uri: &str, body: &impl serde::Serialize) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(body).unwrap()))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    async fn read_json<T: DeserializeOwned>(res: axum::response::Response) -> T {
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn letter(body: &str) -> pb::LetterReq {
        pb::LetterReq {
            case_id: CaseId::new().to_string(),
            organisation_id: OrganisationId::new().to_string(),
            body: body.into(),
            letter_date: "2026-01-06".into(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_health() {
        let temp = TempDir::new().unwrap();
        let res = app(&temp).oneshot(get("/health")).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let body: pb::HealthRes = read_json(res).await;
        assert!(body.ok);
    }

    #[tokio::test]
    async fn test_list_templates() {
        let temp = TempDir::new().unwrap();
        let res = app(&temp).oneshot(get("/templates")).await.unwrap();
        let body: pb::ListTemplatesRes = read_json(res).await;
        assert_eq!(body.templates.len(), 1);
        assert_eq!(body.templates[0].name, "Status update");
        assert_eq!(body.templates[0].category, "client");
    }

    #[tokio::test]
    async fn test_default_branding_has_single_header_element() {
        let temp = TempDir::new().unwrap();
        let res = app(&temp).oneshot(get("/branding/default")).await.unwrap();
        let body: pb::BrandingConfig = read_json(res).await;
        assert_eq!(body.show_logo, Some(true));
        assert_eq!(body.show_org_name, Some(false));
        assert_eq!(body.date_format, "full");
    }

    #[tokio::test]
    async fn test_validate_branding_without_logo_falls_back_to_name() {
        let temp = TempDir::new().unwrap();
        let req = pb::ValidateBrandingReq {
            branding: Some(pb::BrandingConfig {
                show_logo: Some(true),
                ..Default::default()
            }),
            logo_url: String::new(),
        };
        let res = app(&temp)
            .oneshot(post_json("/branding/validate", &req))
            .await
            .unwrap();
        let body: pb::ValidateBrandingRes = read_json(res).await;

        let validation = body.validation.unwrap();
        assert!(validation.is_valid);
        assert!(validation.warning.contains("No logo"));
        let display = body.display.unwrap();
        assert!(!display.show_logo);
        assert!(display.show_org_name);
    }

    #[tokio::test]
    async fn test_validate_branding_unsafe_logo_counts_as_missing() {
        let temp = TempDir::new().unwrap();
        let req = pb::ValidateBrandingReq {
            branding: None,
            logo_url: "javascript:alert(1)".into(),
        };
        let res = app(&temp)
            .oneshot(post_json("/branding/validate", &req))
            .await
            .unwrap();
        let body: pb::ValidateBrandingRes = read_json(res).await;

        assert!(body.validation.unwrap().warning.contains("No logo"));
        let display = body.display.unwrap();
        assert!(!display.show_logo);
        assert!(display.show_org_name);
    }

    #[tokio::test]
    async fn test_preview_partial_branding_keeps_other_sections() {
        let temp = TempDir::new().unwrap();
        let req = serde_json::json!({
            "case_id": CaseId::new().to_string(),
            "organisation_id": OrganisationId::new().to_string(),
            "body": READY_LETTER,
            "letter_date": "2026-01-06",
            "branding": { "showOrgName": true, "showLogo": false },
        });
        let res = app(&temp)
            .oneshot(post_json("/letters/preview", &req))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let body: pb::PreviewLetterRes = read_json(res).await;

        let header = body.header.unwrap();
        assert!(!header.show_logo);
        assert!(header.show_org_name);
        assert!(body
            .html
            .contains("<div class=\"letter-date\">January 6, 2026</div>"));
        assert!(body.html.contains("class=\"signature\""));
        assert!(body.html.contains("class=\"confidentiality\""));
    }

    #[tokio::test]
    async fn test_preview_from_template() {
        let temp = TempDir::new().unwrap();
        let mut req = letter("");
        req.template = "Status update".into();
        let res = app(&temp)
            .oneshot(post_json("/letters/preview", &req))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let body: pb::PreviewLetterRes = read_json(res).await;
        assert_eq!(body.unavailable_placeholders, vec!["Contact.name".to_owned()]);
        assert!(body.css.contains("@page"));
    }

    #[tokio::test]
    async fn test_preview_unknown_template_is_not_found() {
        let temp = TempDir::new().unwrap();
        let mut req = letter("");
        req.template = "Missing".into();
        let res = app(&temp)
            .oneshot(post_json("/letters/preview", &req))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_preview_bad_case_id_is_bad_request() {
        let temp = TempDir::new().unwrap();
        let mut req = letter(READY_LETTER);
        req.case_id = "case-1".into();
        let res = app(&temp)
            .oneshot(post_json("/letters/preview", &req))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_validate_letter_too_short() {
        let temp = TempDir::new().unwrap();
        let req = pb::ValidateLetterReq {
            text: "Dear Sam,".into(),
            is_html: false,
        };
        let res = app(&temp)
            .oneshot(post_json("/letters/validate", &req))
            .await
            .unwrap();
        let body: pb::StructureReport = read_json(res).await;
        assert!(!body.is_valid);
        assert!(body.errors.iter().any(|e| e.contains("too short")));
    }

    #[tokio::test]
    async fn test_finalise_blocks_placeholder_residue() {
        let temp = TempDir::new().unwrap();
        let req = letter(&format!("{READY_LETTER}\n\nP.S. [insert meeting date]"));
        let res = app(&temp)
            .oneshot(post_json("/letters/finalise", &req))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_finalise_ready_letter() {
        let temp = TempDir::new().unwrap();
        let res = app(&temp)
            .oneshot(post_json("/letters/finalise", &letter(READY_LETTER)))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);

        let body: pb::FinaliseLetterRes = read_json(res).await;
        assert!(body.document.starts_with("<!DOCTYPE html>"));
        assert!(body.document.contains("January 6, 2026"));
        assert_eq!(body.page_size, "letter");
        assert_eq!(body.fingerprint.len(), 64);
    }
}
